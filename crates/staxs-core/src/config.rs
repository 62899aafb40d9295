//! Editor configuration.

use crate::view::BackgroundType;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key the project snapshot lives under.
pub const DEFAULT_STORAGE_KEY: &str = "staxs_project";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunable constants of the editor.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub storage_key: String,
    pub grid_size: f64,
    pub grid_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub min_card_width: f64,
    pub min_card_height: f64,
    pub default_color: String,
    pub default_background: BackgroundType,
    pub viewport: Size,
    /// Pointer tolerance (in canvas units) for selecting a path.
    pub hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            grid_size: 20.0,
            grid_offset: 10.0,
            min_zoom: 0.2,
            max_zoom: 5.0,
            zoom_step: 0.2,
            min_card_width: 180.0,
            min_card_height: 100.0,
            default_color: "#222".to_string(),
            default_background: BackgroundType::Dotted,
            viewport: Size::new(1280.0, 800.0),
            hit_tolerance: 6.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storage key is empty".into()));
        }
        if self.grid_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid size must be positive, got {}",
                self.grid_size
            )));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds [{}, {}] are not a valid range",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoom step must be positive".into()));
        }
        if self.min_card_width <= 0.0 || self.min_card_height <= 0.0 {
            return Err(ConfigError::Invalid("minimum card size must be positive".into()));
        }
        Ok(())
    }
}
