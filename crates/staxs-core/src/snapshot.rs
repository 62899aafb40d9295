//! Project snapshot serialization.
//!
//! A snapshot is one JSON object holding every entity store plus the
//! persisted view settings. Loading is tolerant: each field is read on its
//! own, and a malformed field (or a malformed element inside an array
//! field) is skipped with a warning instead of failing the whole load.

use crate::card::{Card, Connection};
use crate::layer::Layer;
use crate::path::Path;
use crate::text::TextElement;
use crate::view::BackgroundType;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that reject a snapshot as a whole.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Snapshot is not a JSON object")]
    NotAnObject,
    #[error("Snapshot schema {found} is newer than supported schema {}", SCHEMA_VERSION)]
    UnsupportedSchema { found: u64 },
}

/// The record written on save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot<'a> {
    pub cards: &'a [Card],
    pub connections: &'a [Connection],
    pub layers: &'a [Layer],
    pub paths: &'a [Path],
    pub text_elements: &'a [TextElement],
    pub background_type: BackgroundType,
    pub zoom: f64,
    pub last_saved_at: i64,
    pub save_version: u64,
    pub schema_version: u32,
}

impl ProjectSnapshot<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The fields recovered from a stored snapshot. `None` means the field was
/// absent or malformed, and the current value should be kept.
#[derive(Debug, Default)]
pub struct LoadedSnapshot {
    pub cards: Option<Vec<Card>>,
    pub connections: Option<Vec<Connection>>,
    pub layers: Option<Vec<Layer>>,
    pub paths: Option<Vec<Path>>,
    pub text_elements: Option<Vec<TextElement>>,
    pub background_type: Option<BackgroundType>,
    pub zoom: Option<f64>,
    pub last_saved_at: Option<i64>,
    pub save_version: Option<u64>,
}

impl LoadedSnapshot {
    /// Parse a stored snapshot.
    ///
    /// A missing `schemaVersion` is read as version 1.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        if let Some(found) = map.get("schemaVersion").and_then(Value::as_u64) {
            if found > u64::from(SCHEMA_VERSION) {
                return Err(SnapshotError::UnsupportedSchema { found });
            }
        }

        Ok(Self {
            cards: array_field(&map, "cards"),
            connections: array_field(&map, "connections"),
            layers: array_field(&map, "layers"),
            paths: array_field(&map, "paths"),
            text_elements: array_field(&map, "textElements"),
            background_type: scalar_field(&map, "backgroundType"),
            zoom: scalar_field::<f64>(&map, "zoom").filter(|z| z.is_finite() && *z > 0.0),
            last_saved_at: scalar_field(&map, "lastSavedAt"),
            save_version: scalar_field(&map, "saveVersion"),
        })
    }
}

fn scalar_field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<T> {
    let value = map.get(name).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring malformed snapshot field {name}: {e}");
            None
        }
    }
}

fn array_field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<Vec<T>> {
    let value = map.get(name).filter(|v| !v.is_null())?;
    let Some(items) = value.as_array() else {
        log::warn!("Ignoring snapshot field {name}: expected an array");
        return None;
    };
    let parsed = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Skipping malformed {name}[{index}]: {e}");
                None
            }
        })
        .collect();
    Some(parsed)
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    use web_time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Human-readable save status line.
pub fn save_status(save_version: u64, last_saved_at: Option<i64>) -> String {
    match last_saved_at.and_then(format_timestamp) {
        Some(when) if save_version > 0 => format!("Saved v{save_version} - {when}"),
        _ => "Not saved yet".to_string(),
    }
}
