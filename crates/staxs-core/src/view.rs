//! View and session settings.

use crate::config::EditorConfig;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Canvas background style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Blank,
    #[default]
    Dotted,
    Lined,
}

impl BackgroundType {
    /// Cycle blank -> dotted -> lined -> blank.
    pub fn next(self) -> Self {
        match self {
            BackgroundType::Blank => BackgroundType::Dotted,
            BackgroundType::Dotted => BackgroundType::Lined,
            BackgroundType::Lined => BackgroundType::Blank,
        }
    }
}

/// Top-level application surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppMode {
    #[default]
    #[serde(rename = "canvas")]
    Canvas,
    /// The separate 3D view, rendered by an external collaborator.
    #[serde(rename = "3d")]
    ThreeD,
}

/// Zoom factor bounded to a fixed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Zoom {
    /// Bounds given in either order describe the same range.
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: 1.0_f64.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the zoom, clamped into range. Non-finite values are ignored.
    pub fn set(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value.clamp(self.min, self.max);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set(self.value + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.value - self.step);
    }
}

/// Process-wide view state. Only background and zoom are persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub background: BackgroundType,
    pub zoom: Zoom,
    pub dark_mode: bool,
    pub color: String,
    pub snap_to_grid: bool,
    pub tool_status_collapsed: bool,
    pub stats_collapsed: bool,
    pub app_mode: AppMode,
    pub viewport: Size,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ViewState {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            background: config.default_background,
            zoom: Zoom::new(config.min_zoom, config.max_zoom, config.zoom_step),
            dark_mode: false,
            color: config.default_color.clone(),
            snap_to_grid: false,
            tool_status_collapsed: true,
            stats_collapsed: false,
            app_mode: AppMode::Canvas,
            viewport: config.viewport,
        }
    }

    pub fn cycle_background(&mut self) {
        self.background = self.background.next();
    }

    pub fn toggle_snap(&mut self) {
        self.snap_to_grid = !self.snap_to_grid;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_cycle() {
        let mut view = ViewState::default();
        assert_eq!(view.background, BackgroundType::Dotted);
        view.cycle_background();
        assert_eq!(view.background, BackgroundType::Lined);
        view.cycle_background();
        assert_eq!(view.background, BackgroundType::Blank);
        view.cycle_background();
        assert_eq!(view.background, BackgroundType::Dotted);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut zoom = Zoom::new(0.2, 5.0, 0.2);
        for _ in 0..100 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.value(), 5.0);
        for _ in 0..100 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.value(), 0.2);
        zoom.set(f64::NAN);
        assert_eq!(zoom.value(), 0.2);
        zoom.set(42.0);
        assert_eq!(zoom.value(), 5.0);
    }

    #[test]
    fn test_zoom_with_inverted_bounds() {
        let mut zoom = Zoom::new(5.0, 0.2, 0.2);
        assert_eq!(zoom.value(), 1.0);
        zoom.set(9.0);
        assert_eq!(zoom.value(), 5.0);
        zoom.set(0.0);
        assert_eq!(zoom.value(), 0.2);
    }

    #[test]
    fn test_app_mode_names() {
        assert_eq!(serde_json::to_string(&AppMode::ThreeD).unwrap(), "\"3d\"");
        assert_eq!(serde_json::to_string(&BackgroundType::Lined).unwrap(), "\"lined\"");
    }
}
