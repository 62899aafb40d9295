//! Conversions between JavaScript-facing values and editor types.

use kurbo::Point;
use serde_json::Value;
use staxs_core::{AppMode, ConfigError, Edge, EditorConfig, KeyPress, Mode, Modifiers};
use thiserror::Error;

/// Errors reported back to JavaScript.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unknown edge: {0}")]
    UnknownEdge(String),
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub fn parse_edge(name: &str) -> Result<Edge, ShellError> {
    Edge::from_name(name).ok_or_else(|| ShellError::UnknownEdge(name.to_string()))
}

pub fn parse_mode(name: &str) -> Result<Mode, ShellError> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| ShellError::UnknownMode(name.to_string()))
}

pub fn parse_app_mode(name: &str) -> Result<AppMode, ShellError> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| ShellError::UnknownMode(name.to_string()))
}

/// Editor config from an optional JSON string; `None` or blank means defaults.
pub fn parse_config(json: Option<&str>) -> Result<EditorConfig, ShellError> {
    match json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => Ok(EditorConfig::from_json(json)?),
        None => Ok(EditorConfig::default()),
    }
}

pub fn key_press(key: &str, ctrl: bool, meta: bool, alt: bool, shift: bool) -> KeyPress {
    KeyPress::new(key, Modifiers { shift, ctrl, alt, meta })
}

/// Whether a document-level key press goes to the editor.
///
/// Presses typed into form fields belong to the field, except Enter and
/// Escape while the floating text input is open.
pub fn routes_key(key: &str, in_editable: bool, has_pending_text: bool) -> bool {
    if !in_editable {
        return true;
    }
    has_pending_text && matches!(key, "Enter" | "Escape")
}

/// Convert window client coordinates into canvas coordinates.
pub fn client_to_canvas(client_x: f64, client_y: f64, canvas_origin: Point) -> Point {
    Point::new(client_x - canvas_origin.x, client_y - canvas_origin.y)
}
