//! Interaction modes.

use serde::{Deserialize, Serialize};

/// How pointer input on the canvas is interpreted. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Freehand strokes.
    #[default]
    Draw,
    /// Click-to-place polylines, committed with Enter.
    Point,
    /// Pick and drag paths and text.
    Select,
    /// Click to place a text annotation.
    Text,
}

impl Mode {
    /// Mode reached by pressing the shortcut for `target` while in `self`.
    ///
    /// Pressing the shortcut of the active mode returns to drawing.
    pub fn toggled(self, target: Mode) -> Mode {
        if self == target { Mode::Draw } else { target }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Draw => "Draw",
            Mode::Point => "Point",
            Mode::Select => "Select",
            Mode::Text => "Text",
        }
    }
}
