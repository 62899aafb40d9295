//! Text annotations.

use crate::geometry::text_bounds;
use crate::id::{LayerId, TextId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

fn generate_id() -> TextId {
    TextId::generate()
}

/// A text label placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Older snapshots have no text ids; one is generated on load.
    #[serde(default = "generate_id")]
    pub id: TextId,
    pub x: f64,
    pub y: f64,
    pub value: String,
    pub color: String,
    pub layer_id: LayerId,
}

impl TextElement {
    pub fn new(
        position: Point,
        value: impl Into<String>,
        color: impl Into<String>,
        layer_id: LayerId,
    ) -> Self {
        Self {
            id: TextId::generate(),
            x: position.x,
            y: position.y,
            value: value.into(),
            color: color.into(),
            layer_id,
        }
    }

    /// The drag anchor.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn bounds(&self) -> Rect {
        text_bounds(self.x, self.y, &self.value)
    }

    pub fn hit_test(&self, point: Point) -> bool {
        crate::geometry::contains(self.bounds(), point)
    }
}
