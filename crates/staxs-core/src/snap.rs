//! Grid snapping.

use kurbo::Point;

/// Grid spacing (matches the dotted background).
pub const GRID_SIZE: f64 = 20.0;
/// Offset of the first grid line from the origin.
pub const GRID_OFFSET: f64 = 10.0;

/// A snapping lattice with fixed spacing and offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: f64,
    pub offset: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            offset: GRID_OFFSET,
        }
    }
}

impl Grid {
    pub fn new(size: f64, offset: f64) -> Self {
        Self { size, offset }
    }

    /// Round a single coordinate to the nearest grid line.
    ///
    /// Halfway values go to the line above, so the origin snaps to `offset`
    /// rather than `offset - size`.
    pub fn snap(&self, v: f64) -> f64 {
        ((v - self.offset) / self.size + 0.5).floor() * self.size + self.offset
    }

    /// Snap both axes of a point.
    pub fn snap_point(&self, point: Point) -> Point {
        Point::new(self.snap(point.x), self.snap(point.y))
    }
}
