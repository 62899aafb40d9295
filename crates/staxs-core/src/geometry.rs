//! Small geometry helpers: card edges, hit testing and measurement.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Approximate font size of text annotations.
pub const TEXT_FONT_SIZE: f64 = 16.0;
/// Approximate glyph advance as a fraction of the font size.
const TEXT_ADVANCE: f64 = 0.6;

/// One of the four sides of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// All edges in tie-break order.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
        }
    }

    /// Parse a lowercase edge name.
    pub fn from_name(name: &str) -> Option<Edge> {
        Edge::ALL.into_iter().find(|e| e.name() == name)
    }
}

/// Midpoint of the given edge of `rect`.
pub fn edge_point(rect: Rect, edge: Edge) -> Point {
    let center = rect.center();
    match edge {
        Edge::Top => Point::new(center.x, rect.y0),
        Edge::Right => Point::new(rect.x1, center.y),
        Edge::Bottom => Point::new(center.x, rect.y1),
        Edge::Left => Point::new(rect.x0, center.y),
    }
}

/// Midpoints of all four edges.
pub fn edge_points(rect: Rect) -> [(Edge, Point); 4] {
    Edge::ALL.map(|edge| (edge, edge_point(rect, edge)))
}

/// The edge whose midpoint is closest to `pos`.
///
/// Ties go to the edge listed first in [`Edge::ALL`].
pub fn nearest_edge(rect: Rect, pos: Point) -> Edge {
    let mut best = Edge::Top;
    let mut best_dist = f64::INFINITY;
    for (edge, point) in edge_points(rect) {
        let dist = (point - pos).hypot2();
        if dist < best_dist {
            best = edge;
            best_dist = dist;
        }
    }
    best
}

/// Inclusive bounding-box hit test.
pub fn contains(rect: Rect, pos: Point) -> bool {
    pos.x >= rect.x0 && pos.x <= rect.x1 && pos.y >= rect.y0 && pos.y <= rect.y1
}

/// Euclidean distance, used for the measurement readout.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Approximate box of a text annotation anchored at its baseline.
pub fn text_bounds(x: f64, y: f64, value: &str) -> Rect {
    let width = value.chars().count() as f64 * TEXT_FONT_SIZE * TEXT_ADVANCE;
    Rect::new(x, y - TEXT_FONT_SIZE, x + width, y + TEXT_FONT_SIZE * 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Rect {
        Rect::from_origin_size((100.0, 100.0), (200.0, 100.0))
    }

    #[test]
    fn test_edge_names() {
        for edge in Edge::ALL {
            assert_eq!(Edge::from_name(edge.name()), Some(edge));
        }
        assert_eq!(Edge::from_name("middle"), None);
    }

    #[test]
    fn test_edge_points() {
        let rect = card();
        assert_eq!(edge_point(rect, Edge::Top), Point::new(200.0, 100.0));
        assert_eq!(edge_point(rect, Edge::Right), Point::new(300.0, 150.0));
        assert_eq!(edge_point(rect, Edge::Bottom), Point::new(200.0, 200.0));
        assert_eq!(edge_point(rect, Edge::Left), Point::new(100.0, 150.0));
    }

    #[test]
    fn test_nearest_edge() {
        let rect = card();
        assert_eq!(nearest_edge(rect, Point::new(200.0, 90.0)), Edge::Top);
        assert_eq!(nearest_edge(rect, Point::new(290.0, 150.0)), Edge::Right);
        assert_eq!(nearest_edge(rect, Point::new(210.0, 195.0)), Edge::Bottom);
        assert_eq!(nearest_edge(rect, Point::new(105.0, 140.0)), Edge::Left);
    }

    #[test]
    fn test_nearest_edge_tie_prefers_top() {
        // Center of a square is equidistant from all midpoints.
        let square = Rect::from_origin_size((0.0, 0.0), (100.0, 100.0));
        assert_eq!(nearest_edge(square, Point::new(50.0, 50.0)), Edge::Top);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let rect = card();
        assert!(contains(rect, Point::new(100.0, 100.0)));
        assert!(contains(rect, Point::new(300.0, 200.0)));
        assert!(!contains(rect, Point::new(300.1, 200.0)));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((distance_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((distance_to_segment(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((distance_to_segment(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Edge::Bottom).unwrap(), "\"bottom\"");
    }
}
