//! Drawn paths as typed move/line segments.
//!
//! Paths are stored structurally. The SVG `d` form is only produced for the
//! presentation layer and parsed when loading snapshots written before
//! segments existed.

use crate::geometry::distance_to_segment;
use crate::id::{LayerId, PathId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Errors from parsing a path string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathParseError {
    #[error("Unsupported path command '{0}'")]
    UnsupportedCommand(char),
    #[error("Expected a coordinate pair after '{0}'")]
    MissingCoordinates(char),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Path data must start with a command")]
    MissingCommand,
}

/// Kind of a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    MoveTo,
    LineTo,
}

impl SegmentKind {
    fn command(self) -> char {
        match self {
            SegmentKind::MoveTo => 'M',
            SegmentKind::LineTo => 'L',
        }
    }
}

/// One command of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub x: f64,
    pub y: f64,
}

impl Segment {
    pub fn move_to(point: Point) -> Self {
        Self {
            kind: SegmentKind::MoveTo,
            x: point.x,
            y: point.y,
        }
    }

    pub fn line_to(point: Point) -> Self {
        Self {
            kind: SegmentKind::LineTo,
            x: point.x,
            y: point.y,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Build a polyline: a move to the first point, then a line to each other.
pub fn points_to_segments(points: &[Point]) -> Vec<Segment> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 {
                Segment::move_to(p)
            } else {
                Segment::line_to(p)
            }
        })
        .collect()
}

/// Format segments as SVG path data (`M10,20 L30,40`).
pub fn segments_to_svg(segments: &[Segment]) -> String {
    let mut d = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        let _ = write!(d, "{}{},{}", seg.kind.command(), seg.x, seg.y);
    }
    d
}

/// Parse absolute `M`/`L` path data.
///
/// Numbers may be separated by commas or whitespace and may be negative or
/// fractional. Extra coordinate pairs after a command repeat it, with pairs
/// after `M` becoming line-tos.
pub fn parse_svg_path(d: &str) -> Result<Vec<Segment>, PathParseError> {
    let mut tokens = Tokenizer::new(d);
    let mut segments = Vec::new();
    let mut current: Option<char> = None;

    while let Some(token) = tokens.next_token()? {
        let (cmd, first) = match token {
            Token::Command(c) => {
                if c != 'M' && c != 'L' {
                    return Err(PathParseError::UnsupportedCommand(c));
                }
                current = Some(c);
                let x = tokens.expect_number(c)?;
                (c, x)
            }
            Token::Number(x) => {
                // Implicit repetition; pairs after M were already turned into L.
                (current.ok_or(PathParseError::MissingCommand)?, x)
            }
        };
        let y = tokens.expect_number(cmd)?;
        let point = Point::new(first, y);
        segments.push(if cmd == 'M' {
            Segment::move_to(point)
        } else {
            Segment::line_to(point)
        });
        if cmd == 'M' {
            current = Some('L');
        }
    }
    Ok(segments)
}

enum Token {
    Command(char),
    Number(f64),
}

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() || c == ',' {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, PathParseError> {
        self.skip_separators();
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            self.chars.next();
            return Ok(Some(Token::Command(c)));
        }
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            let after_exponent = self.src[..i].ends_with(['e', 'E']);
            let is_sign = (c == '-' || c == '+') && i != start && !after_exponent;
            if is_sign || !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        if end == start {
            // Not a number and not a command letter.
            self.chars.next();
            return Err(PathParseError::UnsupportedCommand(c));
        }
        let text = &self.src[start..end];
        text.parse::<f64>()
            .map(|v| Some(Token::Number(v)))
            .map_err(|_| PathParseError::InvalidNumber(text.to_string()))
    }

    fn expect_number(&mut self, cmd: char) -> Result<f64, PathParseError> {
        match self.next_token()? {
            Some(Token::Number(v)) => Ok(v),
            _ => Err(PathParseError::MissingCoordinates(cmd)),
        }
    }
}

/// A committed stroke.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: PathId,
    pub segments: Vec<Segment>,
    pub color: String,
    pub layer_id: LayerId,
}

impl Path {
    pub fn new(segments: Vec<Segment>, color: impl Into<String>, layer_id: LayerId) -> Self {
        Self {
            id: PathId::generate(),
            segments,
            color: color.into(),
            layer_id,
        }
    }

    /// Coordinates of the first move-to, the path's drag anchor.
    pub fn anchor(&self) -> Option<Point> {
        self.segments
            .iter()
            .find(|s| s.kind == SegmentKind::MoveTo)
            .map(Segment::point)
    }

    /// Translate every segment by `delta`, keeping kinds and order.
    pub fn translate(&mut self, delta: Vec2) {
        for seg in &mut self.segments {
            seg.x += delta.x;
            seg.y += delta.y;
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().map(Segment::point)
    }

    /// Coordinates of the last line-to, if any.
    pub fn last_line_to(&self) -> Option<Point> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.kind == SegmentKind::LineTo)
            .map(Segment::point)
    }

    pub fn to_svg(&self) -> String {
        segments_to_svg(&self.segments)
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.points();
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
    }

    /// Whether `point` lies within `tolerance` of any drawn stroke.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let mut prev: Option<Point> = None;
        for seg in &self.segments {
            let p = seg.point();
            let hit = match (seg.kind, prev) {
                (SegmentKind::LineTo, Some(a)) => distance_to_segment(point, a, p) <= tolerance,
                _ => point.distance(p) <= tolerance,
            };
            if hit {
                return true;
            }
            prev = Some(p);
        }
        false
    }
}

/// On-disk shape of a path: either structured segments or legacy `d` data.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRecord {
    #[serde(default)]
    id: Option<PathId>,
    #[serde(default)]
    segments: Option<Vec<Segment>>,
    #[serde(default)]
    d: Option<String>,
    color: String,
    layer_id: LayerId,
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = PathRecord::deserialize(deserializer)?;
        let segments = match (record.segments, record.d) {
            (Some(segments), _) => segments,
            (None, Some(d)) => parse_svg_path(&d).map_err(serde::de::Error::custom)?,
            (None, None) => return Err(serde::de::Error::missing_field("segments")),
        };
        Ok(Path {
            id: record.id.unwrap_or_else(PathId::generate),
            segments,
            color: record.color,
            layer_id: record.layer_id,
        })
    }
}
