//! Note cards and the connections between them.

use crate::geometry::{Edge, edge_point};
use crate::id::{CardId, ConnectionId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Size of cards created with "Add Card".
pub const NEW_CARD_SIZE: Size = Size::new(320.0, 180.0);
/// Size of the welcome card in a fresh scene.
pub const WELCOME_CARD_SIZE: Size = Size::new(340.0, 220.0);

/// A free-floating, resizable note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub hidden: bool,
}

impl Card {
    pub fn new(
        id: CardId,
        origin: Point,
        size: Size,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            title: title.into(),
            content: content.into(),
            hidden: false,
        }
    }

    /// The card shown in an empty scene, centered in the viewport.
    pub fn welcome(viewport: Size) -> Self {
        let origin = Point::new(
            viewport.width / 2.0 - WELCOME_CARD_SIZE.width / 2.0,
            viewport.height / 2.0 - WELCOME_CARD_SIZE.height / 2.0,
        );
        Self::new(
            CardId::new("card-1"),
            origin,
            WELCOME_CARD_SIZE,
            "staxs.dev <br/> studio canvas",
            "A flexible digital canvas for brainstorming, note-taking, and visual thinking.",
        )
    }

    /// A blank card at `origin`.
    pub fn blank(origin: Point) -> Self {
        Self::new(CardId::generate(), origin, NEW_CARD_SIZE, "New Card", "Double-click to edit.")
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    /// Midpoint of one of the card's edges.
    pub fn anchor(&self, edge: Edge) -> Point {
        edge_point(self.rect(), edge)
    }

    /// Resize, never going below `min`.
    pub fn resize(&mut self, size: Size, min: Size) {
        self.width = size.width.max(min.width);
        self.height = size.height.max(min.height);
    }
}

/// A directed link from one card edge to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_card_id: CardId,
    pub from_edge: Edge,
    pub to_card_id: CardId,
    pub to_edge: Edge,
}

impl Connection {
    pub fn new(from: (CardId, Edge), to: (CardId, Edge)) -> Self {
        Self {
            id: ConnectionId::generate(),
            from_card_id: from.0,
            from_edge: from.1,
            to_card_id: to.0,
            to_edge: to.1,
        }
    }
}
