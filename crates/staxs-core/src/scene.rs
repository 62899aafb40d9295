//! The scene: every drawable entity store of a project.

use crate::card::{Card, Connection};
use crate::geometry::contains;
use crate::id::{CardId, LayerId, PathId, TextId};
use crate::layer::LayerStack;
use crate::path::Path;
use crate::text::TextElement;
use kurbo::{Point, Size};
use serde::Serialize;

/// Entity counts for the stats overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneStats {
    pub cards: usize,
    pub connections: usize,
    pub layers: usize,
    pub paths: usize,
    pub text_elements: usize,
}

/// A connection whose cards both exist, with its endpoints resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConnection<'a> {
    pub connection: &'a Connection,
    pub from: Point,
    pub to: Point,
}

/// All entity stores. Each store is a flat list in back-to-front order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub(crate) cards: Vec<Card>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) layers: LayerStack,
    pub(crate) paths: Vec<Path>,
    pub(crate) texts: Vec<TextElement>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Scene {
    /// A fresh scene: one welcome card and one layer.
    pub fn new(viewport: Size) -> Self {
        Self {
            cards: vec![Card::welcome(viewport)],
            connections: Vec::new(),
            layers: LayerStack::default(),
            paths: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// A scene with no entities and no layers.
    pub fn empty() -> Self {
        Self {
            cards: Vec::new(),
            connections: Vec::new(),
            layers: LayerStack::from_layers(Vec::new()),
            paths: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            cards: self.cards.len(),
            connections: self.connections.len(),
            layers: self.layers.len(),
            paths: self.paths.len(),
            text_elements: self.texts.len(),
        }
    }

    // --- Paths ---

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn add_path(&mut self, path: Path) -> PathId {
        let id = path.id.clone();
        self.paths.push(path);
        id
    }

    pub fn path(&self, id: &PathId) -> Option<&Path> {
        self.paths.iter().find(|p| &p.id == id)
    }

    pub fn path_mut(&mut self, id: &PathId) -> Option<&mut Path> {
        self.paths.iter_mut().find(|p| &p.id == id)
    }

    // --- Text ---

    pub fn texts(&self) -> &[TextElement] {
        &self.texts
    }

    pub fn add_text(&mut self, text: TextElement) -> TextId {
        let id = text.id.clone();
        self.texts.push(text);
        id
    }

    pub fn text(&self, id: &TextId) -> Option<&TextElement> {
        self.texts.iter().find(|t| &t.id == id)
    }

    pub fn text_mut(&mut self, id: &TextId) -> Option<&mut TextElement> {
        self.texts.iter_mut().find(|t| &t.id == id)
    }

    /// Replace the value of a text element in place.
    pub fn edit_text(&mut self, id: &TextId, value: impl Into<String>) -> bool {
        match self.text_mut(id) {
            Some(text) => {
                text.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove every path and text element. Cards, connections and layers stay.
    pub fn clear_drawings(&mut self) {
        self.paths.clear();
        self.texts.clear();
    }

    // --- Layers ---

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    /// Delete a layer together with exactly the paths and text on it.
    pub fn delete_layer(&mut self, id: &LayerId) -> bool {
        if self.layers.remove(id).is_none() {
            return false;
        }
        self.paths.retain(|p| &p.layer_id != id);
        self.texts.retain(|t| &t.layer_id != id);
        true
    }

    // --- Cards ---

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn add_card(&mut self, card: Card) -> CardId {
        let id = card.id.clone();
        self.cards.push(card);
        id
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    pub fn card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| &c.id == id)
    }

    pub fn move_card(&mut self, id: &CardId, origin: Point) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.x = origin.x;
                card.y = origin.y;
                true
            }
            None => false,
        }
    }

    /// Resize a card, clamped to `min`.
    pub fn resize_card(&mut self, id: &CardId, size: Size, min: Size) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.resize(size, min);
                true
            }
            None => false,
        }
    }

    pub fn edit_card(
        &mut self,
        id: &CardId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.title = title.into();
                card.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Flip a card's hidden flag, returning the new value.
    pub fn toggle_card_hidden(&mut self, id: &CardId) -> Option<bool> {
        let card = self.card_mut(id)?;
        card.hidden = !card.hidden;
        Some(card.hidden)
    }

    pub fn show_all_cards(&mut self) {
        for card in &mut self.cards {
            card.hidden = false;
        }
    }

    /// Delete a card. Connections touching it are left in place and become
    /// dangling.
    pub fn delete_card(&mut self, id: &CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| &c.id == id)?;
        Some(self.cards.remove(index))
    }

    /// First visible card whose rectangle contains `pos`.
    pub fn find_card_at(&self, pos: Point) -> Option<&Card> {
        self.cards.iter().find(|c| !c.hidden && contains(c.rect(), pos))
    }

    // --- Connections ---

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Connections with both cards present, with endpoints resolved.
    pub fn resolved_connections(&self) -> impl Iterator<Item = ResolvedConnection<'_>> + '_ {
        self.connections.iter().filter_map(|connection| {
            let from = self.card(&connection.from_card_id)?;
            let to = self.card(&connection.to_card_id)?;
            Some(ResolvedConnection {
                connection,
                from: from.anchor(connection.from_edge),
                to: to.anchor(connection.to_edge),
            })
        })
    }

    /// Connections that reference at least one missing card.
    pub fn dangling_connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections
            .iter()
            .filter(|c| self.card(&c.from_card_id).is_none() || self.card(&c.to_card_id).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Edge;
    use crate::path::points_to_segments;

    fn path_on(layer: &LayerId) -> Path {
        Path::new(
            points_to_segments(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]),
            "#222",
            layer.clone(),
        )
    }

    fn text_on(layer: &LayerId) -> TextElement {
        TextElement::new(Point::new(5.0, 5.0), "note", "#222", layer.clone())
    }

    #[test]
    fn test_new_scene() {
        let scene = Scene::default();
        let stats = scene.stats();
        assert_eq!(stats.cards, 1);
        assert_eq!(stats.layers, 1);
        assert_eq!(stats.paths, 0);
    }

    #[test]
    fn test_delete_layer_prunes_only_its_content() {
        let mut scene = Scene::default();
        let first = LayerId::new("layer-1");
        let second = scene.layers_mut().add();

        scene.add_path(path_on(&first));
        let kept_path = scene.add_path(path_on(&second));
        scene.add_text(text_on(&first));
        let kept_text = scene.add_text(text_on(&second));

        assert!(scene.delete_layer(&first));

        assert_eq!(scene.paths().len(), 1);
        assert_eq!(scene.paths()[0].id, kept_path);
        assert_eq!(scene.texts().len(), 1);
        assert_eq!(scene.texts()[0].id, kept_text);
        assert!(!scene.delete_layer(&first));
    }

    #[test]
    fn test_clear_drawings_keeps_cards_and_layers() {
        let mut scene = Scene::default();
        let layer = LayerId::new("layer-1");
        scene.add_path(path_on(&layer));
        scene.add_text(text_on(&layer));
        scene.clear_drawings();
        assert!(scene.paths().is_empty());
        assert!(scene.texts().is_empty());
        assert_eq!(scene.cards().len(), 1);
        assert_eq!(scene.layers().len(), 1);
    }

    #[test]
    fn test_delete_card_leaves_dangling_connection() {
        let mut scene = Scene::empty();
        let a = scene.add_card(Card::blank(Point::new(0.0, 0.0)));
        let b = scene.add_card(Card::blank(Point::new(500.0, 0.0)));
        scene.add_connection(Connection::new((a.clone(), Edge::Right), (b.clone(), Edge::Left)));

        assert_eq!(scene.resolved_connections().count(), 1);
        scene.delete_card(&b);

        assert_eq!(scene.connections().len(), 1);
        assert_eq!(scene.resolved_connections().count(), 0);
        assert_eq!(scene.dangling_connections().count(), 1);
    }

    #[test]
    fn test_resolved_connection_endpoints() {
        let mut scene = Scene::empty();
        let a = scene.add_card(Card::blank(Point::new(0.0, 0.0)));
        let b = scene.add_card(Card::blank(Point::new(500.0, 0.0)));
        scene.add_connection(Connection::new((a, Edge::Right), (b, Edge::Left)));

        let resolved = scene.resolved_connections().next().unwrap();
        assert_eq!(resolved.from, Point::new(320.0, 90.0));
        assert_eq!(resolved.to, Point::new(500.0, 90.0));
    }

    #[test]
    fn test_find_card_at_skips_hidden() {
        let mut scene = Scene::empty();
        let a = scene.add_card(Card::blank(Point::new(0.0, 0.0)));
        assert!(scene.find_card_at(Point::new(10.0, 10.0)).is_some());
        scene.toggle_card_hidden(&a);
        assert!(scene.find_card_at(Point::new(10.0, 10.0)).is_none());
        scene.show_all_cards();
        assert!(scene.find_card_at(Point::new(10.0, 10.0)).is_some());
    }

    #[test]
    fn test_card_edits() {
        let mut scene = Scene::empty();
        let id = scene.add_card(Card::blank(Point::new(0.0, 0.0)));
        assert!(scene.move_card(&id, Point::new(40.0, 50.0)));
        assert!(scene.resize_card(&id, Size::new(20.0, 20.0), Size::new(180.0, 100.0)));
        assert!(scene.edit_card(&id, "Title", "Body"));
        let card = scene.card(&id).unwrap();
        assert_eq!(card.origin(), Point::new(40.0, 50.0));
        assert_eq!(card.size(), Size::new(180.0, 100.0));
        assert_eq!(card.title, "Title");
        assert!(scene.delete_card(&id).is_some());
        assert!(!scene.move_card(&id, Point::ZERO));
    }
}
