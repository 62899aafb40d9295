//! The editor: routes pointer and keyboard input into scene mutations.

use crate::card::{Card, Connection};
use crate::config::{ConfigError, EditorConfig};
use crate::geometry::{Edge, distance, nearest_edge};
use crate::id::{CardId, ConnectionId, LayerId, PathId, TextId};
use crate::input::{KeyPress, PointerEvent};
use crate::mode::Mode;
use crate::path::{Path, Segment, SegmentKind, points_to_segments};
use crate::render::DisplayList;
use crate::scene::Scene;
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::snap::Grid;
use crate::snapshot::{self, LoadedSnapshot, ProjectSnapshot, SCHEMA_VERSION};
use crate::storage::{SnapshotStore, StorageError};
use crate::text::TextElement;
use crate::view::{AppMode, BackgroundType, ViewState};
use kurbo::{Point, Size, Vec2};
use serde::Serialize;
use uuid::Uuid;

/// The element picked in select mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Path(PathId),
    Text(TextId),
}

/// A pointer gesture that outlives the element it started on.
///
/// While one is active the host must forward window-level pointer moves
/// and the final pointer up, since the pointer may leave the card.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Moving a card; `offset` is pointer minus card origin at grab time.
    CardDrag { card: CardId, offset: Vec2 },
    /// Resizing a card from its bottom-right handle.
    CardResize {
        card: CardId,
        start_size: Size,
        start_pointer: Point,
    },
    /// Dragging a new connection out of a card anchor.
    ConnectionDrag {
        card: CardId,
        edge: Edge,
        start: Point,
        cursor: Point,
    },
}

/// Text waiting for the user to finish typing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingText {
    pub position: Point,
    pub value: String,
}

/// Editor state and event router.
pub struct Editor {
    config: EditorConfig,
    grid: Grid,
    scene: Scene,
    view: ViewState,
    mode: Mode,

    /// Points placed in point mode.
    points: Vec<Point>,
    /// In-progress path: the live stroke or the point-mode preview.
    buffer: Vec<Segment>,
    drawing: bool,

    selection: Option<Selection>,
    dragging: bool,
    drag_offset: Vec2,

    pending_text: Option<PendingText>,
    gesture: Option<Gesture>,
    pending_connection: Option<(CardId, Edge)>,
    hovered_card: Option<CardId>,
    cursor: Point,

    save_version: u64,
    last_saved_at: Option<i64>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Build an editor from `config`. Use [`Editor::try_new`] to reject an
    /// invalid config instead of running with it.
    pub fn new(config: EditorConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Running with questionable config: {e}");
        }
        let view = ViewState::from_config(&config);
        Self {
            grid: Grid::new(config.grid_size, config.grid_offset),
            scene: Scene::new(config.viewport),
            view,
            mode: Mode::default(),
            points: Vec::new(),
            buffer: Vec::new(),
            drawing: false,
            selection: None,
            dragging: false,
            drag_offset: Vec2::ZERO,
            pending_text: None,
            gesture: None,
            pending_connection: None,
            hovered_card: None,
            cursor: Point::ZERO,
            save_version: 0,
            last_saved_at: None,
            config,
        }
    }

    pub fn try_new(config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn buffer(&self) -> &[Segment] {
        &self.buffer
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pending_text(&self) -> Option<&PendingText> {
        self.pending_text.as_ref()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Whether a window-level gesture is in progress.
    pub fn has_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn pending_connection(&self) -> Option<&(CardId, Edge)> {
        self.pending_connection.as_ref()
    }

    pub fn hovered_card(&self) -> Option<&CardId> {
        self.hovered_card.as_ref()
    }

    /// Last raw pointer position.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn save_version(&self) -> u64 {
        self.save_version
    }

    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    // --- Modes ---

    /// Press the shortcut for `target`: switch to it, or back to drawing
    /// when it is already active.
    pub fn toggle_mode(&mut self, target: Mode) {
        let next = self.mode.toggled(target);
        self.set_mode(next);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        log::debug!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.points.clear();
        self.buffer.clear();
        self.drawing = false;
        self.selection = None;
        self.dragging = false;
        if mode != Mode::Text {
            self.pending_text = None;
        }
    }

    // --- Pointer input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
        }
    }

    fn snapped(&self, position: Point) -> Point {
        if self.view.snap_to_grid {
            self.grid.snap_point(position)
        } else {
            position
        }
    }

    pub fn pointer_down(&mut self, position: Point) {
        self.cursor = position;
        let p = self.snapped(position);
        match self.mode {
            Mode::Text => {
                self.pending_text = Some(PendingText {
                    position: p,
                    value: String::new(),
                });
            }
            Mode::Select => self.select_at(p),
            Mode::Point => {
                self.points.push(p);
                self.buffer = points_to_segments(&self.points);
            }
            Mode::Draw => {
                self.drawing = true;
                self.buffer = vec![Segment::move_to(p)];
            }
        }
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.cursor = position;
        let p = self.snapped(position);
        match self.mode {
            Mode::Select if self.dragging => self.drag_selection_to(p),
            Mode::Draw if self.drawing => self.buffer.push(Segment::line_to(p)),
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, position: Point) {
        self.cursor = position;
        match self.mode {
            Mode::Select => self.dragging = false,
            Mode::Draw if self.drawing => {
                self.drawing = false;
                let segments = std::mem::take(&mut self.buffer);
                self.commit_path(segments);
            }
            _ => {}
        }
    }

    /// Hit-test text, then paths, top-most first, skipping hidden layers.
    fn select_at(&mut self, p: Point) {
        let layers = self.scene.layers();
        let text_hit = self
            .scene
            .texts()
            .iter()
            .rev()
            .find(|t| layers.is_visible(&t.layer_id) && t.hit_test(p));
        if let Some(text) = text_hit {
            self.drag_offset = p - text.position();
            self.selection = Some(Selection::Text(text.id.clone()));
            self.dragging = true;
            return;
        }

        let tolerance = self.config.hit_tolerance;
        let path_hit = self
            .scene
            .paths()
            .iter()
            .rev()
            .find(|path| layers.is_visible(&path.layer_id) && path.hit_test(p, tolerance));
        match path_hit {
            Some(path) => {
                self.drag_offset = path.anchor().map_or(Vec2::ZERO, |anchor| p - anchor);
                self.selection = Some(Selection::Path(path.id.clone()));
                self.dragging = true;
            }
            None => self.selection = None,
        }
    }

    fn drag_selection_to(&mut self, p: Point) {
        let target = p - self.drag_offset;
        match &self.selection {
            Some(Selection::Text(id)) => {
                if let Some(text) = self.scene.text_mut(id) {
                    text.set_position(target);
                }
            }
            Some(Selection::Path(id)) => {
                if let Some(path) = self.scene.path_mut(id) {
                    if let Some(anchor) = path.anchor() {
                        path.translate(target - anchor);
                    }
                }
            }
            None => {}
        }
    }

    fn commit_path(&mut self, segments: Vec<Segment>) -> Option<PathId> {
        if segments.is_empty() {
            return None;
        }
        let Some(layer) = self.scene.layers().active().cloned() else {
            log::debug!("No active layer, dropping path");
            return None;
        };
        let path = Path::new(segments, self.view.color.clone(), layer);
        Some(self.scene.add_path(path))
    }

    /// Commit the point-mode sequence as one path. Nothing happens when no
    /// points were placed.
    pub fn commit_points(&mut self) -> Option<PathId> {
        if self.mode != Mode::Point || self.points.is_empty() {
            return None;
        }
        let segments = points_to_segments(&self.points);
        self.points.clear();
        self.buffer.clear();
        self.commit_path(segments)
    }

    /// Distance readout for the measurement overlay.
    pub fn measure(&self) -> Option<f64> {
        match self.mode {
            Mode::Point => match self.points.as_slice() {
                [.., a, b] => Some(distance(*a, *b)),
                _ => None,
            },
            Mode::Draw if self.drawing => {
                let current = self
                    .buffer
                    .iter()
                    .rev()
                    .find(|s| s.kind == SegmentKind::LineTo)?
                    .point();
                let previous = self.scene.paths().last()?.last_line_to()?;
                Some(distance(previous, current))
            }
            _ => None,
        }
    }

    // --- Text ---

    pub fn set_text_input(&mut self, value: impl Into<String>) {
        if let Some(pending) = &mut self.pending_text {
            pending.value = value.into();
        }
    }

    /// Turn the pending input into a text element. Whitespace-only input
    /// commits nothing and keeps the input open.
    pub fn commit_text(&mut self) -> Option<TextId> {
        let pending = self.pending_text.as_ref()?;
        if pending.value.trim().is_empty() {
            return None;
        }
        let layer = self.scene.layers().active().cloned()?;
        let text = TextElement::new(
            pending.position,
            pending.value.clone(),
            self.view.color.clone(),
            layer,
        );
        self.pending_text = None;
        Some(self.scene.add_text(text))
    }

    pub fn cancel_text(&mut self) {
        self.pending_text = None;
    }

    pub fn edit_text(&mut self, id: &TextId, value: impl Into<String>) -> bool {
        self.scene.edit_text(id, value)
    }

    // --- Keyboard ---

    /// Run the command bound to `press`, returning it so the host can
    /// suppress the platform default.
    pub fn key_down(&mut self, press: &KeyPress) -> Option<Command> {
        let command = ShortcutRegistry::lookup(press)?;
        self.execute(command);
        Some(command)
    }

    pub fn execute(&mut self, command: Command) {
        log::debug!("Executing {command:?}");
        match command {
            Command::ToggleSnap => self.view.toggle_snap(),
            Command::ToggleMode(mode) => self.toggle_mode(mode),
            Command::ClearDrawings => self.clear_drawings(),
            Command::CycleBackground => self.view.cycle_background(),
            Command::ZoomIn => self.view.zoom.zoom_in(),
            Command::ZoomOut => self.view.zoom.zoom_out(),
            Command::ToggleToolStatus => self.toggle_tool_status(),
            Command::ShowThreeD => self.view.app_mode = AppMode::ThreeD,
            Command::ShowCanvas => self.view.app_mode = AppMode::Canvas,
            Command::Cancel => self.cancel(),
            Command::CommitPoints => {
                if self.pending_text.is_some() {
                    self.commit_text();
                } else {
                    self.commit_points();
                }
            }
        }
    }

    /// Drop pending text input, the selection, the drag flag and any
    /// active gesture. The mode is kept.
    pub fn cancel(&mut self) {
        self.pending_text = None;
        self.selection = None;
        self.dragging = false;
        self.cancel_gesture();
    }

    /// Remove all paths and text, and any in-progress drawing.
    pub fn clear_drawings(&mut self) {
        self.scene.clear_drawings();
        self.points.clear();
        self.buffer.clear();
        self.selection = None;
        self.dragging = false;
    }

    // --- Cards ---

    /// Add a blank card at a pseudo-random spot near the top left.
    pub fn add_card(&mut self) -> CardId {
        let bits = Uuid::new_v4().as_u128();
        let x = 100.0 + (bits % 200) as f64;
        let y = 100.0 + ((bits >> 64) % 200) as f64;
        self.add_card_at(Point::new(x, y))
    }

    pub fn add_card_at(&mut self, origin: Point) -> CardId {
        self.scene.add_card(Card::blank(origin))
    }

    pub fn edit_card(
        &mut self,
        id: &CardId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        self.scene.edit_card(id, title, content)
    }

    pub fn delete_card(&mut self, id: &CardId) -> bool {
        if self.gesture_card() == Some(id) {
            self.cancel_gesture();
        }
        if self.hovered_card.as_ref() == Some(id) {
            self.hovered_card = None;
        }
        self.scene.delete_card(id).is_some()
    }

    pub fn toggle_card_hidden(&mut self, id: &CardId) -> Option<bool> {
        self.scene.toggle_card_hidden(id)
    }

    pub fn show_all_cards(&mut self) {
        self.scene.show_all_cards();
    }

    pub fn set_hovered_card(&mut self, id: Option<CardId>) {
        self.hovered_card = id;
    }

    fn gesture_card(&self) -> Option<&CardId> {
        match self.gesture.as_ref()? {
            Gesture::CardDrag { card, .. }
            | Gesture::CardResize { card, .. }
            | Gesture::ConnectionDrag { card, .. } => Some(card),
        }
    }

    // --- Gestures ---

    pub fn begin_card_drag(&mut self, id: &CardId, pointer: Point) -> bool {
        let Some(card) = self.scene.card(id) else {
            return false;
        };
        let offset = pointer - card.origin();
        log::debug!("Begin drag of {id}");
        self.gesture = Some(Gesture::CardDrag {
            card: id.clone(),
            offset,
        });
        true
    }

    pub fn begin_card_resize(&mut self, id: &CardId, pointer: Point) -> bool {
        let Some(card) = self.scene.card(id) else {
            return false;
        };
        log::debug!("Begin resize of {id}");
        self.gesture = Some(Gesture::CardResize {
            card: id.clone(),
            start_size: card.size(),
            start_pointer: pointer,
        });
        true
    }

    /// Start dragging a connection out of `edge` of `id`.
    pub fn begin_connection_drag(&mut self, id: &CardId, edge: Edge) -> bool {
        let Some(card) = self.scene.card(id) else {
            return false;
        };
        let start = card.anchor(edge);
        log::debug!("Begin connection drag from {id} {edge:?}");
        self.gesture = Some(Gesture::ConnectionDrag {
            card: id.clone(),
            edge,
            start,
            cursor: start,
        });
        true
    }

    pub fn gesture_move(&mut self, pointer: Point) {
        self.cursor = pointer;
        let min = Size::new(self.config.min_card_width, self.config.min_card_height);
        match &mut self.gesture {
            Some(Gesture::CardDrag { card, offset }) => {
                self.scene.move_card(card, pointer - *offset);
            }
            Some(Gesture::CardResize {
                card,
                start_size,
                start_pointer,
            }) => {
                let delta = pointer - *start_pointer;
                let size = Size::new(start_size.width + delta.x, start_size.height + delta.y);
                self.scene.resize_card(card, size, min);
            }
            Some(Gesture::ConnectionDrag { cursor, .. }) => *cursor = pointer,
            None => {}
        }
    }

    /// End the active gesture at the last known pointer position.
    pub fn gesture_end(&mut self) -> Option<ConnectionId> {
        let at = match &self.gesture {
            Some(Gesture::ConnectionDrag { cursor, .. }) => *cursor,
            _ => self.cursor,
        };
        self.gesture_end_at(at)
    }

    /// End the active gesture. A connection drag released over a visible
    /// card connects to that card's nearest edge.
    pub fn gesture_end_at(&mut self, pointer: Point) -> Option<ConnectionId> {
        let gesture = self.gesture.take()?;
        log::debug!("End gesture {gesture:?}");
        let Gesture::ConnectionDrag { card, edge, .. } = gesture else {
            return None;
        };
        let target = self.scene.find_card_at(pointer)?;
        let to_edge = nearest_edge(target.rect(), pointer);
        let connection = Connection::new((card, edge), (target.id.clone(), to_edge));
        let id = connection.id.clone();
        self.scene.add_connection(connection);
        Some(id)
    }

    /// Drop the active gesture without applying its final step.
    pub fn cancel_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            log::debug!("Cancel gesture {gesture:?}");
        }
    }

    // --- Connections ---

    /// Click on a card anchor. The first click picks the source, the second
    /// creates the connection. Ignored while a connection drag is active.
    pub fn anchor_click(&mut self, card: &CardId, edge: Edge) -> Option<ConnectionId> {
        if matches!(self.gesture, Some(Gesture::ConnectionDrag { .. })) {
            return None;
        }
        match self.pending_connection.take() {
            None => {
                self.pending_connection = Some((card.clone(), edge));
                None
            }
            Some(from) => {
                let connection = Connection::new(from, (card.clone(), edge));
                let id = connection.id.clone();
                self.scene.add_connection(connection);
                Some(id)
            }
        }
    }

    pub fn cancel_pending_connection(&mut self) {
        self.pending_connection = None;
    }

    // --- Layers ---

    pub fn add_layer(&mut self) -> LayerId {
        self.scene.layers_mut().add()
    }

    pub fn select_layer(&mut self, id: &LayerId) -> bool {
        self.scene.layers_mut().select(id)
    }

    pub fn delete_layer(&mut self, id: &LayerId) -> bool {
        let removed = self.scene.delete_layer(id);
        if removed {
            let selection_gone = match &self.selection {
                Some(Selection::Path(p)) => self.scene.path(p).is_none(),
                Some(Selection::Text(t)) => self.scene.text(t).is_none(),
                None => false,
            };
            if selection_gone {
                self.selection = None;
                self.dragging = false;
            }
        }
        removed
    }

    pub fn toggle_layer(&mut self, id: &LayerId) -> Option<bool> {
        self.scene.layers_mut().toggle_visible(id)
    }

    pub fn rename_layer(&mut self, id: &LayerId, name: impl Into<String>) -> bool {
        self.scene.layers_mut().rename(id, name)
    }

    // --- View ---

    pub fn zoom_in(&mut self) {
        self.view.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom.zoom_out();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.zoom.set(zoom);
    }

    pub fn set_background(&mut self, background: BackgroundType) {
        self.view.background = background;
    }

    pub fn cycle_background(&mut self) {
        self.view.cycle_background();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.view.toggle_dark_mode();
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.view.color = color.into();
    }

    pub fn toggle_snap(&mut self) {
        self.view.toggle_snap();
    }

    pub fn toggle_tool_status(&mut self) {
        self.view.tool_status_collapsed = !self.view.tool_status_collapsed;
    }

    pub fn toggle_stats(&mut self) {
        self.view.stats_collapsed = !self.view.stats_collapsed;
    }

    pub fn set_app_mode(&mut self, mode: AppMode) {
        self.view.app_mode = mode;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.view.viewport = viewport;
    }

    pub fn render(&self) -> DisplayList {
        DisplayList::build(self)
    }

    // --- Persistence ---

    /// Save the project. Failures are logged and leave the editor as it was.
    pub fn save_project(&mut self, store: &dyn SnapshotStore) -> bool {
        match self.try_save(store) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save project: {e}");
                false
            }
        }
    }

    fn try_save(&mut self, store: &dyn SnapshotStore) -> Result<(), StorageError> {
        let saved_at = snapshot::now_millis();
        let version = self.save_version + 1;
        let layers = self.scene.layers();
        let json = ProjectSnapshot {
            cards: self.scene.cards(),
            connections: self.scene.connections(),
            layers: layers.layers(),
            paths: self.scene.paths(),
            text_elements: self.scene.texts(),
            background_type: self.view.background,
            zoom: self.view.zoom.value(),
            last_saved_at: saved_at,
            save_version: version,
            schema_version: SCHEMA_VERSION,
        }
        .to_json()?;
        store.write(&self.config.storage_key, &json)?;
        self.save_version = version;
        self.last_saved_at = Some(saved_at);
        log::info!("Saved project v{version} ({} bytes)", json.len());
        Ok(())
    }

    /// Load the stored project over the current state. Returns whether a
    /// snapshot was applied; unreadable snapshots are logged and ignored.
    pub fn load_project(&mut self, store: &dyn SnapshotStore) -> bool {
        let raw = match store.read(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Failed to read project: {e}");
                return false;
            }
        };
        match LoadedSnapshot::from_json(&raw) {
            Ok(loaded) => {
                self.apply_snapshot(loaded);
                true
            }
            Err(e) => {
                log::warn!("Ignoring stored project: {e}");
                false
            }
        }
    }

    fn apply_snapshot(&mut self, loaded: LoadedSnapshot) {
        if let Some(cards) = loaded.cards {
            self.scene.cards = cards;
        }
        if let Some(connections) = loaded.connections {
            self.scene.connections = connections;
        }
        if let Some(layers) = loaded.layers {
            self.scene.layers.replace(layers);
        }
        if let Some(paths) = loaded.paths {
            self.scene.paths = paths;
        }
        if let Some(texts) = loaded.text_elements {
            self.scene.texts = texts;
        }
        if let Some(background) = loaded.background_type {
            self.view.background = background;
        }
        if let Some(zoom) = loaded.zoom {
            self.view.zoom.set(zoom);
        }
        if let Some(saved_at) = loaded.last_saved_at {
            self.last_saved_at = Some(saved_at);
        }
        if let Some(version) = loaded.save_version {
            self.save_version = version;
        }
        self.selection = None;
        self.dragging = false;
        self.gesture = None;
        self.pending_connection = None;
        log::info!(
            "Loaded project v{} ({} cards, {} paths)",
            self.save_version,
            self.scene.cards().len(),
            self.scene.paths().len()
        );
    }

    pub fn save_status(&self) -> String {
        snapshot::save_status(self.save_version, self.last_saved_at)
    }
}
