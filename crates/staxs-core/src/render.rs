//! Display list composition.
//!
//! The editor state is projected into a flat list of items, back to front.
//! Hosts draw the items in order and do no hit testing of their own.

use crate::editor::{Editor, Gesture, PendingText, Selection};
use crate::geometry::{Edge, edge_points};
use crate::id::{CardId, ConnectionId, PathId, TextId};
use crate::mode::Mode;
use crate::path::segments_to_svg;
use crate::scene::SceneStats;
use crate::shortcuts::ShortcutRegistry;
use crate::view::{AppMode, BackgroundType};
use kurbo::{Point, Rect, Size, Vec2};
use serde::Serialize;

/// Length of a connection arrowhead along the line.
pub const ARROW_LENGTH: f64 = 8.0;
/// Opacity of the in-progress path preview.
pub const PREVIEW_OPACITY: f64 = 0.5;

const LIGHT_INK: &str = "#181818";
const DARK_INK: &str = "#eaeaea";

/// One drawable item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayItem {
    Background {
        background: BackgroundType,
        dark: bool,
        size: Size,
    },
    Path {
        id: Option<PathId>,
        d: String,
        color: String,
        opacity: f64,
        selected: bool,
    },
    Text {
        id: TextId,
        position: Point,
        value: String,
        color: String,
        selected: bool,
    },
    PointMarker {
        position: Point,
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Connection {
        id: ConnectionId,
        from: Point,
        to: Point,
        /// Triangle tip first, or `None` for a zero-length connection.
        arrow_head: Option<[Point; 3]>,
        midpoint: Point,
        color: &'static str,
    },
    ConnectionPreview {
        from: Point,
        to: Point,
        color: &'static str,
    },
    Card {
        id: CardId,
        rect: Rect,
        title: String,
        content: String,
        hovered: bool,
    },
    HiddenCard {
        id: CardId,
        position: Point,
        title: String,
    },
    Anchor {
        card: CardId,
        edge: Edge,
        position: Point,
        pending: bool,
    },
}

/// The anchor picked by the first click of a two-click connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAnchor {
    pub card: CardId,
    pub edge: Edge,
}

/// One row of the shortcuts overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortcutRow {
    pub keys: String,
    pub description: &'static str,
}

/// Chrome state the host needs beside the drawn items: toolbar toggles,
/// overlays, the floating text input and the top-level surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: Mode,
    pub app_mode: AppMode,
    pub snap_to_grid: bool,
    pub dark_mode: bool,
    pub color: String,
    pub tool_status_collapsed: bool,
    pub stats_collapsed: bool,
    /// Last raw pointer position, for the cursor readout.
    pub cursor: Point,
    /// Where to float the text input, if one is open.
    pub pending_text: Option<PendingText>,
    pub pending_connection: Option<PendingAnchor>,
    pub measurement: Option<f64>,
    pub stats: SceneStats,
    pub save_status: String,
}

impl SessionState {
    pub fn capture(editor: &Editor) -> Self {
        let view = editor.view();
        Self {
            mode: editor.mode(),
            app_mode: view.app_mode,
            snap_to_grid: view.snap_to_grid,
            dark_mode: view.dark_mode,
            color: view.color.clone(),
            tool_status_collapsed: view.tool_status_collapsed,
            stats_collapsed: view.stats_collapsed,
            cursor: editor.cursor(),
            pending_text: editor.pending_text().cloned(),
            pending_connection: editor
                .pending_connection()
                .map(|(card, edge)| PendingAnchor {
                    card: card.clone(),
                    edge: *edge,
                }),
            measurement: editor.measure(),
            stats: editor.scene().stats(),
            save_status: editor.save_status(),
        }
    }
}

/// Rows of the shortcuts overlay, in binding order.
pub fn shortcut_table() -> Vec<ShortcutRow> {
    ShortcutRegistry::all()
        .iter()
        .map(|s| ShortcutRow {
            keys: s.format(),
            description: s.description,
        })
        .collect()
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    pub zoom: f64,
    pub session: SessionState,
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn build(editor: &Editor) -> Self {
        let scene = editor.scene();
        let view = editor.view();
        let layers = scene.layers();
        let ink = if view.dark_mode { DARK_INK } else { LIGHT_INK };
        let mut items = Vec::new();

        items.push(DisplayItem::Background {
            background: view.background,
            dark: view.dark_mode,
            size: view.viewport,
        });

        let selected_path = match editor.selection() {
            Some(Selection::Path(id)) => Some(id),
            _ => None,
        };
        let selected_text = match editor.selection() {
            Some(Selection::Text(id)) => Some(id),
            _ => None,
        };

        for path in scene.paths().iter().filter(|p| layers.is_visible(&p.layer_id)) {
            items.push(DisplayItem::Path {
                id: Some(path.id.clone()),
                d: path.to_svg(),
                color: path.color.clone(),
                opacity: 1.0,
                selected: selected_path == Some(&path.id),
            });
        }

        for text in scene.texts().iter().filter(|t| layers.is_visible(&t.layer_id)) {
            items.push(DisplayItem::Text {
                id: text.id.clone(),
                position: text.position(),
                value: text.value.clone(),
                color: text.color.clone(),
                selected: selected_text == Some(&text.id),
            });
        }

        if !editor.buffer().is_empty() {
            items.push(DisplayItem::Path {
                id: None,
                d: segments_to_svg(editor.buffer()),
                color: view.color.clone(),
                opacity: PREVIEW_OPACITY,
                selected: false,
            });
        }

        if editor.mode() == Mode::Point {
            items.extend(editor.points().iter().map(|&position| DisplayItem::PointMarker {
                position,
                color: view.color.clone(),
            }));
        }

        for resolved in scene.resolved_connections() {
            items.push(DisplayItem::Connection {
                id: resolved.connection.id.clone(),
                from: resolved.from,
                to: resolved.to,
                arrow_head: arrow_head(resolved.from, resolved.to),
                midpoint: resolved.from.midpoint(resolved.to),
                color: ink,
            });
        }

        if let Some(Gesture::ConnectionDrag { start, cursor, .. }) = editor.gesture() {
            items.push(DisplayItem::ConnectionPreview {
                from: *start,
                to: *cursor,
                color: ink,
            });
        }

        for card in scene.cards() {
            if card.hidden {
                items.push(DisplayItem::HiddenCard {
                    id: card.id.clone(),
                    position: card.origin(),
                    title: card.title.clone(),
                });
                continue;
            }
            let hovered = editor.hovered_card() == Some(&card.id);
            items.push(DisplayItem::Card {
                id: card.id.clone(),
                rect: card.rect(),
                title: card.title.clone(),
                content: card.content.clone(),
                hovered,
            });
            if hovered {
                let pending = editor.pending_connection();
                for (edge, position) in edge_points(card.rect()) {
                    items.push(DisplayItem::Anchor {
                        card: card.id.clone(),
                        edge,
                        position,
                        pending: pending.is_some_and(|(id, e)| id == &card.id && *e == edge),
                    });
                }
            }
        }

        Self {
            zoom: view.zoom.value(),
            session: SessionState::capture(editor),
            items,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Arrowhead triangle at `to`, pointing away from `from`.
pub fn arrow_head(from: Point, to: Point) -> Option<[Point; 3]> {
    let along = to - from;
    let length = along.hypot();
    if length <= f64::EPSILON {
        return None;
    }
    let dir = along / length;
    let normal = Vec2::new(-dir.y, dir.x);
    let base = to - dir * ARROW_LENGTH;
    let half = ARROW_LENGTH / 2.0;
    Some([to, base + normal * half, base - normal * half])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Connection;
    use crate::id::LayerId;
    use crate::input::{KeyPress, Modifiers};

    fn count(list: &DisplayList, pred: impl Fn(&DisplayItem) -> bool) -> usize {
        list.items.iter().filter(|i| pred(i)).count()
    }

    #[test]
    fn test_background_comes_first() {
        let list = Editor::default().render();
        assert!(matches!(
            list.items[0],
            DisplayItem::Background {
                background: BackgroundType::Dotted,
                dark: false,
                ..
            }
        ));
        assert_eq!(list.zoom, 1.0);
    }

    #[test]
    fn test_hidden_layer_is_not_drawn() {
        let mut editor = Editor::default();
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(10.0, 10.0));
        editor.pointer_up(Point::new(10.0, 10.0));
        let is_path = |i: &DisplayItem| matches!(i, DisplayItem::Path { .. });
        assert_eq!(count(&editor.render(), is_path), 1);

        editor.toggle_layer(&LayerId::new("layer-1"));
        assert_eq!(count(&editor.render(), is_path), 0);
    }

    #[test]
    fn test_preview_is_translucent() {
        let mut editor = Editor::default();
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(5.0, 5.0));
        let list = editor.render();
        let preview = list
            .items
            .iter()
            .find_map(|i| match i {
                DisplayItem::Path { id: None, opacity, d, .. } => Some((*opacity, d.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(preview, (PREVIEW_OPACITY, "M0,0 L5,5".to_string()));
    }

    #[test]
    fn test_dangling_connection_is_skipped() {
        let mut editor = Editor::default();
        let a = editor.add_card_at(Point::new(0.0, 0.0));
        let b = editor.add_card_at(Point::new(500.0, 0.0));
        editor.anchor_click(&a, Edge::Right);
        editor.anchor_click(&b, Edge::Left);
        let is_conn = |i: &DisplayItem| matches!(i, DisplayItem::Connection { .. });
        assert_eq!(count(&editor.render(), is_conn), 1);

        editor.delete_card(&b);
        assert_eq!(count(&editor.render(), is_conn), 0);
        assert_eq!(editor.scene().connections().len(), 1);
    }

    #[test]
    fn test_hidden_card_and_hover_anchors() {
        let mut editor = Editor::default();
        let a = editor.add_card_at(Point::new(0.0, 0.0));
        editor.set_hovered_card(Some(a.clone()));
        let is_anchor = |i: &DisplayItem| matches!(i, DisplayItem::Anchor { .. });
        assert_eq!(count(&editor.render(), is_anchor), 4);

        editor.toggle_card_hidden(&a);
        let list = editor.render();
        assert_eq!(count(&list, is_anchor), 0);
        assert_eq!(
            count(&list, |i| matches!(i, DisplayItem::HiddenCard { id, .. } if id == &a)),
            1
        );
    }

    #[test]
    fn test_session_reports_surface_and_toggles() {
        let mut editor = Editor::default();
        editor.key_down(&KeyPress::meta("x"));
        editor.key_down(&KeyPress::ctrl("s"));
        let value: serde_json::Value =
            serde_json::from_str(&editor.render().to_json().unwrap()).unwrap();
        let session = &value["session"];
        assert_eq!(session["appMode"], "3d");
        assert_eq!(session["snapToGrid"], true);
        assert_eq!(session["toolStatusCollapsed"], true);
        assert_eq!(session["statsCollapsed"], false);
        assert_eq!(session["mode"], "draw");
        assert_eq!(session["saveStatus"], "Not saved yet");
        assert_eq!(session["stats"]["cards"], 1);

        editor.key_down(&KeyPress::new("s", Modifiers::META_CTRL));
        assert_eq!(editor.render().session.app_mode, AppMode::Canvas);
    }

    #[test]
    fn test_session_reports_pending_input() {
        let mut editor = Editor::default();
        let a = editor.add_card_at(Point::new(0.0, 0.0));
        editor.anchor_click(&a, Edge::Left);
        editor.toggle_mode(Mode::Text);
        editor.pointer_down(Point::new(40.0, 60.0));
        editor.set_text_input("draft");

        let session = editor.render().session;
        assert_eq!(session.cursor, Point::new(40.0, 60.0));
        let pending = session.pending_text.unwrap();
        assert_eq!(pending.position, Point::new(40.0, 60.0));
        assert_eq!(pending.value, "draft");
        assert_eq!(
            session.pending_connection,
            Some(PendingAnchor {
                card: a,
                edge: Edge::Left
            })
        );
    }

    #[test]
    fn test_shortcut_table() {
        let table = shortcut_table();
        assert_eq!(table.len(), ShortcutRegistry::all().len());
        assert!(table.iter().any(|row| row.keys == "Cmd+X"));
        assert!(table.iter().any(|row| row.keys == "Ctrl+P"));
    }

    #[test]
    fn test_arrow_head_points_along_line() {
        let head = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        assert_eq!(head[0], Point::new(100.0, 0.0));
        assert_eq!(head[1], Point::new(92.0, 4.0));
        assert_eq!(head[2], Point::new(92.0, -4.0));
        assert!(arrow_head(Point::new(1.0, 1.0), Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_connection_json_fields() {
        let conn = Connection::new(
            (CardId::new("card-1"), Edge::Top),
            (CardId::new("card-1"), Edge::Bottom),
        );
        let item = DisplayItem::Connection {
            id: conn.id,
            from: Point::new(0.0, 0.0),
            to: Point::new(0.0, 10.0),
            arrow_head: None,
            midpoint: Point::new(0.0, 5.0),
            color: LIGHT_INK,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "connection");
        assert!(value["arrowHead"].is_null());
    }
}
