//! End-to-end editor flows driven through the public input API.

use kurbo::{Point, Size};
use staxs_core::storage::FileStore;
use staxs_core::{
    BackgroundType, Command, Edge, Editor, EditorConfig, KeyPress, LayerId, MemoryStore, Mode,
    PointerEvent, SegmentKind, Selection, SnapshotStore,
};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn drag(editor: &mut Editor, from: Point, to: Point) {
    editor.handle_pointer(PointerEvent::Down { position: from });
    editor.handle_pointer(PointerEvent::Move { position: to });
    editor.handle_pointer(PointerEvent::Up { position: to });
}

#[test]
fn freehand_stroke_is_one_moveto_then_linetos() {
    let mut editor = Editor::default();
    let start = pt(1.0, 1.0);
    editor.handle_pointer(PointerEvent::Down { position: start });
    for i in 2..=6 {
        let position = pt(f64::from(i), f64::from(i));
        editor.handle_pointer(PointerEvent::Move { position });
    }
    let end = pt(6.0, 6.0);
    editor.handle_pointer(PointerEvent::Up { position: end });

    let path = &editor.scene().paths()[0];
    assert_eq!(path.segments.len(), 6);
    assert_eq!(path.segments[0].kind, SegmentKind::MoveTo);
    assert!(path.segments[1..].iter().all(|s| s.kind == SegmentKind::LineTo));
}

#[test]
fn point_sequence_commits_in_click_order() {
    let mut editor = Editor::default();
    editor.key_down(&KeyPress::ctrl("p"));
    assert_eq!(editor.mode(), Mode::Point);

    let clicks = [pt(10.0, 10.0), pt(50.0, 10.0), pt(50.0, 60.0)];
    for p in clicks {
        editor.handle_pointer(PointerEvent::Down { position: p });
        editor.handle_pointer(PointerEvent::Up { position: p });
    }
    editor.key_down(&KeyPress::plain("Enter"));
    editor.key_down(&KeyPress::plain("Enter"));

    assert_eq!(editor.scene().paths().len(), 1);
    let points: Vec<_> = editor.scene().paths()[0].points().collect();
    assert_eq!(points, clicks);
}

#[test]
fn deleting_a_layer_prunes_its_content_and_moves_active() {
    let mut editor = Editor::default();
    let first = LayerId::new("layer-1");
    drag(&mut editor, pt(0.0, 0.0), pt(10.0, 10.0));

    let second = editor.add_layer();
    assert_eq!(editor.scene().layers().active(), Some(&second));
    drag(&mut editor, pt(20.0, 20.0), pt(30.0, 30.0));
    assert_eq!(editor.scene().layers().get(&second).unwrap().name, "Layer 2");

    assert!(editor.delete_layer(&second));
    assert_eq!(editor.scene().paths().len(), 1);
    assert_eq!(editor.scene().paths()[0].layer_id, first);
    assert_eq!(editor.scene().layers().active(), Some(&first));

    assert!(editor.delete_layer(&first));
    assert!(editor.scene().paths().is_empty());
    assert_eq!(editor.scene().layers().active(), None);
}

#[test]
fn dragging_a_selected_path_translates_all_points() {
    let mut editor = Editor::default();
    editor.pointer_down(pt(100.0, 100.0));
    editor.pointer_move(pt(150.0, 100.0));
    editor.pointer_move(pt(150.0, 150.0));
    editor.pointer_up(pt(150.0, 150.0));
    let before: Vec<_> = editor.scene().paths()[0].points().collect();

    editor.execute(Command::ToggleMode(Mode::Select));
    editor.pointer_down(pt(120.0, 100.0));
    assert!(matches!(editor.selection(), Some(Selection::Path(_))));
    editor.pointer_move(pt(125.0, 90.0));
    editor.pointer_move(pt(130.0, 80.0));
    editor.pointer_up(pt(130.0, 80.0));

    let path = &editor.scene().paths()[0];
    let after: Vec<_> = path.points().collect();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(*b - *a, kurbo::Vec2::new(10.0, -20.0));
    }
    assert_eq!(path.segments[0].kind, SegmentKind::MoveTo);
}

#[test]
fn clicking_empty_canvas_in_select_mode_clears_selection() {
    let mut editor = Editor::default();
    drag(&mut editor, pt(0.0, 0.0), pt(40.0, 0.0));
    editor.toggle_mode(Mode::Select);
    editor.pointer_down(pt(20.0, 0.0));
    assert!(editor.selection().is_some());
    editor.pointer_up(pt(20.0, 0.0));
    editor.pointer_down(pt(700.0, 700.0));
    assert!(editor.selection().is_none());
}

#[test]
fn escape_mid_drag_drops_selection_and_stops_the_drag() {
    let mut editor = Editor::default();
    drag(&mut editor, pt(0.0, 0.0), pt(100.0, 0.0));
    let before: Vec<_> = editor.scene().paths()[0].points().collect();

    editor.toggle_mode(Mode::Select);
    editor.pointer_down(pt(50.0, 0.0));
    assert!(editor.selection().is_some());
    assert!(editor.is_dragging());

    editor.key_down(&KeyPress::plain("Escape"));
    assert!(editor.selection().is_none());
    assert!(!editor.is_dragging());
    assert_eq!(editor.mode(), Mode::Select);

    editor.pointer_move(pt(80.0, 40.0));
    editor.pointer_up(pt(80.0, 40.0));
    let after: Vec<_> = editor.scene().paths()[0].points().collect();
    assert_eq!(after, before);
}

#[test]
fn switching_modes_clears_the_selection() {
    let mut editor = Editor::default();
    drag(&mut editor, pt(0.0, 0.0), pt(100.0, 0.0));
    editor.toggle_mode(Mode::Select);
    editor.pointer_down(pt(50.0, 0.0));
    assert!(editor.selection().is_some());

    editor.key_down(&KeyPress::ctrl("p"));
    assert_eq!(editor.mode(), Mode::Point);
    assert!(editor.selection().is_none());
    assert!(!editor.is_dragging());

    editor.toggle_mode(Mode::Select);
    editor.pointer_down(pt(50.0, 0.0));
    editor.toggle_mode(Mode::Select);
    assert_eq!(editor.mode(), Mode::Draw);
    assert!(editor.selection().is_none());
}

#[test]
fn snapped_stroke_at_origin_lands_on_first_grid_line() {
    let mut editor = Editor::default();
    editor.key_down(&KeyPress::ctrl("s"));
    drag(&mut editor, pt(0.0, 0.0), pt(20.0, 40.0));
    let points: Vec<_> = editor.scene().paths()[0].points().collect();
    assert_eq!(points, vec![pt(10.0, 10.0), pt(30.0, 50.0)]);
}

#[test]
fn inverted_zoom_bounds_do_not_panic() {
    let config = EditorConfig {
        min_zoom: 4.0,
        max_zoom: 2.0,
        ..EditorConfig::default()
    };
    assert!(Editor::try_new(config.clone()).is_err());

    let mut editor = Editor::new(config);
    assert_eq!(editor.view().zoom.value(), 2.0);
    editor.set_zoom(10.0);
    assert_eq!(editor.view().zoom.value(), 4.0);
}

#[test]
fn save_then_load_restores_everything() {
    let store = MemoryStore::new();
    let mut editor = Editor::default();
    drag(&mut editor, pt(0.0, 0.0), pt(10.0, 10.0));
    let card = editor.add_card_at(pt(100.0, 100.0));
    editor.anchor_click(&card, Edge::Top);
    editor.anchor_click(&staxs_core::CardId::new("card-1"), Edge::Bottom);
    editor.toggle_mode(Mode::Text);
    editor.pointer_down(pt(300.0, 300.0));
    editor.set_text_input("hello");
    editor.commit_text();
    editor.execute(Command::ZoomIn);
    editor.execute(Command::CycleBackground);

    assert!(editor.save_project(&store));
    assert!(editor.save_project(&store));
    assert_eq!(editor.save_version(), 2);

    let mut loaded = Editor::default();
    assert!(loaded.load_project(&store));
    assert_eq!(loaded.scene().cards(), editor.scene().cards());
    assert_eq!(loaded.scene().connections(), editor.scene().connections());
    assert_eq!(loaded.scene().paths(), editor.scene().paths());
    assert_eq!(loaded.scene().texts(), editor.scene().texts());
    assert_eq!(loaded.scene().layers().layers(), editor.scene().layers().layers());
    assert_eq!(loaded.view().background, BackgroundType::Lined);
    assert!((loaded.view().zoom.value() - 1.2).abs() < 1e-9);
    assert_eq!(loaded.save_version(), 2);
    assert_eq!(loaded.save_status(), editor.save_status());

    assert!(loaded.save_project(&store));
    assert_eq!(loaded.save_version(), 3);
}

#[test]
fn legacy_snapshot_with_path_strings_loads() {
    let json = r#"{
        "layers": [{"id": "layer-9", "name": "Imported", "visible": true}],
        "paths": [{"d": "M10,20 L30,40 L-5.5,60", "color": "red", "layerId": "layer-9"}],
        "zoom": 99,
        "saveVersion": 7,
        "lastSavedAt": 0
    }"#;
    let store = MemoryStore::with_value("staxs_project", json);
    let mut editor = Editor::default();
    assert!(editor.load_project(&store));

    let path = &editor.scene().paths()[0];
    assert_eq!(path.segments.len(), 3);
    assert_eq!(path.segments[2].x, -5.5);
    assert!(path.id.as_str().starts_with("path-"));
    assert_eq!(editor.scene().layers().active(), Some(&LayerId::new("layer-9")));
    assert_eq!(editor.view().zoom.value(), 5.0);
    assert_eq!(editor.scene().cards().len(), 1);
    assert_eq!(editor.save_status(), "Saved v7 - 1970-01-01 00:00:00");
}

#[test]
fn newer_schema_is_ignored() {
    let json = r#"{"schemaVersion": 99, "cards": []}"#;
    let store = MemoryStore::with_value("staxs_project", json);
    let mut editor = Editor::default();
    assert!(!editor.load_project(&store));
    assert_eq!(editor.scene().cards().len(), 1);
}

#[test]
fn custom_storage_key_is_used() {
    let config = EditorConfig::from_json(r#"{"storageKey": "board-2"}"#).unwrap();
    let store = MemoryStore::new();
    let mut editor = Editor::new(config);
    assert!(editor.save_project(&store));
    assert!(store.read("board-2").unwrap().is_some());
    assert!(store.read("staxs_project").unwrap().is_none());
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    let mut editor = Editor::default();
    drag(&mut editor, pt(5.0, 5.0), pt(15.0, 15.0));
    assert!(editor.save_project(&store));

    let mut loaded = Editor::default();
    assert!(loaded.load_project(&store));
    assert_eq!(loaded.scene().paths(), editor.scene().paths());
}

#[test]
fn two_clicks_connect_cards_and_drag_connects_nearest_edge() {
    let mut editor = Editor::default();
    let a = editor.add_card_at(pt(0.0, 0.0));
    let b = editor.add_card_at(pt(0.0, 400.0));

    editor.anchor_click(&a, Edge::Bottom);
    editor.anchor_click(&b, Edge::Top);
    assert_eq!(editor.scene().connections().len(), 1);

    editor.begin_connection_drag(&a, Edge::Right);
    assert!(editor.has_gesture());
    editor.gesture_move(pt(150.0, 410.0));
    let id = editor.gesture_end();
    assert!(id.is_some());
    assert!(!editor.has_gesture());

    let conn = editor.scene().connections().last().unwrap();
    assert_eq!(conn.from_edge, Edge::Right);
    assert_eq!(conn.to_card_id, b);
    assert_eq!(conn.to_edge, Edge::Top);
}

#[test]
fn resize_never_goes_below_minimum() {
    let mut editor = Editor::default();
    let card = editor.add_card_at(pt(0.0, 0.0));
    editor.begin_card_resize(&card, pt(320.0, 180.0));
    editor.gesture_move(pt(-1000.0, -1000.0));
    editor.gesture_end();
    assert_eq!(editor.scene().card(&card).unwrap().size(), Size::new(180.0, 100.0));
}

#[test]
fn clear_drawings_shortcut_keeps_cards() {
    let mut editor = Editor::default();
    drag(&mut editor, pt(0.0, 0.0), pt(10.0, 10.0));
    editor.key_down(&KeyPress::ctrl("c"));
    let stats = editor.scene().stats();
    assert_eq!(stats.paths, 0);
    assert_eq!(stats.cards, 1);
    assert_eq!(stats.layers, 1);
}
