//! WebAssembly entry point and the JavaScript-facing canvas handle.

use crate::bridge::{self, ShellError};
use gloo_events::EventListener;
use kurbo::{Point, Size};
use staxs_core::storage::LocalStorageStore;
use staxs_core::{
    AppMode, CardId, Edge, Editor, LayerId, Mode, SessionState, TextId, shortcut_table,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, KeyboardEvent, MouseEvent};

impl From<ShellError> for JsValue {
    fn from(err: ShellError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Initialize logging and the panic hook.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {e}").into());
    }

    log::info!("Starting Staxs (WASM)");
}

/// Window listeners held for the lifetime of one gesture.
struct GestureListeners {
    _move: EventListener,
    _up: EventListener,
}

type GestureSlot = Rc<RefCell<Option<GestureListeners>>>;

struct Shared {
    editor: RefCell<Editor>,
    canvas_origin: RefCell<Point>,
    on_change: RefCell<Option<js_sys::Function>>,
}

impl Shared {
    fn notify(&self) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("Change callback failed: {e:?}");
            }
        }
    }

    fn client_point(&self, event: &MouseEvent) -> Point {
        bridge::client_to_canvas(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
            *self.canvas_origin.borrow(),
        )
    }
}

/// The editor as seen from JavaScript.
#[wasm_bindgen]
pub struct StaxsCanvas {
    shared: Rc<Shared>,
    store: Option<LocalStorageStore>,
    gesture: GestureSlot,
    _keydown: Option<EventListener>,
}

#[wasm_bindgen]
impl StaxsCanvas {
    /// Create the editor, restore the saved project and start listening for
    /// keyboard shortcuts on the document.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<StaxsCanvas, JsValue> {
        let config = bridge::parse_config(config_json.as_deref())?;
        let mut editor = Editor::new(config);

        let store = match LocalStorageStore::new() {
            Ok(store) => {
                editor.load_project(&store);
                Some(store)
            }
            Err(e) => {
                log::warn!("Saving disabled: {e}");
                None
            }
        };

        let shared = Rc::new(Shared {
            editor: RefCell::new(editor),
            canvas_origin: RefCell::new(Point::ZERO),
            on_change: RefCell::new(None),
        });

        let gesture: GestureSlot = Rc::new(RefCell::new(None));

        let keydown = web_sys::window().and_then(|w| w.document()).map(|document| {
            let shared = Rc::downgrade(&shared);
            let slot = Rc::downgrade(&gesture);
            EventListener::new(&document, "keydown", move |event| {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let key = event.key();
                let has_pending_text = shared.editor.borrow().pending_text().is_some();
                if !bridge::routes_key(&key, is_editable_target(event), has_pending_text) {
                    return;
                }
                let press = bridge::key_press(
                    &key,
                    event.ctrl_key(),
                    event.meta_key(),
                    event.alt_key(),
                    event.shift_key(),
                );
                let handled = shared.editor.borrow_mut().key_down(&press);
                if let Some(command) = handled {
                    if command.prevents_default() {
                        event.prevent_default();
                    }
                    // Escape may have cancelled a gesture.
                    if !shared.editor.borrow().has_gesture() {
                        if let Some(slot) = slot.upgrade() {
                            slot.borrow_mut().take();
                        }
                    }
                    shared.notify();
                }
            })
        });

        Ok(StaxsCanvas {
            shared,
            store,
            gesture,
            _keydown: keydown,
        })
    }

    /// Register a callback invoked after state changes that did not come
    /// from a direct method call (shortcuts, window gestures).
    pub fn set_on_change(&self, callback: Option<js_sys::Function>) {
        *self.shared.on_change.borrow_mut() = callback;
    }

    /// Page offset of the canvas, used to map window events.
    pub fn set_canvas_origin(&self, x: f64, y: f64) {
        *self.shared.canvas_origin.borrow_mut() = Point::new(x, y);
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.editor().set_viewport(Size::new(width, height));
    }

    // --- Pointer ---

    pub fn pointer_down(&self, x: f64, y: f64) {
        self.editor().pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.editor().pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&self, x: f64, y: f64) {
        self.editor().pointer_up(Point::new(x, y));
    }

    pub fn key_down(&self, key: &str, ctrl: bool, meta: bool, alt: bool, shift: bool) -> bool {
        let press = bridge::key_press(key, ctrl, meta, alt, shift);
        let handled = self.editor().key_down(&press).is_some();
        self.sync_gesture_listeners();
        handled
    }

    pub fn mode(&self) -> String {
        self.shared.editor.borrow().mode().label().to_lowercase()
    }

    /// Last raw pointer position as `[x, y]`.
    pub fn cursor(&self) -> Vec<f64> {
        let cursor = self.shared.editor.borrow().cursor();
        vec![cursor.x, cursor.y]
    }

    pub fn toggle_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: Mode = bridge::parse_mode(mode)?;
        self.editor().toggle_mode(mode);
        Ok(())
    }

    pub fn commit_points(&self) -> Option<String> {
        self.editor().commit_points().map(|id| id.to_string())
    }

    pub fn measure(&self) -> Option<f64> {
        self.shared.editor.borrow().measure()
    }

    // --- Text ---

    pub fn set_text_input(&self, value: &str) {
        self.editor().set_text_input(value);
    }

    pub fn commit_text(&self) -> Option<String> {
        self.editor().commit_text().map(|id| id.to_string())
    }

    pub fn cancel_text(&self) {
        self.editor().cancel_text();
    }

    pub fn edit_text(&self, id: &str, value: &str) -> bool {
        self.editor().edit_text(&TextId::new(id), value)
    }

    // --- Cards ---

    pub fn add_card(&self) -> String {
        self.editor().add_card().to_string()
    }

    pub fn edit_card(&self, id: &str, title: &str, content: &str) -> bool {
        self.editor().edit_card(&CardId::new(id), title, content)
    }

    pub fn delete_card(&self, id: &str) -> bool {
        let deleted = self.editor().delete_card(&CardId::new(id));
        self.sync_gesture_listeners();
        deleted
    }

    pub fn toggle_card_hidden(&self, id: &str) -> Option<bool> {
        self.editor().toggle_card_hidden(&CardId::new(id))
    }

    pub fn show_all_cards(&self) {
        self.editor().show_all_cards();
    }

    pub fn set_hovered_card(&self, id: Option<String>) {
        self.editor().set_hovered_card(id.map(CardId::new));
    }

    pub fn begin_card_drag(&self, id: &str, x: f64, y: f64) -> bool {
        let started = self.editor().begin_card_drag(&CardId::new(id), Point::new(x, y));
        self.sync_gesture_listeners();
        started
    }

    pub fn begin_card_resize(&self, id: &str, x: f64, y: f64) -> bool {
        let started = self.editor().begin_card_resize(&CardId::new(id), Point::new(x, y));
        self.sync_gesture_listeners();
        started
    }

    // --- Connections ---

    pub fn begin_connection_drag(&self, id: &str, edge: &str) -> Result<bool, JsValue> {
        let edge: Edge = bridge::parse_edge(edge)?;
        let started = self.editor().begin_connection_drag(&CardId::new(id), edge);
        self.sync_gesture_listeners();
        Ok(started)
    }

    pub fn anchor_click(&self, id: &str, edge: &str) -> Result<Option<String>, JsValue> {
        let edge = bridge::parse_edge(edge)?;
        Ok(self.editor().anchor_click(&CardId::new(id), edge).map(|id| id.to_string()))
    }

    pub fn has_pending_connection(&self) -> bool {
        self.shared.editor.borrow().pending_connection().is_some()
    }

    pub fn cancel_pending_connection(&self) {
        self.editor().cancel_pending_connection();
    }

    pub fn cancel_gesture(&self) {
        self.editor().cancel_gesture();
        self.sync_gesture_listeners();
    }

    // --- Layers ---

    pub fn add_layer(&self) -> String {
        self.editor().add_layer().to_string()
    }

    pub fn select_layer(&self, id: &str) -> bool {
        self.editor().select_layer(&LayerId::new(id))
    }

    pub fn delete_layer(&self, id: &str) -> bool {
        self.editor().delete_layer(&LayerId::new(id))
    }

    pub fn toggle_layer(&self, id: &str) -> Option<bool> {
        self.editor().toggle_layer(&LayerId::new(id))
    }

    pub fn rename_layer(&self, id: &str, name: &str) -> bool {
        self.editor().rename_layer(&LayerId::new(id), name)
    }

    // --- View ---

    pub fn zoom_in(&self) {
        self.editor().zoom_in();
    }

    pub fn zoom_out(&self) {
        self.editor().zoom_out();
    }

    /// Top-level surface, `"canvas"` or `"3d"`.
    pub fn app_mode(&self) -> String {
        match self.shared.editor.borrow().view().app_mode {
            AppMode::Canvas => "canvas".to_string(),
            AppMode::ThreeD => "3d".to_string(),
        }
    }

    pub fn set_app_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = bridge::parse_app_mode(mode)?;
        self.editor().set_app_mode(mode);
        Ok(())
    }

    pub fn snap_to_grid(&self) -> bool {
        self.shared.editor.borrow().view().snap_to_grid
    }

    pub fn toggle_snap(&self) {
        self.editor().toggle_snap();
    }

    pub fn set_color(&self, color: &str) {
        self.editor().set_color(color);
    }

    pub fn toggle_dark_mode(&self) {
        self.editor().toggle_dark_mode();
    }

    pub fn toggle_stats(&self) {
        self.editor().toggle_stats();
    }

    pub fn toggle_tool_status(&self) {
        self.editor().toggle_tool_status();
    }

    // --- Persistence and output ---

    /// Save to local storage. Returns whether the save went through.
    pub fn save(&self) -> bool {
        match &self.store {
            Some(store) => self.editor().save_project(store),
            None => false,
        }
    }

    pub fn save_status(&self) -> String {
        self.shared.editor.borrow().save_status()
    }

    pub fn stats_json(&self) -> Result<String, JsValue> {
        let stats = self.shared.editor.borrow().scene().stats();
        serde_json::to_string(&stats).map_err(|e| ShellError::from(e).into())
    }

    /// Toolbar toggles, overlays and pending input, without the drawn items.
    pub fn session_json(&self) -> Result<String, JsValue> {
        let session = SessionState::capture(&self.shared.editor.borrow());
        serde_json::to_string(&session).map_err(|e| ShellError::from(e).into())
    }

    /// Rows for the shortcuts overlay.
    pub fn shortcuts_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&shortcut_table()).map_err(|e| ShellError::from(e).into())
    }

    pub fn display_list_json(&self) -> Result<String, JsValue> {
        let list = self.shared.editor.borrow().render();
        list.to_json().map_err(|e| ShellError::from(e).into())
    }
}

impl StaxsCanvas {
    fn editor(&self) -> std::cell::RefMut<'_, Editor> {
        self.shared.editor.borrow_mut()
    }

    /// Hold window listeners exactly while the editor has a gesture.
    fn sync_gesture_listeners(&self) {
        let active = self.shared.editor.borrow().has_gesture();
        let mut slot = self.gesture.borrow_mut();
        match (active, slot.is_some()) {
            (true, false) => *slot = attach_gesture_listeners(&self.shared, &self.gesture),
            (false, true) => *slot = None,
            _ => {}
        }
    }
}

impl Drop for StaxsCanvas {
    fn drop(&mut self) {
        self.shared.editor.borrow_mut().cancel_gesture();
        self.gesture.borrow_mut().take();
    }
}

/// Whether the event was aimed at a form field or editable content.
fn is_editable_target(event: &Event) -> bool {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) else {
        return false;
    };
    element.is_content_editable()
        || matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
}

fn attach_gesture_listeners(shared: &Rc<Shared>, slot: &GestureSlot) -> Option<GestureListeners> {
    let window = web_sys::window()?;

    let on_move = {
        let shared = Rc::downgrade(shared);
        EventListener::new(&window, "mousemove", move |event| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let pointer = shared.client_point(event);
            shared.editor.borrow_mut().gesture_move(pointer);
            shared.notify();
        })
    };

    let on_up = {
        let shared = Rc::downgrade(shared);
        let slot: Weak<RefCell<Option<GestureListeners>>> = Rc::downgrade(slot);
        EventListener::new(&window, "mouseup", move |event| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let pointer = shared.client_point(event);
                shared.editor.borrow_mut().gesture_end_at(pointer);
            }
            shared.notify();
            // This listener cannot be dropped from inside its own callback.
            let slot = slot.clone();
            let shared = Rc::downgrade(&shared);
            wasm_bindgen_futures::spawn_local(async move {
                let (Some(slot), Some(shared)) = (slot.upgrade(), shared.upgrade()) else {
                    return;
                };
                if !shared.editor.borrow().has_gesture() {
                    slot.borrow_mut().take();
                    log::debug!("Window gesture listeners released");
                }
            });
        })
    };

    log::debug!("Window gesture listeners attached");
    Some(GestureListeners {
        _move: on_move,
        _up: on_up,
    })
}
