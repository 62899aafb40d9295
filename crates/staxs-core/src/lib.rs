//! Staxs Core Library
//!
//! Platform-agnostic scene model, interaction engine and persistence for the
//! Staxs canvas.

pub mod card;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod id;
pub mod input;
pub mod layer;
pub mod mode;
pub mod path;
pub mod render;
pub mod scene;
pub mod shortcuts;
pub mod snap;
pub mod snapshot;
pub mod storage;
pub mod text;
pub mod view;

pub use card::{Card, Connection};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, Gesture, PendingText, Selection};
pub use geometry::Edge;
pub use id::{CardId, ConnectionId, LayerId, PathId, TextId};
pub use input::{KeyPress, Modifiers, PointerEvent};
pub use layer::{Layer, LayerStack};
pub use mode::Mode;
pub use path::{Path, PathParseError, Segment, SegmentKind};
pub use render::{DisplayItem, DisplayList, SessionState, shortcut_table};
pub use scene::{Scene, SceneStats};
pub use shortcuts::{Command, ShortcutRegistry};
pub use snap::Grid;
pub use snapshot::{LoadedSnapshot, SnapshotError};
pub use storage::{MemoryStore, SnapshotStore, StorageError, StorageResult};
pub use text::TextElement;
pub use view::{AppMode, BackgroundType, ViewState};
