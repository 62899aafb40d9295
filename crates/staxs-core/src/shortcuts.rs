//! Keyboard shortcut registry.

use crate::input::KeyPress;
use crate::mode::Mode;
use serde::Serialize;

/// Everything a key binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Command {
    ToggleSnap,
    ToggleMode(Mode),
    ClearDrawings,
    CycleBackground,
    ZoomIn,
    ZoomOut,
    ToggleToolStatus,
    ShowThreeD,
    ShowCanvas,
    Cancel,
    CommitPoints,
}

impl Command {
    /// Whether the browser's own handling of the key must be suppressed.
    ///
    /// Only the Cmd chords collide with browser bindings. Everything else
    /// (Enter, Escape, Ctrl+C/V) must keep working in form fields.
    pub fn prevents_default(self) -> bool {
        matches!(
            self,
            Command::ToggleToolStatus | Command::ShowThreeD | Command::ShowCanvas
        )
    }
}

/// Modifier requirement of a binding. Shift is never checked so that
/// shifted symbols like `+` still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chord {
    /// Ctrl held, Cmd and Alt up.
    Ctrl,
    /// Cmd held, Ctrl and Alt up.
    Cmd,
    /// Cmd and Ctrl held.
    CmdCtrl,
    /// Matches whatever modifiers are held.
    Any,
}

impl Chord {
    fn matches(self, press: &KeyPress) -> bool {
        let m = press.modifiers;
        match self {
            Chord::Ctrl => m.ctrl && !m.meta && !m.alt,
            Chord::Cmd => m.meta && !m.ctrl && !m.alt,
            Chord::CmdCtrl => m.meta && m.ctrl,
            Chord::Any => true,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Chord::Ctrl => "Ctrl+",
            Chord::Cmd => "Cmd+",
            Chord::CmdCtrl => "Cmd+Ctrl+",
            Chord::Any => "",
        }
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Accepted key values, compared case-insensitively.
    pub keys: &'static [&'static str],
    pub chord: Chord,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        keys: &'static [&'static str],
        chord: Chord,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            keys,
            chord,
            command,
            description,
        }
    }

    pub fn matches(&self, press: &KeyPress) -> bool {
        self.chord.matches(press) && self.keys.iter().any(|k| press.is(k))
    }

    /// Format the shortcut for display (e.g., "Ctrl+P").
    pub fn format(&self) -> String {
        let keys = self
            .keys
            .iter()
            .map(|k| k.to_uppercase())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}{}", self.chord.label(), keys)
    }
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new(&["t"], Chord::Cmd, Command::ToggleToolStatus, "Collapse or expand tool status"),
    Shortcut::new(&["x"], Chord::Cmd, Command::ShowThreeD, "Switch to the 3D view"),
    Shortcut::new(&["s"], Chord::CmdCtrl, Command::ShowCanvas, "Switch back to the canvas"),
    Shortcut::new(&["s"], Chord::Ctrl, Command::ToggleSnap, "Toggle snap to grid"),
    Shortcut::new(&["p"], Chord::Ctrl, Command::ToggleMode(Mode::Point), "Toggle point mode"),
    Shortcut::new(&["v"], Chord::Ctrl, Command::ToggleMode(Mode::Select), "Toggle select mode"),
    Shortcut::new(&["t"], Chord::Ctrl, Command::ToggleMode(Mode::Text), "Toggle text mode"),
    Shortcut::new(&["c"], Chord::Ctrl, Command::ClearDrawings, "Clear paths and text"),
    Shortcut::new(&["g"], Chord::Ctrl, Command::CycleBackground, "Cycle background"),
    Shortcut::new(&["+", "="], Chord::Ctrl, Command::ZoomIn, "Zoom in"),
    Shortcut::new(&["-"], Chord::Ctrl, Command::ZoomOut, "Zoom out"),
    Shortcut::new(&["Escape"], Chord::Any, Command::Cancel, "Cancel input, selection and drag"),
    Shortcut::new(&["Enter", "Return"], Chord::Any, Command::CommitPoints, "Commit point path"),
];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> &'static [Shortcut] {
        SHORTCUTS
    }

    /// The command bound to `press`, if any.
    pub fn lookup(press: &KeyPress) -> Option<Command> {
        SHORTCUTS.iter().find(|s| s.matches(press)).map(|s| s.command)
    }

    /// Pairs of shortcuts that could fire on the same key press.
    pub fn conflicts() -> Vec<(&'static Shortcut, &'static Shortcut)> {
        let mut found = Vec::new();
        for (i, a) in SHORTCUTS.iter().enumerate() {
            for b in &SHORTCUTS[i + 1..] {
                let same_key = a
                    .keys
                    .iter()
                    .any(|ka| b.keys.iter().any(|kb| ka.eq_ignore_ascii_case(kb)));
                let overlapping =
                    a.chord == b.chord || a.chord == Chord::Any || b.chord == Chord::Any;
                if same_key && overlapping {
                    found.push((a, b));
                }
            }
        }
        found
    }
}
