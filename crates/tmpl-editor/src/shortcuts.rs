//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `EditorCommand`s. The primary
//! modifier ("Mod") is Cmd on macOS and Ctrl elsewhere; it is resolved once
//! into a `PlatformProfile` when the session starts and never re-sniffed.

use crate::input::{KeyEvent, Modifiers};

/// The platform-specific binding of the primary modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformProfile {
    /// ⌘ is Mod.
    Mac,
    /// Ctrl is Mod.
    Other,
}

impl PlatformProfile {
    /// Profile for the compile target.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else {
            Self::Other
        }
    }

    pub fn mac() -> Self {
        Self::Mac
    }

    pub fn other() -> Self {
        Self::Other
    }

    /// Whether the platform's primary modifier is held.
    pub fn is_mod(&self, m: Modifiers) -> bool {
        match self {
            Self::Mac => m.meta,
            Self::Other => m.ctrl,
        }
    }

    /// Label for menus and tooltips.
    pub fn mod_label(&self) -> &'static str {
        match self {
            Self::Mac => "⌘",
            Self::Other => "Ctrl",
        }
    }
}

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in page space (y grows downward).
    pub fn unit(&self) -> (f64, f64) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    // ── Edit ──
    Delete,
    Copy,
    Paste,
    Duplicate,
    SelectAll,
    Nudge { direction: Direction, large: bool },
    Undo,
    Redo,

    // ── Z-order ──
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,

    // ── UI ──
    /// Escape: clear the selection, or cancel a live text edit.
    ClearSelection,
}

impl EditorCommand {
    /// Whether the command is swallowed while a text object is being typed into.
    pub fn suppressed_during_text_edit(&self) -> bool {
        !matches!(self, EditorCommand::ClearSelection)
    }
}

/// Resolves key events into editor commands.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event against `profile`. Returns `None` if the combo
    /// has no binding. Alt combos are never bound.
    pub fn resolve(profile: &PlatformProfile, event: &KeyEvent) -> Option<EditorCommand> {
        let m = event.modifiers;
        if m.alt {
            return None;
        }
        let key = event.key.as_str();
        let cmd = profile.is_mod(m);
        // The non-Mod control key (Ctrl on macOS, Meta elsewhere) binds nothing.
        let stray = match profile {
            PlatformProfile::Mac => m.ctrl,
            PlatformProfile::Other => m.meta,
        };
        if stray {
            return None;
        }

        if cmd && m.shift {
            return match key {
                "z" | "Z" => Some(EditorCommand::Redo),
                "[" | "{" => Some(EditorCommand::SendToBack),
                "]" | "}" => Some(EditorCommand::BringToFront),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(EditorCommand::Undo),
                "y" | "Y" => Some(EditorCommand::Redo),
                "c" | "C" => Some(EditorCommand::Copy),
                "v" | "V" => Some(EditorCommand::Paste),
                "d" | "D" => Some(EditorCommand::Duplicate),
                "a" | "A" => Some(EditorCommand::SelectAll),
                "[" => Some(EditorCommand::SendBackward),
                "]" => Some(EditorCommand::BringForward),
                _ => None,
            };
        }

        let direction = match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            _ => None,
        };
        if let Some(direction) = direction {
            return Some(EditorCommand::Nudge {
                direction,
                large: m.shift,
            });
        }

        if m.shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(EditorCommand::Delete),
            "Escape" => Some(EditorCommand::ClearSelection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(profile: PlatformProfile, key: &str, m: Modifiers) -> Option<EditorCommand> {
        ShortcutMap::resolve(&profile, &KeyEvent::new(key, m))
    }

    #[test]
    fn resolve_mod_per_platform() {
        use PlatformProfile::{Mac, Other};
        assert_eq!(resolve(Mac, "c", Modifiers::META), Some(EditorCommand::Copy));
        assert_eq!(resolve(Mac, "c", Modifiers::CTRL), None);
        assert_eq!(resolve(Other, "c", Modifiers::CTRL), Some(EditorCommand::Copy));
        assert_eq!(resolve(Other, "c", Modifiers::META), None);
        assert_eq!(resolve(Other, "c", Modifiers::NONE), None);
    }

    #[test]
    fn resolve_edit_commands() {
        let p = PlatformProfile::Other;
        assert_eq!(resolve(p, "v", Modifiers::CTRL), Some(EditorCommand::Paste));
        assert_eq!(resolve(p, "d", Modifiers::CTRL), Some(EditorCommand::Duplicate));
        assert_eq!(resolve(p, "a", Modifiers::CTRL), Some(EditorCommand::SelectAll));
        assert_eq!(resolve(p, "Delete", Modifiers::NONE), Some(EditorCommand::Delete));
        assert_eq!(resolve(p, "Backspace", Modifiers::NONE), Some(EditorCommand::Delete));
        assert_eq!(resolve(p, "Escape", Modifiers::NONE), Some(EditorCommand::ClearSelection));
    }

    #[test]
    fn resolve_undo_redo() {
        let p = PlatformProfile::Mac;
        assert_eq!(resolve(p, "z", Modifiers::META), Some(EditorCommand::Undo));
        assert_eq!(resolve(p, "Z", Modifiers::META.with_shift()), Some(EditorCommand::Redo));
        assert_eq!(resolve(p, "y", Modifiers::META), Some(EditorCommand::Redo));
    }

    #[test]
    fn resolve_z_order() {
        let p = PlatformProfile::Other;
        assert_eq!(resolve(p, "]", Modifiers::CTRL), Some(EditorCommand::BringForward));
        assert_eq!(resolve(p, "[", Modifiers::CTRL), Some(EditorCommand::SendBackward));
        assert_eq!(resolve(p, "}", Modifiers::CTRL.with_shift()), Some(EditorCommand::BringToFront));
        assert_eq!(resolve(p, "[", Modifiers::CTRL.with_shift()), Some(EditorCommand::SendToBack));
    }

    #[test]
    fn resolve_nudge() {
        let p = PlatformProfile::Other;
        assert_eq!(
            resolve(p, "ArrowLeft", Modifiers::NONE),
            Some(EditorCommand::Nudge {
                direction: Direction::Left,
                large: false
            })
        );
        assert_eq!(
            resolve(p, "ArrowDown", Modifiers::SHIFT),
            Some(EditorCommand::Nudge {
                direction: Direction::Down,
                large: true
            })
        );
    }

    #[test]
    fn unbound_keys() {
        let p = PlatformProfile::Other;
        assert_eq!(resolve(p, "q", Modifiers::NONE), None);
        assert_eq!(resolve(p, "Delete", Modifiers::SHIFT), None);
        let alt = Modifiers {
            alt: true,
            ..Modifiers::CTRL
        };
        assert_eq!(resolve(p, "c", alt), None);
    }

    #[test]
    fn escape_survives_text_edit() {
        assert!(!EditorCommand::ClearSelection.suppressed_during_text_edit());
        assert!(EditorCommand::Undo.suppressed_during_text_edit());
        assert!(EditorCommand::Delete.suppressed_during_text_edit());
    }
}
