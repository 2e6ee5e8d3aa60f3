use egui::{Key, Modifiers, Pos2};

/// A pointer position in canvas coordinates with the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pos: Pos2,
    /// Milliseconds; only differences between samples matter.
    pub time_ms: f64,
}

impl PointerSample {
    pub fn new(pos: Pos2, time_ms: f64) -> Self {
        Self { pos, time_ms }
    }
}

/// The key part of a keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCode {
    /// A single printable character.
    Char(char),
    Named(Key),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn char(c: char) -> Self {
        Self {
            key: KeyCode::Char(c),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn named(key: Key) -> Self {
        Self {
            key: KeyCode::Named(key),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is(&self, key: Key) -> bool {
        self.key == KeyCode::Named(key)
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.modifiers.command || self.modifiers.ctrl || self.modifiers.mac_cmd
    }
}

/// Input routed from the host surface into an editing session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Pos2),
    PointerMove(Pos2),
    PointerUp,
    /// The pointer left the canvas; handled like a release.
    PointerLeave,
    Key(KeyPress),
}

impl InputEvent {
    pub fn position(&self) -> Option<Pos2> {
        match self {
            InputEvent::PointerDown(p) | InputEvent::PointerMove(p) => Some(*p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_modifier_detection() {
        let undo = KeyPress::char('z').with_modifiers(Modifiers::COMMAND);
        assert!(undo.command());
        assert!(!KeyPress::char('z').command());
    }

    #[test]
    fn named_keys_compare() {
        assert!(KeyPress::named(Key::Escape).is(Key::Escape));
        assert!(!KeyPress::char('a').is(Key::A));
    }
}
