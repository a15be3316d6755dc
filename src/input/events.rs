//! Backend-neutral input event types.

/// Keys the input state cares about.
///
/// The Wayland keyboard handler maps keysyms onto these; anything else that
/// produces text arrives as [`Key::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character (letters, digits, punctuation)
    Char(char),
    Escape,
    Return,
    Backspace,
    Tab,
    Space,
    Shift,
    Ctrl,
    Alt,
    /// Function key F1-F12
    F(u8),
    Unknown,
}

impl Key {
    /// Name used when matching against configured bindings.
    ///
    /// Single characters are uppercased so `z` and `Z` hit the same binding;
    /// shift state is carried separately by the modifiers.
    pub fn binding_name(self) -> Option<String> {
        Some(match self {
            Key::Char(c) => c.to_uppercase().collect(),
            Key::Escape => "Escape".to_string(),
            Key::Return => "Return".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Space => "Space".to_string(),
            Key::F(n) => format!("F{n}"),
            Key::Shift | Key::Ctrl | Key::Alt | Key::Unknown => return None,
        })
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Draws, places text, clicks menu buttons
    Left,
    /// Removes the shape under the pointer or cancels a draft
    Right,
    /// Restyles the shape under the pointer
    Middle,
}
