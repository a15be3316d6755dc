//! Keyboard modifier state tracking.

/// Keyboard modifier state.
///
/// Tracks which modifier keys are held so bindings like `Ctrl+Z` and
/// `Shift+Return` can be told apart from the bare key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a modifier other than Shift is held.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt
    }
}
