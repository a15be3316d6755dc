//! Input handling and tool state machine.
//!
//! This module translates backend keyboard and pointer events into drawing
//! actions. It owns the tool state (active tool, fill, opacity, the in-progress
//! draft) and routes every bound key and menu click through one action dispatch.

pub mod events;
pub mod modifiers;
pub mod state;
pub mod tool;

pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
pub use state::{DrawingState, InputState};
pub use tool::Tool;
