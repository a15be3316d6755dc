//! Annotation model and Cairo rendering.
//!
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Shape`]: committed annotations, tagged by [`ShapeKind`]
//! - [`Canvas`]: the ordered [`Document`] plus its undo/redo [`CommandStack`]
//! - Rendering functions for Cairo-based output

pub mod canvas;
pub mod color;
pub mod document;
pub mod font;
pub mod history;
pub mod render;
pub mod shape;

pub use canvas::Canvas;
pub use color::Color;
pub use document::{Document, Entry, ShapeId};
pub use font::FontDescriptor;
pub use history::{Command, CommandStack};
pub use render::{clear_surface, render_shape, render_shapes, render_text};
pub use shape::{Opacity, Shape, ShapeKind};

pub use color::{
    BLACK, BLUE, DEEP_PINK, DEEP_SKY_BLUE, GREEN, ORANGE, PINK, PURPLE, RED, TRANSPARENT, WHITE,
    YELLOW,
};
