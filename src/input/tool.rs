//! Drawing tool selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing tool selection.
///
/// The active tool determines what shape a left-button drag (or, for text, a
/// click) creates. Tools are switched with their key or a floating menu button.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Straight line between press and release points
    Line,
    /// Line with a two-barb head at the release point
    #[default]
    Arrow,
    /// Axis-aligned rectangle from corner to corner
    Rectangle,
    /// Ellipse inscribed in the dragged box
    Ellipse,
    /// Text anchored at the click position
    Text,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Line,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Text,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Line => "Line",
            Tool::Arrow => "Arrow",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
            Tool::Text => "Text",
        }
    }

    /// Single-letter glyph for the floating menu.
    pub fn glyph(self) -> &'static str {
        match self {
            Tool::Line => "L",
            Tool::Arrow => "A",
            Tool::Rectangle => "R",
            Tool::Ellipse => "E",
            Tool::Text => "T",
        }
    }
}
