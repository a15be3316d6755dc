//! Configuration enum types.

use crate::draw::{Color, color::*};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a named color, a hex string or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// line = "yellow"
///
/// # Hex string, optionally with alpha
/// rectangle = "#FF1493"
///
/// # RGB color (0-255 per component)
/// ellipse = [0, 191, 255]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, yellow, orange, pink, white, black,
    /// deeppink, deepskyblue, purple) or a `#RRGGBB` / `#RRGGBBAA` string
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown names and malformed hex strings fall back to `fallback` with a warning.
    pub fn to_color_or(&self, fallback: Color) -> Color {
        match self {
            ColorSpec::Name(value) if value.starts_with('#') => crate::util::hex_to_color(value)
                .unwrap_or_else(|| {
                    warn!("Invalid hex color '{}', using fallback", value);
                    fallback
                }),
            ColorSpec::Name(name) => crate::util::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using fallback", name);
                fallback
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgba8(*r, *g, *b, 255),
        }
    }

    pub fn to_color(&self) -> Color {
        self.to_color_or(RED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_spec_variants_resolve() {
        assert_eq!(ColorSpec::Name("yellow".into()).to_color(), YELLOW);
        assert_eq!(ColorSpec::Name("#00BFFF".into()).to_color(), DEEP_SKY_BLUE);
        assert_eq!(ColorSpec::Rgb([0, 255, 0]).to_color(), GREEN);
        assert_eq!(ColorSpec::Name("#nope".into()).to_color_or(WHITE), WHITE);
        assert_eq!(ColorSpec::Name("mauve".into()).to_color(), RED);
    }
}
