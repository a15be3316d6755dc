//! Font descriptor for text rendering.

use serde::{Deserialize, Serialize};

/// Font configuration for text annotations.
///
/// Describes which font to use, including family name, weight, and style.
/// The descriptor is stored on every committed text shape so a later config
/// reload does not restyle text that is already on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "JetBrains Mono")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "bold".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// Format: "Family Style Weight Size", e.g. "Sans Bold 36".
    pub fn to_pango_string(&self, size: f64) -> String {
        let mut parts = vec![self.family.clone()];

        if !self.style.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.style));
        }

        if !self.weight.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.weight));
        }

        parts.push(format!("{}", size.round() as i32));

        parts.join(" ")
    }

    /// Builds a Pango layout on `ctx` for `text` at `size`.
    pub fn layout(&self, ctx: &cairo::Context, text: &str, size: f64) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(ctx);
        let font_desc = pango::FontDescription::from_string(&self.to_pango_string(size));
        layout.set_font_description(Some(&font_desc));
        layout.set_text(text);
        layout
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pango_string_default() {
        let font = FontDescriptor::default();
        assert_eq!(font.to_pango_string(36.0), "Sans Bold 36");
    }

    #[test]
    fn pango_string_italic_normal_weight() {
        let font = FontDescriptor::new(
            "HanziPen TC".to_string(),
            "normal".to_string(),
            "italic".to_string(),
        );
        assert_eq!(font.to_pango_string(24.4), "HanziPen TC Italic 24");
    }
}
