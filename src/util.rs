//! Utility functions for colors and geometry.
//!
//! This module provides:
//! - Arrowhead geometry calculations
//! - Ellipse bounding box calculations from drag corners
//! - Integer rectangle helper used for hit-testing and damage
//! - Color name / hex string parsing for the configuration file

use crate::draw::{Color, color::*};

// ============================================================================
// Arrowhead Geometry
// ============================================================================

/// Calculates the two barb points of an arrowhead drawn at the end of a line.
///
/// The head sits at the tip `(x2, y2)` and opens back towards the tail
/// `(x1, y1)`. Each barb is `length` pixels long and diverges from the shaft
/// by `angle_degrees`.
///
/// # Returns
/// Array of two points `[(left_x, left_y), (right_x, right_y)]`.
/// If the line is too short (< 1 pixel), both points equal the tip.
pub fn calculate_arrowhead(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    length: f64,
    angle_degrees: f64,
) -> [(f64, f64); 2] {
    let tip_x = x2 as f64;
    let tip_y = y2 as f64;
    let dx = (x2 - x1) as f64;
    let dy = (y2 - y1) as f64;
    let line_length = (dx * dx + dy * dy).sqrt();

    if line_length < 1.0 {
        return [(tip_x, tip_y), (tip_x, tip_y)];
    }

    // Unit vector along the shaft, tail -> tip
    let ux = dx / line_length;
    let uy = dy / line_length;

    let angle = angle_degrees.to_radians();
    let cos_a = angle.cos();
    let sin_a = angle.sin();

    let left_x = tip_x - length * (ux * cos_a - uy * sin_a);
    let left_y = tip_y - length * (uy * cos_a + ux * sin_a);

    let right_x = tip_x - length * (ux * cos_a + uy * sin_a);
    let right_y = tip_y - length * (uy * cos_a - ux * sin_a);

    [(left_x, left_y), (right_x, right_y)]
}

// ============================================================================
// Color Parsing
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
/// - "deeppink", "deepskyblue", "purple" (the default per-shape palette)
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "deeppink" => Some(DEEP_PINK),
        "deepskyblue" => Some(DEEP_SKY_BLUE),
        "purple" => Some(PURPLE),
        _ => None,
    }
}

/// Parses a `#RRGGBB` or `#RRGGBBAA` hex string.
pub fn hex_to_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let r = channel(0)?;
    let g = channel(2)?;
    let b = channel(4)?;
    let a = if hex.len() == 8 { channel(6)? } else { 255 };

    Some(Color::from_rgba8(r, g, b, a))
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Axis-aligned integer rectangle used for hit-testing and damage hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Width/height must be positive.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Returns true if the point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(self, amount: i32) -> Rect {
        Rect {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2,
            height: self.height + amount * 2,
        }
    }
}

/// Normalizes a drag from one corner to the opposite corner into
/// `(x, y, width, height)` with non-negative extents.
pub fn normalized_rect(x1: i32, y1: i32, x2: i32, y2: i32) -> (i32, i32, i32, i32) {
    (x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
}

/// Calculates ellipse parameters from two corner points.
///
/// Converts a drag rectangle (from corner to corner) into ellipse parameters
/// (center point and radii) suitable for Cairo's ellipse rendering.
///
/// The ellipse is inscribed in the exact drag rectangle, so odd extents give
/// half-pixel centers and radii.
///
/// # Returns
/// Tuple `(cx, cy, rx, ry)` where:
/// - `cx`, `cy` = center point coordinates
/// - `rx` = horizontal radius (half width)
/// - `ry` = vertical radius (half height)
pub fn ellipse_bounds(x1: i32, y1: i32, x2: i32, y2: i32) -> (f64, f64, f64, f64) {
    let (x, y, w, h) = normalized_rect(x1, y1, x2, y2);
    let rx = w as f64 / 2.0;
    let ry = h as f64 / 2.0;
    (x as f64 + rx, y as f64 + ry, rx, ry)
}

/// Shortest distance from point `(px, py)` to the segment `(x1, y1)-(x2, y2)`.
pub fn distance_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }
    let t = (((px - x1) * dx + (py - y1) * dy) / len_sq).clamp(0.0, 1.0);
    let nx = x1 + t * dx;
    let ny = y1 + t * dy;
    ((px - nx).powi(2) + (py - ny).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_sits_at_tip_and_points_back() {
        let [(lx, ly), (rx, ry)] = calculate_arrowhead(0, 0, 100, 0, 10.0, 45.0);
        // Both barbs trail behind the tip on the tail side
        assert!(lx < 100.0 && rx < 100.0);
        assert!((ly + ry).abs() < 1e-9);
        let barb = ((100.0 - lx).powi(2) + ly.powi(2)).sqrt();
        assert!((barb - 10.0).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_handles_degenerate_lines() {
        let [(lx, ly), (rx, ry)] = calculate_arrowhead(5, 5, 5, 5, 15.0, 45.0);
        assert_eq!((lx, ly), (5.0, 5.0));
        assert_eq!((rx, ry), (5.0, 5.0));
    }

    #[test]
    fn ellipse_bounds_compute_center_and_radii() {
        assert_eq!(ellipse_bounds(0, 0, 10, 4), (5.0, 2.0, 5.0, 2.0));
        // Odd extents keep the half pixel instead of truncating
        assert_eq!(ellipse_bounds(21, 31, 10, 10), (15.5, 20.5, 5.5, 10.5));
    }

    #[test]
    fn normalized_rect_flips_reverse_drags() {
        assert_eq!(normalized_rect(110, 60, 10, 10), (10, 10, 100, 50));
    }

    #[test]
    fn name_and_hex_colors_parse() {
        assert_eq!(name_to_color("WHITE").unwrap(), WHITE);
        assert!(name_to_color("chartreuse").is_none());

        let pink = hex_to_color("#FF1493").unwrap();
        assert_eq!(pink, DEEP_PINK);
        let translucent = hex_to_color("#00000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
        assert!(hex_to_color("FF1493").is_none());
        assert!(hex_to_color("#FF14").is_none());
        assert!(hex_to_color("#GG1493").is_none());
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        assert!((distance_to_segment(5.0, 3.0, 0.0, 0.0, 10.0, 0.0) - 3.0).abs() < 1e-9);
        assert!((distance_to_segment(-4.0, 3.0, 0.0, 0.0, 10.0, 0.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rect_contains_uses_exclusive_max() {
        let rect = Rect::new(0, 0, 10, 10).unwrap();
        assert!(rect.contains(0, 0));
        assert!(rect.contains(9, 9));
        assert!(!rect.contains(10, 5));
        assert_eq!(rect.inflate(2), Rect::new(-2, -2, 14, 14).unwrap());
    }
}
