//! Shape definitions for screen annotations.

use super::color::Color;
use super::font::FontDescriptor;
use crate::geometry::MonitorId;
use crate::util::{self, Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opacity applied to the stroke and fill of geometric shapes.
///
/// Cycled with the opacity key: Full → Half → Quarter → Full.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Opacity {
    /// Alpha 255
    Full,
    /// Alpha 128
    #[default]
    Half,
    /// Alpha 64
    Quarter,
}

impl Opacity {
    pub fn alpha_u8(self) -> u8 {
        match self {
            Opacity::Full => 255,
            Opacity::Half => 128,
            Opacity::Quarter => 64,
        }
    }

    pub fn alpha(self) -> f64 {
        self.alpha_u8() as f64 / 255.0
    }

    pub fn next(self) -> Self {
        match self {
            Opacity::Full => Opacity::Half,
            Opacity::Half => Opacity::Quarter,
            Opacity::Quarter => Opacity::Full,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Opacity::Full => "100%",
            Opacity::Half => "50%",
            Opacity::Quarter => "25%",
        }
    }
}

/// Geometry of a committed annotation, tagged by kind.
///
/// All coordinates are local to the monitor named by [`Shape::monitor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Straight line between two points
    Line { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// Line with a V-shaped head at the end point `(x2, y2)`
    Arrow {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        /// Barb length in pixels
        head_length: f64,
        /// Angle between each barb and the shaft, in degrees
        head_angle: f64,
    },
    /// Axis-aligned rectangle with non-negative extents
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        filled: bool,
    },
    /// Axis-aligned ellipse described by center and radii, inscribed in the
    /// integer drag rectangle (odd extents land on half pixels)
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        filled: bool,
    },
    /// Text anchored at the baseline of its first line
    Text {
        x: i32,
        y: i32,
        text: String,
        /// Font size in points
        size: f64,
        font: FontDescriptor,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line { .. } => "line",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Rect { .. } => "rectangle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Text { .. } => "text",
        }
    }
}

/// A committed annotation.
///
/// Shapes are never mutated once they enter the document; restyling builds a
/// new value with [`Shape::restyled`] and swaps it in through a replace command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Monitor the shape was drawn on
    pub monitor: MonitorId,
    /// Base stroke color, before opacity is applied
    pub color: Color,
    pub opacity: Opacity,
    /// Stroke width in pixels
    pub thick: f64,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn is_filled(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Rect { filled: true, .. } | ShapeKind::Ellipse { filled: true, .. }
        )
    }

    /// Color used for strokes and fills. Text is always drawn opaque.
    pub fn paint_color(&self) -> Color {
        match self.kind {
            ShapeKind::Text { .. } => self.color,
            _ => self.color.with_alpha(self.color.a * self.opacity.alpha()),
        }
    }

    /// Returns a copy with the given fill and opacity applied where the kind
    /// supports them.
    pub fn restyled(&self, fill: bool, opacity: Opacity) -> Shape {
        let mut shape = self.clone();
        shape.opacity = opacity;
        match &mut shape.kind {
            ShapeKind::Rect { filled, .. } | ShapeKind::Ellipse { filled, .. } => *filled = fill,
            _ => {}
        }
        shape
    }

    /// Returns the axis-aligned bounding box for this shape, expanded to cover stroke width.
    pub fn bounding_box(&self) -> Option<Rect> {
        let thick = self.thick;
        match &self.kind {
            ShapeKind::Line { x1, y1, x2, y2 } => bounding_box_for_line(*x1, *y1, *x2, *y2, thick),
            ShapeKind::Arrow {
                x1,
                y1,
                x2,
                y2,
                head_length,
                head_angle,
            } => bounding_box_for_arrow(*x1, *y1, *x2, *y2, thick, *head_length, *head_angle),
            ShapeKind::Rect { x, y, w, h, .. } => bounding_box_for_rect(*x, *y, *w, *h, thick),
            ShapeKind::Ellipse { cx, cy, rx, ry, .. } => {
                bounding_box_for_ellipse(*cx, *cy, *rx, *ry, thick)
            }
            ShapeKind::Text {
                x,
                y,
                text,
                size,
                font,
            } => bounding_box_for_text(*x, *y, text, *size, font),
        }
    }

    /// Returns true if the monitor-local point `(px, py)` touches the shape.
    ///
    /// Outlines accept points within `tolerance` pixels of the stroke; filled
    /// rectangles and ellipses accept any interior point.
    pub fn hit_test(&self, px: i32, py: i32, tolerance: f64) -> bool {
        let (fx, fy) = (px as f64, py as f64);
        let reach = self.thick / 2.0 + tolerance;
        match &self.kind {
            ShapeKind::Line { x1, y1, x2, y2 } => {
                util::distance_to_segment(fx, fy, *x1 as f64, *y1 as f64, *x2 as f64, *y2 as f64)
                    <= reach
            }
            ShapeKind::Arrow {
                x1,
                y1,
                x2,
                y2,
                head_length,
                head_angle,
            } => {
                let (tx, ty) = (*x2 as f64, *y2 as f64);
                let shaft = util::distance_to_segment(fx, fy, *x1 as f64, *y1 as f64, tx, ty);
                let barbs =
                    util::calculate_arrowhead(*x1, *y1, *x2, *y2, *head_length, *head_angle);
                shaft <= reach
                    || barbs
                        .iter()
                        .any(|&(bx, by)| util::distance_to_segment(fx, fy, tx, ty, bx, by) <= reach)
            }
            ShapeKind::Rect { x, y, w, h, filled } => {
                let (left, top) = (*x as f64, *y as f64);
                let (right, bottom) = (left + *w as f64, top + *h as f64);
                let inside_outer = fx >= left - reach
                    && fx <= right + reach
                    && fy >= top - reach
                    && fy <= bottom + reach;
                if !inside_outer {
                    return false;
                }
                if *filled {
                    return true;
                }
                let inside_inner = fx > left + reach
                    && fx < right - reach
                    && fy > top + reach
                    && fy < bottom - reach;
                !inside_inner
            }
            ShapeKind::Ellipse {
                cx,
                cy,
                rx,
                ry,
                filled,
            } => {
                if *rx <= 0.0 || *ry <= 0.0 {
                    return false;
                }
                let (rx, ry) = (*rx, *ry);
                let nx = (fx - *cx) / rx;
                let ny = (fy - *cy) / ry;
                let norm = (nx * nx + ny * ny).sqrt();
                if *filled && norm <= 1.0 {
                    return true;
                }
                // Radial distance to the outline, scaled back to pixels along the ray
                let radius_along_ray = if norm > 0.0 {
                    let dx = fx - *cx;
                    let dy = fy - *cy;
                    (dx * dx + dy * dy).sqrt() / norm
                } else {
                    rx.min(ry)
                };
                ((norm - 1.0) * radius_along_ray).abs() <= reach
            }
            ShapeKind::Text { .. } => self
                .bounding_box()
                .is_some_and(|rect| rect.inflate(tolerance.ceil() as i32).contains(px, py)),
        }
    }
}

fn stroke_padding(thick: f64) -> i32 {
    let padding = (thick / 2.0).ceil() as i32;
    padding.max(1)
}

pub(crate) fn bounding_box_for_line(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    thick: f64,
) -> Option<Rect> {
    let padding = stroke_padding(thick);

    let min_x = x1.min(x2) - padding;
    let max_x = x1.max(x2) + padding;
    let min_y = y1.min(y2) - padding;
    let max_y = y1.max(y2) + padding;

    ensure_positive_rect(min_x, min_y, max_x, max_y)
}

pub(crate) fn bounding_box_for_rect(x: i32, y: i32, w: i32, h: i32, thick: f64) -> Option<Rect> {
    let padding = stroke_padding(thick);

    let x2 = x + w;
    let y2 = y + h;

    let min_x = x.min(x2) - padding;
    let max_x = x.max(x2) + padding;
    let min_y = y.min(y2) - padding;
    let max_y = y.max(y2) + padding;

    ensure_positive_rect(min_x, min_y, max_x, max_y)
}

pub(crate) fn bounding_box_for_ellipse(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    thick: f64,
) -> Option<Rect> {
    let padding = stroke_padding(thick);
    let min_x = (cx - rx).floor() as i32 - padding;
    let max_x = (cx + rx).ceil() as i32 + padding;
    let min_y = (cy - ry).floor() as i32 - padding;
    let max_y = (cy + ry).ceil() as i32 + padding;

    ensure_positive_rect(min_x, min_y, max_x, max_y)
}

pub(crate) fn bounding_box_for_arrow(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    thick: f64,
    head_length: f64,
    head_angle: f64,
) -> Option<Rect> {
    let barbs = util::calculate_arrowhead(x1, y1, x2, y2, head_length, head_angle);

    let mut min_x = x1.min(x2) as f64;
    let mut max_x = x1.max(x2) as f64;
    let mut min_y = y1.min(y2) as f64;
    let mut max_y = y1.max(y2) as f64;

    for &(px, py) in &barbs {
        min_x = min_x.min(px);
        max_x = max_x.max(px);
        min_y = min_y.min(py);
        max_y = max_y.max(py);
    }

    let padding = stroke_padding(thick) as f64;

    ensure_positive_rect_f64(
        min_x - padding,
        min_y - padding,
        max_x + padding,
        max_y + padding,
    )
}

pub(crate) fn bounding_box_for_text(
    x: i32,
    y: i32,
    text: &str,
    size: f64,
    font: &FontDescriptor,
) -> Option<Rect> {
    if text.is_empty() {
        return None;
    }

    // A 1x1 surface is enough; only the layout metrics are needed.
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).ok()?;
    let ctx = cairo::Context::new(&surface).ok()?;
    ctx.set_antialias(cairo::Antialias::Best);

    let layout = font.layout(&ctx, text, size);
    let (ink_rect, _logical_rect) = layout.extents();

    let scale = pango::SCALE as f64;
    let ink_x = ink_rect.x() as f64 / scale;
    let ink_y = ink_rect.y() as f64 / scale;
    let ink_width = ink_rect.width() as f64 / scale;
    let ink_height = ink_rect.height() as f64 / scale;
    let baseline = layout.baseline() as f64 / scale;

    let base_x = x as f64;
    let base_y = y as f64 - baseline;

    // Outline stroke plus the drop shadow offset
    let stroke_padding = (size * 0.06) / 2.0;
    let shadow_offset = size * 0.04;

    let min_x = base_x + ink_x - stroke_padding;
    let min_y = base_y + ink_y - stroke_padding;
    let max_x = base_x + ink_x + ink_width + shadow_offset + stroke_padding;
    let max_y = base_y + ink_y + ink_height + shadow_offset + stroke_padding;

    ensure_positive_rect_f64(min_x, min_y, max_x, max_y)
}

fn ensure_positive_rect(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Rect> {
    let max_x = if min_x == max_x { max_x + 1 } else { max_x };
    let max_y = if min_y == max_y { max_y + 1 } else { max_y };
    Rect::from_min_max(min_x, min_y, max_x, max_y)
}

fn ensure_positive_rect_f64(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Option<Rect> {
    ensure_positive_rect(
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{GREEN, WHITE};

    fn shape(kind: ShapeKind) -> Shape {
        Shape {
            monitor: MonitorId::new("DP-1"),
            color: WHITE,
            opacity: Opacity::Full,
            thick: 4.0,
            kind,
        }
    }

    #[test]
    fn opacity_cycles_through_three_levels() {
        let start = Opacity::default();
        assert_eq!(start, Opacity::Half);
        assert_eq!(start.next(), Opacity::Quarter);
        assert_eq!(start.next().next(), Opacity::Full);
        assert_eq!(start.next().next().next(), start);
        assert_eq!(Opacity::Quarter.alpha_u8(), 64);
    }

    #[test]
    fn line_bounding_box_covers_stroke() {
        let line = shape(ShapeKind::Line {
            x1: 50,
            y1: 40,
            x2: 70,
            y2: 90,
        });
        let rect = line.bounding_box().expect("line should have bounds");
        assert_eq!(rect, Rect::new(48, 38, 24, 54).unwrap());
    }

    #[test]
    fn arrow_bounding_box_includes_head() {
        let arrow = shape(ShapeKind::Arrow {
            x1: 50,
            y1: 120,
            x2: 100,
            y2: 100,
            head_length: 20.0,
            head_angle: 45.0,
        });
        let rect = arrow.bounding_box().expect("arrow should have bounds");
        for (px, py) in util::calculate_arrowhead(50, 120, 100, 100, 20.0, 45.0) {
            assert!(px >= rect.x as f64 && px <= (rect.x + rect.width) as f64);
            assert!(py >= rect.y as f64 && py <= (rect.y + rect.height) as f64);
        }
    }

    #[test]
    fn ellipse_bounding_box_handles_radii_and_stroke() {
        let ellipse = shape(ShapeKind::Ellipse {
            cx: 200.0,
            cy: 150.0,
            rx: 40.0,
            ry: 20.0,
            filled: false,
        });
        let rect = ellipse.bounding_box().expect("ellipse should have bounds");
        assert_eq!(rect, Rect::new(158, 128, 84, 44).unwrap());
    }

    #[test]
    fn text_bounding_box_is_non_zero() {
        let text = shape(ShapeKind::Text {
            x: 10,
            y: 40,
            text: "Hello".to_string(),
            size: 24.0,
            font: FontDescriptor::default(),
        });
        let rect = text.bounding_box().expect("text should have bounds");
        assert!(rect.width > 0 && rect.height > 0);
        assert!(rect.x <= 10);
    }

    #[test]
    fn outline_rect_hit_test_ignores_interior() {
        let rect = shape(ShapeKind::Rect {
            x: 10,
            y: 10,
            w: 100,
            h: 50,
            filled: false,
        });
        assert!(rect.hit_test(10, 30, 3.0));
        assert!(rect.hit_test(60, 61, 3.0));
        assert!(!rect.hit_test(60, 35, 3.0));
        assert!(!rect.hit_test(200, 200, 3.0));

        let filled = rect.restyled(true, Opacity::Quarter);
        assert!(filled.hit_test(60, 35, 3.0));
    }

    #[test]
    fn ellipse_and_line_hit_tests() {
        let ellipse = shape(ShapeKind::Ellipse {
            cx: 100.0,
            cy: 100.0,
            rx: 50.0,
            ry: 25.0,
            filled: false,
        });
        assert!(ellipse.hit_test(150, 100, 2.0));
        assert!(ellipse.hit_test(100, 75, 2.0));
        assert!(!ellipse.hit_test(100, 100, 2.0));

        let line = shape(ShapeKind::Line {
            x1: 0,
            y1: 0,
            x2: 100,
            y2: 0,
        });
        assert!(line.hit_test(50, 3, 2.0));
        assert!(!line.hit_test(50, 10, 2.0));
    }

    #[test]
    fn restyle_keeps_original_and_skips_fill_for_lines() {
        let mut line = shape(ShapeKind::Line {
            x1: 0,
            y1: 0,
            x2: 10,
            y2: 10,
        });
        line.color = GREEN;
        let restyled = line.restyled(true, Opacity::Quarter);
        assert_eq!(line.opacity, Opacity::Full);
        assert_eq!(restyled.opacity, Opacity::Quarter);
        assert!(!restyled.is_filled());
        assert!((restyled.paint_color().a - 64.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn text_paints_opaque_regardless_of_opacity() {
        let mut text = shape(ShapeKind::Text {
            x: 0,
            y: 0,
            text: "x".into(),
            size: 12.0,
            font: FontDescriptor::default(),
        });
        text.opacity = Opacity::Quarter;
        assert_eq!(text.paint_color().a, 1.0);
    }
}
