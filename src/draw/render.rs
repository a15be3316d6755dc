//! Cairo-based rendering functions for shapes.

use super::color::Color;
use super::font::FontDescriptor;
use super::shape::{Shape, ShapeKind};
use crate::util;

/// Renders shapes in order (first shape = bottom layer).
pub fn render_shapes<'a>(ctx: &cairo::Context, shapes: impl IntoIterator<Item = &'a Shape>) {
    for shape in shapes {
        render_shape(ctx, shape);
    }
}

/// Renders a single shape, applying its opacity and fill.
pub fn render_shape(ctx: &cairo::Context, shape: &Shape) {
    let color = shape.paint_color();
    let thick = shape.thick;
    match &shape.kind {
        ShapeKind::Line { x1, y1, x2, y2 } => {
            render_line(ctx, *x1, *y1, *x2, *y2, color, thick);
        }
        ShapeKind::Arrow {
            x1,
            y1,
            x2,
            y2,
            head_length,
            head_angle,
        } => {
            render_arrow(
                ctx,
                (*x1, *y1, *x2, *y2),
                color,
                thick,
                *head_length,
                *head_angle,
            );
        }
        ShapeKind::Rect { x, y, w, h, filled } => {
            render_rect(ctx, *x, *y, *w, *h, color, thick, *filled);
        }
        ShapeKind::Ellipse {
            cx,
            cy,
            rx,
            ry,
            filled,
        } => {
            render_ellipse(ctx, *cx, *cy, *rx, *ry, color, thick, *filled);
        }
        ShapeKind::Text {
            x,
            y,
            text,
            size,
            font,
        } => {
            render_text(ctx, *x, *y, text, color, *size, font);
        }
    }
}

fn render_line(ctx: &cairo::Context, x1: i32, y1: i32, x2: i32, y2: i32, color: Color, thick: f64) {
    color.apply(ctx);
    ctx.set_line_width(thick);
    ctx.set_line_cap(cairo::LineCap::Round);

    ctx.move_to(x1 as f64, y1 as f64);
    ctx.line_to(x2 as f64, y2 as f64);
    let _ = ctx.stroke();
}

#[allow(clippy::too_many_arguments)]
fn render_rect(
    ctx: &cairo::Context,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Color,
    thick: f64,
    filled: bool,
) {
    let (nx, ny, nw, nh) = util::normalized_rect(x, y, x + w, y + h);

    color.apply(ctx);
    ctx.set_line_width(thick);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(nx as f64, ny as f64, nw as f64, nh as f64);
    stroke_or_fill(ctx, filled);
}

#[allow(clippy::too_many_arguments)]
fn render_ellipse(
    ctx: &cairo::Context,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    color: Color,
    thick: f64,
    filled: bool,
) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }

    color.apply(ctx);
    ctx.set_line_width(thick);

    ctx.save().ok();
    ctx.translate(cx, cy);
    ctx.scale(rx, ry);
    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
    ctx.restore().ok();

    stroke_or_fill(ctx, filled);
}

/// Fills with the stroke color and then strokes the outline on top, so a
/// filled shape keeps a crisp edge at the same opacity.
fn stroke_or_fill(ctx: &cairo::Context, filled: bool) {
    if filled {
        let _ = ctx.fill_preserve();
    }
    let _ = ctx.stroke();
}

/// Line with two barbs at the end point.
fn render_arrow(
    ctx: &cairo::Context,
    (x1, y1, x2, y2): (i32, i32, i32, i32),
    color: Color,
    thick: f64,
    head_length: f64,
    head_angle: f64,
) {
    let [(lx, ly), (rx, ry)] = util::calculate_arrowhead(x1, y1, x2, y2, head_length, head_angle);

    color.apply(ctx);
    ctx.set_line_width(thick);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    // One path so overlapping segments don't double up the alpha
    ctx.move_to(x1 as f64, y1 as f64);
    ctx.line_to(x2 as f64, y2 as f64);
    ctx.move_to(lx, ly);
    ctx.line_to(x2 as f64, y2 as f64);
    ctx.line_to(rx, ry);
    let _ = ctx.stroke();
}

/// Renders text at a specified position with multi-line support using Pango.
///
/// The position (x, y) is the baseline start of the first line. Text is drawn
/// with a drop shadow and a contrasting outline so it stays legible over any
/// desktop content.
pub fn render_text(
    ctx: &cairo::Context,
    x: i32,
    y: i32,
    text: &str,
    color: Color,
    size: f64,
    font: &FontDescriptor,
) {
    ctx.save().ok();

    // Subpixel antialiasing fringes on an ARGB overlay
    ctx.set_antialias(cairo::Antialias::Best);

    let layout = font.layout(ctx, text, size);

    let brightness = color.r * 0.299 + color.g * 0.587 + color.b * 0.114;
    let outline = if brightness > 0.5 { 0.0 } else { 1.0 };

    // Pango measures from the top-left corner
    let baseline = layout.baseline() as f64 / pango::SCALE as f64;
    let adjusted_y = y as f64 - baseline;

    let shadow_offset = size * 0.04;
    ctx.move_to(x as f64 + shadow_offset, adjusted_y + shadow_offset);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.4);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.move_to(x as f64, adjusted_y);
    pangocairo::functions::layout_path(ctx, &layout);

    ctx.set_source_rgba(outline, outline, outline, 1.0);
    ctx.set_line_width(size * 0.06);
    ctx.set_line_join(cairo::LineJoin::Round);
    let _ = ctx.stroke_preserve();

    color.apply(ctx);
    let _ = ctx.fill();

    ctx.restore().ok();
}

/// Clears the whole surface to transparent.
pub fn clear_surface(ctx: &cairo::Context) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Clear);
    let _ = ctx.paint();
    let _ = ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::DEEP_PINK;
    use crate::draw::shape::Opacity;
    use crate::geometry::MonitorId;

    fn surface_with(shape: &Shape) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 200, 120)
            .expect("create surface");
        {
            let ctx = cairo::Context::new(&surface).expect("context");
            clear_surface(&ctx);
            render_shape(&ctx, shape);
        }
        surface.flush();
        surface
    }

    fn alpha_at(surface: &mut cairo::ImageSurface, x: usize, y: usize) -> u8 {
        let stride = surface.stride() as usize;
        let data = surface.data().expect("surface data");
        // ARGB32 is native-endian; alpha is the high byte of the u32
        let offset = y * stride + x * 4;
        let pixel = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (pixel >> 24) as u8
    }

    fn rect(filled: bool, opacity: Opacity) -> Shape {
        Shape {
            monitor: MonitorId::new("DP-1"),
            color: DEEP_PINK,
            opacity,
            thick: 4.0,
            kind: ShapeKind::Rect {
                x: 10,
                y: 10,
                w: 100,
                h: 50,
                filled,
            },
        }
    }

    #[test]
    fn outline_rect_leaves_interior_clear() {
        let mut surface = surface_with(&rect(false, Opacity::Full));
        assert_eq!(alpha_at(&mut surface, 10, 30), 255);
        assert_eq!(alpha_at(&mut surface, 60, 35), 0);
    }

    #[test]
    fn filled_rect_uses_opacity_alpha() {
        let mut surface = surface_with(&rect(true, Opacity::Half));
        let alpha = alpha_at(&mut surface, 60, 35);
        assert!((127..=129).contains(&alpha), "alpha was {alpha}");
        assert_eq!(alpha_at(&mut surface, 150, 100), 0);
    }
}
