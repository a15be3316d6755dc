use std::f64::consts::PI;

// ============================================================================
// Pass-through indicator constants
// ============================================================================

/// Badge diameter
const BADGE_SIZE: f64 = 20.0;
/// Distance from the top and right edges
const BADGE_MARGIN: f64 = 10.0;
const BADGE_FONT: &str = "Sans Bold 10";

/// Tints the whole surface light blue and draws a "P" badge in the top-right corner.
pub fn render_passthrough_indicator(ctx: &cairo::Context, width: f64, height: f64) {
    let _ = ctx.save();

    ctx.set_source_rgba(0.0, 150.0 / 255.0, 1.0, 15.0 / 255.0);
    ctx.rectangle(0.0, 0.0, width, height);
    let _ = ctx.fill();

    let x = width - BADGE_SIZE - BADGE_MARGIN;
    let y = BADGE_MARGIN;
    let radius = BADGE_SIZE / 2.0;
    ctx.arc(x + radius, y + radius, radius, 0.0, 2.0 * PI);
    ctx.set_source_rgba(0.0, 150.0 / 255.0, 1.0, 120.0 / 255.0);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgba(1.0, 1.0, 1.0, 180.0 / 255.0);
    ctx.set_line_width(2.0);
    let _ = ctx.stroke();

    ctx.set_source_rgba(1.0, 1.0, 1.0, 220.0 / 255.0);
    super::show_centered(ctx, "P", BADGE_FONT, (x, y, BADGE_SIZE, BADGE_SIZE));

    let _ = ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_covers_surface_and_badge_sits_top_right() {
        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 200, 100).unwrap();
        {
            let ctx = cairo::Context::new(&surface).unwrap();
            render_passthrough_indicator(&ctx, 200.0, 100.0);
        }
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let alpha = |x: usize, y: usize| {
            let o = y * stride + x * 4;
            (u32::from_ne_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]) >> 24) as u8
        };

        assert_eq!(alpha(20, 80), 15);
        // Badge ring at the left edge of the circle (x = 170, y = 20)
        assert!(alpha(171, 20) > 120);
        // Top-left corner only carries the tint
        assert_eq!(alpha(2, 2), 15);
    }
}
