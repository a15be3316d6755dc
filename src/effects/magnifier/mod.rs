//! Screen magnifier: lens placement, lens painting and the screen sampler.

mod portal;
mod reader;
mod sampler;

pub use sampler::{
    MagnifierSampler, PortalScreenSource, SampleError, SamplerEvent, ScreenSample, ScreenSource,
};

use crate::geometry::VirtualDesktopBounds;
use std::f64::consts::PI;

/// Space between the sampled circle and the lens.
const LENS_GAP: f64 = 24.0;
/// Room around the lens circle for its outline.
pub const LENS_PADDING: i32 = 3;

const HINT_TEXT: &str = "Waiting for screen access";

/// Where the lens surface goes, in monitor-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LensPlacement {
    /// Top-left of the lens surface
    pub x: i32,
    pub y: i32,
    /// Width and height of the (square) lens surface
    pub size: i32,
}

impl LensPlacement {
    pub fn center(&self) -> (f64, f64) {
        let half = self.size as f64 / 2.0;
        (self.x as f64 + half, self.y as f64 + half)
    }
}

/// Places the lens beside the cursor so it does not cover the sampled area.
///
/// The lens goes to the right of the cursor, flips to the left when it would
/// leave the monitor, and is clamped onto the monitor when neither side fits.
pub fn place_lens(
    (cursor_x, cursor_y): (f64, f64),
    radius: f64,
    zoom: f64,
    (monitor_width, monitor_height): (i32, i32),
) -> LensPlacement {
    let size = (radius * 2.0).round() as i32 + LENS_PADDING * 2;
    let half = size as f64 / 2.0;
    let sample_radius = radius / zoom.max(1.0);
    let offset = sample_radius + LENS_GAP + half;

    let right = cursor_x + offset;
    let left = cursor_x - offset;
    let center_x = if right + half <= monitor_width as f64 {
        right
    } else if left - half >= 0.0 {
        left
    } else {
        right
    };

    let max_x = (monitor_width - size).max(0);
    let max_y = (monitor_height - size).max(0);
    let x = ((center_x - half).round() as i32).clamp(0, max_x);
    let y = ((cursor_y - half).round() as i32).clamp(0, max_y);

    LensPlacement { x, y, size }
}

/// Paints the lens into a surface of `placement.size` square.
///
/// `source` is the latest screen sample (already uploaded to a cairo surface)
/// covering `desktop`; `focus` is the global cursor position it is magnified
/// around. Without a sample the lens shows a dark fill and a hint.
pub fn paint_lens(
    ctx: &cairo::Context,
    size: i32,
    radius: f64,
    zoom: f64,
    source: Option<&cairo::ImageSurface>,
    desktop: &VirtualDesktopBounds,
    (focus_x, focus_y): (f64, f64),
) {
    let center = size as f64 / 2.0;

    let _ = ctx.save();
    ctx.arc(center, center, radius, 0.0, 2.0 * PI);
    ctx.clip();

    match source {
        Some(sample) if desktop.width() > 0 && desktop.height() > 0 => {
            // Sample pixels per logical pixel (portal images are device pixels)
            let scale_x = sample.width() as f64 / desktop.width() as f64;
            let scale_y = sample.height() as f64 / desktop.height() as f64;
            let sample_x = (focus_x - desktop.min_x as f64) * scale_x;
            let sample_y = (focus_y - desktop.min_y as f64) * scale_y;

            ctx.set_source_rgba(0.0, 0.0, 0.0, 1.0);
            let _ = ctx.paint();

            ctx.translate(center, center);
            ctx.scale(zoom / scale_x, zoom / scale_y);
            if ctx
                .set_source_surface(sample, -sample_x, -sample_y)
                .is_ok()
            {
                ctx.source().set_filter(cairo::Filter::Good);
                let _ = ctx.paint();
            }
        }
        _ => {
            ctx.set_source_rgba(0.0, 0.0, 0.0, 120.0 / 255.0);
            let _ = ctx.paint();
            paint_hint(ctx, center, radius);
        }
    }
    let _ = ctx.restore();

    ctx.new_path();
    ctx.arc(center, center, radius, 0.0, 2.0 * PI);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 180.0 / 255.0);
    ctx.set_line_width(2.0);
    let _ = ctx.stroke();

    ctx.arc(center, center, (radius - 1.0).max(0.0), 0.0, 2.0 * PI);
    ctx.set_source_rgba(1.0, 1.0, 1.0, 200.0 / 255.0);
    ctx.set_line_width(1.0);
    let _ = ctx.stroke();
}

fn paint_hint(ctx: &cairo::Context, center: f64, radius: f64) {
    let layout = pangocairo::functions::create_layout(ctx);
    let font = pango::FontDescription::from_string("Sans 12");
    layout.set_font_description(Some(&font));
    layout.set_width(((radius * 2.0 - 16.0).max(1.0) * pango::SCALE as f64) as i32);
    layout.set_alignment(pango::Alignment::Center);
    layout.set_wrap(pango::WrapMode::Word);
    layout.set_text(HINT_TEXT);

    let (_, logical) = layout.pixel_extents();
    let x = center - radius + 8.0;
    let y = center - logical.height() as f64 / 2.0;
    ctx.move_to(x, y);
    ctx.set_source_rgba(1.0, 1.0, 1.0, 230.0 / 255.0);
    pangocairo::functions::show_layout(ctx, &layout);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lens_sits_right_of_cursor_when_room() {
        let placement = place_lens((200.0, 500.0), 120.0, 2.0, (1920, 1080));
        assert_eq!(placement.size, 246);
        let (cx, cy) = placement.center();
        // sample radius 60 + gap 24 + half lens 123
        assert!((cx - 407.0).abs() <= 1.0, "center x {cx}");
        assert!((cy - 500.0).abs() <= 1.0);
        // Lens circle does not overlap the sampled circle
        assert!(cx - 120.0 > 200.0 + 60.0);
    }

    #[test]
    fn lens_flips_left_at_right_edge() {
        let placement = place_lens((1800.0, 500.0), 120.0, 2.0, (1920, 1080));
        let (cx, _) = placement.center();
        assert!(cx < 1800.0);
        assert!(placement.x >= 0);
    }

    #[test]
    fn lens_clamps_vertically_and_on_tiny_monitors() {
        let top = place_lens((300.0, 5.0), 120.0, 2.0, (1920, 1080));
        assert_eq!(top.y, 0);
        let bottom = place_lens((300.0, 1075.0), 120.0, 2.0, (1920, 1080));
        assert_eq!(bottom.y + bottom.size, 1080);

        let huge = place_lens((400.0, 300.0), 480.0, 2.0, (800, 600));
        assert_eq!(huge.x, 0);
        assert_eq!(huge.y, 0);
    }

    #[test]
    fn lens_without_sample_shows_dark_fill_and_outline() {
        let placement = place_lens((100.0, 100.0), 120.0, 2.0, (1920, 1080));
        let mut surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, placement.size, placement.size)
                .unwrap();
        {
            let ctx = cairo::Context::new(&surface).unwrap();
            let desktop = VirtualDesktopBounds {
                min_x: 0,
                min_y: 0,
                max_x: 1920,
                max_y: 1080,
            };
            paint_lens(&ctx, placement.size, 120.0, 2.0, None, &desktop, (100.0, 100.0));
        }
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let alpha = |x: usize, y: usize| {
            let o = y * stride + x * 4;
            (u32::from_ne_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]) >> 24) as u8
        };
        // Inside near the rim, away from the hint text
        assert!((115..=125).contains(&alpha(123, 20)));
        // Corner of the square surface is outside the circle
        assert_eq!(alpha(1, 1), 0);
    }
}
