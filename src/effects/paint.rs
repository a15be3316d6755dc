//! Cairo painters for the cursor effects.

use super::EffectState;
use crate::draw::Color;
use std::f64::consts::PI;

/// Paints the enabled effects in order: mouse mask, flashlight, halo.
///
/// `halo_color` is the current tool color at the current opacity alpha.
/// `include_halo` is false for exports.
pub fn paint_effects(
    ctx: &cairo::Context,
    effects: &EffectState,
    (cx, cy): (f64, f64),
    (width, height): (f64, f64),
    halo_color: Color,
    include_halo: bool,
) {
    let settings = effects.settings();
    if effects.mouse_mask() {
        paint_mouse_mask(
            ctx,
            (cx, cy),
            (width, height),
            settings.mask_radius,
            settings.mask_alpha,
        );
    }
    if effects.flashlight() {
        paint_flashlight(
            ctx,
            (cx, cy),
            (width, height),
            settings.flashlight_radius,
            settings.flashlight_dim,
        );
    }
    if include_halo && effects.halo() {
        paint_halo(ctx, (cx, cy), settings.halo_radius, halo_color);
    }
}

/// Radial glow around the cursor, fading from `color` to the same hue at 75/255.
pub fn paint_halo(ctx: &cairo::Context, (cx, cy): (f64, f64), radius: f64, color: Color) {
    let gradient = cairo::RadialGradient::new(cx, cy, 0.0, cx, cy, radius);
    gradient.add_color_stop_rgba(0.0, color.r, color.g, color.b, color.a);
    gradient.add_color_stop_rgba(1.0, color.r, color.g, color.b, 75.0 / 255.0);

    let _ = ctx.save();
    if ctx.set_source(&gradient).is_ok() {
        ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
        let _ = ctx.fill();
    }
    let _ = ctx.restore();
}

/// Darkens everything outside a circle and lights the inside with a warm glow.
pub fn paint_flashlight(
    ctx: &cairo::Context,
    (cx, cy): (f64, f64),
    (width, height): (f64, f64),
    radius: f64,
    dim: f64,
) {
    let _ = ctx.save();
    fill_outside_circle(ctx, (cx, cy), (width, height), radius, dim);

    let gradient = cairo::RadialGradient::new(cx, cy, 0.0, cx, cy, radius);
    gradient.add_color_stop_rgba(0.0, 1.0, 1.0, 0.0, 120.0 / 255.0);
    gradient.add_color_stop_rgba(0.5, 1.0, 1.0, 0.0, 60.0 / 255.0);
    gradient.add_color_stop_rgba(1.0, 1.0, 1.0, 0.0, 0.0);
    if ctx.set_source(&gradient).is_ok() {
        ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
        let _ = ctx.fill();
    }
    let _ = ctx.restore();
}

/// Full-surface shade with a clear circular cutout at the cursor.
pub fn paint_mouse_mask(
    ctx: &cairo::Context,
    (cx, cy): (f64, f64),
    (width, height): (f64, f64),
    radius: f64,
    alpha: u8,
) {
    let _ = ctx.save();
    fill_outside_circle(ctx, (cx, cy), (width, height), radius, alpha as f64 / 255.0);
    let _ = ctx.restore();
}

/// Even-odd fill of the surface rectangle minus a circle, so whatever is
/// already painted inside the circle is left untouched.
fn fill_outside_circle(
    ctx: &cairo::Context,
    (cx, cy): (f64, f64),
    (width, height): (f64, f64),
    radius: f64,
    alpha: f64,
) {
    ctx.new_path();
    ctx.rectangle(0.0, 0.0, width, height);
    ctx.new_sub_path();
    ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
    ctx.set_fill_rule(cairo::FillRule::EvenOdd);
    ctx.set_source_rgba(0.0, 0.0, 0.0, alpha);
    let _ = ctx.fill();
    ctx.set_fill_rule(cairo::FillRule::Winding);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::GREEN;

    const W: i32 = 400;
    const H: i32 = 300;

    fn paint(effects: &EffectState, include_halo: bool) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, W, H).unwrap();
        {
            let ctx = cairo::Context::new(&surface).unwrap();
            paint_effects(
                &ctx,
                effects,
                (200.0, 150.0),
                (W as f64, H as f64),
                GREEN.with_alpha(0.5),
                include_halo,
            );
        }
        surface.flush();
        surface
    }

    fn alpha_at(surface: &mut cairo::ImageSurface, x: usize, y: usize) -> u8 {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = y * stride + x * 4;
        let pixel = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (pixel >> 24) as u8
    }

    #[test]
    fn mask_cuts_a_clear_hole() {
        let mut effects = EffectState::default();
        effects.toggle_mouse_mask();
        let mut surface = paint(&effects, true);
        assert_eq!(alpha_at(&mut surface, 200, 150), 0);
        assert_eq!(alpha_at(&mut surface, 250, 150), 0);
        assert!((127..=129).contains(&alpha_at(&mut surface, 5, 5)));
    }

    #[test]
    fn mask_and_flashlight_coexist() {
        let mut effects = EffectState::default();
        effects.toggle_mouse_mask();
        effects.toggle_flashlight();
        let mut surface = paint(&effects, true);

        // Far corner: both shades stacked, darker than either alone
        let corner = alpha_at(&mut surface, 5, 5);
        assert!(corner > 140, "corner alpha {corner}");

        // Between the flashlight edge (80) and the mask edge (100): only the dim
        let ring = alpha_at(&mut surface, 290, 150);
        assert!((85..=93).contains(&ring), "ring alpha {ring}");

        // Center: only the warm glow, no darkening
        let center = alpha_at(&mut surface, 200, 150);
        assert!((115..=125).contains(&center), "center alpha {center}");
    }

    #[test]
    fn halo_is_left_out_when_asked() {
        let mut effects = EffectState::default();
        effects.toggle_halo();
        let mut with_halo = paint(&effects, true);
        let mut without = paint(&effects, false);
        assert!(alpha_at(&mut with_halo, 200, 150) > 0);
        assert!(alpha_at(&mut with_halo, 215, 150) >= 75);
        assert_eq!(alpha_at(&mut with_halo, 230, 150), 0);
        assert_eq!(alpha_at(&mut without, 200, 150), 0);
    }
}
