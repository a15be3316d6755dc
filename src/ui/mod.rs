//! UI rendering: floating menu, pass-through indicator, monitor selection view

mod indicator;
pub mod menu;
pub mod monitor_select;

pub use indicator::render_passthrough_indicator;
pub use menu::{FloatingMenu, MenuHighlights, MenuItem};
pub use monitor_select::{MonitorSelectView, MonitorSelection, SelectionOutcome};

use std::f64::consts::PI;

/// Adds a rounded rectangle to the current path.
pub(crate) fn rounded_rect(ctx: &cairo::Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.new_sub_path();
    ctx.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    ctx.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    ctx.arc(x + r, y + h - r, r, PI / 2.0, PI);
    ctx.arc(x + r, y + r, r, PI, 1.5 * PI);
    ctx.close_path();
}

/// Lays out `text` with a pango font string and returns the layout with its pixel size.
pub(crate) fn text_layout(
    ctx: &cairo::Context,
    text: &str,
    font: &str,
) -> (pango::Layout, f64, f64) {
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&pango::FontDescription::from_string(font)));
    layout.set_text(text);
    let (_, logical) = layout.pixel_extents();
    (layout, logical.width() as f64, logical.height() as f64)
}

/// Shows `text` centered in the box `(x, y, w, h)`.
pub(crate) fn show_centered(
    ctx: &cairo::Context,
    text: &str,
    font: &str,
    (x, y, w, h): (f64, f64, f64, f64),
) {
    let (layout, tw, th) = text_layout(ctx, text, font);
    ctx.move_to(x + (w - tw) / 2.0, y + (h - th) / 2.0);
    pangocairo::functions::show_layout(ctx, &layout);
}
