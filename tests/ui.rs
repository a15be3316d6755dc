use cairo::{Context, ImageSurface};
use std::time::Instant;

use annotateit::config::Config;
use annotateit::geometry::{Monitor, Point};
use annotateit::input::{InputState, MouseButton, Tool};
use annotateit::ui::MonitorSelectView;

fn two_monitors() -> Vec<Monitor> {
    let mut left = Monitor::new("DP-1", 0, 0, 400, 300);
    left.primary = true;
    let right = Monitor::new("HDMI-A-1", 400, 0, 400, 300);
    vec![left, right]
}

fn make_input_state() -> InputState {
    let config = Config::default();
    let action_map = config.keybindings.build_action_map().unwrap();
    let mut input = InputState::new(&config, action_map);
    input.set_monitors(two_monitors());
    input
}

fn surface_with_context(width: i32, height: i32) -> (ImageSurface, Context) {
    let surface = ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
    let ctx = Context::new(&surface).unwrap();
    (surface, ctx)
}

fn alpha_at(surface: &mut ImageSurface, x: usize, y: usize) -> u8 {
    let stride = surface.stride() as usize;
    let data = surface.data().unwrap();
    // ARGB32 is native-endian; alpha is the high byte
    let offset = y * stride + x * 4;
    let pixel = u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    (pixel >> 24) as u8
}

fn surface_has_pixels(surface: &mut ImageSurface) -> bool {
    surface
        .data()
        .map(|data| data.iter().any(|byte| *byte != 0))
        .unwrap_or(false)
}

#[test]
fn rectangle_drawn_on_second_monitor_renders_only_there() {
    let mut input = make_input_state();
    input.set_tool(Tool::Rectangle);

    input.on_pointer_press(MouseButton::Left, Point::new(450, 50));
    input.on_pointer_motion(Point::new(550, 150));
    input.on_pointer_release(MouseButton::Left, Point::new(550, 150));
    assert_eq!(input.canvas.document().len(), 1);

    let monitors = two_monitors();
    let now = Instant::now();

    let (mut left, ctx) = surface_with_context(400, 300);
    input.render_monitor(&ctx, &monitors[0], now);
    drop(ctx);
    assert_eq!(alpha_at(&mut left, 50, 100), 0);
    assert_eq!(alpha_at(&mut left, 200, 200), 0);

    let (mut right, ctx) = surface_with_context(400, 300);
    input.render_monitor(&ctx, &monitors[1], now);
    drop(ctx);
    // Left edge of the rectangle sits at local x = 50
    assert!(alpha_at(&mut right, 50, 100) > 0);
    assert_eq!(alpha_at(&mut right, 100, 100), 0);
}

#[test]
fn press_outside_every_monitor_starts_nothing() {
    let mut input = make_input_state();
    input.set_tool(Tool::Line);
    input.on_pointer_press(MouseButton::Left, Point::new(900, 50));
    input.on_pointer_release(MouseButton::Left, Point::new(950, 80));
    assert!(input.canvas.document().is_empty());
}

#[test]
fn passthrough_draws_indicator() {
    let mut input = make_input_state();
    input.set_passthrough(true);

    let (mut surface, ctx) = surface_with_context(400, 300);
    input.render_monitor(&ctx, &two_monitors()[0], Instant::now());
    drop(ctx);
    assert!(surface_has_pixels(&mut surface));
}

#[test]
fn selection_view_renders_content() {
    let view = MonitorSelectView::new(two_monitors()).unwrap();
    let (mut surface, ctx) = surface_with_context(1280, 720);
    view.render(&ctx, 1280.0, 720.0);
    drop(ctx);
    assert!(surface_has_pixels(&mut surface));
}
