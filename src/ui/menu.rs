//! Floating tool menu.
//!
//! A horizontal panel of buttons at the top center of one monitor. Every button
//! maps to an [`Action`], so clicking it is the same as pressing its key. The
//! menu fades in and out and hides itself shortly after a button is used.

use crate::config::{Action, UiConfig};
use crate::input::Tool;
use std::time::{Duration, Instant};

// ============================================================================
// Menu Layout Constants
// ============================================================================

/// Panel height
const PANEL_HEIGHT: f64 = 60.0;
/// Narrowest the panel gets
const PANEL_MIN_WIDTH: f64 = 400.0;
/// Distance from the top of the monitor
const PANEL_TOP: f64 = 20.0;
const PANEL_RADIUS: f64 = 15.0;
/// Inner margin between panel edge and buttons
const PANEL_MARGIN: f64 = 10.0;
const BUTTON_SIZE: f64 = 40.0;
const BUTTON_RADIUS: f64 = 8.0;
const BUTTON_SPACING: f64 = 5.0;
const SEPARATOR_WIDTH: f64 = 12.0;
const BUTTON_FONT: &str = "Sans Bold 14px";
const SEPARATOR_FONT: &str = "Sans Bold 16px";

/// One slot in the menu row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Button { glyph: &'static str, action: Action },
    Separator,
}

const fn button(glyph: &'static str, action: Action) -> MenuItem {
    MenuItem::Button { glyph, action }
}

/// Tools, then effects, then utilities.
pub const MENU_ITEMS: [MenuItem; 17] = [
    button("L", Action::SelectLine),
    button("A", Action::SelectArrow),
    button("R", Action::SelectRectangle),
    button("E", Action::SelectEllipse),
    button("T", Action::SelectText),
    MenuItem::Separator,
    button("H", Action::ToggleHalo),
    button("F", Action::ToggleFlashlight),
    button("M", Action::ToggleMouseMask),
    button("Z", Action::ToggleMagnifier),
    button("P", Action::TogglePassthrough),
    MenuItem::Separator,
    button("◩", Action::ToggleFill),
    button("O", Action::CycleOpacity),
    button("C", Action::ClearCanvas),
    button("X", Action::Export),
    button("↻", Action::ReloadConfig),
];

/// Which buttons render as "on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuHighlights {
    pub tool: Tool,
    pub halo: bool,
    pub flashlight: bool,
    pub mouse_mask: bool,
    pub magnifier: bool,
    pub passthrough: bool,
    pub fill: bool,
}

impl MenuHighlights {
    fn is_active(&self, action: Action) -> bool {
        match action {
            Action::SelectLine => self.tool == Tool::Line,
            Action::SelectArrow => self.tool == Tool::Arrow,
            Action::SelectRectangle => self.tool == Tool::Rectangle,
            Action::SelectEllipse => self.tool == Tool::Ellipse,
            Action::SelectText => self.tool == Tool::Text,
            Action::ToggleHalo => self.halo,
            Action::ToggleFlashlight => self.flashlight,
            Action::ToggleMouseMask => self.mouse_mask,
            Action::ToggleMagnifier => self.magnifier,
            Action::TogglePassthrough => self.passthrough,
            Action::ToggleFill => self.fill,
            _ => false,
        }
    }
}

/// Accent color of an active button, by group.
fn accent(action: Action) -> (f64, f64, f64) {
    match action {
        Action::SelectLine
        | Action::SelectArrow
        | Action::SelectRectangle
        | Action::SelectEllipse
        | Action::SelectText => (0.0, 150.0 / 255.0, 1.0),
        Action::ToggleHalo
        | Action::ToggleFlashlight
        | Action::ToggleMouseMask
        | Action::ToggleMagnifier
        | Action::TogglePassthrough => (1.0, 165.0 / 255.0, 0.0),
        _ => (128.0 / 255.0, 1.0, 128.0 / 255.0),
    }
}

/// A positioned button in monitor-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonRect {
    pub x: f64,
    pub y: f64,
    pub action: Action,
    pub glyph: &'static str,
}

impl ButtonRect {
    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + BUTTON_SIZE && y >= self.y && y < self.y + BUTTON_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visibility {
    Hidden,
    FadingIn(Instant),
    Shown,
    FadingOut(Instant),
}

/// Show/hide state and geometry of the floating menu.
#[derive(Debug)]
pub struct FloatingMenu {
    enabled: bool,
    visibility: Visibility,
    hide_at: Option<Instant>,
    auto_hide: Duration,
    fade: Duration,
}

impl FloatingMenu {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            enabled: config.floating_menu_enabled,
            visibility: Visibility::Hidden,
            hide_at: None,
            auto_hide: Duration::from_millis(config.menu_auto_hide_ms),
            fade: Duration::from_millis(config.menu_fade_ms),
        }
    }

    pub fn apply_settings(&mut self, config: &UiConfig) {
        self.enabled = config.floating_menu_enabled;
        self.auto_hide = Duration::from_millis(config.menu_auto_hide_ms);
        self.fade = Duration::from_millis(config.menu_fade_ms);
        if !self.enabled {
            self.visibility = Visibility::Hidden;
            self.hide_at = None;
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// True while shown or fading in; a fading-out menu no longer takes clicks.
    pub fn is_visible(&self) -> bool {
        matches!(self.visibility, Visibility::FadingIn(_) | Visibility::Shown)
    }

    /// True while anything is drawn, including the fade-out.
    pub fn is_drawn(&self) -> bool {
        self.visibility != Visibility::Hidden
    }

    /// Shows a hidden menu or hides a visible one. Returns the new visibility.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if !self.enabled {
            log::debug!("Floating menu disabled in config");
            return false;
        }
        if self.is_visible() {
            self.hide(now);
        } else {
            self.show(now);
        }
        self.is_visible()
    }

    pub fn show(&mut self, now: Instant) {
        if !self.enabled || self.is_visible() {
            return;
        }
        self.hide_at = None;
        self.visibility = if self.fade.is_zero() {
            Visibility::Shown
        } else {
            Visibility::FadingIn(now)
        };
        log::info!("Floating menu shown");
    }

    pub fn hide(&mut self, now: Instant) {
        if !self.is_visible() {
            return;
        }
        self.hide_at = None;
        self.visibility = if self.fade.is_zero() {
            Visibility::Hidden
        } else {
            Visibility::FadingOut(now)
        };
        log::info!("Floating menu hidden");
    }

    /// Starts the auto-hide countdown after a button was used.
    pub fn note_button_used(&mut self, now: Instant) {
        if self.is_visible() {
            self.hide_at = Some(now + self.auto_hide);
        }
    }

    /// Advances timers and fades. Returns true while the menu still needs frames.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.hide_at
            && now >= deadline
        {
            self.hide(now);
        }

        match self.visibility {
            Visibility::FadingIn(start) if now.saturating_duration_since(start) >= self.fade => {
                self.visibility = Visibility::Shown;
            }
            Visibility::FadingOut(start) if now.saturating_duration_since(start) >= self.fade => {
                self.visibility = Visibility::Hidden;
            }
            _ => {}
        }

        matches!(
            self.visibility,
            Visibility::FadingIn(_) | Visibility::FadingOut(_)
        ) || self.hide_at.is_some()
    }

    /// Current panel opacity between 0 and 1.
    pub fn opacity(&self, now: Instant) -> f64 {
        let progress = |start: Instant| {
            if self.fade.is_zero() {
                1.0
            } else {
                (now.saturating_duration_since(start).as_secs_f64() / self.fade.as_secs_f64())
                    .clamp(0.0, 1.0)
            }
        };
        match self.visibility {
            Visibility::Hidden => 0.0,
            Visibility::Shown => 1.0,
            Visibility::FadingIn(start) => ease_out_cubic(progress(start)),
            Visibility::FadingOut(start) => 1.0 - ease_out_cubic(progress(start)),
        }
    }

    /// Panel rectangle `(x, y, w, h)` on a monitor of the given width.
    pub fn panel_rect(monitor_width: f64) -> (f64, f64, f64, f64) {
        let width = content_width().max(PANEL_MIN_WIDTH);
        let x = ((monitor_width - width) / 2.0).max(0.0);
        (x, PANEL_TOP, width, PANEL_HEIGHT)
    }

    pub fn buttons(monitor_width: f64) -> Vec<ButtonRect> {
        let (panel_x, panel_y, panel_w, _) = Self::panel_rect(monitor_width);
        let mut x = panel_x + PANEL_MARGIN + (panel_w - content_width()) / 2.0;
        let y = panel_y + (PANEL_HEIGHT - BUTTON_SIZE) / 2.0;

        let mut rects = Vec::new();
        for item in MENU_ITEMS {
            match item {
                MenuItem::Button { glyph, action } => {
                    rects.push(ButtonRect {
                        x,
                        y,
                        action,
                        glyph,
                    });
                    x += BUTTON_SIZE + BUTTON_SPACING;
                }
                MenuItem::Separator => x += SEPARATOR_WIDTH + BUTTON_SPACING,
            }
        }
        rects
    }

    /// Whether a monitor-local point falls on the visible panel.
    pub fn contains(&self, monitor_width: f64, x: f64, y: f64) -> bool {
        if !self.is_visible() {
            return false;
        }
        let (px, py, pw, ph) = Self::panel_rect(monitor_width);
        x >= px && x < px + pw && y >= py && y < py + ph
    }

    /// The action of the button under a monitor-local point, if any.
    pub fn action_at(&self, monitor_width: f64, x: f64, y: f64) -> Option<Action> {
        if !self.is_visible() {
            return None;
        }
        Self::buttons(monitor_width)
            .into_iter()
            .find(|b| b.contains(x, y))
            .map(|b| b.action)
    }

    pub fn render(
        &self,
        ctx: &cairo::Context,
        monitor_width: f64,
        highlights: &MenuHighlights,
        now: Instant,
    ) {
        let alpha = self.opacity(now);
        if alpha <= 0.0 {
            return;
        }

        let _ = ctx.save();
        let (px, py, pw, ph) = Self::panel_rect(monitor_width);
        ctx.set_source_rgba(0.0, 0.0, 0.0, 180.0 / 255.0 * alpha);
        super::rounded_rect(ctx, px, py, pw, ph, PANEL_RADIUS);
        let _ = ctx.fill();

        for b in Self::buttons(monitor_width) {
            let active = highlights.is_active(b.action);
            let (bg, border) = if active {
                let (r, g, bl) = accent(b.action);
                ((r, g, bl, 100.0 / 255.0), (r, g, bl, 200.0 / 255.0))
            } else {
                ((1.0, 1.0, 1.0, 30.0 / 255.0), (1.0, 1.0, 1.0, 100.0 / 255.0))
            };

            super::rounded_rect(ctx, b.x, b.y, BUTTON_SIZE, BUTTON_SIZE, BUTTON_RADIUS);
            ctx.set_source_rgba(bg.0, bg.1, bg.2, bg.3 * alpha);
            let _ = ctx.fill_preserve();
            ctx.set_source_rgba(border.0, border.1, border.2, border.3 * alpha);
            ctx.set_line_width(2.0);
            let _ = ctx.stroke();

            ctx.set_source_rgba(1.0, 1.0, 1.0, alpha);
            super::show_centered(ctx, b.glyph, BUTTON_FONT, (b.x, b.y, BUTTON_SIZE, BUTTON_SIZE));
        }

        // Separators sit in the gaps the button layout leaves
        let buttons = Self::buttons(monitor_width);
        for pair in buttons.windows(2) {
            let gap = pair[1].x - (pair[0].x + BUTTON_SIZE);
            if gap > BUTTON_SPACING {
                ctx.set_source_rgba(1.0, 1.0, 1.0, 150.0 / 255.0 * alpha);
                let x = pair[0].x + BUTTON_SIZE;
                super::show_centered(ctx, "|", SEPARATOR_FONT, (x, pair[0].y, gap, BUTTON_SIZE));
            }
        }
        let _ = ctx.restore();
    }
}

fn content_width() -> f64 {
    let (buttons, separators) = MENU_ITEMS.iter().fold((0.0, 0.0), |(b, s), item| match item {
        MenuItem::Button { .. } => (b + 1.0, s),
        MenuItem::Separator => (b, s + 1.0),
    });
    let gaps = buttons + separators - 1.0;
    PANEL_MARGIN * 2.0 + buttons * BUTTON_SIZE + separators * SEPARATOR_WIDTH + gaps * BUTTON_SPACING
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> FloatingMenu {
        FloatingMenu::new(&UiConfig::default())
    }

    #[test]
    fn toggle_fades_in_and_out() {
        let mut menu = menu();
        let t0 = Instant::now();
        assert!(menu.toggle(t0));
        assert!(menu.opacity(t0) < 0.01);
        assert!(menu.tick(t0 + Duration::from_millis(100)));
        assert!(menu.opacity(t0 + Duration::from_millis(150)) > 0.5);
        assert!(!menu.tick(t0 + Duration::from_millis(300)));
        assert_eq!(menu.opacity(t0 + Duration::from_millis(300)), 1.0);

        let t1 = t0 + Duration::from_secs(1);
        assert!(!menu.toggle(t1));
        assert!(menu.is_drawn());
        menu.tick(t1 + Duration::from_millis(300));
        assert!(!menu.is_drawn());
    }

    #[test]
    fn auto_hides_after_button_use() {
        let mut menu = menu();
        let t0 = Instant::now();
        menu.show(t0);
        menu.tick(t0 + Duration::from_millis(300));
        menu.note_button_used(t0 + Duration::from_millis(400));

        assert!(menu.tick(t0 + Duration::from_millis(1800)));
        assert!(menu.is_visible());

        menu.tick(t0 + Duration::from_millis(1900));
        assert!(!menu.is_visible());
        menu.tick(t0 + Duration::from_millis(2200));
        assert!(!menu.is_drawn());
    }

    #[test]
    fn disabled_menu_never_shows() {
        let config = UiConfig {
            floating_menu_enabled: false,
            ..UiConfig::default()
        };
        let mut menu = FloatingMenu::new(&config);
        assert!(!menu.toggle(Instant::now()));
        assert!(!menu.is_drawn());
    }

    #[test]
    fn panel_is_centered_and_buttons_fit() {
        let (x, y, w, h) = FloatingMenu::panel_rect(1920.0);
        assert_eq!(y, 20.0);
        assert_eq!(h, 60.0);
        assert!(w >= 400.0);
        assert!((x + w / 2.0 - 960.0).abs() < 0.001);

        let buttons = FloatingMenu::buttons(1920.0);
        assert_eq!(buttons.len(), 15);
        let last = buttons.last().unwrap();
        assert!(last.x + BUTTON_SIZE <= x + w - PANEL_MARGIN + 0.001);
    }

    #[test]
    fn clicks_map_to_actions_only_while_visible() {
        let mut menu = menu();
        let buttons = FloatingMenu::buttons(1920.0);
        let rect = buttons.iter().find(|b| b.action == Action::ToggleHalo).unwrap();
        let (cx, cy) = (rect.x + 20.0, rect.y + 20.0);

        assert_eq!(menu.action_at(1920.0, cx, cy), None);
        menu.show(Instant::now());
        assert_eq!(menu.action_at(1920.0, cx, cy), Some(Action::ToggleHalo));
        assert!(menu.contains(1920.0, cx, cy));
        assert!(!menu.contains(1920.0, 5.0, 500.0));
    }

    #[test]
    fn highlights_follow_state() {
        let highlights = MenuHighlights {
            tool: Tool::Rectangle,
            flashlight: true,
            fill: true,
            ..MenuHighlights::default()
        };
        assert!(highlights.is_active(Action::SelectRectangle));
        assert!(!highlights.is_active(Action::SelectArrow));
        assert!(highlights.is_active(Action::ToggleFlashlight));
        assert!(highlights.is_active(Action::ToggleFill));
        assert!(!highlights.is_active(Action::ClearCanvas));
    }

    #[test]
    fn renders_panel_pixels() {
        let mut menu = menu();
        let t0 = Instant::now();
        menu.show(t0);
        menu.tick(t0 + Duration::from_millis(300));

        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1000, 120).unwrap();
        {
            let ctx = cairo::Context::new(&surface).unwrap();
            menu.render(&ctx, 1000.0, &MenuHighlights::default(), t0 + Duration::from_millis(300));
        }
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let (x, _, _, _) = FloatingMenu::panel_rect(1000.0);
        let px = x as usize + 4;
        let offset = 50 * stride + px * 4;
        let alpha = (u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) >> 24) as u8;
        assert!(alpha >= 170, "panel alpha {alpha}");
    }
}
