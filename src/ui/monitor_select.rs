//! Monitor selection view shown before the overlay starts on a multi-monitor setup.

use crate::geometry::{Monitor, MonitorId};
use crate::input::Key;
use crate::layout::{self, ContainerLimits, LayoutPlan, MonitorWidget};

// ============================================================================
// Dialog Layout Constants
// ============================================================================

/// Space above the widget area for the title and instructions
const HEADER_HEIGHT: f64 = 150.0;
const DIALOG_RADIUS: f64 = 10.0;
const WIDGET_RADIUS: f64 = 5.0;
const TITLE_FONT: &str = "Sans Bold 16";
const BODY_FONT: &str = "Sans 10";
const WIDGET_TITLE_FONT: &str = "Sans Bold 8";
const WIDGET_FONT: &str = "Sans 7";
/// First widget text line and spacing between lines
const WIDGET_TEXT_TOP: f64 = 4.0;
const WIDGET_LINE_HEIGHT: f64 = 13.0;
const BUTTON_HEIGHT: f64 = 36.0;
const BUTTON_GAP: f64 = 10.0;
/// Distance from the dialog's bottom edge to the button row
const BUTTON_BOTTOM: f64 = 30.0;

const NAME_MAX_CHARS: usize = 20;
const NAME_KEEP_CHARS: usize = 17;

/// Which monitors the overlay covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorSelection {
    All,
    Only(MonitorId),
}

impl MonitorSelection {
    pub fn includes(&self, id: &MonitorId) -> bool {
        match self {
            MonitorSelection::All => true,
            MonitorSelection::Only(only) => only == id,
        }
    }
}

/// How the view was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Confirmed(MonitorSelection),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FooterButton {
    All,
    Confirm,
    Cancel,
}

impl FooterButton {
    const ROW: [FooterButton; 3] = [FooterButton::All, FooterButton::Confirm, FooterButton::Cancel];

    fn label(self) -> &'static str {
        match self {
            FooterButton::All => "All monitors (A)",
            FooterButton::Confirm => "OK",
            FooterButton::Cancel => "Cancel",
        }
    }

    fn width(self) -> f64 {
        match self {
            FooterButton::All => 160.0,
            FooterButton::Confirm | FooterButton::Cancel => 90.0,
        }
    }
}

/// State of the selection view: the monitors, their scaled layout and the pick.
#[derive(Debug, Clone)]
pub struct MonitorSelectView {
    monitors: Vec<Monitor>,
    plan: LayoutPlan,
    selected: MonitorId,
}

impl MonitorSelectView {
    /// Whether a selection view makes sense for this many monitors.
    pub fn needed(monitors: &[Monitor]) -> bool {
        monitors.len() > 1
    }

    /// Builds the view with the primary monitor preselected.
    ///
    /// Returns `None` when there is nothing to lay out.
    pub fn new(monitors: Vec<Monitor>) -> Option<Self> {
        let plan = layout::plan(&monitors, &ContainerLimits::default())?;
        let selected = preferred(&monitors)?;
        log::info!(
            "Monitor selection: {} monitors, {:?}/{:?}, scale {:.3}, dialog {:.0}x{:.0}",
            monitors.len(),
            plan.arrangement,
            plan.complexity,
            plan.scale,
            plan.dialog.width,
            plan.dialog.height
        );
        Some(Self {
            monitors,
            plan,
            selected,
        })
    }

    /// Re-plans after hot-plug, keeping the pick if that monitor is still there.
    ///
    /// Returns false if no monitors remain.
    pub fn update_monitors(&mut self, monitors: Vec<Monitor>) -> bool {
        let Some(plan) = layout::plan(&monitors, &ContainerLimits::default()) else {
            return false;
        };
        if !monitors.iter().any(|m| m.id == self.selected) {
            match preferred(&monitors) {
                Some(id) => self.selected = id,
                None => return false,
            }
        }
        self.monitors = monitors;
        self.plan = plan;
        true
    }

    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn selected(&self) -> &MonitorId {
        &self.selected
    }

    /// Top-left of the dialog when centered on a host surface.
    pub fn dialog_origin(&self, host_width: f64, host_height: f64) -> (f64, f64) {
        (
            ((host_width - self.plan.dialog.width) / 2.0).max(0.0),
            ((host_height - self.plan.dialog.height) / 2.0).max(0.0),
        )
    }

    fn widget_origin(&self, host_width: f64, host_height: f64) -> (f64, f64) {
        let (dx, dy) = self.dialog_origin(host_width, host_height);
        let side = (self.plan.dialog.width - self.plan.available.width) / 2.0;
        (dx + side, dy + HEADER_HEIGHT)
    }

    fn footer_buttons(&self, host_width: f64, host_height: f64) -> Vec<(FooterButton, f64, f64)> {
        let (dx, dy) = self.dialog_origin(host_width, host_height);
        let y = dy + self.plan.dialog.height - BUTTON_BOTTOM - BUTTON_HEIGHT;
        let mut x = dx + self.plan.dialog.width - BUTTON_BOTTOM;
        let mut row: Vec<_> = FooterButton::ROW
            .iter()
            .rev()
            .map(|b| {
                x -= b.width();
                let entry = (*b, x, y);
                x -= BUTTON_GAP;
                entry
            })
            .collect();
        row.reverse();
        row
    }

    /// Handles a click at host-surface coordinates.
    ///
    /// Clicking a monitor selects it; clicking a footer button closes the view.
    pub fn on_click(&mut self, host_width: f64, host_height: f64, x: f64, y: f64) -> Option<SelectionOutcome> {
        let (ox, oy) = self.widget_origin(host_width, host_height);
        if let Some(widget) = self.plan.widget_at(x - ox, y - oy) {
            if widget.id != self.selected {
                log::debug!("Monitor {} selected", widget.id);
                self.selected = widget.id.clone();
            }
            return None;
        }

        let button = self
            .footer_buttons(host_width, host_height)
            .into_iter()
            .find(|(b, bx, by)| x >= *bx && x < bx + b.width() && y >= *by && y < by + BUTTON_HEIGHT)
            .map(|(b, _, _)| b)?;
        Some(self.outcome(button))
    }

    /// Return confirms the pick, `A` picks every monitor, Escape cancels,
    /// Tab moves the pick to the next monitor.
    pub fn on_key(&mut self, key: Key) -> Option<SelectionOutcome> {
        match key {
            Key::Return => Some(self.outcome(FooterButton::Confirm)),
            Key::Escape => Some(self.outcome(FooterButton::Cancel)),
            Key::Char(c) if c.eq_ignore_ascii_case(&'a') => Some(self.outcome(FooterButton::All)),
            Key::Tab => {
                let index = self
                    .monitors
                    .iter()
                    .position(|m| m.id == self.selected)
                    .map_or(0, |i| (i + 1) % self.monitors.len());
                self.selected = self.monitors[index].id.clone();
                None
            }
            _ => None,
        }
    }

    fn outcome(&self, button: FooterButton) -> SelectionOutcome {
        match button {
            FooterButton::All => SelectionOutcome::Confirmed(MonitorSelection::All),
            FooterButton::Confirm => {
                SelectionOutcome::Confirmed(MonitorSelection::Only(self.selected.clone()))
            }
            FooterButton::Cancel => SelectionOutcome::Cancelled,
        }
    }

    pub fn render(&self, ctx: &cairo::Context, host_width: f64, host_height: f64) {
        let _ = ctx.save();

        // Dim the desktop behind the dialog
        ctx.set_source_rgba(0.0, 0.0, 0.0, 0.4);
        let _ = ctx.paint();

        let (dx, dy) = self.dialog_origin(host_width, host_height);
        let (dw, dh) = (self.plan.dialog.width, self.plan.dialog.height);
        super::rounded_rect(ctx, dx, dy, dw, dh, DIALOG_RADIUS);
        ctx.set_source_rgb(0.98, 0.98, 0.98);
        let _ = ctx.fill();

        ctx.set_source_rgb(0.1, 0.1, 0.1);
        super::show_centered(
            ctx,
            "Select Monitor for Annotation Window",
            TITLE_FONT,
            (dx, dy + 20.0, dw, 40.0),
        );
        ctx.set_source_rgb(0.3, 0.3, 0.3);
        super::show_centered(
            ctx,
            "Click a monitor to select it, then press Return. The layout shows the relative positions of your monitors.",
            BODY_FONT,
            (dx, dy + 70.0, dw, 30.0),
        );

        let (ox, oy) = self.widget_origin(host_width, host_height);
        let _ = ctx.save();
        ctx.rectangle(ox, oy, self.plan.available.width, self.plan.available.height);
        ctx.clip();
        for widget in &self.plan.widgets {
            if let Some(monitor) = self.monitors.iter().position(|m| m.id == widget.id) {
                self.render_widget(ctx, widget, monitor, (ox, oy));
            }
        }
        let _ = ctx.restore();

        for (button, bx, by) in self.footer_buttons(host_width, host_height) {
            super::rounded_rect(ctx, bx, by, button.width(), BUTTON_HEIGHT, 4.0);
            if button == FooterButton::Confirm {
                ctx.set_source_rgb(0.118, 0.533, 0.898);
            } else {
                ctx.set_source_rgb(0.88, 0.88, 0.88);
            }
            let _ = ctx.fill();
            if button == FooterButton::Confirm {
                ctx.set_source_rgb(1.0, 1.0, 1.0);
            } else {
                ctx.set_source_rgb(0.1, 0.1, 0.1);
            }
            super::show_centered(ctx, button.label(), BODY_FONT, (bx, by, button.width(), BUTTON_HEIGHT));
        }

        let _ = ctx.restore();
    }

    fn render_widget(&self, ctx: &cairo::Context, widget: &MonitorWidget, index: usize, (ox, oy): (f64, f64)) {
        let monitor = &self.monitors[index];
        let (x, y) = (ox + widget.x, oy + widget.y);

        let (fill, border, border_width) = if monitor.id == self.selected {
            ((0.298, 0.686, 0.314), (0.180, 0.490, 0.196), 3.0)
        } else if monitor.primary {
            ((0.890, 0.949, 0.992), (0.098, 0.463, 0.824), 2.0)
        } else {
            ((0.961, 0.961, 0.961), (0.459, 0.459, 0.459), 2.0)
        };

        super::rounded_rect(ctx, x, y, widget.width, widget.height, WIDGET_RADIUS);
        ctx.set_source_rgb(fill.0, fill.1, fill.2);
        let _ = ctx.fill_preserve();
        ctx.set_source_rgb(border.0, border.1, border.2);
        ctx.set_line_width(border_width);
        let _ = ctx.stroke();

        let _ = ctx.save();
        ctx.rectangle(x, y, widget.width, widget.height);
        ctx.clip();
        ctx.set_source_rgb(0.0, 0.0, 0.0);
        for (line, text) in widget_lines(monitor, index).iter().enumerate() {
            let font = if line == 0 { WIDGET_TITLE_FONT } else { WIDGET_FONT };
            let (layout, _, _) = super::text_layout(ctx, text, font);
            ctx.move_to(x + 5.0, y + WIDGET_TEXT_TOP + line as f64 * WIDGET_LINE_HEIGHT);
            pangocairo::functions::show_layout(ctx, &layout);
        }
        let _ = ctx.restore();
    }
}

/// The primary monitor, or the first one.
fn preferred(monitors: &[Monitor]) -> Option<MonitorId> {
    monitors
        .iter()
        .find(|m| m.primary)
        .or_else(|| monitors.first())
        .map(|m| m.id.clone())
}

/// Shortens names longer than 20 characters to 17 plus "...".
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_MAX_CHARS {
        let kept: String = name.chars().take(NAME_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        name.to_string()
    }
}

/// Text lines drawn inside a monitor widget.
pub fn widget_lines(monitor: &Monitor, index: usize) -> Vec<String> {
    let mut title = format!("Monitor {}", index + 1);
    if monitor.primary {
        title.push_str(" (Primary)");
    }
    let physical = monitor
        .physical_dpi()
        .map_or_else(|| "n/a".to_string(), |dpi| format!("{:.0}", dpi));

    let mut lines = vec![
        title,
        format!("Resolution: {}x{}", monitor.width, monitor.height),
        format!("Position: ({}, {})", monitor.x, monitor.y),
        format!("DPI: {:.0} (Physical: {})", monitor.logical_dpi(), physical),
        format!("Scale Factor: {:.1}x", monitor.device_pixel_ratio()),
        format!("Refresh: {:.0}Hz", monitor.refresh_hz),
    ];
    if !monitor.name.is_empty() {
        lines.push(format!("Name: {}", truncate_name(&monitor.name)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_monitors() -> Vec<Monitor> {
        let mut left = Monitor::new("DP-1", 0, 0, 1920, 1080);
        left.primary = true;
        let right = Monitor::new("HDMI-A-1", 1920, 0, 1920, 1080);
        vec![left, right]
    }

    #[test]
    fn single_monitor_needs_no_view() {
        assert!(!MonitorSelectView::needed(&[Monitor::new("DP-1", 0, 0, 1920, 1080)]));
        assert!(MonitorSelectView::needed(&two_monitors()));
        assert!(MonitorSelectView::new(Vec::new()).is_none());
    }

    #[test]
    fn primary_is_preselected_and_return_confirms_it() {
        let mut view = MonitorSelectView::new(two_monitors()).unwrap();
        assert_eq!(view.selected().as_str(), "DP-1");
        assert_eq!(
            view.on_key(Key::Return),
            Some(SelectionOutcome::Confirmed(MonitorSelection::Only(
                MonitorId::new("DP-1")
            )))
        );
    }

    #[test]
    fn keys_pick_all_cancel_and_cycle() {
        let mut view = MonitorSelectView::new(two_monitors()).unwrap();
        assert_eq!(
            view.on_key(Key::Char('a')),
            Some(SelectionOutcome::Confirmed(MonitorSelection::All))
        );
        assert_eq!(view.on_key(Key::Escape), Some(SelectionOutcome::Cancelled));
        assert_eq!(view.on_key(Key::Tab), None);
        assert_eq!(view.selected().as_str(), "HDMI-A-1");
        assert_eq!(view.on_key(Key::Char('x')), None);
    }

    #[test]
    fn clicking_a_widget_selects_it() {
        let mut view = MonitorSelectView::new(two_monitors()).unwrap();
        let (host_w, host_h) = (1920.0, 1080.0);
        let (ox, oy) = view.widget_origin(host_w, host_h);
        let widget = view.plan().widgets[1].clone();

        let outcome = view.on_click(
            host_w,
            host_h,
            ox + widget.x + widget.width / 2.0,
            oy + widget.y + widget.height / 2.0,
        );
        assert_eq!(outcome, None);
        assert_eq!(view.selected().as_str(), "HDMI-A-1");
    }

    #[test]
    fn footer_buttons_close_the_view() {
        let mut view = MonitorSelectView::new(two_monitors()).unwrap();
        let buttons = view.footer_buttons(1920.0, 1080.0);
        let (_, x, y) = buttons
            .iter()
            .find(|(b, _, _)| *b == FooterButton::Cancel)
            .copied()
            .unwrap();
        assert_eq!(
            view.on_click(1920.0, 1080.0, x + 5.0, y + 5.0),
            Some(SelectionOutcome::Cancelled)
        );
        // Buttons stay inside the dialog
        let (dx, _) = view.dialog_origin(1920.0, 1080.0);
        assert!(buttons.iter().all(|(_, bx, _)| *bx > dx));
    }

    #[test]
    fn hot_plug_keeps_or_resets_the_pick() {
        let mut view = MonitorSelectView::new(two_monitors()).unwrap();
        view.on_key(Key::Tab);
        assert_eq!(view.selected().as_str(), "HDMI-A-1");

        let mut third = Monitor::new("DP-2", -1920, 0, 1920, 1080);
        third.primary = false;
        let mut grown = two_monitors();
        grown.push(third);
        assert!(view.update_monitors(grown));
        assert_eq!(view.selected().as_str(), "HDMI-A-1");
        assert_eq!(view.plan().widgets.len(), 3);

        assert!(view.update_monitors(vec![two_monitors().remove(0)]));
        assert_eq!(view.selected().as_str(), "DP-1");
        assert!(!view.update_monitors(Vec::new()));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate_name("DP-1"), "DP-1");
        assert_eq!(truncate_name("12345678901234567890"), "12345678901234567890");
        assert_eq!(
            truncate_name("Dell Inc. DELL U2720Q 1234"),
            "Dell Inc. DELL U2..."
        );
    }

    #[test]
    fn widget_lines_describe_the_monitor() {
        let mut monitor = Monitor::new("DP-1", 1920, 0, 2560, 1440);
        monitor.primary = true;
        monitor.scale = 2.0;
        monitor.refresh_hz = 59.95;
        let lines = widget_lines(&monitor, 0);
        assert_eq!(lines[0], "Monitor 1 (Primary)");
        assert_eq!(lines[1], "Resolution: 2560x1440");
        assert_eq!(lines[2], "Position: (1920, 0)");
        assert_eq!(lines[3], "DPI: 192 (Physical: n/a)");
        assert_eq!(lines[4], "Scale Factor: 2.0x");
        assert_eq!(lines[5], "Refresh: 60Hz");
        assert_eq!(lines[6], "Name: DP-1");
    }

    #[test]
    fn render_draws_dialog() {
        let view = MonitorSelectView::new(two_monitors()).unwrap();
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1280, 900).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        view.render(&ctx, 1280.0, 900.0);
        assert!(ctx.status().is_ok());
    }
}
