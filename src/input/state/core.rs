//! Drawing state machine and input state management.

use crate::config::{Action, Config, KeyBinding, ToolColors};
use crate::draw::{Canvas, FontDescriptor, Opacity, Shape, ShapeKind};
use crate::effects::EffectState;
use crate::geometry::{self, Monitor, MonitorId, Point};
use crate::input::{modifiers::Modifiers, tool::Tool};
use crate::ui::{FloatingMenu, MenuHighlights};
use crate::util;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pixels of slack around a stroke when picking a shape under the pointer.
pub(crate) const HIT_TOLERANCE: f64 = 6.0;

/// Half period of the text caret blink.
pub(crate) const CARET_BLINK: Duration = Duration::from_millis(500);

/// Current drawing mode state machine.
///
/// Tracks whether the user is idle, dragging out a shape, or entering text.
/// Draft coordinates are local to the monitor the draft started on.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// Not actively drawing - waiting for user input
    Idle,
    /// Left button held with a shape tool
    Drawing {
        tool: Tool,
        /// Monitor the drag started on
        monitor: MonitorId,
        /// Press position
        start: Point,
        /// Latest pointer position, in the same monitor's coordinates
        current: Point,
    },
    /// Text input mode - user is typing text to place on screen
    TextInput {
        monitor: MonitorId,
        /// Baseline anchor
        x: i32,
        y: i32,
        /// Accumulated text buffer
        buffer: String,
    },
}

impl DrawingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DrawingState::Idle)
    }
}

/// Main input state containing all annotation session state.
///
/// Owned by the event loop. The backend feeds it pointer and keyboard events
/// in global coordinates and asks it to paint each monitor.
pub struct InputState {
    /// Every committed annotation plus undo history
    pub canvas: Canvas,
    /// Cursor effect toggles and tuning
    pub effects: EffectState,
    /// Floating tool menu
    pub menu: FloatingMenu,
    /// Monitor the menu is shown on
    pub(crate) menu_monitor: Option<MonitorId>,
    /// Monitors currently annotated
    pub(crate) monitors: Vec<Monitor>,
    /// Tool used for the next draft
    pub tool: Tool,
    /// Fill toggle for the next rectangle or ellipse
    pub fill: bool,
    /// Opacity of the next shape
    pub opacity: Opacity,
    /// Stroke color per shape kind
    pub colors: ToolColors,
    /// Stroke width in pixels
    pub stroke_width: f64,
    /// Text size in points
    pub font_size: f64,
    pub font: FontDescriptor,
    /// Arrowhead length in pixels
    pub arrow_head_length: f64,
    /// Arrowhead angle in degrees
    pub arrow_head_angle: f64,
    /// Current modifier key state
    pub modifiers: Modifiers,
    /// Current drawing mode state machine
    pub state: DrawingState,
    /// Last pointer position in global coordinates; `None` once it left every surface
    pub cursor: Option<Point>,
    /// Input falls through to the clients below
    pub passthrough: bool,
    /// Draw the tint and badge while passing input through
    pub show_passthrough_indicator: bool,
    /// Whether user requested to exit the overlay
    pub should_exit: bool,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
    /// Start of the current caret blink cycle
    pub(crate) caret_epoch: Instant,
    /// Caret phase the overlays last showed
    caret_shown: bool,
    /// Keybinding action map for efficient lookup
    action_map: HashMap<KeyBinding, Action>,
    /// Action the backend has to carry out (export, reload)
    pending_backend_action: Option<Action>,
}

impl InputState {
    /// Creates the session state from a loaded configuration.
    ///
    /// Monitors start empty; the backend calls [`set_monitors`](Self::set_monitors)
    /// once outputs are known.
    pub fn new(config: &Config, action_map: HashMap<KeyBinding, Action>) -> Self {
        let drawing = &config.drawing;
        Self {
            canvas: Canvas::new(),
            effects: EffectState::new(config.effects.clone()),
            menu: FloatingMenu::new(&config.ui),
            menu_monitor: None,
            monitors: Vec::new(),
            tool: drawing.default_tool,
            fill: drawing.fill_shapes,
            opacity: drawing.default_opacity,
            colors: config.colors.resolve(),
            stroke_width: drawing.stroke_width,
            font_size: drawing.font_size,
            font: drawing.font(),
            arrow_head_length: drawing.arrow_head_length,
            arrow_head_angle: drawing.arrow_head_angle,
            modifiers: Modifiers::new(),
            state: DrawingState::Idle,
            cursor: None,
            passthrough: false,
            show_passthrough_indicator: config.ui.passthrough_indicator,
            should_exit: false,
            needs_redraw: true,
            caret_epoch: Instant::now(),
            caret_shown: true,
            action_map,
            pending_backend_action: None,
        }
    }

    /// Re-applies reloaded settings.
    ///
    /// Tool, fill, opacity, effect toggles and the document are kept; colors,
    /// stroke and font settings, effect tuning, UI settings and the key map
    /// are replaced.
    pub fn apply_config(&mut self, config: &Config, action_map: HashMap<KeyBinding, Action>) {
        let drawing = &config.drawing;
        self.colors = config.colors.resolve();
        self.stroke_width = drawing.stroke_width;
        self.font_size = drawing.font_size;
        self.font = drawing.font();
        self.arrow_head_length = drawing.arrow_head_length;
        self.arrow_head_angle = drawing.arrow_head_angle;
        self.effects.apply_settings(config.effects.clone());
        self.menu.apply_settings(&config.ui);
        self.show_passthrough_indicator = config.ui.passthrough_indicator;
        self.action_map = action_map;
        self.needs_redraw = true;
        log::info!("Configuration applied");
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Replaces the monitor set after enumeration or hot-plug.
    ///
    /// Drafts and the menu tied to a vanished monitor are dropped; shapes on it
    /// stay in the document and reappear if the monitor comes back.
    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        self.monitors = monitors;

        let draft_monitor = match &self.state {
            DrawingState::Drawing { monitor, .. } | DrawingState::TextInput { monitor, .. } => {
                Some(monitor.clone())
            }
            DrawingState::Idle => None,
        };
        if let Some(id) = draft_monitor
            && geometry::find_monitor(&self.monitors, &id).is_none()
        {
            log::info!("Monitor {} went away; dropping draft", id);
            self.state = DrawingState::Idle;
        }

        if let Some(id) = &self.menu_monitor
            && geometry::find_monitor(&self.monitors, id).is_none()
        {
            self.menu_monitor = None;
        }

        if let Some(cursor) = self.cursor
            && geometry::monitor_at(&self.monitors, cursor).is_none()
        {
            self.cursor = None;
        }

        self.needs_redraw = true;
    }

    /// Monitor under the cursor, else the primary one, else the first.
    pub fn active_monitor(&self) -> Option<&Monitor> {
        self.cursor
            .and_then(|p| geometry::monitor_at(&self.monitors, p))
            .or_else(|| self.monitors.iter().find(|m| m.primary))
            .or_else(|| self.monitors.first())
    }

    /// Look up an action for the given key and modifiers.
    pub(super) fn find_action(&self, key_str: &str) -> Option<Action> {
        self.action_map
            .iter()
            .find(|(binding, _)| {
                binding.matches(
                    key_str,
                    self.modifiers.ctrl,
                    self.modifiers.shift,
                    self.modifiers.alt,
                )
            })
            .map(|(_, action)| *action)
    }

    /// Takes and clears any pending backend action.
    ///
    /// Export and config reload need things the input state does not own
    /// (the export worker, the config file), so the backend polls for them
    /// after each dispatch.
    pub fn take_pending_backend_action(&mut self) -> Option<Action> {
        self.pending_backend_action.take()
    }

    pub(super) fn set_pending_backend_action(&mut self, action: Action) {
        self.pending_backend_action = Some(action);
    }

    /// Switches tools. Any draft, open text included, is dropped uncommitted.
    pub fn set_tool(&mut self, tool: Tool) {
        if !self.state.is_idle() {
            log::debug!("Discarding draft on tool switch");
            self.state = DrawingState::Idle;
        }
        if self.tool != tool {
            log::info!("Tool: {}", tool.label());
        }
        self.tool = tool;
        self.needs_redraw = true;
    }

    /// Drops any draft without committing it. Returns true if there was one.
    pub fn cancel_draft(&mut self) -> bool {
        if self.state.is_idle() {
            return false;
        }
        self.state = DrawingState::Idle;
        self.needs_redraw = true;
        true
    }

    /// Commits an open, non-empty text input; drops an empty one.
    pub fn commit_text(&mut self) -> bool {
        let DrawingState::TextInput {
            monitor,
            x,
            y,
            buffer,
        } = std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return false;
        };
        self.needs_redraw = true;

        if buffer.is_empty() {
            log::debug!("Discarding empty text input");
            return false;
        }

        let shape = Shape {
            monitor,
            color: self.colors.text,
            opacity: self.opacity,
            thick: self.stroke_width,
            kind: ShapeKind::Text {
                x,
                y,
                text: buffer,
                size: self.font_size,
                font: self.font.clone(),
            },
        };
        self.canvas.append(shape);
        true
    }

    /// Builds the shape a drag from `start` to `end` would commit.
    ///
    /// Returns `None` for zero-extent drags, and for rectangles or ellipses
    /// with no width or no height.
    pub(crate) fn shape_for_drag(
        &self,
        tool: Tool,
        monitor: &MonitorId,
        start: Point,
        end: Point,
    ) -> Option<Shape> {
        if start == end {
            return None;
        }

        let kind = match tool {
            Tool::Line => ShapeKind::Line {
                x1: start.x,
                y1: start.y,
                x2: end.x,
                y2: end.y,
            },
            Tool::Arrow => ShapeKind::Arrow {
                x1: start.x,
                y1: start.y,
                x2: end.x,
                y2: end.y,
                head_length: self.arrow_head_length,
                head_angle: self.arrow_head_angle,
            },
            Tool::Rectangle => {
                let (x, y, w, h) = util::normalized_rect(start.x, start.y, end.x, end.y);
                if w == 0 || h == 0 {
                    return None;
                }
                ShapeKind::Rect {
                    x,
                    y,
                    w,
                    h,
                    filled: self.fill,
                }
            }
            Tool::Ellipse => {
                if start.x == end.x || start.y == end.y {
                    return None;
                }
                let (cx, cy, rx, ry) = util::ellipse_bounds(start.x, start.y, end.x, end.y);
                ShapeKind::Ellipse {
                    cx,
                    cy,
                    rx,
                    ry,
                    filled: self.fill,
                }
            }
            Tool::Text => return None,
        };

        Some(Shape {
            monitor: monitor.clone(),
            color: self.colors.for_tool(tool),
            opacity: self.opacity,
            thick: self.stroke_width,
            kind,
        })
    }

    /// Flips pass-through mode.
    ///
    /// Entering it commits open text and drops a drag, since no further
    /// pointer or key events will arrive to finish them.
    pub fn toggle_passthrough(&mut self) -> bool {
        self.set_passthrough(!self.passthrough);
        self.passthrough
    }

    pub fn set_passthrough(&mut self, enabled: bool) {
        if self.passthrough == enabled {
            return;
        }
        if enabled {
            self.commit_text();
            self.cancel_draft();
            self.modifiers = Modifiers::new();
            self.cursor = None;
        }
        self.passthrough = enabled;
        self.needs_redraw = true;
        log::info!(
            "Input mode: {}",
            if enabled { "pass-through" } else { "capture" }
        );
    }

    /// Turns the halo on once the startup delay has passed.
    pub fn enable_startup_halo(&mut self) {
        if self.effects.enable_startup_halo() {
            self.needs_redraw = true;
        }
    }

    /// Highlight state for the floating menu buttons.
    pub fn menu_highlights(&self) -> MenuHighlights {
        MenuHighlights {
            tool: self.tool,
            halo: self.effects.halo(),
            flashlight: self.effects.flashlight(),
            mouse_mask: self.effects.mouse_mask(),
            magnifier: self.effects.magnifier(),
            passthrough: self.passthrough,
            fill: self.fill,
        }
    }

    /// Shows or hides the menu on the monitor under the cursor.
    pub(super) fn toggle_menu(&mut self, now: Instant) {
        let target = self.active_monitor().map(|m| m.id.clone());
        if self.menu.toggle(now) {
            self.menu_monitor = target;
        }
        self.needs_redraw = true;
    }

    /// Advances menu timers. Returns true while the menu is animating.
    /// Shows the caret and restarts its blink cycle, so it stays solid while typing.
    pub(crate) fn restart_caret(&mut self) {
        self.caret_epoch = Instant::now();
        self.caret_shown = true;
    }

    /// Whether the text caret is in its visible half at `now`.
    pub fn caret_visible(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.caret_epoch).as_millis();
        (elapsed / CARET_BLINK.as_millis()) % 2 == 0
    }

    /// Time until the caret next toggles; `None` unless text input is open.
    pub fn caret_timeout(&self, now: Instant) -> Option<Duration> {
        if !matches!(self.state, DrawingState::TextInput { .. }) {
            return None;
        }
        let period = CARET_BLINK.as_millis();
        let elapsed = now.saturating_duration_since(self.caret_epoch).as_millis();
        Some(Duration::from_millis((period - elapsed % period) as u64))
    }

    /// Requests a redraw when the caret changed phase since the last frame.
    pub fn tick_caret(&mut self, now: Instant) {
        if !matches!(self.state, DrawingState::TextInput { .. }) {
            return;
        }
        let visible = self.caret_visible(now);
        if visible != self.caret_shown {
            self.caret_shown = visible;
            self.needs_redraw = true;
        }
    }

    pub fn tick_menu(&mut self, now: Instant) -> bool {
        let was_drawn = self.menu.is_drawn();
        let animating = self.menu.tick(now);
        if animating || was_drawn != self.menu.is_drawn() {
            self.needs_redraw = true;
        }
        animating
    }
}
