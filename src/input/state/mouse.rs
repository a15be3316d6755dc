use crate::geometry::{self, Point};
use crate::input::{events::MouseButton, tool::Tool};
use std::time::Instant;

use super::core::HIT_TOLERANCE;
use super::{DrawingState, InputState};

impl InputState {
    /// Processes pointer motion, in global coordinates.
    ///
    /// Keeps the cursor for effects and stretches an active drag. The drag
    /// stays in its own monitor's coordinates even when the pointer crosses
    /// onto a neighbour.
    pub fn on_pointer_motion(&mut self, global: Point) {
        self.cursor = Some(global);

        if let DrawingState::Drawing {
            monitor, current, ..
        } = &mut self.state
            && let Some(m) = geometry::find_monitor(&self.monitors, monitor)
        {
            *current = geometry::to_monitor_local(global, m);
        }

        if !self.state.is_idle() || self.effects.any_active() {
            self.needs_redraw = true;
        }
    }

    /// The pointer left every overlay surface.
    pub fn on_pointer_leave(&mut self) {
        if self.cursor.take().is_some() && self.effects.any_active() {
            self.needs_redraw = true;
        }
    }

    /// Processes a button press at a global position.
    ///
    /// - Left on a visible menu button runs that button's action.
    /// - Left with a shape tool starts a drag on the monitor under the pointer.
    /// - Left with the text tool commits any open text and opens a new input.
    /// - Right cancels a draft, or removes the topmost shape under the pointer.
    /// - Middle restyles the topmost shape with the current fill and opacity.
    pub fn on_pointer_press(&mut self, button: MouseButton, global: Point) {
        self.cursor = Some(global);

        let Some(monitor) = geometry::monitor_at(&self.monitors, global).cloned() else {
            log::debug!("Press at {:?} is outside every monitor", global);
            return;
        };
        let local = geometry::to_monitor_local(global, &monitor);

        if button == MouseButton::Left && self.menu_monitor.as_ref() == Some(&monitor.id) {
            let width = monitor.width as f64;
            let (x, y) = (local.x as f64, local.y as f64);
            if let Some(action) = self.menu.action_at(width, x, y) {
                log::debug!("Menu button {}", action.label());
                self.handle_action(action);
                self.menu.note_button_used(Instant::now());
                return;
            }
            if self.menu.contains(width, x, y) {
                return;
            }
        }

        match button {
            MouseButton::Left => match self.tool {
                Tool::Text => {
                    self.commit_text();
                    self.state = DrawingState::TextInput {
                        monitor: monitor.id,
                        x: local.x,
                        y: local.y,
                        buffer: String::new(),
                    };
                    self.restart_caret();
                    self.needs_redraw = true;
                }
                tool => {
                    if self.state.is_idle() {
                        self.state = DrawingState::Drawing {
                            tool,
                            monitor: monitor.id,
                            start: local,
                            current: local,
                        };
                        self.needs_redraw = true;
                    }
                }
            },
            MouseButton::Right => {
                if self.cancel_draft() {
                    log::debug!("Draft cancelled with right click");
                    return;
                }
                let document = self.canvas.document();
                if let Some(id) = document.topmost_at(&monitor.id, local.x, local.y, HIT_TOLERANCE)
                    && self.canvas.remove(id)
                {
                    log::info!("Removed shape {}", id);
                    self.needs_redraw = true;
                }
            }
            MouseButton::Middle => {
                let document = self.canvas.document();
                let Some(id) = document.topmost_at(&monitor.id, local.x, local.y, HIT_TOLERANCE)
                else {
                    return;
                };
                let Some(restyled) = document
                    .get(id)
                    .map(|shape| shape.restyled(self.fill, self.opacity))
                else {
                    return;
                };
                if self.canvas.replace(id, restyled) {
                    log::info!("Restyled shape {}", id);
                    self.needs_redraw = true;
                } else {
                    log::debug!("Shape {} already has the current style", id);
                }
            }
        }
    }

    /// Processes a button release; a left release commits the drag.
    pub fn on_pointer_release(&mut self, button: MouseButton, global: Point) {
        self.cursor = Some(global);
        if button != MouseButton::Left {
            return;
        }

        let DrawingState::Drawing {
            tool,
            monitor,
            start,
            current,
        } = std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return;
        };
        self.needs_redraw = true;

        let end = geometry::find_monitor(&self.monitors, &monitor)
            .map(|m| geometry::to_monitor_local(global, m))
            .unwrap_or(current);

        match self.shape_for_drag(tool, &monitor, start, end) {
            Some(shape) => {
                self.canvas.append(shape);
            }
            None => log::debug!("Discarding zero-size {} draft", tool.label()),
        }
    }
}
