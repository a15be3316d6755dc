use crate::config::Action;
use crate::input::{events::Key, tool::Tool};
use std::time::Instant;

use super::{DrawingState, InputState};

impl InputState {
    /// Processes a key press event.
    ///
    /// Modifier keys only update [`Modifiers`](crate::input::Modifiers). While
    /// text input is open, plain keys edit the buffer and only Escape or
    /// Ctrl/Alt combinations reach the key map; otherwise every key is looked
    /// up in the key map.
    pub fn on_key_press(&mut self, key: Key) {
        match key {
            Key::Shift => {
                self.modifiers.shift = true;
                return;
            }
            Key::Ctrl => {
                self.modifiers.ctrl = true;
                return;
            }
            Key::Alt => {
                self.modifiers.alt = true;
                return;
            }
            _ => {}
        }

        if matches!(self.state, DrawingState::TextInput { .. }) {
            self.on_text_key(key);
            return;
        }

        // Escape drops an active drag before it can mean "exit"
        if key == Key::Escape && self.cancel_draft() {
            log::debug!("Draft cancelled with Escape");
            return;
        }

        let Some(key_str) = key.binding_name() else {
            return;
        };
        if let Some(action) = self.find_action(&key_str) {
            self.handle_action(action);
        }
    }

    fn on_text_key(&mut self, key: Key) {
        match key {
            Key::Escape => {
                log::debug!("Text input cancelled");
                self.cancel_draft();
                return;
            }
            Key::Return if !self.modifiers.shift => {
                self.commit_text();
                return;
            }
            _ => {}
        }

        if self.modifiers.has_command_modifier() {
            if let Some(action) = key.binding_name().and_then(|k| self.find_action(&k)) {
                self.handle_action(action);
            }
            return;
        }

        if let DrawingState::TextInput { buffer, .. } = &mut self.state {
            match key {
                Key::Char(c) => buffer.push(c),
                Key::Space => buffer.push(' '),
                Key::Return => buffer.push('\n'),
                Key::Backspace => {
                    buffer.pop();
                }
                _ => return,
            }
            self.restart_caret();
            self.needs_redraw = true;
        }
    }

    /// Processes a key release event.
    pub fn on_key_release(&mut self, key: Key) {
        match key {
            Key::Shift => self.modifiers.shift = false,
            Key::Ctrl => self.modifiers.ctrl = false,
            Key::Alt => self.modifiers.alt = false,
            _ => {}
        }
    }

    /// Keyboard focus left the overlay: open text is committed and held
    /// modifiers are forgotten.
    pub fn on_focus_lost(&mut self) {
        self.commit_text();
        self.modifiers = Default::default();
    }

    /// Runs one action, from a key binding or a menu button.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::SelectLine => self.set_tool(Tool::Line),
            Action::SelectArrow => self.set_tool(Tool::Arrow),
            Action::SelectRectangle => self.set_tool(Tool::Rectangle),
            Action::SelectEllipse => self.set_tool(Tool::Ellipse),
            Action::SelectText => self.set_tool(Tool::Text),
            Action::ToggleHalo => {
                self.effects.toggle_halo();
            }
            Action::ToggleFlashlight => {
                self.effects.toggle_flashlight();
            }
            Action::ToggleMouseMask => {
                self.effects.toggle_mouse_mask();
            }
            Action::ToggleMagnifier => {
                self.effects.toggle_magnifier();
            }
            Action::CycleMagnifierSize => self.effects.cycle_magnifier_size(),
            Action::ToggleFill => {
                self.fill = !self.fill;
                log::info!("Fill {}", if self.fill { "on" } else { "off" });
            }
            Action::CycleOpacity => {
                self.opacity = self.opacity.next();
                log::info!("Opacity {}", self.opacity.label());
            }
            Action::ClearCanvas => {
                if self.canvas.clear() {
                    log::info!("Canvas cleared");
                }
            }
            Action::Undo => {
                if !self.canvas.undo() {
                    log::debug!("Nothing to undo");
                }
            }
            Action::Redo => {
                if !self.canvas.redo() {
                    log::debug!("Nothing to redo");
                }
            }
            Action::Export | Action::ReloadConfig => {
                log::debug!("{:?} pending for backend", action);
                self.set_pending_backend_action(action);
                // Key releases can be missed while the worker or file IO runs
                self.modifiers = Default::default();
            }
            Action::ToggleMenu => self.toggle_menu(Instant::now()),
            Action::TogglePassthrough => {
                self.toggle_passthrough();
            }
            Action::Exit => {
                if !self.cancel_draft() {
                    log::info!("Exit requested");
                    self.should_exit = true;
                }
            }
        }
        self.needs_redraw = true;
    }
}
