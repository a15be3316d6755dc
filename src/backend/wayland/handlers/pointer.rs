// Pointer events: overlay positions are converted to global coordinates for the
// input state; clicks on the selection dialog go to its view.
use log::{debug, warn};
use smithay_client_toolkit::seat::pointer::{
    BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, PointerEvent, PointerEventKind, PointerHandler,
};
use wayland_client::{Connection, QueueHandle, protocol::wl_pointer};

use crate::input::MouseButton;

use super::super::state::WaylandState;

fn map_button(button: u32) -> Option<MouseButton> {
    match button {
        BTN_LEFT => Some(MouseButton::Left),
        BTN_MIDDLE => Some(MouseButton::Middle),
        BTN_RIGHT => Some(MouseButton::Right),
        _ => None,
    }
}

impl WaylandState {
    fn selection_click(&mut self, qh: &QueueHandle<Self>, position: (f64, f64)) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        let (width, height) = selection.surface.size();
        let outcome = selection
            .view
            .on_click(width as f64, height as f64, position.0, position.1);
        selection.surface.mark_dirty();
        if let Some(outcome) = outcome
            && let Err(e) = self.finish_selection(outcome, qh)
        {
            warn!("Failed to apply monitor selection: {:#}", e);
            self.input_state.should_exit = true;
        }
    }
}

impl PointerHandler for WaylandState {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let on_selection = self
                .selection
                .as_ref()
                .is_some_and(|s| s.surface.owns(&event.surface));

            match event.kind {
                PointerEventKind::Enter { .. } | PointerEventKind::Motion { .. } => {
                    if let Some(global) = self.to_global(&event.surface, event.position) {
                        self.input_state.on_pointer_motion(global);
                    }
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left surface");
                    if !on_selection {
                        self.input_state.on_pointer_leave();
                    }
                }
                PointerEventKind::Press { button, .. } => {
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    if on_selection {
                        if button == MouseButton::Left {
                            self.selection_click(qh, event.position);
                        }
                        continue;
                    }
                    if let Some(global) = self.to_global(&event.surface, event.position) {
                        debug!("{:?} pressed at {:?}", button, global);
                        self.input_state.on_pointer_press(button, global);
                    }
                }
                PointerEventKind::Release { button, .. } => {
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    if let Some(global) = self.to_global(&event.surface, event.position) {
                        self.input_state.on_pointer_release(button, global);
                    }
                }
                PointerEventKind::Axis { .. } => {}
            }
        }
    }
}
