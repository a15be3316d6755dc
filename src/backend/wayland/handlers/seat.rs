// Seat capabilities: grab the keyboard and pointer when the seat offers them.
use log::{debug, info, warn};
use smithay_client_toolkit::seat::{Capability, SeatHandler, SeatState};
use wayland_client::{Connection, QueueHandle, protocol::wl_seat};

use super::super::state::WaylandState;

impl SeatHandler for WaylandState {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        match capability {
            Capability::Keyboard => match self.seat_state.get_keyboard(qh, &seat, None) {
                Ok(_) => info!("Keyboard attached"),
                Err(e) => warn!("Could not get keyboard: {}", e),
            },
            Capability::Pointer => match self.seat_state.get_pointer(qh, &seat) {
                Ok(_) => info!("Pointer attached"),
                Err(e) => warn!("Could not get pointer: {}", e),
            },
            _ => debug!("Ignoring seat capability {}", capability),
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        info!("Seat capability {} removed", capability);
        if capability == Capability::Pointer {
            self.input_state.on_pointer_leave();
        }
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}
