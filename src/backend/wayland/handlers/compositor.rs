// Frame pacing and buffer scale for every surface we own.
use log::debug;
use smithay_client_toolkit::compositor::CompositorHandler;
use wayland_client::{
    Connection, QueueHandle,
    protocol::{wl_output, wl_surface},
};

use super::super::{state::WaylandState, surface::SurfaceState};

impl WaylandState {
    fn surface_state_mut(&mut self, surface: &wl_surface::WlSurface) -> Option<&mut SurfaceState> {
        if let Some(overlay) = self.overlays.iter_mut().find(|o| o.surface.owns(surface)) {
            return Some(&mut overlay.surface);
        }
        if let Some(lens) = self.lens.as_mut().filter(|l| l.surface.owns(surface)) {
            return Some(&mut lens.surface);
        }
        self.selection
            .as_mut()
            .filter(|s| s.surface.owns(surface))
            .map(|s| &mut s.surface)
    }
}

impl CompositorHandler for WaylandState {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        surface: &wl_surface::WlSurface,
        new_factor: i32,
    ) {
        debug!("Scale factor changed to {}", new_factor);
        if let Some(state) = self.surface_state_mut(surface) {
            state.set_scale(new_factor);
        }
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        if let Some(state) = self.surface_state_mut(surface) {
            state.frame_done();
        }
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
        debug!("Surface entered output");
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
        debug!("Surface left output");
    }
}
