// Layer-shell configure/close events for overlays, the lens and the selection dialog.
use log::{debug, info, warn};
use smithay_client_toolkit::shell::{
    WaylandSurface,
    wlr_layer::{LayerShellHandler, LayerSurface, LayerSurfaceConfigure},
};
use wayland_client::{Connection, QueueHandle};

use super::super::state::WaylandState;

impl LayerShellHandler for WaylandState {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, layer: &LayerSurface) {
        let surface = layer.wl_surface();

        if let Some(index) = self.overlays.iter().position(|o| o.surface.owns(surface)) {
            let overlay = self.overlays.remove(index);
            warn!("Overlay for {} closed by compositor", overlay.monitor);
            if self.overlays.is_empty() {
                info!("No overlays left");
                self.input_state.should_exit = true;
            }
        } else if self.lens.as_ref().is_some_and(|l| l.surface.owns(surface)) {
            debug!("Lens closed by compositor");
            self.lens = None;
        } else if self.selection.as_ref().is_some_and(|s| s.surface.owns(surface)) {
            info!("Monitor selection closed by compositor");
            self.selection = None;
            self.input_state.should_exit = true;
        }
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let (width, height) = configure.new_size;
        let surface = layer.wl_surface();
        debug!("Layer surface configured: {}x{}", width, height);

        let state = if let Some(overlay) = self.overlays.iter_mut().find(|o| o.surface.owns(surface)) {
            Some(&mut overlay.surface)
        } else if let Some(lens) = self.lens.as_mut().filter(|l| l.surface.owns(surface)) {
            Some(&mut lens.surface)
        } else {
            self.selection
                .as_mut()
                .filter(|s| s.surface.owns(surface))
                .map(|s| &mut s.surface)
        };

        let Some(state) = state else {
            debug!("Configure for an unknown surface");
            return;
        };
        if width > 0 && height > 0 && state.configure(width, height) {
            info!("Surface size is now {}x{}", width, height);
        }
    }
}
