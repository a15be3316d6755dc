// Wayland backend using wlr-layer-shell: one overlay surface per monitor.
mod backend;
mod handlers;
mod outputs;
mod signals;
mod state;
mod surface;

pub use backend::WaylandBackend;

use anyhow::Result;

use crate::geometry::Monitor;

/// Enumerates the compositor's monitors without showing anything.
pub fn scan_monitors() -> Result<Vec<Monitor>> {
    outputs::scan()
}
