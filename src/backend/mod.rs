use anyhow::Result;

use crate::geometry::{Monitor, MonitorId};
use crate::input::Tool;

pub mod wayland;

/// Startup choices taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// `--monitor`: annotate only the matching monitor
    pub monitor: Option<String>,
    /// `--all-monitors`: annotate every monitor without asking
    pub all_monitors: bool,
    pub tool: Option<Tool>,
    pub passthrough: bool,
}

/// Run the overlay until the user exits.
pub fn run_wayland(options: RunOptions) -> Result<()> {
    let mut backend = wayland::WaylandBackend::new(options)?;
    backend.run()
}

/// Monitors as the compositor currently reports them.
pub fn list_monitors() -> Result<Vec<Monitor>> {
    wayland::scan_monitors()
}

/// Finds the monitor a `--monitor` argument refers to.
///
/// Tries the exact id, then the display name (case-insensitive), then the
/// connector prefix of the id (`DP-1` matches `DP-1-Dell-U2720Q`).
pub fn resolve_monitor(monitors: &[Monitor], arg: &str) -> Option<MonitorId> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    let prefix = format!("{arg}-");
    monitors
        .iter()
        .find(|m| m.id.as_str() == arg)
        .or_else(|| monitors.iter().find(|m| m.name.eq_ignore_ascii_case(arg)))
        .or_else(|| monitors.iter().find(|m| m.id.as_str().starts_with(&prefix)))
        .map(|m| m.id.clone())
}

/// One `--list-monitors` line.
pub fn describe_monitor(monitor: &Monitor) -> String {
    let dpi = match monitor.physical_dpi() {
        Some(physical) => format!("{:.0} dpi", physical),
        None => format!("{:.0} dpi (logical)", monitor.logical_dpi()),
    };
    let refresh = if monitor.refresh_hz > 0.0 {
        format!("{:.2} Hz", monitor.refresh_hz)
    } else {
        "? Hz".to_string()
    };
    format!(
        "{}\t{}x{}+{}+{}\tx{:.2}\t{}\t{}\t{}{}",
        monitor.id,
        monitor.width,
        monitor.height,
        monitor.x,
        monitor.y,
        monitor.device_pixel_ratio(),
        dpi,
        refresh,
        monitor.name,
        if monitor.primary { "\t(primary)" } else { "" }
    )
}
