// Turns wl_output information into `Monitor` snapshots.
use anyhow::{Context, Result};
use smithay_client_toolkit::{
    delegate_output, delegate_registry,
    output::{OutputHandler, OutputInfo, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
};
use wayland_client::{Connection, QueueHandle, globals::registry_queue_init, protocol::wl_output};

use crate::geometry::{self, Monitor, MonitorId};

/// The parts of an output advertisement a monitor is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct OutputSnapshot {
    pub(super) global_id: u32,
    pub(super) connector: Option<String>,
    pub(super) make: String,
    pub(super) model: String,
    pub(super) description: Option<String>,
    pub(super) position: (i32, i32),
    pub(super) logical_size: Option<(i32, i32)>,
    /// Current mode in device pixels
    pub(super) mode_size: Option<(i32, i32)>,
    /// Current mode refresh in mHz
    pub(super) refresh_mhz: i32,
    pub(super) scale_factor: i32,
    pub(super) physical_size_mm: (i32, i32),
}

impl OutputSnapshot {
    pub(super) fn from_info(info: &OutputInfo) -> Self {
        let current = info.modes.iter().find(|mode| mode.current);
        Self {
            global_id: info.id,
            connector: info.name.clone(),
            make: info.make.clone(),
            model: info.model.clone(),
            description: info.description.clone(),
            position: info.logical_position.unwrap_or(info.location),
            logical_size: info.logical_size,
            mode_size: current.map(|mode| mode.dimensions),
            refresh_mhz: current.map_or(0, |mode| mode.refresh_rate),
            scale_factor: info.scale_factor,
            physical_size_mm: info.physical_size,
        }
    }

    /// `connector-make-model`, skipping empty parts, or `id<N>` when all are empty.
    pub(super) fn identity(&self) -> MonitorId {
        let parts: Vec<&str> = [
            self.connector.as_deref().unwrap_or(""),
            self.make.as_str(),
            self.model.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            MonitorId::new(format!("id{}", self.global_id))
        } else {
            MonitorId::new(parts.join("-"))
        }
    }

    /// Builds the monitor, or `None` while the output has no usable size yet.
    pub(super) fn to_monitor(&self) -> Option<Monitor> {
        let integer_scale = self.scale_factor.max(1);
        let (width, height) = self.logical_size.or_else(|| {
            self.mode_size
                .map(|(w, h)| (w / integer_scale, h / integer_scale))
        })?;
        if width <= 0 || height <= 0 {
            return None;
        }

        // Fractional scales only show up as mode size over logical size
        let scale = match self.mode_size {
            Some((mode_width, _)) if self.logical_size.is_some() => {
                (mode_width as f64 / width as f64).max(1.0)
            }
            _ => integer_scale as f64,
        };

        let physical_size_mm = match self.physical_size_mm {
            (w, h) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        };

        let name = self
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.connector.clone())
            .unwrap_or_else(|| format!("{} {}", self.make, self.model).trim().to_string());

        Some(Monitor {
            id: self.identity(),
            name,
            x: self.position.0,
            y: self.position.1,
            width,
            height,
            scale,
            physical_size_mm,
            refresh_hz: self.refresh_mhz as f64 / 1000.0,
            primary: false,
        })
    }
}

/// Every output with a usable size, normalized, paired with its `wl_output`.
pub(super) fn enumerate(output_state: &OutputState) -> Vec<(Monitor, wl_output::WlOutput)> {
    let mut pairs: Vec<(Monitor, wl_output::WlOutput)> = output_state
        .outputs()
        .filter_map(|output| {
            let info = output_state.info(&output)?;
            let monitor = OutputSnapshot::from_info(&info).to_monitor()?;
            Some((monitor, output))
        })
        .collect();

    let mut monitors: Vec<Monitor> = pairs.iter().map(|(m, _)| m.clone()).collect();
    geometry::normalize(&mut monitors);

    // Re-pair in normalized order
    monitors
        .into_iter()
        .filter_map(|monitor| {
            let index = pairs.iter().position(|(m, _)| m.id == monitor.id)?;
            let (_, output) = pairs.swap_remove(index);
            Some((monitor, output))
        })
        .collect()
}

/// Minimal dispatch state for enumerating outputs without creating surfaces.
struct OutputScan {
    registry_state: RegistryState,
    output_state: OutputState,
}

impl OutputHandler for OutputScan {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_output::WlOutput) {}

    fn update_output(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_output::WlOutput) {}

    fn output_destroyed(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_output::WlOutput) {
    }
}

impl ProvidesRegistryState for OutputScan {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState];
}

delegate_output!(OutputScan);
delegate_registry!(OutputScan);

/// Connects, waits for the output advertisements and returns the monitors.
pub(super) fn scan() -> Result<Vec<Monitor>> {
    let conn = Connection::connect_to_env().context("Failed to connect to Wayland compositor")?;
    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize Wayland registry")?;
    let qh = event_queue.handle();

    let mut scan = OutputScan {
        registry_state: RegistryState::new(&globals),
        output_state: OutputState::new(&globals, &qh),
    };

    // wl_output first, then the xdg_output details it triggers
    for _ in 0..2 {
        event_queue
            .roundtrip(&mut scan)
            .context("Wayland roundtrip failed")?;
    }

    Ok(enumerate(&scan.output_state)
        .into_iter()
        .map(|(monitor, _)| monitor)
        .collect())
}
