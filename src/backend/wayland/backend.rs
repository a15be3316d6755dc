// Coordinates backend startup/shutdown and drives the calloop event loop while
// delegating rendering & protocol state to `WaylandState` and its handler modules.
use anyhow::{Context, Result, anyhow};
use calloop::EventLoop;
use log::{debug, info, warn};
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    reexports::calloop_wayland_source::WaylandSource,
    registry::RegistryState,
    seat::SeatState,
    shell::wlr_layer::LayerShell,
    shm::Shm,
};
use std::time::{Duration, Instant};
use wayland_client::{Connection, globals::registry_queue_init};

use super::{signals, state::WaylandState};
use crate::{
    backend::{self, RunOptions},
    config::Config,
    effects::MagnifierSampler,
    export::ExportManager,
    input::InputState,
    ui::{MonitorSelectView, MonitorSelection},
};

const MAX_RENDER_FAILURES: u32 = 10;

/// Wayland backend state
pub struct WaylandBackend {
    options: RunOptions,
    /// Tokio runtime for export and screen sampling
    tokio_runtime: tokio::runtime::Runtime,
}

impl WaylandBackend {
    pub fn new(options: RunOptions) -> Result<Self> {
        let tokio_runtime = tokio::runtime::Runtime::new()
            .context("Failed to create Tokio runtime for background work")?;
        Ok(Self {
            options,
            tokio_runtime,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        info!("Starting Wayland backend");

        let conn =
            Connection::connect_to_env().context("Failed to connect to Wayland compositor")?;
        debug!("Connected to Wayland display");

        let (globals, mut event_queue) =
            registry_queue_init(&conn).context("Failed to initialize Wayland registry")?;
        let qh = event_queue.handle();

        let compositor_state =
            CompositorState::bind(&globals, &qh).context("wl_compositor not available")?;
        let layer_shell =
            LayerShell::bind(&globals, &qh).context("zwlr_layer_shell_v1 not available")?;
        let shm = Shm::bind(&globals, &qh).context("wl_shm not available")?;
        let output_state = OutputState::new(&globals, &qh);
        let seat_state = SeatState::new(&globals, &qh);
        let registry_state = RegistryState::new(&globals);
        debug!("Bound compositor, layer shell and shm");

        let config = Config::load_or_default();
        debug!("  Tool: {:?}", config.drawing.default_tool);
        debug!("  Stroke width: {:.1}px", config.drawing.stroke_width);
        debug!("  Buffer count: {}", config.performance.buffer_count);
        debug!("  VSync: {}", config.performance.enable_vsync);

        let action_map = config
            .keybindings
            .build_action_map()
            .map_err(|e| anyhow!(e))
            .context("Invalid keybindings in config")?;

        let mut input_state = InputState::new(&config, action_map);
        if let Some(tool) = self.options.tool {
            input_state.set_tool(tool);
        }
        if self.options.passthrough {
            input_state.set_passthrough(true);
        }

        let handle = self.tokio_runtime.handle().clone();
        let export_manager = ExportManager::new(&handle);
        let mut sampler = MagnifierSampler::new(
            &handle,
            Duration::from_millis(config.effects.magnifier_sample_interval_ms),
        );

        let mut event_loop: EventLoop<WaylandState> =
            EventLoop::try_new().context("Failed to create event loop")?;
        let (waker, ping_source) =
            calloop::ping::make_ping().context("Failed to create event loop waker")?;
        event_loop
            .handle()
            .insert_source(ping_source, |_, _, _| {})
            .map_err(|e| anyhow!("Failed to register event loop waker: {}", e.error))?;
        sampler.set_waker(waker.clone());
        export_manager.set_waker(waker.clone());
        let signal_flags = signals::spawn(waker)?;

        let mut state = WaylandState::new(
            registry_state,
            compositor_state,
            layer_shell,
            shm,
            output_state,
            seat_state,
            config,
            input_state,
            export_manager,
            sampler,
            handle,
        );

        // wl_output first, then the xdg_output details it triggers
        for _ in 0..2 {
            event_queue
                .roundtrip(&mut state)
                .context("Wayland roundtrip failed")?;
        }
        state.refresh_outputs();
        let monitors = state.all_monitors();
        if monitors.is_empty() {
            anyhow::bail!("No monitors found");
        }
        info!("Found {} monitor(s)", monitors.len());

        let target = match (&self.options.monitor, self.options.all_monitors) {
            (Some(arg), _) => {
                let id = backend::resolve_monitor(&monitors, arg).with_context(|| {
                    let known: Vec<&str> = monitors.iter().map(|m| m.id.as_str()).collect();
                    format!("No monitor matches '{}' (known: {})", arg, known.join(", "))
                })?;
                Some(MonitorSelection::Only(id))
            }
            (None, true) => Some(MonitorSelection::All),
            (None, false) if !MonitorSelectView::needed(&monitors) => Some(MonitorSelection::All),
            (None, false) => None,
        };

        match target {
            Some(selection) => {
                info!("Annotating {:?}", selection);
                state.target = super::state::Target::Chosen(selection);
                state.sync_overlays(&qh)?;
                state.start_overlay_session(Instant::now());
            }
            None => state.open_selection(&qh)?,
        }

        WaylandSource::new(conn, event_queue)
            .insert(event_loop.handle())
            .map_err(|e| anyhow!("Failed to insert Wayland source: {}", e.error))?;

        let mut consecutive_render_failures = 0u32;
        loop {
            if state.input_state.should_exit || signal_flags.quit_requested() {
                info!("Exit requested, leaving event loop");
                break;
            }

            let timeout = state.next_timeout(Instant::now());
            event_loop
                .dispatch(timeout, &mut state)
                .context("Wayland event loop failed")?;

            if signal_flags.take_toggle() {
                let passthrough = state.input_state.toggle_passthrough();
                info!("Pass-through {}", if passthrough { "on" } else { "off" });
            }
            if signal_flags.quit_requested() || state.input_state.should_exit {
                continue;
            }

            let now = Instant::now();
            state.after_dispatch(&qh, now)?;

            match state.render(&qh, now) {
                Ok(()) => consecutive_render_failures = 0,
                Err(e) => {
                    consecutive_render_failures += 1;
                    warn!(
                        "Rendering error (attempt {}/{}): {:#}",
                        consecutive_render_failures, MAX_RENDER_FAILURES, e
                    );
                    if consecutive_render_failures >= MAX_RENDER_FAILURES {
                        return Err(e.context(format!(
                            "Too many consecutive render failures ({})",
                            consecutive_render_failures
                        )));
                    }
                }
            }
        }

        info!("Wayland backend exiting");
        Ok(())
    }
}
