// Live Wayland state shared by the event loop and the handler submodules: the
// surfaces per monitor, the workers, and the glue between them and `InputState`.
use anyhow::{Context, Result};
use log::{debug, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorState, Region},
    output::OutputState,
    registry::RegistryState,
    seat::SeatState,
    shell::{
        WaylandSurface,
        wlr_layer::{Anchor, KeyboardInteractivity, Layer, LayerShell},
    },
    shm::Shm,
};
use std::time::{Duration, Instant};
use wayland_client::{QueueHandle, protocol::wl_output};

use crate::{
    config::{Action, Config},
    draw::clear_surface,
    effects::{self, MagnifierSampler, SamplerEvent},
    export::{self, ExportManager, ExportOutcome, FlatImage},
    geometry::{self, Monitor, MonitorId, Point},
    input::InputState,
    notification,
    ui::{MonitorSelectView, MonitorSelection, SelectionOutcome},
};

use super::outputs;
use super::surface::{FrameOptions, LensSurface, OverlaySurface, SelectionSurface, SurfaceState};

const OVERLAY_NAMESPACE: &str = "annotateit";
const LENS_NAMESPACE: &str = "annotateit-lens";
const SELECTION_NAMESPACE: &str = "annotateit-select";

/// Which monitors get an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Target {
    /// The selection dialog is still open
    Selecting,
    Chosen(MonitorSelection),
}

/// Internal Wayland state shared across modules.
pub(super) struct WaylandState {
    // Wayland protocol objects
    pub(super) registry_state: RegistryState,
    pub(super) compositor_state: CompositorState,
    pub(super) layer_shell: LayerShell,
    pub(super) shm: Shm,
    pub(super) output_state: OutputState,
    pub(super) seat_state: SeatState,

    // Surfaces
    pub(super) overlays: Vec<OverlaySurface>,
    pub(super) lens: Option<LensSurface>,
    pub(super) selection: Option<SelectionSurface>,

    // Monitor topology
    pub(super) outputs: Vec<(Monitor, wl_output::WlOutput)>,
    pub(super) target: Target,
    pub(super) topology_dirty: bool,

    pub(super) config: Config,
    pub(super) input_state: InputState,
    applied_passthrough: bool,

    // Workers
    pub(super) export_manager: ExportManager,
    pub(super) sampler: MagnifierSampler,
    lens_sample: Option<cairo::ImageSurface>,
    magnifier_was_on: bool,

    halo_deadline: Option<Instant>,
    pub(super) tokio_handle: tokio::runtime::Handle,
}

impl WaylandState {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        registry_state: RegistryState,
        compositor_state: CompositorState,
        layer_shell: LayerShell,
        shm: Shm,
        output_state: OutputState,
        seat_state: SeatState,
        config: Config,
        input_state: InputState,
        export_manager: ExportManager,
        sampler: MagnifierSampler,
        tokio_handle: tokio::runtime::Handle,
    ) -> Self {
        Self {
            registry_state,
            compositor_state,
            layer_shell,
            shm,
            output_state,
            seat_state,
            overlays: Vec::new(),
            lens: None,
            selection: None,
            outputs: Vec::new(),
            target: Target::Chosen(MonitorSelection::All),
            topology_dirty: false,
            config,
            input_state,
            applied_passthrough: false,
            export_manager,
            sampler,
            lens_sample: None,
            magnifier_was_on: false,
            halo_deadline: None,
            tokio_handle,
        }
    }

    pub(super) fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            buffer_count: self.config.performance.buffer_count as usize,
            vsync: self.config.performance.enable_vsync,
        }
    }

    /// Every enumerated monitor, annotated or not.
    pub(super) fn all_monitors(&self) -> Vec<Monitor> {
        self.outputs.iter().map(|(m, _)| m.clone()).collect()
    }

    fn output_for(&self, id: &MonitorId) -> Option<&wl_output::WlOutput> {
        self.outputs
            .iter()
            .find(|(m, _)| &m.id == id)
            .map(|(_, output)| output)
    }

    /// Re-reads the output list. Returns true if the monitor set changed.
    pub(super) fn refresh_outputs(&mut self) -> bool {
        let fresh = outputs::enumerate(&self.output_state);
        let before = self.all_monitors();
        let after: Vec<Monitor> = fresh.iter().map(|(m, _)| m.clone()).collect();
        let change = geometry::diff_topology(&before, &after);
        self.outputs = fresh;

        if change.is_empty() {
            return false;
        }
        info!(
            "Monitor topology: {} added, {} removed, {} changed",
            change.added.len(),
            change.removed.len(),
            change.changed.len()
        );
        true
    }

    /// Monitors that get an overlay under the current target.
    pub(super) fn annotated_monitors(&self) -> Vec<Monitor> {
        match &self.target {
            Target::Selecting => Vec::new(),
            Target::Chosen(selection) => self
                .outputs
                .iter()
                .filter(|(m, _)| selection.includes(&m.id))
                .map(|(m, _)| m.clone())
                .collect(),
        }
    }

    /// Brings surfaces in line with the output list after hot-plug.
    ///
    /// The canvas is untouched: shapes of a vanished monitor stay dormant.
    pub(super) fn apply_topology(&mut self, qh: &QueueHandle<Self>) -> Result<()> {
        if !self.refresh_outputs() {
            return Ok(());
        }

        match self.target {
            Target::Selecting => {
                let monitors = self.all_monitors();
                if !MonitorSelectView::needed(&monitors) {
                    info!("Only {} monitor(s) left; skipping selection", monitors.len());
                    self.finish_selection(SelectionOutcome::Confirmed(MonitorSelection::All), qh)?;
                } else {
                    let host_gone = self
                        .selection
                        .as_ref()
                        .and_then(|s| s.view.monitors().iter().find(|m| m.primary))
                        .is_none_or(|host| self.output_for(&host.id).is_none());
                    if host_gone {
                        self.open_selection(qh)?;
                    } else if let Some(selection) = self.selection.as_mut()
                        && selection.view.update_monitors(monitors)
                    {
                        selection.surface.mark_dirty();
                    }
                }
            }
            Target::Chosen(_) => self.sync_overlays(qh)?,
        }
        Ok(())
    }

    /// Opens (or reopens) the selection dialog on the primary monitor.
    pub(super) fn open_selection(&mut self, qh: &QueueHandle<Self>) -> Result<()> {
        let monitors = self.all_monitors();
        let view = MonitorSelectView::new(monitors.clone())
            .context("No monitors to choose from")?;
        let host = monitors
            .iter()
            .find(|m| m.primary)
            .context("No primary monitor")?;
        let output = self.output_for(&host.id).cloned();

        let wl_surface = self.compositor_state.create_surface(qh);
        let layer = self.layer_shell.create_layer_surface(
            qh,
            wl_surface,
            Layer::Overlay,
            Some(SELECTION_NAMESPACE),
            output.as_ref(),
        );
        layer.set_anchor(Anchor::all());
        layer.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
        layer.set_size(0, 0);
        layer.set_exclusive_zone(-1);
        layer.commit();

        info!("Showing monitor selection on {}", host.id);
        self.target = Target::Selecting;
        self.selection = Some(SelectionSurface {
            view,
            surface: SurfaceState::new(layer, host.scale.ceil() as i32),
        });
        Ok(())
    }

    /// Closes the selection dialog; a confirmed pick creates the overlays.
    pub(super) fn finish_selection(
        &mut self,
        outcome: SelectionOutcome,
        qh: &QueueHandle<Self>,
    ) -> Result<()> {
        self.selection = None;
        match outcome {
            SelectionOutcome::Confirmed(selection) => {
                info!("Annotating {:?}", selection);
                self.target = Target::Chosen(selection);
                self.sync_overlays(qh)?;
                self.start_overlay_session(Instant::now());
            }
            SelectionOutcome::Cancelled => {
                info!("Monitor selection cancelled");
                self.input_state.should_exit = true;
            }
        }
        Ok(())
    }

    /// Arms the startup halo once overlays are on screen.
    pub(super) fn start_overlay_session(&mut self, now: Instant) {
        self.halo_deadline = self
            .input_state
            .effects
            .startup_halo_delay()
            .map(|delay| now + delay);
    }

    /// Creates overlays for newly annotated monitors and drops stale ones.
    pub(super) fn sync_overlays(&mut self, qh: &QueueHandle<Self>) -> Result<()> {
        let annotated = self.annotated_monitors();

        let before = self.overlays.len();
        self.overlays
            .retain(|overlay| annotated.iter().any(|m| m.id == overlay.monitor));
        if self.overlays.len() != before {
            info!("Dropped {} overlay(s)", before - self.overlays.len());
        }
        if let Some(lens) = &self.lens
            && !annotated.iter().any(|m| m.id == lens.monitor)
        {
            self.lens = None;
        }

        for monitor in &annotated {
            if self.overlays.iter().any(|o| o.monitor == monitor.id) {
                continue;
            }
            let output = self.output_for(&monitor.id).cloned();
            let wl_surface = self.compositor_state.create_surface(qh);
            let layer = self.layer_shell.create_layer_surface(
                qh,
                wl_surface,
                Layer::Overlay,
                Some(OVERLAY_NAMESPACE),
                output.as_ref(),
            );
            layer.set_anchor(Anchor::all());
            layer.set_keyboard_interactivity(KeyboardInteractivity::None);
            layer.set_size(0, 0);
            layer.set_exclusive_zone(-1);
            layer.commit();

            info!("Created overlay for {} ({})", monitor.id, monitor.name);
            self.overlays.push(OverlaySurface {
                monitor: monitor.id.clone(),
                surface: SurfaceState::new(layer, monitor.scale.ceil() as i32),
            });
        }

        self.input_state.set_monitors(annotated);
        self.apply_input_mode()
    }

    /// Pushes the pass-through state to every overlay in lock-step.
    ///
    /// While capturing, the first overlay holds the keyboard.
    pub(super) fn apply_input_mode(&mut self) -> Result<()> {
        let passthrough = self.input_state.passthrough;
        for (index, overlay) in self.overlays.iter().enumerate() {
            overlay.set_input_mode(&self.compositor_state, passthrough, index == 0)?;
        }
        self.applied_passthrough = passthrough;
        Ok(())
    }

    /// Finds the overlay drawn on `surface` and its monitor.
    pub(super) fn monitor_for_surface(
        &self,
        surface: &wayland_client::protocol::wl_surface::WlSurface,
    ) -> Option<Monitor> {
        let overlay = self.overlays.iter().find(|o| o.surface.owns(surface))?;
        geometry::find_monitor(self.input_state.monitors(), &overlay.monitor).cloned()
    }

    /// Everything that has to happen between dispatching events and drawing.
    pub(super) fn after_dispatch(&mut self, qh: &QueueHandle<Self>, now: Instant) -> Result<()> {
        if std::mem::take(&mut self.topology_dirty) {
            self.apply_topology(qh)?;
        }

        while let Some(action) = self.input_state.take_pending_backend_action() {
            self.handle_backend_action(action);
        }

        if self.input_state.passthrough != self.applied_passthrough {
            self.apply_input_mode()?;
        }

        self.poll_export();
        self.poll_sampler();

        if let Some(deadline) = self.halo_deadline
            && now >= deadline
        {
            self.halo_deadline = None;
            self.input_state.enable_startup_halo();
        }

        self.input_state.tick_menu(now);
        self.input_state.tick_caret(now);
        self.update_lens(qh, now)?;

        if std::mem::take(&mut self.input_state.needs_redraw) {
            for overlay in &mut self.overlays {
                overlay.surface.mark_dirty();
            }
            if let Some(lens) = &mut self.lens {
                lens.surface.mark_dirty();
            }
        }
        Ok(())
    }

    /// How long the loop may sleep before something time-based is due.
    pub(super) fn next_timeout(&self, now: Instant) -> Option<Duration> {
        let mut timeout = None;
        let effects_live = self.input_state.effects.any_active() && !self.input_state.passthrough;
        if effects_live || self.input_state.menu.is_drawn() || self.lens.is_some() {
            timeout = Some(self.input_state.effects.frame_interval());
        }
        if let Some(caret) = self.input_state.caret_timeout(now) {
            timeout = Some(timeout.map_or(caret, |t: Duration| t.min(caret)));
        }
        if let Some(deadline) = self.halo_deadline {
            let until = deadline.saturating_duration_since(now);
            timeout = Some(timeout.map_or(until, |t: Duration| t.min(until)));
        }
        timeout
    }

    fn handle_backend_action(&mut self, action: Action) {
        match action {
            Action::Export => self.export_active_monitor(),
            Action::ReloadConfig => self.reload_config(),
            other => warn!("{:?} is not a backend action", other),
        }
    }

    /// Flattens the monitor under the cursor (or the primary) and queues it.
    fn export_active_monitor(&mut self) {
        let Some(monitor) = self.input_state.active_monitor().cloned() else {
            warn!("Nothing to export: no monitor is annotated");
            return;
        };

        let image = export::flatten(
            &self.input_state.canvas,
            &self.input_state.effects,
            &monitor,
            self.input_state.cursor,
        )
        .and_then(FlatImage::from_surface);

        let result = image.and_then(|image| {
            self.export_manager
                .request_export(monitor.id.clone(), image, &self.config.export)
        });
        match result {
            Ok(()) => info!("Export of {} queued", monitor.id),
            Err(e) => {
                warn!("Export of {} failed: {}", monitor.id, e);
                if self.config.export.notify {
                    notification::send_notification_async(
                        &self.tokio_handle,
                        "Export failed".to_string(),
                        e.to_string(),
                        Some("dialog-error".to_string()),
                    );
                }
            }
        }
    }

    /// Re-reads the config file; on failure the current settings stay.
    pub(super) fn reload_config(&mut self) {
        let loaded = Config::load().and_then(|config| {
            let action_map = config
                .keybindings
                .build_action_map()
                .map_err(anyhow::Error::msg)
                .context("Invalid keybindings")?;
            Ok((config, action_map))
        });

        match loaded {
            Ok((config, action_map)) => {
                self.input_state.apply_config(&config, action_map);
                self.sampler.set_interval(Duration::from_millis(
                    config.effects.magnifier_sample_interval_ms,
                ));
                self.config = config;
                for overlay in &mut self.overlays {
                    overlay.surface.mark_dirty();
                }
                info!("Configuration reloaded");
            }
            Err(e) => {
                warn!("Failed to reload config, keeping current settings: {:#}", e);
                notification::send_notification_async(
                    &self.tokio_handle,
                    "Configuration not reloaded".to_string(),
                    format!("{:#}", e),
                    Some("dialog-warning".to_string()),
                );
            }
        }
    }

    fn poll_export(&mut self) {
        match self.export_manager.try_take_outcome() {
            Some(ExportOutcome::Success(result)) => debug!("Export outcome: {}", result.summary()),
            Some(ExportOutcome::Failed(message)) => debug!("Export outcome: failed ({})", message),
            None => {}
        }
    }

    fn poll_sampler(&mut self) {
        match self.sampler.try_sample() {
            Some(SamplerEvent::Sample(sample)) => match sample.into_surface() {
                Ok(surface) => {
                    self.lens_sample = Some(surface);
                    if let Some(lens) = &mut self.lens {
                        lens.surface.mark_dirty();
                    }
                }
                Err(e) => debug!("Dropping unusable screen sample: {}", e),
            },
            Some(SamplerEvent::Unavailable(err)) => {
                self.input_state.effects.disable_magnifier();
                self.input_state.needs_redraw = true;
                if self.sampler.take_denial_notice() {
                    warn!("Magnifier disabled: {}", err);
                    notification::send_notification_async(
                        &self.tokio_handle,
                        "Magnifier unavailable".to_string(),
                        err.to_string(),
                        Some("dialog-warning".to_string()),
                    );
                } else {
                    debug!("Magnifier disabled again: {}", err);
                }
            }
            None => {}
        }
    }

    /// Shows, moves or removes the magnifier lens to follow the cursor.
    fn update_lens(&mut self, qh: &QueueHandle<Self>, now: Instant) -> Result<()> {
        let magnifier_on =
            self.input_state.effects.magnifier() && !self.input_state.passthrough;
        if self.magnifier_was_on && !magnifier_on {
            self.sampler.cancel();
            self.lens_sample = None;
        }
        self.magnifier_was_on = magnifier_on;

        let target = self.input_state.cursor.and_then(|cursor| {
            geometry::monitor_at(self.input_state.monitors(), cursor)
                .map(|monitor| (cursor, monitor.clone()))
        });
        let (cursor, monitor) = match target {
            Some(target) if magnifier_on => target,
            _ => {
                if self.lens.take().is_some() {
                    debug!("Lens hidden");
                }
                return Ok(());
            }
        };

        let settings = self.input_state.effects.settings();
        let local = geometry::to_monitor_local(cursor, &monitor);
        let placement = effects::place_lens(
            (local.x as f64, local.y as f64),
            self.input_state.effects.lens_radius(),
            settings.magnifier_zoom,
            (monitor.width, monitor.height),
        );

        let on_same_monitor = self
            .lens
            .as_ref()
            .is_some_and(|lens| lens.monitor == monitor.id);
        match self.lens.as_mut() {
            Some(lens) if on_same_monitor => lens.place(placement),
            _ => {
                let output = self.output_for(&monitor.id).cloned();
                let wl_surface = self.compositor_state.create_surface(qh);
                let layer = self.layer_shell.create_layer_surface(
                    qh,
                    wl_surface,
                    Layer::Overlay,
                    Some(LENS_NAMESPACE),
                    output.as_ref(),
                );
                layer.set_anchor(Anchor::TOP | Anchor::LEFT);
                layer.set_margin(placement.y, 0, 0, placement.x);
                layer.set_size(placement.size as u32, placement.size as u32);
                layer.set_exclusive_zone(-1);
                layer.set_keyboard_interactivity(KeyboardInteractivity::None);
                let region =
                    Region::new(&self.compositor_state).context("Failed to create lens region")?;
                layer.wl_surface().set_input_region(Some(region.wl_region()));
                layer.commit();

                debug!("Lens created on {}", monitor.id);
                self.lens = Some(LensSurface {
                    monitor: monitor.id.clone(),
                    placement,
                    surface: SurfaceState::new(layer, monitor.scale.ceil() as i32),
                });
            }
        }

        self.sampler.request(now);
        Ok(())
    }

    /// Draws every surface that is dirty and ready.
    pub(super) fn render(&mut self, qh: &QueueHandle<Self>, now: Instant) -> Result<()> {
        let options = self.frame_options();

        if let Some(SelectionSurface { view, surface }) = &mut self.selection
            && surface.ready_to_draw(options)
        {
            surface.draw(&self.shm, qh, options, |ctx, width, height| {
                clear_surface(ctx);
                view.render(ctx, width, height);
            })?;
        }

        for overlay in &mut self.overlays {
            if !overlay.surface.ready_to_draw(options) {
                continue;
            }
            let Some(monitor) =
                geometry::find_monitor(self.input_state.monitors(), &overlay.monitor).cloned()
            else {
                continue;
            };
            let input = &self.input_state;
            overlay.surface.draw(&self.shm, qh, options, |ctx, _, _| {
                input.render_monitor(ctx, &monitor, now)
            })?;
        }

        let desktop = geometry::bounds_of(&self.all_monitors());
        if let Some(lens) = &mut self.lens
            && lens.surface.ready_to_draw(options)
            && let Some(cursor) = self.input_state.cursor
            && let Some(desktop) = desktop
        {
            let effects = &self.input_state.effects;
            let sample = self.lens_sample.as_ref();
            let size = lens.placement.size;
            let focus = (cursor.x as f64, cursor.y as f64);
            lens.surface.draw(&self.shm, qh, options, |ctx, _, _| {
                clear_surface(ctx);
                effects::paint_lens(
                    ctx,
                    size,
                    effects.lens_radius(),
                    effects.settings().magnifier_zoom,
                    sample,
                    &desktop,
                    focus,
                );
            })?;
        }

        Ok(())
    }

    /// Converts a surface-local pointer position to global coordinates.
    pub(super) fn to_global(
        &self,
        surface: &wayland_client::protocol::wl_surface::WlSurface,
        position: (f64, f64),
    ) -> Option<Point> {
        let monitor = self.monitor_for_surface(surface)?;
        Some(geometry::to_global(
            Point::from_f64(position.0, position.1),
            &monitor,
        ))
    }
}
