//! Layer surfaces and their shared memory buffers.
//!
//! [`SurfaceState`] owns one `zwlr_layer_surface_v1` plus its buffer pool and
//! knows how to paint a frame into it. Overlays, the magnifier lens and the
//! monitor-selection dialog each wrap one.

use anyhow::{Context, Result};
use log::{debug, info};
use smithay_client_toolkit::{
    compositor::{CompositorState, Region},
    shell::{
        WaylandSurface,
        wlr_layer::{KeyboardInteractivity, LayerSurface},
    },
    shm::{Shm, slot::SlotPool},
};
use wayland_client::{
    QueueHandle,
    protocol::{wl_shm, wl_surface},
};

use super::state::WaylandState;
use crate::effects::magnifier::LensPlacement;
use crate::geometry::MonitorId;

/// Paint settings shared by every surface.
#[derive(Debug, Clone, Copy)]
pub(super) struct FrameOptions {
    pub(super) buffer_count: usize,
    pub(super) vsync: bool,
}

/// One layer surface, its buffer pool and sizing state.
pub(super) struct SurfaceState {
    layer_surface: LayerSurface,
    pool: Option<SlotPool>,
    /// Logical size from the last configure
    width: u32,
    height: u32,
    /// Integer buffer scale (1 unless the output is HiDPI)
    scale: i32,
    configured: bool,
    frame_callback_pending: bool,
    dirty: bool,
}

impl SurfaceState {
    pub(super) fn new(layer_surface: LayerSurface, scale: i32) -> Self {
        Self {
            layer_surface,
            pool: None,
            width: 0,
            height: 0,
            scale: scale.max(1),
            configured: false,
            frame_callback_pending: false,
            dirty: true,
        }
    }

    pub(super) fn layer_surface(&self) -> &LayerSurface {
        &self.layer_surface
    }

    pub(super) fn wl_surface(&self) -> &wl_surface::WlSurface {
        self.layer_surface.wl_surface()
    }

    pub(super) fn owns(&self, surface: &wl_surface::WlSurface) -> bool {
        self.wl_surface() == surface
    }

    /// Records a configure; returns true if the size changed.
    ///
    /// A new size invalidates the buffer pool.
    pub(super) fn configure(&mut self, width: u32, height: u32) -> bool {
        let changed = self.width != width || self.height != height;
        if changed {
            self.width = width;
            self.height = height;
            self.pool = None;
        }
        self.configured = true;
        self.dirty = true;
        changed
    }

    pub(super) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(super) fn set_scale(&mut self, scale: i32) {
        let scale = scale.max(1);
        if scale != self.scale {
            info!("Surface buffer scale {} -> {}", self.scale, scale);
            self.scale = scale;
            self.pool = None;
            self.dirty = true;
        }
    }

    pub(super) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(super) fn frame_done(&mut self) {
        self.frame_callback_pending = false;
    }

    /// Dirty, configured and not waiting on a frame callback.
    pub(super) fn ready_to_draw(&self, options: FrameOptions) -> bool {
        self.dirty
            && self.configured
            && self.width > 0
            && self.height > 0
            && (!self.frame_callback_pending || !options.vsync)
    }

    fn ensure_pool(&mut self, shm: &Shm, buffer_count: usize) -> Result<&mut SlotPool> {
        if self.pool.is_none() {
            let (bw, bh) = self.buffer_size();
            let pool_size = (bw * bh * 4) as usize * buffer_count;
            info!(
                "Creating SlotPool ({}x{} px, {} bytes, {} buffers)",
                bw, bh, pool_size, buffer_count
            );
            self.pool = Some(SlotPool::new(pool_size, shm).context("Failed to create slot pool")?);
        }
        self.pool
            .as_mut()
            .context("Buffer pool not initialized despite previous check")
    }

    fn buffer_size(&self) -> (i32, i32) {
        (
            self.width as i32 * self.scale,
            self.height as i32 * self.scale,
        )
    }

    /// Paints a full frame and commits it.
    ///
    /// `paint` draws in logical coordinates onto a cleared surface of
    /// `(width, height)`.
    pub(super) fn draw(
        &mut self,
        shm: &Shm,
        qh: &QueueHandle<WaylandState>,
        options: FrameOptions,
        paint: impl FnOnce(&cairo::Context, f64, f64),
    ) -> Result<()> {
        let (bw, bh) = self.buffer_size();
        let scale = self.scale;
        let (width, height) = (self.width as f64, self.height as f64);

        let (buffer, canvas) = self
            .ensure_pool(shm, options.buffer_count)?
            .create_buffer(bw, bh, bw * 4, wl_shm::Format::Argb8888)
            .context("Failed to create buffer")?;

        // SAFETY: `canvas` is the pool slot for this buffer, exactly bw * bh * 4
        // bytes with stride bw * 4, matching ARgb32. The cairo surface and context
        // are dropped below, before the buffer is attached and handed to the
        // compositor, and nothing else touches the slot meanwhile.
        let cairo_surface = unsafe {
            cairo::ImageSurface::create_for_data_unsafe(
                canvas.as_mut_ptr(),
                cairo::Format::ARgb32,
                bw,
                bh,
                bw * 4,
            )
            .context("Failed to create Cairo surface")?
        };
        let ctx = cairo::Context::new(&cairo_surface).context("Failed to create Cairo context")?;
        ctx.scale(scale as f64, scale as f64);
        paint(&ctx, width, height);
        cairo_surface.flush();
        drop(ctx);
        drop(cairo_surface);

        let wl_surface = self.layer_surface.wl_surface();
        wl_surface.set_buffer_scale(scale);
        wl_surface.attach(Some(buffer.wl_buffer()), 0, 0);
        wl_surface.damage_buffer(0, 0, bw, bh);
        if options.vsync {
            wl_surface.frame(qh, wl_surface.clone());
            self.frame_callback_pending = true;
        }
        wl_surface.commit();

        self.dirty = false;
        debug!("Committed {}x{} frame", bw, bh);
        Ok(())
    }
}

/// The annotation surface of one monitor.
pub(super) struct OverlaySurface {
    pub(super) monitor: MonitorId,
    pub(super) surface: SurfaceState,
}

impl OverlaySurface {
    /// Switches between taking input and letting it fall through.
    ///
    /// `keyboard` is whether this surface should hold exclusive keyboard focus
    /// while capturing.
    pub(super) fn set_input_mode(
        &self,
        compositor: &CompositorState,
        passthrough: bool,
        keyboard: bool,
    ) -> Result<()> {
        let layer = self.surface.layer_surface();
        if passthrough {
            let region = Region::new(compositor).context("Failed to create input region")?;
            layer.wl_surface().set_input_region(Some(region.wl_region()));
            layer.set_keyboard_interactivity(KeyboardInteractivity::None);
        } else {
            layer.wl_surface().set_input_region(None);
            layer.set_keyboard_interactivity(if keyboard {
                KeyboardInteractivity::Exclusive
            } else {
                KeyboardInteractivity::None
            });
        }
        layer.commit();
        Ok(())
    }
}

/// The magnifier lens, a small surface that follows the cursor on one monitor.
pub(super) struct LensSurface {
    pub(super) monitor: MonitorId,
    pub(super) placement: LensPlacement,
    pub(super) surface: SurfaceState,
}

impl LensSurface {
    /// Moves and resizes the lens; the compositor answers with a configure.
    pub(super) fn place(&mut self, placement: LensPlacement) {
        if placement == self.placement {
            return;
        }
        let layer = self.surface.layer_surface();
        layer.set_margin(placement.y, 0, 0, placement.x);
        layer.set_size(placement.size as u32, placement.size as u32);
        layer.commit();
        self.placement = placement;
        self.surface.mark_dirty();
    }
}

/// Host surface for the monitor-selection dialog.
pub(super) struct SelectionSurface {
    pub(super) view: crate::ui::MonitorSelectView,
    pub(super) surface: SurfaceState,
}
