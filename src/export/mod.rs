//! Exporting annotations as PNG.
//!
//! The loop thread flattens one monitor's shapes (plus the current mouse mask
//! and flashlight) into a [`FlatImage`]. An [`ExportManager`] then encodes it,
//! copies it to the clipboard and saves it on a Tokio worker.

pub mod clipboard;
pub mod file;
pub mod types;

mod dependencies;
mod manager;
mod pipeline;

pub use dependencies::{ExportClipboard, ExportDependencies, ExportFileSaver, ExportNotifier};
pub use file::FileSaveConfig;
pub use manager::ExportManager;
pub use types::{ExportError, ExportOutcome, ExportResult};

use crate::draw::{Canvas, TRANSPARENT, render_shapes};
use crate::effects::{EffectState, paint_effects};
use crate::geometry::{self, Monitor, Point};
use std::io::Cursor;

/// Raw ARGB32 pixels detached from cairo so they can cross to a worker thread.
#[derive(Debug, Clone)]
pub struct FlatImage {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub data: Vec<u8>,
}

impl FlatImage {
    pub fn from_surface(mut surface: cairo::ImageSurface) -> Result<Self, ExportError> {
        surface.flush();
        let width = surface.width();
        let height = surface.height();
        let stride = surface.stride();
        let data = surface
            .data()
            .map_err(|e| ExportError::Encode(format!("Surface is not readable: {}", e)))?
            .to_vec();
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// PNG bytes of the image.
    pub fn encode_png(self) -> Result<Vec<u8>, ExportError> {
        let surface = cairo::ImageSurface::create_for_data(
            self.data,
            cairo::Format::ARgb32,
            self.width,
            self.height,
            self.stride,
        )
        .map_err(|e| ExportError::Encode(e.to_string()))?;

        let mut buffer = Cursor::new(Vec::new());
        surface
            .write_to_png(&mut buffer)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

/// Paints `monitor`'s shapes and the cursor effects onto a transparent
/// surface of the monitor's logical size.
///
/// The halo is left out. Effects are only painted when `cursor` (global
/// coordinates) is known.
pub fn flatten(
    canvas: &Canvas,
    effects: &EffectState,
    monitor: &Monitor,
    cursor: Option<Point>,
) -> Result<cairo::ImageSurface, ExportError> {
    let surface =
        cairo::ImageSurface::create(cairo::Format::ARgb32, monitor.width, monitor.height)
            .map_err(|e| ExportError::Encode(format!("Failed to create surface: {}", e)))?;
    let ctx = cairo::Context::new(&surface)
        .map_err(|e| ExportError::Encode(format!("Failed to create context: {}", e)))?;

    render_shapes(&ctx, canvas.document().shapes_on(&monitor.id));

    if let Some(cursor) = cursor {
        let local = geometry::to_monitor_local(cursor, monitor);
        paint_effects(
            &ctx,
            effects,
            (local.x as f64, local.y as f64),
            (monitor.width as f64, monitor.height as f64),
            TRANSPARENT,
            false,
        );
    }

    drop(ctx);
    Ok(surface)
}
