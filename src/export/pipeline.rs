use std::{fmt, path::PathBuf, sync::Arc};

use tokio::task;

use crate::export::{
    FlatImage,
    dependencies::{ExportClipboard, ExportDependencies, ExportFileSaver},
    file::FileSaveConfig,
    types::{ExportError, ExportResult},
};
use crate::geometry::MonitorId;

#[derive(Clone)]
pub(crate) struct ExportRequest {
    pub(crate) monitor: MonitorId,
    pub(crate) image: FlatImage,
    pub(crate) copy_to_clipboard: bool,
    pub(crate) save: Option<FileSaveConfig>,
    pub(crate) notify: bool,
}

impl fmt::Debug for ExportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportRequest")
            .field("monitor", &self.monitor)
            .field("size", &(self.image.width, self.image.height))
            .field("copy_to_clipboard", &self.copy_to_clipboard)
            .field("save", &self.save.as_ref().map(|cfg| &cfg.directory))
            .field("notify", &self.notify)
            .finish()
    }
}

/// Encodes, saves, copies. A failed save fails the export; a failed copy only
/// does when the clipboard was the sole destination.
pub(crate) async fn perform_export(
    request: ExportRequest,
    dependencies: Arc<ExportDependencies>,
) -> Result<ExportResult, ExportError> {
    log::info!("Exporting monitor {}", request.monitor);

    let image = request.image;
    let png = task::spawn_blocking(move || image.encode_png())
        .await
        .map_err(|e| ExportError::Encode(format!("Encode task failed: {}", e)))??;
    log::debug!("Encoded export: {} bytes", png.len());

    let png = Arc::new(png);

    let saved_path = match request.save {
        Some(config) => Some(save_png(Arc::clone(&dependencies.saver), Arc::clone(&png), config).await?),
        None => None,
    };

    let copied_to_clipboard = if request.copy_to_clipboard {
        match copy_png(Arc::clone(&dependencies.clipboard), Arc::clone(&png)).await {
            Ok(()) => true,
            Err(e) if saved_path.is_none() => return Err(e),
            Err(e) => {
                log::error!("Clipboard copy failed, file was still saved: {}", e);
                false
            }
        }
    } else {
        false
    };

    Ok(ExportResult {
        bytes: png.len(),
        saved_path,
        copied_to_clipboard,
    })
}

async fn save_png(
    saver: Arc<dyn ExportFileSaver>,
    png: Arc<Vec<u8>>,
    config: FileSaveConfig,
) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || saver.save(&png, &config))
        .await
        .map_err(|e| ExportError::Save(format!("Save task failed: {}", e)))?
}

async fn copy_png(clipboard: Arc<dyn ExportClipboard>, png: Arc<Vec<u8>>) -> Result<(), ExportError> {
    task::spawn_blocking(move || clipboard.copy(&png))
        .await
        .map_err(|e| ExportError::Clipboard(format!("Clipboard task failed: {}", e)))?
}
