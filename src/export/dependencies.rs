use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::export::{
    clipboard,
    file::{self, FileSaveConfig},
    types::ExportError,
};
use crate::notification;

/// Writes encoded exports to disk.
pub trait ExportFileSaver: Send + Sync {
    fn save(&self, png: &[u8], config: &FileSaveConfig) -> Result<PathBuf, ExportError>;
}

/// Puts encoded exports on the clipboard.
pub trait ExportClipboard: Send + Sync {
    fn copy(&self, png: &[u8]) -> Result<(), ExportError>;
}

/// Reports the outcome of an export to the user.
#[async_trait]
pub trait ExportNotifier: Send + Sync {
    async fn notify(&self, summary: &str, body: &str);
}

/// Everything the export pipeline talks to. Each part can be mocked in tests.
#[derive(Clone)]
pub struct ExportDependencies {
    pub saver: Arc<dyn ExportFileSaver>,
    pub clipboard: Arc<dyn ExportClipboard>,
    pub notifier: Arc<dyn ExportNotifier>,
}

impl Default for ExportDependencies {
    fn default() -> Self {
        Self {
            saver: Arc::new(DiskSaver),
            clipboard: Arc::new(WaylandClipboard),
            notifier: Arc::new(DesktopNotifier),
        }
    }
}

struct DiskSaver;
struct WaylandClipboard;
struct DesktopNotifier;

impl ExportFileSaver for DiskSaver {
    fn save(&self, png: &[u8], config: &FileSaveConfig) -> Result<PathBuf, ExportError> {
        file::save_png(png, config)
    }
}

impl ExportClipboard for WaylandClipboard {
    fn copy(&self, png: &[u8]) -> Result<(), ExportError> {
        clipboard::copy_png(png)
    }
}

#[async_trait]
impl ExportNotifier for DesktopNotifier {
    async fn notify(&self, summary: &str, body: &str) {
        if let Err(e) = notification::send_notification(summary, body, None).await {
            log::warn!("Failed to send export notification: {}", e);
        }
    }
}
