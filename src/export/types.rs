//! Export results and errors.

use std::path::PathBuf;
use thiserror::Error;

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Size of the encoded PNG
    pub bytes: usize,
    pub saved_path: Option<PathBuf>,
    pub copied_to_clipboard: bool,
}

impl ExportResult {
    /// One-line description for logs and notifications.
    pub fn summary(&self) -> String {
        match (&self.saved_path, self.copied_to_clipboard) {
            (Some(path), true) => {
                format!("Copied to clipboard and saved to {}", path.display())
            }
            (Some(path), false) => format!("Saved to {}", path.display()),
            (None, true) => "Copied to clipboard".to_string(),
            (None, false) => "Encoded but not delivered".to_string(),
        }
    }
}

/// Final state of one export request.
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Success(ExportResult),
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),

    #[error("Failed to save export: {0}")]
    Save(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export worker is not running")]
    WorkerGone,
}
