//! Wayland clipboard delivery for exported PNGs.

use super::types::ExportError;
use std::io::Write;
use std::process::{Command, Stdio};
use wl_clipboard_rs::copy::{MimeType, Options, ServeRequests, Source};

const PNG_MIME: &str = "image/png";

/// Puts PNG bytes on the clipboard.
///
/// The `wl-copy` command keeps serving the data after we exit, so it is tried
/// first; `wl-clipboard-rs` is the fallback when the command is missing or fails.
pub fn copy_png(png: &[u8]) -> Result<(), ExportError> {
    log::debug!("Copying {} bytes to clipboard", png.len());

    match copy_via_command(png) {
        Ok(()) => {
            log::info!("Copied export to clipboard via wl-copy");
            Ok(())
        }
        Err(cmd_err) => {
            log::warn!("wl-copy failed ({}), trying wl-clipboard-rs", cmd_err);
            copy_via_library(png).map_err(|lib_err| {
                ExportError::Clipboard(format!(
                    "wl-copy: {}; wl-clipboard-rs: {}",
                    cmd_err, lib_err
                ))
            })?;
            log::info!("Copied export to clipboard via wl-clipboard-rs");
            Ok(())
        }
    }
}

fn copy_via_library(png: &[u8]) -> Result<(), ExportError> {
    let mut opts = Options::new();
    opts.serve_requests(ServeRequests::Only(1));
    opts.copy(
        Source::Bytes(png.into()),
        MimeType::Specific(PNG_MIME.to_string()),
    )
    .map_err(|e| ExportError::Clipboard(e.to_string()))
}

fn copy_via_command(png: &[u8]) -> Result<(), ExportError> {
    let mut child = Command::new("wl-copy")
        .args(["--type", PNG_MIME])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExportError::Clipboard(format!("cannot spawn wl-copy: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(png)
            .map_err(|e| ExportError::Clipboard(format!("cannot write to wl-copy: {}", e)))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ExportError::Clipboard(format!("cannot wait for wl-copy: {}", e)))?;

    if !output.status.success() {
        return Err(ExportError::Clipboard(format!(
            "wl-copy exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
