//! Saving exported PNGs to disk.

use super::types::ExportError;
use crate::config::ExportConfig;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Where and under which name exports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSaveConfig {
    pub directory: PathBuf,
    /// chrono format string, without extension
    pub filename_template: String,
}

impl FileSaveConfig {
    /// `None` when saving is disabled (empty directory).
    pub fn from_config(config: &ExportConfig) -> Option<Self> {
        let directory = config.save_directory.trim();
        if directory.is_empty() {
            return None;
        }
        Some(Self {
            directory: expand_tilde(directory),
            filename_template: config.filename_template.clone(),
        })
    }
}

/// Formats the template with the local time and appends `.png`.
pub fn generate_filename(template: &str) -> String {
    format!("{}.png", Local::now().format(template))
}

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Picks a path in `directory` that does not exist yet, adding `-N` before
/// the extension on collisions.
fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let candidate = directory.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let stem = filename.strip_suffix(".png").unwrap_or(filename);
    (1..)
        .map(|n| directory.join(format!("{}-{}.png", stem, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Writes the PNG with owner-only permissions and returns its path.
pub fn save_png(png: &[u8], config: &FileSaveConfig) -> Result<PathBuf, ExportError> {
    if !config.directory.exists() {
        log::info!("Creating export directory {}", config.directory.display());
        fs::create_dir_all(&config.directory).map_err(|e| {
            ExportError::Save(format!(
                "cannot create {}: {}",
                config.directory.display(),
                e
            ))
        })?;
    }

    let path = unique_path(
        &config.directory,
        &generate_filename(&config.filename_template),
    );
    log::info!("Saving export to {} ({} bytes)", path.display(), png.len());
    fs::write(&path, png)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_template_and_png_extension() {
        let name = generate_filename("shot_%Y");
        assert!(name.starts_with("shot_"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "shot_2026.png".len());
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/abs/dir"), PathBuf::from("/abs/dir"));
    }

    #[test]
    fn empty_directory_disables_saving() {
        let config = ExportConfig {
            save_directory: "  ".to_string(),
            ..ExportConfig::default()
        };
        assert!(FileSaveConfig::from_config(&config).is_none());
        assert!(FileSaveConfig::from_config(&ExportConfig::default()).is_some());
    }

    #[test]
    fn saves_with_private_permissions_and_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileSaveConfig {
            directory: dir.path().join("nested"),
            filename_template: "fixed".to_string(),
        };

        let first = save_png(b"one", &config).unwrap();
        let second = save_png(b"two", &config).unwrap();

        assert_eq!(first.file_name().unwrap(), "fixed.png");
        assert_eq!(second.file_name().unwrap(), "fixed-1.png");
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&first).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
