//! Configuration file support for annotateit.
//!
//! Settings live in `~/.config/annotateit/config.toml`. Every field has a
//! default, so a missing file or a partial one both work. Values outside their
//! valid range are clamped with a warning instead of rejecting the file.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{
    ColorsConfig, DrawingConfig, EffectsConfig, ExportConfig, PerformanceConfig, ToolColors,
    UiConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Commented example written by `--init-config`.
const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");

/// Root of the configuration file.
///
/// # Example TOML
/// ```toml
/// [colors]
/// rectangle = "#FF1493"
/// text = [170, 38, 255]
///
/// [drawing]
/// default_tool = "rectangle"
/// stroke_width = 6.0
///
/// [effects]
/// halo_on_startup = false
///
/// [keybindings]
/// toggle_passthrough = ["Ctrl+\\", "F12"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Stroke color for each shape kind
    #[serde(default)]
    pub colors: ColorsConfig,

    /// Tool, stroke, font and arrow defaults
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Halo, flashlight, mouse mask and magnifier tuning
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Floating menu and mode indicators
    #[serde(default)]
    pub ui: UiConfig,

    /// Clipboard and file export
    #[serde(default)]
    pub export: ExportConfig,

    /// Buffering and frame pacing
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Key bindings per action
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `stroke_width`: 1.0 - 20.0
    /// - `font_size`: 8.0 - 72.0
    /// - `arrow_head_length`: 5.0 - 50.0
    /// - `arrow_head_angle`: 15.0 - 60.0
    /// - effect radii: 5.0 - 1000.0, `flashlight_dim`: 0.0 - 1.0,
    ///   `magnifier_zoom`: 1.0 - 8.0
    /// - `magnifier_sample_interval_ms`: 50 - 5000, `frame_interval_ms`: 8 - 100
    /// - `buffer_count`: 2 - 4
    pub fn validate_and_clamp(&mut self) {
        clamp_f64("stroke_width", &mut self.drawing.stroke_width, 1.0, 20.0);
        clamp_f64("font_size", &mut self.drawing.font_size, 8.0, 72.0);
        clamp_f64(
            "arrow_head_length",
            &mut self.drawing.arrow_head_length,
            5.0,
            50.0,
        );
        clamp_f64(
            "arrow_head_angle",
            &mut self.drawing.arrow_head_angle,
            15.0,
            60.0,
        );

        let valid_weight = matches!(
            self.drawing.font_weight.to_lowercase().as_str(),
            "normal" | "bold" | "light" | "ultralight" | "heavy" | "ultrabold"
        ) || self
            .drawing
            .font_weight
            .parse::<u32>()
            .is_ok_and(|w| (100..=900).contains(&w));

        if !valid_weight {
            warn!(
                "Invalid font_weight '{}', falling back to 'bold'",
                self.drawing.font_weight
            );
            self.drawing.font_weight = "bold".to_string();
        }

        if !matches!(
            self.drawing.font_style.to_lowercase().as_str(),
            "normal" | "italic" | "oblique"
        ) {
            warn!(
                "Invalid font_style '{}', falling back to 'normal'",
                self.drawing.font_style
            );
            self.drawing.font_style = "normal".to_string();
        }

        let effects = &mut self.effects;
        clamp_f64("halo_radius", &mut effects.halo_radius, 5.0, 1000.0);
        clamp_f64(
            "flashlight_radius",
            &mut effects.flashlight_radius,
            5.0,
            1000.0,
        );
        clamp_f64("flashlight_dim", &mut effects.flashlight_dim, 0.0, 1.0);
        clamp_f64("mask_radius", &mut effects.mask_radius, 5.0, 1000.0);
        for radius in effects.magnifier_radii.iter_mut() {
            clamp_f64("magnifier_radii", radius, 5.0, 1000.0);
        }
        clamp_f64("magnifier_zoom", &mut effects.magnifier_zoom, 1.0, 8.0);
        clamp_u64(
            "magnifier_sample_interval_ms",
            &mut effects.magnifier_sample_interval_ms,
            50,
            5000,
        );
        clamp_u64(
            "frame_interval_ms",
            &mut effects.frame_interval_ms,
            8,
            100,
        );

        if !(2..=4).contains(&self.performance.buffer_count) {
            warn!(
                "Invalid buffer_count {}, clamping to 2-4 range",
                self.performance.buffer_count
            );
            self.performance.buffer_count = self.performance.buffer_count.clamp(2, 4);
        }

        if let Err(err) = self.keybindings.build_action_map() {
            warn!("Invalid keybindings ({}), using defaults", err);
            self.keybindings = KeybindingsConfig::default();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("annotateit");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Loads the config at startup, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config: {:#}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Writes the commented example config to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists or it cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        Self::create_default_file_at(&config_path)?;
        Ok(config_path)
    }

    fn create_default_file_at(config_path: &Path) -> Result<()> {
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, EXAMPLE_CONFIG)?;

        info!("Created default config at {}", config_path.display());
        Ok(())
    }

    /// JSON Schema describing the whole file.
    pub fn json_schema() -> Schema {
        schema_for!(Config)
    }
}

fn clamp_f64(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        warn!(
            "Invalid {} {:.2}, clamping to {:.1}-{:.1} range",
            name, *value, min, max
        );
        // NaN falls through clamp unchanged
        *value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
    }
}

fn clamp_u64(name: &str, value: &mut u64, min: u64, max: u64) {
    if !(min..=max).contains(value) {
        warn!(
            "Invalid {} {}, clamping to {}-{} range",
            name, *value, min, max
        );
        *value = (*value).clamp(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Opacity;
    use crate::draw::color::{DEEP_PINK, YELLOW};
    use crate::input::Tool;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.drawing.default_tool, Tool::Arrow);
        assert_eq!(config.effects.magnifier_radii, [120.0, 240.0, 480.0]);
        assert_eq!(config.colors.resolve().rectangle, DEEP_PINK);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[drawing]
default_tool = "rectangle"
default_opacity = "quarter"

[colors]
arrow = "yellow"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.drawing.default_tool, Tool::Rectangle);
        assert_eq!(config.drawing.default_opacity, Opacity::Quarter);
        assert_eq!(config.drawing.stroke_width, 4.0);
        assert_eq!(config.colors.resolve().arrow, YELLOW);
        assert!(config.effects.halo_on_startup);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[drawing]
stroke_width = 99.0
font_size = 2.0
font_weight = "enormous"

[effects]
flashlight_dim = 3.0
frame_interval_ms = 1

[performance]
buffer_count = 9
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.drawing.stroke_width, 20.0);
        assert_eq!(config.drawing.font_size, 8.0);
        assert_eq!(config.drawing.font_weight, "bold");
        assert_eq!(config.effects.flashlight_dim, 1.0);
        assert_eq!(config.effects.frame_interval_ms, 8);
        assert_eq!(config.performance.buffer_count, 4);
    }

    #[test]
    fn conflicting_keybindings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[keybindings]
undo = ["L"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.keybindings.undo, vec!["Ctrl+Z".to_string()]);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[drawing\nstroke_width = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn serialized_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.drawing.default_tool = Tool::Ellipse;
        config.export.save_directory = String::new();
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.drawing.default_tool, Tool::Ellipse);
        assert!(loaded.export.save_directory.is_empty());
    }

    #[test]
    fn example_config_parses_and_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annotateit").join("config.toml");
        Config::create_default_file_at(&path).unwrap();
        assert!(Config::load_from(&path).is_ok());
        assert!(Config::create_default_file_at(&path).is_err());
    }

    #[test]
    fn schema_names_every_section() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in [
            "colors",
            "drawing",
            "effects",
            "ui",
            "export",
            "performance",
            "keybindings",
        ] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
