//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::draw::{Color, FontDescriptor, Opacity, color::*};
use crate::input::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stroke color per shape kind.
///
/// Colors are looked up when a shape is committed, so a reload only affects
/// shapes drawn afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorsConfig {
    #[serde(default = "default_line_color")]
    pub line: ColorSpec,

    #[serde(default = "default_arrow_color")]
    pub arrow: ColorSpec,

    #[serde(default = "default_rectangle_color")]
    pub rectangle: ColorSpec,

    #[serde(default = "default_ellipse_color")]
    pub ellipse: ColorSpec,

    #[serde(default = "default_text_color")]
    pub text: ColorSpec,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            line: default_line_color(),
            arrow: default_arrow_color(),
            rectangle: default_rectangle_color(),
            ellipse: default_ellipse_color(),
            text: default_text_color(),
        }
    }
}

/// Resolved color-per-kind map handed to the input state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolColors {
    pub line: Color,
    pub arrow: Color,
    pub rectangle: Color,
    pub ellipse: Color,
    pub text: Color,
}

impl ToolColors {
    pub fn for_tool(&self, tool: Tool) -> Color {
        match tool {
            Tool::Line => self.line,
            Tool::Arrow => self.arrow,
            Tool::Rectangle => self.rectangle,
            Tool::Ellipse => self.ellipse,
            Tool::Text => self.text,
        }
    }
}

impl Default for ToolColors {
    fn default() -> Self {
        ColorsConfig::default().resolve()
    }
}

impl ColorsConfig {
    pub fn resolve(&self) -> ToolColors {
        ToolColors {
            line: self.line.to_color_or(YELLOW),
            arrow: self.arrow.to_color_or(GREEN),
            rectangle: self.rectangle.to_color_or(DEEP_PINK),
            ellipse: self.ellipse.to_color_or(DEEP_SKY_BLUE),
            text: self.text.to_color_or(PURPLE),
        }
    }
}

/// Drawing-related settings.
///
/// Controls the tool, stroke and font used when the overlay first opens.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Tool active at startup (line, arrow, rectangle, ellipse, text)
    #[serde(default = "default_tool")]
    pub default_tool: Tool,

    /// Stroke width in pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Font family name for text annotations (e.g., "Sans", "HanziPen TC")
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font weight (e.g., "normal", "bold", "light", 400, 700)
    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    #[serde(default = "default_font_style")]
    pub font_style: String,

    /// Font size for text annotations in points (valid range: 8.0 - 72.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Arrowhead barb length in pixels (valid range: 5.0 - 50.0)
    #[serde(default = "default_arrow_head_length")]
    pub arrow_head_length: f64,

    /// Angle between barb and shaft in degrees (valid range: 15.0 - 60.0)
    #[serde(default = "default_arrow_head_angle")]
    pub arrow_head_angle: f64,

    /// Opacity level at startup (full, half, quarter)
    #[serde(default)]
    pub default_opacity: Opacity,

    /// Whether rectangles and ellipses start filled
    #[serde(default)]
    pub fill_shapes: bool,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_tool: default_tool(),
            stroke_width: default_stroke_width(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
            font_size: default_font_size(),
            arrow_head_length: default_arrow_head_length(),
            arrow_head_angle: default_arrow_head_angle(),
            default_opacity: Opacity::default(),
            fill_shapes: false,
        }
    }
}

impl DrawingConfig {
    pub fn font(&self) -> FontDescriptor {
        FontDescriptor::new(
            self.font_family.clone(),
            self.font_weight.clone(),
            self.font_style.clone(),
        )
    }
}

/// Cursor effect tuning.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EffectsConfig {
    /// Halo radius in pixels
    #[serde(default = "default_halo_radius")]
    pub halo_radius: f64,

    /// Turn the halo on shortly after the overlay starts
    #[serde(default = "default_halo_on_startup")]
    pub halo_on_startup: bool,

    /// Delay before the startup halo appears
    #[serde(default = "default_halo_startup_delay_ms")]
    pub halo_startup_delay_ms: u64,

    /// Radius of the lit circle in pixels
    #[serde(default = "default_flashlight_radius")]
    pub flashlight_radius: f64,

    /// Alpha of the darkening outside the flashlight (0.0 - 1.0)
    #[serde(default = "default_flashlight_dim")]
    pub flashlight_dim: f64,

    /// Radius of the clear cutout in pixels
    #[serde(default = "default_mask_radius")]
    pub mask_radius: f64,

    /// Alpha of the mask (0 - 255)
    #[serde(default = "default_mask_alpha")]
    pub mask_alpha: u8,

    /// Lens radii for the three magnifier sizes
    #[serde(default = "default_magnifier_radii")]
    pub magnifier_radii: [f64; 3],

    /// Zoom factor applied to the sampled screen content
    #[serde(default = "default_magnifier_zoom")]
    pub magnifier_zoom: f64,

    /// Minimum interval between screen samples
    #[serde(default = "default_magnifier_sample_interval_ms")]
    pub magnifier_sample_interval_ms: u64,

    /// Repaint interval while any effect is active
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            halo_radius: default_halo_radius(),
            halo_on_startup: default_halo_on_startup(),
            halo_startup_delay_ms: default_halo_startup_delay_ms(),
            flashlight_radius: default_flashlight_radius(),
            flashlight_dim: default_flashlight_dim(),
            mask_radius: default_mask_radius(),
            mask_alpha: default_mask_alpha(),
            magnifier_radii: default_magnifier_radii(),
            magnifier_zoom: default_magnifier_zoom(),
            magnifier_sample_interval_ms: default_magnifier_sample_interval_ms(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// UI chrome preferences.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UiConfig {
    /// Allow the floating menu to be shown with its toggle key
    #[serde(default = "default_true")]
    pub floating_menu_enabled: bool,

    /// Hide the menu this long after a button was used
    #[serde(default = "default_menu_auto_hide_ms")]
    pub menu_auto_hide_ms: u64,

    /// Fade in/out duration
    #[serde(default = "default_menu_fade_ms")]
    pub menu_fade_ms: u64,

    /// Show the tint and badge while input passes through
    #[serde(default = "default_true")]
    pub passthrough_indicator: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            floating_menu_enabled: true,
            menu_auto_hide_ms: default_menu_auto_hide_ms(),
            menu_fade_ms: default_menu_fade_ms(),
            passthrough_indicator: true,
        }
    }
}

/// Export destinations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Copy the flattened PNG to the clipboard
    #[serde(default = "default_true")]
    pub copy_to_clipboard: bool,

    /// Directory for saved PNGs; empty disables saving. `~` expands to $HOME.
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// chrono format string for file names (without extension)
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Send a desktop notification when an export finishes
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            copy_to_clipboard: true,
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            notify: true,
        }
    }
}

/// Performance tuning options.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceConfig {
    /// Number of shm buffers per surface (valid range: 2 - 4)
    #[serde(default = "default_buffer_count")]
    pub buffer_count: u32,

    /// Wait for frame callbacks before drawing the next frame
    #[serde(default = "default_true")]
    pub enable_vsync: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            buffer_count: default_buffer_count(),
            enable_vsync: true,
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_line_color() -> ColorSpec {
    ColorSpec::Name("#FFFF00".to_string())
}

fn default_arrow_color() -> ColorSpec {
    ColorSpec::Name("#00FF00".to_string())
}

fn default_rectangle_color() -> ColorSpec {
    ColorSpec::Name("#FF1493".to_string())
}

fn default_ellipse_color() -> ColorSpec {
    ColorSpec::Name("#00BFFF".to_string())
}

fn default_text_color() -> ColorSpec {
    ColorSpec::Name("#AA26FF".to_string())
}

fn default_tool() -> Tool {
    Tool::Arrow
}

fn default_stroke_width() -> f64 {
    4.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_weight() -> String {
    "bold".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_font_size() -> f64 {
    36.0
}

fn default_arrow_head_length() -> f64 {
    14.0
}

fn default_arrow_head_angle() -> f64 {
    45.0
}

fn default_halo_radius() -> f64 {
    20.0
}

fn default_halo_on_startup() -> bool {
    true
}

fn default_halo_startup_delay_ms() -> u64 {
    1000
}

fn default_flashlight_radius() -> f64 {
    80.0
}

fn default_flashlight_dim() -> f64 {
    0.35
}

fn default_mask_radius() -> f64 {
    100.0
}

fn default_mask_alpha() -> u8 {
    128
}

fn default_magnifier_radii() -> [f64; 3] {
    [120.0, 240.0, 480.0]
}

fn default_magnifier_zoom() -> f64 {
    2.0
}

fn default_magnifier_sample_interval_ms() -> u64 {
    250
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_menu_auto_hide_ms() -> u64 {
    1500
}

fn default_menu_fade_ms() -> u64 {
    300
}

fn default_save_directory() -> String {
    "~/Pictures/annotateit".to_string()
}

fn default_filename_template() -> String {
    "annotateit_%Y-%m-%d_%H%M%S".to_string()
}

fn default_buffer_count() -> u32 {
    3
}
