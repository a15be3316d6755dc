//! Keybinding configuration types and parsing.
//!
//! Every user-facing operation is an [`Action`]; the keyboard, the floating
//! menu and the signal handler all funnel into the same action dispatch.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Tool selection
    SelectLine,
    SelectArrow,
    SelectRectangle,
    SelectEllipse,
    SelectText,

    // Cursor effects
    ToggleHalo,
    ToggleFlashlight,
    ToggleMouseMask,
    ToggleMagnifier,
    CycleMagnifierSize,

    // Style modifiers for the next shape
    ToggleFill,
    CycleOpacity,

    // Document
    ClearCanvas,
    Undo,
    Redo,
    Export,

    // Session
    ReloadConfig,
    ToggleMenu,
    TogglePassthrough,
    Exit,
}

impl Action {
    /// Short label used in logs and the floating menu tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Action::SelectLine => "Line",
            Action::SelectArrow => "Arrow",
            Action::SelectRectangle => "Rectangle",
            Action::SelectEllipse => "Ellipse",
            Action::SelectText => "Text",
            Action::ToggleHalo => "Halo",
            Action::ToggleFlashlight => "Flashlight",
            Action::ToggleMouseMask => "Mouse mask",
            Action::ToggleMagnifier => "Magnifier",
            Action::CycleMagnifierSize => "Magnifier size",
            Action::ToggleFill => "Fill",
            Action::CycleOpacity => "Opacity",
            Action::ClearCanvas => "Clear",
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::Export => "Export",
            Action::ReloadConfig => "Reload config",
            Action::ToggleMenu => "Menu",
            Action::TogglePassthrough => "Pass-through",
            Action::Exit => "Exit",
        }
    }
}

/// A single keybinding: a key with optional modifiers.
///
/// Single-character keys are stored uppercase so `"ctrl+z"` and `"Ctrl+Z"`
/// are the same binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z", "Shift+F" or "Escape".
    ///
    /// Modifiers can appear in any order and spaces around `+` are ignored.
    /// A trailing `+` binds the plus key itself ("Ctrl++").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into ["Ctrl", "", ""]; the empty parts are the plus key
        let key = key_parts.join("+");
        let key = if key.is_empty() || key == "+" {
            "+".to_string()
        } else if key.chars().count() == 1 {
            key.to_uppercase()
        } else {
            key
        };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// Each action can have multiple keybindings:
/// ```toml
/// [keybindings]
/// exit = ["Escape", "Q"]
/// redo = ["Ctrl+Y", "Ctrl+Shift+Z"]
/// toggle_passthrough = ["Ctrl+\\"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_select_line")]
    pub select_line: Vec<String>,

    #[serde(default = "default_select_arrow")]
    pub select_arrow: Vec<String>,

    #[serde(default = "default_select_rectangle")]
    pub select_rectangle: Vec<String>,

    #[serde(default = "default_select_ellipse")]
    pub select_ellipse: Vec<String>,

    #[serde(default = "default_select_text")]
    pub select_text: Vec<String>,

    #[serde(default = "default_toggle_halo")]
    pub toggle_halo: Vec<String>,

    #[serde(default = "default_toggle_flashlight")]
    pub toggle_flashlight: Vec<String>,

    #[serde(default = "default_toggle_mouse_mask")]
    pub toggle_mouse_mask: Vec<String>,

    #[serde(default = "default_toggle_magnifier")]
    pub toggle_magnifier: Vec<String>,

    #[serde(default = "default_cycle_magnifier_size")]
    pub cycle_magnifier_size: Vec<String>,

    #[serde(default = "default_toggle_fill")]
    pub toggle_fill: Vec<String>,

    #[serde(default = "default_cycle_opacity")]
    pub cycle_opacity: Vec<String>,

    #[serde(default = "default_clear_canvas")]
    pub clear_canvas: Vec<String>,

    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_export")]
    pub export: Vec<String>,

    #[serde(default = "default_reload_config")]
    pub reload_config: Vec<String>,

    #[serde(default = "default_toggle_menu")]
    pub toggle_menu: Vec<String>,

    #[serde(default = "default_toggle_passthrough")]
    pub toggle_passthrough: Vec<String>,

    #[serde(default = "default_exit")]
    pub exit: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            select_line: default_select_line(),
            select_arrow: default_select_arrow(),
            select_rectangle: default_select_rectangle(),
            select_ellipse: default_select_ellipse(),
            select_text: default_select_text(),
            toggle_halo: default_toggle_halo(),
            toggle_flashlight: default_toggle_flashlight(),
            toggle_mouse_mask: default_toggle_mouse_mask(),
            toggle_magnifier: default_toggle_magnifier(),
            cycle_magnifier_size: default_cycle_magnifier_size(),
            toggle_fill: default_toggle_fill(),
            cycle_opacity: default_cycle_opacity(),
            clear_canvas: default_clear_canvas(),
            undo: default_undo(),
            redo: default_redo(),
            export: default_export(),
            reload_config: default_reload_config(),
            toggle_menu: default_toggle_menu(),
            toggle_passthrough: default_toggle_passthrough(),
            exit: default_exit(),
        }
    }
}

impl KeybindingsConfig {
    fn bindings(&self) -> [(&[String], Action); 20] {
        [
            (self.select_line.as_slice(), Action::SelectLine),
            (self.select_arrow.as_slice(), Action::SelectArrow),
            (self.select_rectangle.as_slice(), Action::SelectRectangle),
            (self.select_ellipse.as_slice(), Action::SelectEllipse),
            (self.select_text.as_slice(), Action::SelectText),
            (self.toggle_halo.as_slice(), Action::ToggleHalo),
            (self.toggle_flashlight.as_slice(), Action::ToggleFlashlight),
            (self.toggle_mouse_mask.as_slice(), Action::ToggleMouseMask),
            (self.toggle_magnifier.as_slice(), Action::ToggleMagnifier),
            (self.cycle_magnifier_size.as_slice(), Action::CycleMagnifierSize),
            (self.toggle_fill.as_slice(), Action::ToggleFill),
            (self.cycle_opacity.as_slice(), Action::CycleOpacity),
            (self.clear_canvas.as_slice(), Action::ClearCanvas),
            (self.undo.as_slice(), Action::Undo),
            (self.redo.as_slice(), Action::Redo),
            (self.export.as_slice(), Action::Export),
            (self.reload_config.as_slice(), Action::ReloadConfig),
            (self.toggle_menu.as_slice(), Action::ToggleMenu),
            (self.toggle_passthrough.as_slice(), Action::TogglePassthrough),
            (self.exit.as_slice(), Action::Exit),
        ]
    }

    /// Build a lookup map from keybindings to actions.
    ///
    /// Returns an error if any keybinding string is invalid or if the same
    /// binding is assigned to two actions.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let mut insert_binding = |binding_str: &str, action: Action| -> Result<(), String> {
            let binding = KeyBinding::parse(binding_str)?;
            if let Some(existing_action) = map.insert(binding, action) {
                if existing_action != action {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing_action, action
                    ));
                }
            }
            Ok(())
        };

        for (strings, action) in self.bindings() {
            for binding_str in strings {
                insert_binding(binding_str, action)?;
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_select_line() -> Vec<String> {
    vec!["L".to_string()]
}

fn default_select_arrow() -> Vec<String> {
    vec!["A".to_string()]
}

fn default_select_rectangle() -> Vec<String> {
    vec!["R".to_string()]
}

fn default_select_ellipse() -> Vec<String> {
    vec!["E".to_string()]
}

fn default_select_text() -> Vec<String> {
    vec!["T".to_string()]
}

fn default_toggle_halo() -> Vec<String> {
    vec!["H".to_string()]
}

fn default_toggle_flashlight() -> Vec<String> {
    vec!["Shift+F".to_string()]
}

fn default_toggle_mouse_mask() -> Vec<String> {
    vec!["M".to_string()]
}

fn default_toggle_magnifier() -> Vec<String> {
    vec!["Z".to_string()]
}

fn default_cycle_magnifier_size() -> Vec<String> {
    vec!["Shift+Z".to_string()]
}

fn default_toggle_fill() -> Vec<String> {
    vec!["F".to_string()]
}

fn default_cycle_opacity() -> Vec<String> {
    vec!["O".to_string()]
}

fn default_clear_canvas() -> Vec<String> {
    vec!["C".to_string()]
}

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec!["Ctrl+Y".to_string(), "Ctrl+Shift+Z".to_string()]
}

fn default_export() -> Vec<String> {
    vec!["X".to_string()]
}

fn default_reload_config() -> Vec<String> {
    vec!["Ctrl+,".to_string()]
}

fn default_toggle_menu() -> Vec<String> {
    vec!["Tab".to_string()]
}

fn default_toggle_passthrough() -> Vec<String> {
    vec!["Ctrl+\\".to_string()]
}

fn default_exit() -> Vec<String> {
    vec!["Escape".to_string(), "Q".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_key() {
        let binding = KeyBinding::parse("Escape").unwrap();
        assert_eq!(binding.key, "Escape");
        assert!(!binding.ctrl && !binding.shift && !binding.alt);
    }

    #[test]
    fn parse_uppercases_single_characters() {
        let binding = KeyBinding::parse("ctrl+shift+z").unwrap();
        assert_eq!(binding.key, "Z");
        assert!(binding.ctrl && binding.shift);
        assert_eq!(binding, KeyBinding::parse("Shift + Ctrl + Z").unwrap());
    }

    #[test]
    fn parse_punctuation_keys() {
        let comma = KeyBinding::parse("Ctrl+,").unwrap();
        assert_eq!(comma.key, ",");
        assert!(comma.ctrl);

        let backslash = KeyBinding::parse("Ctrl+\\").unwrap();
        assert_eq!(backslash.key, "\\");

        let plus = KeyBinding::parse("Ctrl++").unwrap();
        assert_eq!(plus.key, "+");
        assert!(plus.ctrl);
    }

    #[test]
    fn parse_rejects_modifier_only() {
        assert!(KeyBinding::parse("Ctrl+Shift").is_err());
        assert!(KeyBinding::parse("   ").is_err());
    }

    #[test]
    fn shift_bindings_require_shift() {
        let flashlight = KeyBinding::parse("Shift+F").unwrap();
        let fill = KeyBinding::parse("F").unwrap();
        assert!(flashlight.matches("F", false, true, false));
        assert!(!flashlight.matches("f", false, false, false));
        assert!(fill.matches("f", false, false, false));
        assert!(!fill.matches("F", false, true, false));
    }

    #[test]
    fn default_map_covers_every_action() {
        let map = KeybindingsConfig::default().build_action_map().unwrap();
        let escape = KeyBinding::parse("Escape").unwrap();
        assert_eq!(map.get(&escape), Some(&Action::Exit));
        let redo = KeyBinding::parse("Ctrl+Shift+Z").unwrap();
        assert_eq!(map.get(&redo), Some(&Action::Redo));
        let magnifier_size = KeyBinding::parse("Shift+Z").unwrap();
        assert_eq!(map.get(&magnifier_size), Some(&Action::CycleMagnifierSize));

        let mut actions: Vec<Action> = map.values().copied().collect();
        actions.sort_by_key(|a| format!("{a:?}"));
        actions.dedup();
        assert_eq!(actions.len(), 20);
    }

    #[test]
    fn duplicate_keybinding_detection() {
        let mut config = KeybindingsConfig::default();
        config.exit = vec!["Ctrl+Z".to_string()];

        let err = config.build_action_map().unwrap_err();
        assert!(err.contains("Duplicate keybinding"));
        assert!(err.contains("Ctrl+Z"));
    }

    #[test]
    fn duplicate_detection_ignores_case_and_order() {
        let mut config = KeybindingsConfig::default();
        config.toggle_fill = vec!["shift+ctrl+w".to_string()];
        config.export = vec!["Ctrl+Shift+W".to_string()];
        assert!(config.build_action_map().is_err());
    }

    #[test]
    fn repeated_binding_for_same_action_is_allowed() {
        let mut config = KeybindingsConfig::default();
        config.undo = vec!["Ctrl+Z".to_string(), "ctrl+z".to_string()];
        assert!(config.build_action_map().is_ok());
    }
}
