//! Cursor effects: halo, flashlight, mouse mask and magnifier.
//!
//! Effects are independent toggles painted on top of the annotations from the
//! current cursor position every frame. Nothing is cached between cursor
//! positions except the magnifier's last screen sample.

pub mod magnifier;
mod paint;

pub use magnifier::{
    LensPlacement, MagnifierSampler, SampleError, SamplerEvent, ScreenSample, ScreenSource,
    paint_lens, place_lens,
};
pub use paint::{paint_effects, paint_flashlight, paint_halo, paint_mouse_mask};

use crate::config::EffectsConfig;
use log::info;
use std::time::Duration;

/// Which effects are on, plus their tuning.
#[derive(Debug, Clone)]
pub struct EffectState {
    halo: bool,
    flashlight: bool,
    mouse_mask: bool,
    magnifier: bool,
    magnifier_size: usize,
    /// Set once the user toggles the halo, so the startup timer leaves it alone
    halo_touched: bool,
    settings: EffectsConfig,
}

impl Default for EffectState {
    fn default() -> Self {
        Self::new(EffectsConfig::default())
    }
}

impl EffectState {
    pub fn new(settings: EffectsConfig) -> Self {
        Self {
            halo: false,
            flashlight: false,
            mouse_mask: false,
            magnifier: false,
            magnifier_size: 0,
            halo_touched: false,
            settings,
        }
    }

    pub fn settings(&self) -> &EffectsConfig {
        &self.settings
    }

    /// Swaps in reloaded tuning; toggles stay as they are.
    pub fn apply_settings(&mut self, settings: EffectsConfig) {
        self.settings = settings;
        self.magnifier_size = self.magnifier_size.min(self.settings.magnifier_radii.len() - 1);
    }

    pub fn halo(&self) -> bool {
        self.halo
    }

    pub fn flashlight(&self) -> bool {
        self.flashlight
    }

    pub fn mouse_mask(&self) -> bool {
        self.mouse_mask
    }

    pub fn magnifier(&self) -> bool {
        self.magnifier
    }

    /// Index into `magnifier_radii` (0 = smallest).
    pub fn magnifier_size(&self) -> usize {
        self.magnifier_size
    }

    pub fn lens_radius(&self) -> f64 {
        self.settings.magnifier_radii[self.magnifier_size]
    }

    pub fn toggle_halo(&mut self) -> bool {
        self.halo_touched = true;
        self.halo = !self.halo;
        info!("Halo {}", on_off(self.halo));
        self.halo
    }

    /// Turns the halo on when the startup delay elapses.
    ///
    /// Returns false if the user already toggled it or startup halo is disabled.
    pub fn enable_startup_halo(&mut self) -> bool {
        if self.halo_touched || self.halo || !self.settings.halo_on_startup {
            return false;
        }
        self.halo = true;
        info!("Halo enabled on startup");
        true
    }

    pub fn startup_halo_delay(&self) -> Option<Duration> {
        self.settings
            .halo_on_startup
            .then(|| Duration::from_millis(self.settings.halo_startup_delay_ms))
    }

    pub fn toggle_flashlight(&mut self) -> bool {
        self.flashlight = !self.flashlight;
        info!("Flashlight {}", on_off(self.flashlight));
        self.flashlight
    }

    pub fn toggle_mouse_mask(&mut self) -> bool {
        self.mouse_mask = !self.mouse_mask;
        info!("Mouse mask {}", on_off(self.mouse_mask));
        self.mouse_mask
    }

    pub fn toggle_magnifier(&mut self) -> bool {
        self.magnifier = !self.magnifier;
        info!("Magnifier {}", on_off(self.magnifier));
        self.magnifier
    }

    /// Enables the magnifier if it is off, otherwise advances to the next lens size.
    pub fn cycle_magnifier_size(&mut self) {
        if !self.magnifier {
            self.toggle_magnifier();
            return;
        }
        self.magnifier_size = (self.magnifier_size + 1) % self.settings.magnifier_radii.len();
        info!(
            "Magnifier size {} ({:.0}px)",
            self.magnifier_size + 1,
            self.lens_radius()
        );
    }

    /// Turns the magnifier off after the screen source gave up.
    pub fn disable_magnifier(&mut self) {
        if self.magnifier {
            self.magnifier = false;
            info!("Magnifier disabled");
        }
    }

    /// Whether anything needs repainting as the cursor moves.
    pub fn any_active(&self) -> bool {
        self.halo || self.flashlight || self.mouse_mask || self.magnifier
    }

    /// Interval of the repaint timer while an effect is active.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.settings.frame_interval_ms)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_are_independent() {
        let mut effects = EffectState::default();
        assert!(!effects.any_active());
        assert!(effects.toggle_mouse_mask());
        assert!(effects.toggle_flashlight());
        assert!(effects.mouse_mask() && effects.flashlight());
        assert!(!effects.halo());
        assert!(!effects.toggle_mouse_mask());
        assert!(effects.flashlight());
        assert!(effects.any_active());
    }

    #[test]
    fn cycle_enables_then_walks_sizes() {
        let mut effects = EffectState::default();
        effects.cycle_magnifier_size();
        assert!(effects.magnifier());
        assert_eq!(effects.lens_radius(), 120.0);

        effects.cycle_magnifier_size();
        assert_eq!(effects.lens_radius(), 240.0);
        effects.cycle_magnifier_size();
        assert_eq!(effects.lens_radius(), 480.0);
        effects.cycle_magnifier_size();
        assert_eq!(effects.lens_radius(), 120.0);
    }

    #[test]
    fn startup_halo_respects_user_toggle() {
        let mut effects = EffectState::default();
        assert_eq!(effects.startup_halo_delay(), Some(Duration::from_secs(1)));
        effects.toggle_halo();
        effects.toggle_halo();
        assert!(!effects.enable_startup_halo());
        assert!(!effects.halo());

        let mut fresh = EffectState::default();
        assert!(fresh.enable_startup_halo());
        assert!(fresh.halo());
    }

    #[test]
    fn startup_halo_can_be_disabled() {
        let settings = EffectsConfig {
            halo_on_startup: false,
            ..EffectsConfig::default()
        };
        let mut effects = EffectState::new(settings);
        assert_eq!(effects.startup_halo_delay(), None);
        assert!(!effects.enable_startup_halo());
    }

    #[test]
    fn disable_magnifier_keeps_size() {
        let mut effects = EffectState::default();
        effects.cycle_magnifier_size();
        effects.cycle_magnifier_size();
        effects.disable_magnifier();
        assert!(!effects.magnifier());
        assert_eq!(effects.magnifier_size(), 1);
    }
}
