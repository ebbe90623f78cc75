//! Presentation preferences
//!
//! Nothing here affects gameplay: settings only decide how much of a frame
//! gets drawn and how loud the cues are. Persisted apart from the tuning.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles drawn for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 250,
            QualityPreset::High => 1000,
        }
    }

    /// Share of the ball trail that gets drawn (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.3,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Triangle fan segments for balls and particles
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 16,
            QualityPreset::High => 32,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Ball trails
    pub trails: bool,
    /// Brick and pickup particle bursts
    pub particles: bool,
    /// Full-field flash when a power-up is collected
    pub power_up_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            particles: true,
            power_up_flash: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.power_up_flash = false;
        }
    }

    /// Effective flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        self.power_up_flash && !self.reduced_motion
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }

    /// Trail points to draw out of `available`
    pub fn trail_points(&self, available: usize) -> usize {
        if !self.trails {
            return 0;
        }
        ((available as f32 * self.quality.trail_quality()).ceil() as usize).min(available)
    }

    /// Gain applied to every sound cue
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "neon_breakout_settings";

    /// Load settings from LocalStorage, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                log::warn!("Failed to store settings");
            } else {
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file; a missing file yields defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, crate::ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Using default settings");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<(), crate::ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_preset_disables_flash() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.effective_flash());
        assert_eq!(settings.trail_points(10), 3);
    }

    #[test]
    fn test_trail_points() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        assert_eq!(settings.trail_points(10), 10);
        settings.trails = false;
        assert_eq!(settings.trail_points(10), 0);
    }

    #[test]
    fn test_mute_silences() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High","muted":true}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.muted);
        assert!(settings.trails);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("neon-settings-{}.json", std::process::id()));
        let settings = Settings::from_preset(QualityPreset::Low);
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);
    }
}
