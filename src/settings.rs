//! User settings and preferences
//!
//! Persisted as JSON in LocalStorage; the demo itself keeps no other
//! state.

use serde::{Deserialize, Serialize};

/// Demo settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Menu cues on/off
    pub audio_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Skip menu fade transitions
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "pixel_valley_settings";

    /// Combined cue volume; zero when audio is off
    pub fn effective_volume(&self) -> f32 {
        if self.audio_enabled {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_audible_and_animated() {
        let s = Settings::default();
        assert!(s.audio_enabled);
        assert!(!s.reduced_motion);
        assert!((s.effective_volume() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_audio_silences_cues() {
        let s = Settings {
            audio_enabled: false,
            ..Default::default()
        };
        assert_eq!(s.effective_volume(), 0.0);
    }

    #[test]
    fn test_json_round_trip() {
        let s = Settings {
            audio_enabled: true,
            master_volume: 0.5,
            sfx_volume: 0.25,
            reduced_motion: true,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.master_volume, 0.5);
        assert_eq!(back.sfx_volume, 0.25);
        assert!(back.reduced_motion);
    }
}
