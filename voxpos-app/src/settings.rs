//! Persistent application settings (JSON file in the app data directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use voxpos_core::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub language: String,
    pub confidence_threshold: f32,
    pub interim_results: bool,
    pub spoken_feedback: bool,
    pub speech_rate: f32,
    pub speech_pitch: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            language: engine.language,
            confidence_threshold: engine.confidence_threshold,
            interim_results: engine.interim_results,
            spoken_feedback: true,
            speech_rate: engine.speech_rate,
            speech_pitch: engine.speech_pitch,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.language = normalize_language(&self.language);
        self.confidence_threshold = if self.confidence_threshold.is_finite() {
            self.confidence_threshold.clamp(0.0, 1.0)
        } else {
            EngineConfig::default().confidence_threshold
        };
        self.speech_rate = clamp_or(self.speech_rate, 0.1, 10.0, 1.0);
        self.speech_pitch = clamp_or(self.speech_pitch, 0.0, 2.0, 1.0);
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            language: self.language.clone(),
            confidence_threshold: self.confidence_threshold,
            interim_results: self.interim_results,
            speech_rate: self.speech_rate,
            speech_pitch: self.speech_pitch,
            ..EngineConfig::default()
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Locale is fixed configuration; anything unrecognised falls back to Vietnamese.
pub fn normalize_language(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "vi" | "vi-vn" | "vie" | "vietnamese" => "vi-VN".into(),
        "en" | "en-us" | "english" => "en-US".into(),
        _ => "vi-VN".into(),
    }
}

pub fn default_settings_path() -> PathBuf {
    if let Some(path) = std::env::var_os("VOXPOS_SETTINGS") {
        return PathBuf::from(path);
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("VoxPOS")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("voxpos")
            .join("settings.json")
    }
}

pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("voxpos-settings-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(&scratch_path("missing"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.language, "vi-VN");
    }

    #[test]
    fn partial_file_is_filled_and_normalized() {
        let path = scratch_path("partial");
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, r#"{"confidenceThreshold": 1.5, "language": " VI "}"#).expect("write");

        let settings = load_settings(&path);
        assert_eq!(settings.confidence_threshold, 1.0);
        assert_eq!(settings.language, "vi-VN");
        assert!(settings.spoken_feedback);

        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = scratch_path("save");
        let settings = AppSettings {
            confidence_threshold: 0.8,
            spoken_feedback: false,
            ..AppSettings::default()
        };
        save_settings(&path, &settings).expect("save");
        assert_eq!(load_settings(&path), settings);

        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn engine_config_carries_threshold_and_voice() {
        let settings = AppSettings {
            confidence_threshold: 0.5,
            speech_rate: 1.2,
            ..AppSettings::default()
        };
        let config = settings.engine_config();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.speech_rate, 1.2);
        assert!(!config.continuous);
    }

    #[test]
    fn unknown_language_falls_back_to_vietnamese() {
        assert_eq!(normalize_language("fr-FR"), "vi-VN");
        assert_eq!(normalize_language("english"), "en-US");
    }
}
