//! Startup configuration
//!
//! Read once from an optional JSON file. Nothing is ever written back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::INITIAL_LIVES;
use crate::error::SetupError;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "STARFIELD_CONFIG";

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hits the ship survives before the game is lost
    pub initial_lives: u32,
    /// Starting perspective field of view in degrees
    pub fov_degrees: f32,
    /// Root directory for meshes, textures and shaders
    pub assets_dir: PathBuf,

    // === Window ===
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,

    /// Fixed seed for the obstacle stream (wall clock when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            fov_degrees: 168.0,
            assets_dir: PathBuf::from("assets"),
            window_width: 1280,
            window_height: 720,
            vsync: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when no file exists
    pub fn load(path: Option<&Path>) -> Result<Self, SetupError> {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Ok(Self::default());
        };

        if !path.exists() {
            log::warn!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SetupError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;

        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings path from the first CLI argument or `STARFIELD_CONFIG`
    pub fn locate(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
        args.nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.initial_lives == 0 {
            return Err(SetupError::InvalidSetting("initial_lives must be at least 1"));
        }
        if !self.fov_degrees.is_finite() {
            return Err(SetupError::InvalidSetting("fov_degrees must be finite"));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(SetupError::InvalidSetting("window size must be non-zero"));
        }
        Ok(())
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.initial_lives, 5);
        assert_eq!(settings.fov_degrees, 168.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "initial_lives": 2, "seed": 9 }"#).unwrap();
        assert_eq!(settings.initial_lives, 2);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_zero_lives_rejected() {
        let settings = Settings {
            initial_lives: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SetupError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Some(Path::new("does/not/exist.json"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_locate_prefers_cli_argument() {
        let args = vec!["starfield-runner".to_string(), "custom.json".to_string()];
        assert_eq!(
            Settings::locate(args.into_iter()),
            Some(PathBuf::from("custom.json"))
        );
    }
}
