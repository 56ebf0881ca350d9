//! Settings management

use std::path::{Path, PathBuf};

use nersis_core::Color;
use nersis_render::{RuntimeConfig, UnobservedEvents, WindowConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowConfig,
    pub graphics: GraphicsSettings,
    pub script: ScriptSettings,
    pub events: EventSettings,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

/// Which backend pairing the host builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Headless,
    Windowed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub variant: Variant,
    pub background: Color,
    pub headless_width: u32,
    pub headless_height: u32,
    pub vsync: bool,
    /// Use a software adapter even when a GPU is present.
    pub force_fallback_adapter: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub entry: Option<PathBuf>,
    /// Stop after this many frames; unset runs until quit.
    pub max_frames: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub unobserved: UnobservedEvents,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics: GraphicsSettings::default(),
            script: ScriptSettings::default(),
            events: EventSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Windowed,
            background: Color::BLACK,
            headless_width: 1280,
            headless_height: 720,
            vsync: true,
            force_fallback_adapter: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let (w, h) = self.target_size();
        if w == 0 || h == 0 {
            return Err(SettingsError::Invalid(format!(
                "{:?} target size must be non-zero, got {w}x{h}",
                self.graphics.variant
            )));
        }
        Ok(())
    }

    /// Drawable size requested for the selected variant.
    pub fn target_size(&self) -> (u32, u32) {
        match self.graphics.variant {
            Variant::Windowed => (self.window.width, self.window.height),
            Variant::Headless => (self.graphics.headless_width, self.graphics.headless_height),
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let (width, height) = self.target_size();
        RuntimeConfig {
            window: WindowConfig {
                title: self.window.title.clone(),
                width,
                height,
            },
            background: self.graphics.background,
            unobserved: self.events.unobserved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_settings_parse() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "graphics": { "variant": "headless", "headless_width": 64, "background": [0.1, 0.2, 0.3, 1.0] },
                "events": { "unobserved": "discard" },
                "script": { "entry": "main.js", "max_frames": 10 }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.graphics.variant, Variant::Headless);
        assert_eq!(settings.target_size(), (64, 720));
        assert_eq!(settings.events.unobserved, UnobservedEvents::Discard);
        assert_eq!(settings.script.max_frames, Some(10));

        let config = settings.runtime_config();
        assert_eq!((config.window.width, config.window.height), (64, 720));
        assert_eq!(config.background, Color::new(0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn zero_size_is_invalid() {
        let mut settings = Settings::default();
        settings.window.width = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        settings.graphics.variant = Variant::Headless;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Settings::load(Path::new("/nonexistent/nersis.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
