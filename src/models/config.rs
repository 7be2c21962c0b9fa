use serde::Deserialize;
use std::path::Path;

use super::ProcessingOptions;

/// Default request body limit for the batch endpoints (64 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application configuration loaded from config.yaml
///
/// ```yaml
/// defaults:
///   contrast: 1.4
///   mode: binary
///   tone_mode: gray
/// max_body_bytes: 33554432
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Options used when a request or CLI flag does not set them
    pub defaults: ProcessingOptions,

    /// Largest accepted HTTP request body
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: ProcessingOptions::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, or built-in defaults when no
    /// path is given. Read and parse failures fall back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from the `CONFIG_FILE` environment variable.
    pub fn from_env() -> Self {
        let path = std::env::var("CONFIG_FILE").ok();
        Self::load(path.as_deref().map(Path::new))
    }

    pub fn from_yaml(content: &str) -> Self {
        match serde_yaml::from_str::<Self>(content) {
            Ok(config) => {
                if let Err(e) = config.defaults.validate() {
                    tracing::warn!(%e, "Invalid default options in config, using defaults");
                    return Self {
                        defaults: ProcessingOptions::default(),
                        ..config
                    };
                }
                tracing::info!(
                    mode = %config.defaults.mode,
                    tone = %config.defaults.tone_mode,
                    width_cm = config.defaults.output_width_cm,
                    dpi = config.defaults.print_dpi,
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }
}
