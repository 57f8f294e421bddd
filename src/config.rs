//! Application configuration.
//!
//! Loads settings from config.json next to the executable at startup.
//! Missing or invalid files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// OCR settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tesseract language code used for every recognition call.
    #[serde(default = "default_language")]
    pub language: String,
    /// Tesseract page segmentation mode.
    #[serde(default = "default_psm")]
    pub psm: u8,
    /// Explicit path to the Tesseract executable. Discovered when unset.
    #[serde(default)]
    pub tesseract_path: Option<String>,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_psm() -> u8 {
    6 // single uniform block of text
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            psm: default_psm(),
            tesseract_path: None,
        }
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> AppConfig {
    let config_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf());

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns the global configuration, loading it on first use if
/// `init_config` was skipped.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(load_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.psm, 6);
        assert!(config.tesseract_path.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"language": "jpn"}"#).unwrap();
        assert_eq!(config.language, "jpn");
        assert_eq!(config.psm, 6);
        assert!(config.tesseract_path.is_none());
    }
}
