//! TOML configuration file loading
//!
//! Supports `~/.config/hub-gateway/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct HubConfigFile {
    /// Where context and device settings are kept
    #[serde(default)]
    pub state: StateFileConfig,

    /// Speech settings
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Dialogue behaviour
    #[serde(default)]
    pub dialogue: DialogueFileConfig,

    /// Roku driver settings
    #[serde(default)]
    pub roku: RokuFileConfig,
}

/// State storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StateFileConfig {
    /// Base directory for state files
    pub dir: Option<String>,

    /// Context file name, relative to the state directory
    pub context_file: Option<String>,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Wake word (e.g. "jarvis")
    pub wake_word: Option<String>,
}

/// Dialogue configuration
#[derive(Debug, Default, Deserialize)]
pub struct DialogueFileConfig {
    /// Asks per missing argument before the turn is abandoned
    pub reprompt_attempts: Option<u32>,
}

/// Roku configuration
#[derive(Debug, Default, Deserialize)]
pub struct RokuFileConfig {
    /// HTTP timeout for ECP requests, in seconds
    pub timeout_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `HubConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> HubConfigFile {
    config_file_path().map_or_else(HubConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `HubConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file_from(path: &Path) -> HubConfigFile {
    if !path.exists() {
        return HubConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                HubConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            HubConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/hub-gateway/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("hub-gateway").join("config.toml"))
}
