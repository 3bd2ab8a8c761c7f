//! Configuration management for the hub gateway
//!
//! Values are layered env > TOML file > defaults, and command-line flags
//! override all three.

mod file;

pub use file::{
    DialogueFileConfig, HubConfigFile, RokuFileConfig, StateFileConfig, VoiceFileConfig,
    config_file_path, load_config_file, load_config_file_from,
};

use std::path::PathBuf;
use std::time::Duration;

use crate::dialogue::DialogueSettings;
use crate::{Error, Result};

/// Default wake word
pub const DEFAULT_WAKE_WORD: &str = "jarvis";

/// Default context file name
pub const DEFAULT_CONTEXT_FILE: &str = "vui_context.json";

const DEFAULT_REPROMPT_ATTEMPTS: u32 = 2;
const DEFAULT_ROKU_TIMEOUT_SECS: u64 = 5;

/// Resolved hub configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base directory for the context file and device settings
    pub state_dir: PathBuf,

    /// Context file name, relative to `state_dir`
    pub context_file: String,

    /// Word that opens a dialogue
    pub wake_word: String,

    /// Asks per missing argument
    pub reprompt_attempts: u32,

    /// HTTP timeout for Roku requests
    pub roku_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            context_file: DEFAULT_CONTEXT_FILE.to_string(),
            wake_word: DEFAULT_WAKE_WORD.to_string(),
            reprompt_attempts: DEFAULT_REPROMPT_ATTEMPTS,
            roku_timeout: Duration::from_secs(DEFAULT_ROKU_TIMEOUT_SECS),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub state_dir: Option<PathBuf>,
    pub wake_word: Option<String>,
}

/// Default state directory: `~/.local/share/hub-gateway` on Linux
fn default_state_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/hub-gateway"),
        |d| d.data_dir().join("hub-gateway"),
    )
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if an environment value is malformed
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok(), overrides)
    }

    /// Layer overrides, environment, file and defaults
    ///
    /// # Errors
    ///
    /// Returns error if a numeric value does not parse or the reprompt
    /// attempts are zero
    pub fn resolve<E>(fc: HubConfigFile, env: E, overrides: ConfigOverrides) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let state_dir = overrides
            .state_dir
            .or_else(|| env("HUB_STATE_DIR").map(PathBuf::from))
            .or_else(|| fc.state.dir.map(PathBuf::from))
            .unwrap_or(defaults.state_dir);

        let context_file = env("HUB_CONTEXT_FILE")
            .or(fc.state.context_file)
            .unwrap_or(defaults.context_file);

        let wake_word = overrides
            .wake_word
            .or_else(|| env("HUB_WAKE_WORD"))
            .or(fc.voice.wake_word)
            .unwrap_or(defaults.wake_word);
        if wake_word.trim().is_empty() {
            return Err(Error::Config("wake word cannot be empty".to_string()));
        }

        let reprompt_attempts = parse_env(&env, "HUB_REPROMPT_ATTEMPTS")?
            .or(fc.dialogue.reprompt_attempts)
            .unwrap_or(defaults.reprompt_attempts);
        if reprompt_attempts == 0 {
            return Err(Error::Config(
                "reprompt attempts must be at least 1".to_string(),
            ));
        }

        let roku_timeout = parse_env(&env, "HUB_ROKU_TIMEOUT_SECS")?
            .or(fc.roku.timeout_secs)
            .map_or(defaults.roku_timeout, Duration::from_secs);

        let config = Self {
            state_dir,
            context_file,
            wake_word,
            reprompt_attempts,
            roku_timeout,
        };
        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Full path of the context file
    #[must_use]
    pub fn context_path(&self) -> PathBuf {
        self.state_dir.join(&self.context_file)
    }

    /// Settings for the dialogue controller
    #[must_use]
    pub fn dialogue_settings(&self) -> DialogueSettings {
        DialogueSettings {
            wake_word: self.wake_word.clone(),
            reprompt_attempts: self.reprompt_attempts,
            context_path: self.context_path(),
        }
    }
}

fn parse_env<E, T>(env: &E, key: &str) -> Result<Option<T>>
where
    E: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}
