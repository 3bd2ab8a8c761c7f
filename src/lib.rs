//! Hub Gateway - voice command hub for smart-home devices
//!
//! This library provides the command-resolution and slot-filling engine:
//! - Device registry with typed action arguments
//! - Persistent dialogue context shared across turns
//! - Spoken-command tokenizer with word-to-number conversion
//! - Dialogue controller driving speech collaborators
//! - Roku driver over the External Control Protocol
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Speech (console, STT/TTS)               │
//! └────────────────────┬────────────────────────────────┘
//!                      │ utterances
//! ┌────────────────────▼────────────────────────────────┐
//! │                Dialogue Controller                   │
//! │  Context  │  Device/Action Resolution  │  Slots     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ actions
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Device Registry                     │
//! │          Generic  │  Roku  │  ...                   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod config;
pub mod context;
pub mod device;
pub mod dialogue;
pub mod error;
pub mod registry;
pub mod voice;

pub use command::CommandInput;
pub use config::{Config, ConfigOverrides};
pub use context::{ConfigStore, Context, ContextRecord, JsonStore};
pub use device::{
    ActionHandler, ActionResponse, ArgKind, ArgMap, ArgSpec, Args, Device, DeviceAction,
    HttpRokuRemote, RokuRemote,
};
pub use dialogue::{Controller, DialogueSettings, DialogueState, Reprompt, Resolution, Turn};
pub use error::{Error, Result};
pub use registry::{DeviceEnv, Registry, RegistryBuilder};
pub use voice::{ConsoleListener, ConsoleSpeaker, SpeechToText, TextToSpeech};
