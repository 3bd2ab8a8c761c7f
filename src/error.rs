//! Error types for the hub gateway

use thiserror::Error;

use crate::device::ArgKind;

/// Result type alias for hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the hub gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Two actions of one device share a name
    #[error("device {device} declares action {action} more than once")]
    DuplicateAction { device: String, action: String },

    /// A phrase could not be converted to the kind an argument expects
    #[error("could not understand \"{phrase}\" as {kind}")]
    TypeConversion { kind: ArgKind, phrase: String },

    /// The command tokenizer cannot pop values of this kind
    #[error("cannot read a {0} argument from a spoken command")]
    UnsupportedKind(ArgKind),

    /// More words were requested than the command has left
    #[error("requested {requested} words but only {remaining} remain")]
    InputExhausted { requested: usize, remaining: usize },

    /// Arguments were committed to an action twice
    #[error("arguments for action {0} are already initialized")]
    ArgsAlreadyInitialized(String),

    /// An action was performed before its arguments were committed
    #[error("action {0} was performed before its arguments were initialized")]
    ArgsNotInitialized(String),

    /// Device driver error
    #[error("device error: {0}")]
    Device(String),

    /// Speech collaborator error
    #[error("voice error: {0}")]
    Voice(String),

    /// The utterance source has no more input
    #[error("input closed")]
    InputClosed,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error should stop the process instead of being spoken
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DuplicateAction { .. })
    }
}
