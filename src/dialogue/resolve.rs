//! Device and action resolution

use std::fmt;

use crate::command::CommandInput;
use crate::context::Context;
use crate::device::generic::GENERIC_DEVICE;
use crate::device::{Device, DeviceAction};
use crate::registry::Registry;
use crate::Result;

/// Outcome of one resolution step
#[derive(Debug)]
pub enum Resolution<T> {
    /// The step produced its value
    Resolved(T),
    /// The turn ends; the message is spoken and the dialogue stays open
    NeedsReprompt(Reprompt),
}

impl<T> Resolution<T> {
    /// The resolved value, if any
    #[must_use]
    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::NeedsReprompt(_) => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Why a turn could not be resolved; displays as the message to speak
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reprompt {
    /// No registered device matches the input or the context
    UnknownDevice(Option<String>),
    /// The input ended before an action name
    MissingAction,
    /// The device has no action matching the input or the context
    UnknownAction { device: String, word: String },
    /// A value did not convert to its argument's kind
    InvalidArgument { label: String, phrase: String },
    /// A required argument was asked for but no value was given
    MissingArgument { label: String },
    /// A required argument cannot be given by voice
    Unspeakable { label: String },
}

impl fmt::Display for Reprompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDevice(Some(word)) => write!(f, "No device named {word}"),
            Self::UnknownDevice(None) => f.write_str("Which device?"),
            Self::MissingAction => f.write_str("Must specify an action"),
            Self::UnknownAction { device, word } => {
                write!(f, "No action named {word} for device {device}")
            }
            Self::InvalidArgument { label, phrase } => {
                write!(f, "{phrase} is not a valid {label}")
            }
            Self::MissingArgument { label } => write!(f, "No value given for {label}"),
            Self::Unspeakable { label } => write!(f, "{label} cannot be given by voice"),
        }
    }
}

/// Pick the device a command is for
///
/// In order:
/// 1. a leading generic action name selects the generic device, consuming
///    nothing
/// 2. a device recorded in the context is used as is
/// 3. the first registered device name prefixing the input is consumed
///
/// The device gets its own copy of the context.
///
/// # Errors
///
/// Returns error if the device constructor fails
pub fn resolve_device(
    registry: &Registry,
    input: &mut CommandInput,
    context: &Context,
) -> Result<Resolution<Box<dyn Device>>> {
    let generic_actions = registry.generic_action_names();
    let name = if input.prefix_from(&generic_actions, false).is_some() {
        GENERIC_DEVICE.to_string()
    } else if let Some(device) = context.device() {
        device.to_string()
    } else if let Some(device) = input.prefix_from(registry.device_names(), true) {
        device
    } else {
        let word = input.head().map(ToString::to_string);
        return Ok(Resolution::NeedsReprompt(Reprompt::UnknownDevice(word)));
    };

    match registry.create(&name, Some(context.clone()))? {
        Some(device) => {
            tracing::debug!(device = %name, "device resolved");
            Ok(Resolution::Resolved(device))
        }
        None => Ok(Resolution::NeedsReprompt(Reprompt::UnknownDevice(Some(
            name,
        )))),
    }
}

/// Pick the action a command is for
///
/// A fixed action in the context wins, except for the generic device whose
/// actions are always read from the input.
///
/// # Errors
///
/// Returns `DuplicateAction` if the device's action names collide
pub fn resolve_action(
    input: &mut CommandInput,
    context: &Context,
    device: &dyn Device,
) -> Result<Resolution<DeviceAction>> {
    let from_context = context
        .action()
        .filter(|_| device.name() != GENERIC_DEVICE)
        .map(ToString::to_string);

    let name = match from_context {
        Some(name) => name,
        None if input.is_empty() => {
            return Ok(Resolution::NeedsReprompt(Reprompt::MissingAction));
        }
        None => match input.prefix_from(device.action_names(), true) {
            Some(name) => name,
            None => {
                let word = input.head().unwrap_or_default().to_string();
                return Ok(unknown_action(device, word));
            }
        },
    };

    let mut actions = device.action_map()?;
    match actions.swap_remove(&name) {
        Some(action) => {
            tracing::debug!(device = device.name(), action = %name, "action resolved");
            Ok(Resolution::Resolved(action))
        }
        None => Ok(unknown_action(device, name)),
    }
}

fn unknown_action<T>(device: &dyn Device, word: String) -> Resolution<T> {
    Resolution::NeedsReprompt(Reprompt::UnknownAction {
        device: device.name().to_string(),
        word,
    })
}
