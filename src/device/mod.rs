//! Devices and the actions they perform
//!
//! A [`Device`] is built fresh for every resolution and hands out fresh
//! [`DeviceAction`]s. Optional capabilities are separate traits:
//! - [`HasContext`] for devices that read or change the dialogue context
//! - [`HasConfig`] for devices with persisted settings
//!
//! A device exposes them through [`Device::as_context`] and
//! [`Device::as_config`].

mod builtin;
mod describe;
pub mod generic;
pub mod roku;
mod schema;

pub use builtin::{base_actions, configurable_actions};
pub use describe::{ActionDescription, ArgDescription, DeviceDescription};
pub use generic::GenericDevice;
pub use roku::{HttpRokuRemote, RokuDevice, RokuRemote};
pub use schema::{ArgKind, ArgMap, ArgSpec, Args, titleize};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::{ConfigStore, Context};
use crate::{Error, Result};

/// Name and human description
pub trait Describable {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

/// Access to the dialogue context a device was created with
pub trait HasContext: Send {
    fn context(&self) -> Option<&Context>;

    fn context_mut(&mut self) -> Option<&mut Context>;

    /// Give the context back to the caller
    fn take_context(&mut self) -> Option<Context>;

    /// Persist the context, if there is one
    ///
    /// # Errors
    ///
    /// Returns error if the context file cannot be written
    fn save_context(&mut self) -> Result<()> {
        if let Some(context) = self.context_mut() {
            context.save()?;
        }
        Ok(())
    }
}

/// Access to a device's persisted settings
pub trait HasConfig: Send {
    fn config(&self) -> &ConfigStore;

    fn config_mut(&mut self) -> &mut ConfigStore;

    /// Settings that may be changed through `update_config`
    fn config_map(&self) -> ArgMap;
}

/// A controllable appliance
pub trait Device: Describable + Send {
    /// Fresh instances of every action, in declaration order
    fn actions(&self) -> Vec<DeviceAction>;

    fn action_names(&self) -> Vec<String> {
        self.actions()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Actions keyed by name
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAction` if two actions share a name
    fn action_map(&self) -> Result<IndexMap<String, DeviceAction>> {
        build_action_map(self.name(), self.actions())
    }

    fn as_context(&mut self) -> Option<&mut dyn HasContext> {
        None
    }

    fn as_config(&mut self) -> Option<&mut dyn HasConfig> {
        None
    }
}

/// Build a name-keyed action map, rejecting duplicate names
///
/// # Errors
///
/// Returns `DuplicateAction` naming the device and the repeated action
pub fn build_action_map(
    device: &str,
    actions: Vec<DeviceAction>,
) -> Result<IndexMap<String, DeviceAction>> {
    let mut map = IndexMap::with_capacity(actions.len());

    for action in actions {
        let name = action.name().to_string();
        if map.contains_key(&name) {
            return Err(Error::DuplicateAction {
                device: device.to_string(),
                action: name,
            });
        }
        map.insert(name, action);
    }

    Ok(map)
}

/// Result of performing an action
///
/// `message` is what gets spoken back; `extra` carries any additional
/// fields for API clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionResponse {
    pub message: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionResponse {
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }
}

/// Behaviour of one kind of action
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn argmap(&self) -> ArgMap;

    /// Run the action against the device it belongs to
    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()>;
}

/// One invocation of an action: its handler, committed args and response
pub struct DeviceAction {
    handler: Box<dyn ActionHandler>,
    args: Option<Args>,
    response: ActionResponse,
}

impl DeviceAction {
    pub fn new(handler: impl ActionHandler + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            args: None,
            response: ActionResponse::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.handler.description()
    }

    #[must_use]
    pub fn argmap(&self) -> ArgMap {
        self.handler.argmap()
    }

    /// Committed arguments, once initialized
    #[must_use]
    pub const fn args(&self) -> Option<&Args> {
        self.args.as_ref()
    }

    #[must_use]
    pub const fn response(&self) -> &ActionResponse {
        &self.response
    }

    /// Commit the arguments for this invocation
    ///
    /// # Errors
    ///
    /// Returns `ArgsAlreadyInitialized` on a second call
    pub fn init_args(&mut self, args: Args) -> Result<()> {
        if self.args.is_some() {
            return Err(Error::ArgsAlreadyInitialized(self.name().to_string()));
        }
        self.args = Some(args);
        Ok(())
    }

    /// Perform the action and return its response
    ///
    /// # Errors
    ///
    /// Returns `ArgsNotInitialized` if [`Self::init_args`] was never called,
    /// or whatever the handler fails with
    pub async fn perform(&mut self, device: &mut dyn Device) -> Result<&ActionResponse> {
        let args = self
            .args
            .as_ref()
            .ok_or_else(|| Error::ArgsNotInitialized(self.handler.name().to_string()))?;

        tracing::debug!(
            device = device.name(),
            action = self.handler.name(),
            ?args,
            "performing action"
        );

        self.handler
            .perform(args, device, &mut self.response)
            .await?;
        Ok(&self.response)
    }

    #[must_use]
    pub fn describe(&self) -> ActionDescription {
        ActionDescription::of(self)
    }
}

impl std::fmt::Debug for DeviceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAction")
            .field("name", &self.name())
            .field("args", &self.args)
            .field("response", &self.response)
            .finish()
    }
}
