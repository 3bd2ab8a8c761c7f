//! Device-independent actions
//!
//! The generic pseudo-device lists devices and moves the user in and out of
//! a device context. Its action names are checked before any device name so
//! they stay reachable while a device is entered.

use async_trait::async_trait;
use serde_json::Value;

use super::{
    ActionHandler, ActionResponse, ArgMap, ArgSpec, Args, Describable, Device, DeviceAction,
    HasContext,
};
use crate::Result;
use crate::context::Context;

/// Registry name of the generic pseudo-device
pub const GENERIC_DEVICE: &str = "generic";

/// Pseudo-device carrying the generic actions
#[derive(Debug)]
pub struct GenericDevice {
    context: Option<Context>,
    device_names: Vec<String>,
}

impl GenericDevice {
    /// Create the generic device over the names of the registered devices
    #[must_use]
    pub const fn new(context: Option<Context>, device_names: Vec<String>) -> Self {
        Self {
            context,
            device_names,
        }
    }
}

impl Describable for GenericDevice {
    fn name(&self) -> &str {
        GENERIC_DEVICE
    }

    fn description(&self) -> &str {
        "Actions that do not belong to any one device"
    }
}

impl HasContext for GenericDevice {
    fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    fn context_mut(&mut self) -> Option<&mut Context> {
        self.context.as_mut()
    }

    fn take_context(&mut self) -> Option<Context> {
        self.context.take()
    }
}

impl Device for GenericDevice {
    fn actions(&self) -> Vec<DeviceAction> {
        vec![
            DeviceAction::new(ListDevices {
                names: self.device_names.clone(),
            }),
            DeviceAction::new(Enter {
                names: self.device_names.clone(),
            }),
            DeviceAction::new(Exit),
        ]
    }

    fn as_context(&mut self) -> Option<&mut dyn HasContext> {
        Some(self)
    }
}

struct ListDevices {
    names: Vec<String>,
}

#[async_trait]
impl ActionHandler for ListDevices {
    fn name(&self) -> &str {
        "list_devices"
    }

    fn description(&self) -> &str {
        "List every registered device"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new()
    }

    async fn perform(
        &self,
        _args: &Args,
        _device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        response.set_message(self.names.join(", "));
        response.insert("devices", self.names.clone());
        Ok(())
    }
}

struct Enter {
    names: Vec<String>,
}

#[async_trait]
impl ActionHandler for Enter {
    fn name(&self) -> &str {
        "enter"
    }

    fn description(&self) -> &str {
        "Keep talking to one device without naming it"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new().arg(
            "device_name",
            ArgSpec::string()
                .required()
                .order(0)
                .one_of(self.names.iter().cloned()),
        )
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let name = args
            .get("device_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(context) = device.as_context().and_then(|c| c.context_mut()) else {
            response.set_message("There is no context to enter");
            return Ok(());
        };

        context.set_device(Some(name.clone()));
        context.set_in_dialogue(true);
        context.save()?;

        tracing::info!(device = %name, "entered device");
        response.set_message(format!("Using device {name}"));
        Ok(())
    }
}

struct Exit;

#[async_trait]
impl ActionHandler for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn description(&self) -> &str {
        "Forget the current device and close the dialogue"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new()
    }

    async fn perform(
        &self,
        _args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        if let Some(context) = device.as_context().and_then(|c| c.context_mut()) {
            context.clear();
            context.save()?;
            tracing::info!("context cleared");
        }
        response.set_message("Cleared context");
        Ok(())
    }
}
