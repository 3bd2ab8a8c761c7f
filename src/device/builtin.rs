//! Actions every device carries

use async_trait::async_trait;
use serde_json::Value;

use super::{ActionHandler, ActionResponse, ArgMap, ArgSpec, Args, Device, DeviceAction};
use crate::Result;

/// `list_actions` and `list_arguments`
#[must_use]
pub fn base_actions() -> Vec<DeviceAction> {
    vec![
        DeviceAction::new(ListActions),
        DeviceAction::new(ListArguments),
    ]
}

/// `update_config` over the given settings
#[must_use]
pub fn configurable_actions(config_map: ArgMap) -> Vec<DeviceAction> {
    vec![DeviceAction::new(UpdateConfig { config_map })]
}

struct ListActions;

#[async_trait]
impl ActionHandler for ListActions {
    fn name(&self) -> &str {
        "list_actions"
    }

    fn description(&self) -> &str {
        "List the actions this device supports"
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
        let names = device.action_names();
        response.set_message(names.join(", "));
        response.insert("actions", names);
        Ok(())
    }
}

struct ListArguments;

#[async_trait]
impl ActionHandler for ListArguments {
    fn name(&self) -> &str {
        "list_arguments"
    }

    fn description(&self) -> &str {
        "List the arguments an action takes"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new().arg("action", ArgSpec::string().required().order(0))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let wanted = args
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .replace(' ', "_");

        let actions = device.action_map()?;
        match actions.get(&wanted) {
            Some(action) => {
                let argmap = action.argmap();
                let names: Vec<&str> = argmap.names().collect();
                if names.is_empty() {
                    response.set_message(format!("{wanted} takes no arguments"));
                } else {
                    response.set_message(names.join(", "));
                }
                response.insert("arguments", names);
            }
            None => response.set_message(format!("No action named {wanted}")),
        }
        Ok(())
    }
}

struct UpdateConfig {
    config_map: ArgMap,
}

#[async_trait]
impl ActionHandler for UpdateConfig {
    fn name(&self) -> &str {
        "update_config"
    }

    fn description(&self) -> &str {
        "Change saved settings for this device"
    }

    fn argmap(&self) -> ArgMap {
        self.config_map.clone()
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let Some(configurable) = device.as_config() else {
            response.set_message("This device has no settings");
            return Ok(());
        };

        let config = configurable.config_mut();
        for (key, value) in args {
            config.set(key.clone(), value.clone());
        }
        config.save()?;

        tracing::info!(keys = ?args.keys().collect::<Vec<_>>(), "device config updated");
        response.set_message("Updated configuration");
        Ok(())
    }
}
