//! Remote-control keypress actions

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{NO_ADDRESS, RokuRemote, address, base_url};
use crate::Result;
use crate::device::{ActionHandler, ActionResponse, ArgMap, ArgSpec, Args, Device};

/// Store the device address in the Roku settings
pub struct SetIp;

#[async_trait]
impl ActionHandler for SetIp {
    fn name(&self) -> &str {
        "set_ip"
    }

    fn description(&self) -> &str {
        "Set the network address of the Roku"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new().arg("address", ArgSpec::string().required().order(0))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let raw = args
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(configurable) = device.as_config() else {
            response.set_message("This device has no settings");
            return Ok(());
        };

        let url = base_url(raw);
        let config = configurable.config_mut();
        config.set("ip", url.clone());
        config.save()?;

        tracing::info!(%url, "roku address saved");
        response.set_message(format!("Roku address set to {url}"));
        response.insert("ip", url);
        Ok(())
    }
}

/// A single key with no arguments
pub struct Keypress {
    name: &'static str,
    description: &'static str,
    key: &'static str,
    remote: Arc<dyn RokuRemote>,
}

impl Keypress {
    pub fn home(remote: Arc<dyn RokuRemote>) -> Self {
        Self {
            name: "home",
            description: "Go to the home screen",
            key: "Home",
            remote,
        }
    }

    pub fn power_on(remote: Arc<dyn RokuRemote>) -> Self {
        Self {
            name: "on",
            description: "Turn the TV on",
            key: "PowerOn",
            remote,
        }
    }

    pub fn power_off(remote: Arc<dyn RokuRemote>) -> Self {
        Self {
            name: "off",
            description: "Turn the TV off",
            key: "PowerOff",
            remote,
        }
    }

    pub fn select(remote: Arc<dyn RokuRemote>) -> Self {
        Self {
            name: "ok",
            description: "Press OK",
            key: "Select",
            remote,
        }
    }
}

#[async_trait]
impl ActionHandler for Keypress {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
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
        let Some(base) = address(device) else {
            response.set_message(NO_ADDRESS);
            return Ok(());
        };
        self.remote.keypress(&base, self.key).await
    }
}

/// Most volume steps one command may press
pub const MAX_VOLUME_UNITS: i64 = 50;

/// Step the volume up or down
pub struct Volume {
    remote: Arc<dyn RokuRemote>,
}

impl Volume {
    pub fn new(remote: Arc<dyn RokuRemote>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ActionHandler for Volume {
    fn name(&self) -> &str {
        "volume"
    }

    fn description(&self) -> &str {
        "Turn the volume up or down"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new()
            .arg(
                "direction",
                ArgSpec::string().required().order(0).one_of(["up", "down"]),
            )
            .arg("units", ArgSpec::integer().default_value(1).order(1))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let key = match args.get("direction").and_then(Value::as_str) {
            Some("down") => "VolumeDown",
            _ => "VolumeUp",
        };
        let units = args.get("units").and_then(Value::as_i64).unwrap_or(1);
        if !(1..=MAX_VOLUME_UNITS).contains(&units) {
            response.set_message(format!("Cannot change the volume by {units}"));
            return Ok(());
        }

        let Some(base) = address(device) else {
            response.set_message(NO_ADDRESS);
            return Ok(());
        };

        for _ in 0..units {
            self.remote.keypress(&base, key).await?;
        }
        Ok(())
    }
}

/// Switch to an HDMI input
pub struct Hdmi {
    remote: Arc<dyn RokuRemote>,
}

impl Hdmi {
    pub fn new(remote: Arc<dyn RokuRemote>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ActionHandler for Hdmi {
    fn name(&self) -> &str {
        "hdmi"
    }

    fn description(&self) -> &str {
        "Switch to an HDMI input"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new().arg("input", ArgSpec::integer().required().order(0))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let input = args.get("input").and_then(Value::as_i64).unwrap_or_default();
        if input < 1 {
            response.set_message(format!("There is no HDMI input {input}"));
            return Ok(());
        }

        let Some(base) = address(device) else {
            response.set_message(NO_ADDRESS);
            return Ok(());
        };
        self.remote
            .keypress(&base, &format!("InputHDMI{input}"))
            .await
    }
}
