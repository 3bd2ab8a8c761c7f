//! Roku streaming device
//!
//! Settings live in `roku/main_config.json` under the state directory; the
//! only key is `ip`, the device's base URL. Content lookup tables live in
//! `roku/content/`.

mod content;
mod keypress;
mod remote;

pub use keypress::MAX_VOLUME_UNITS;
pub use remote::{HttpRokuRemote, RokuRemote, base_url};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    ArgMap, Describable, Device, DeviceAction, HasConfig, HasContext, base_actions,
    configurable_actions,
};
use crate::Result;
use crate::context::{ConfigStore, Context};

/// Registry name of the Roku device
pub const ROKU_DEVICE: &str = "roku";

/// Spoken when an action needs the device address and none is saved
pub const NO_ADDRESS: &str =
    "The roku address is not set. Say \"roku set ip\" followed by the address.";

/// A Roku on the local network
pub struct RokuDevice {
    context: Option<Context>,
    config: ConfigStore,
    content_dir: PathBuf,
    remote: Arc<dyn RokuRemote>,
}

impl RokuDevice {
    /// Load the Roku settings from the state directory
    ///
    /// # Errors
    ///
    /// Returns error if the settings file exists but cannot be parsed
    pub fn open(
        state_dir: &Path,
        context: Option<Context>,
        remote: Arc<dyn RokuRemote>,
    ) -> Result<Self> {
        let root = state_dir.join(ROKU_DEVICE);
        Ok(Self {
            context,
            config: ConfigStore::open(root.join("main_config.json"))?,
            content_dir: root.join("content"),
            remote,
        })
    }
}

impl std::fmt::Debug for RokuDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RokuDevice")
            .field("config", &self.config)
            .field("content_dir", &self.content_dir)
            .finish_non_exhaustive()
    }
}

impl Describable for RokuDevice {
    fn name(&self) -> &str {
        ROKU_DEVICE
    }

    fn description(&self) -> &str {
        "A way to interact with any Roku devices on this network."
    }
}

impl HasContext for RokuDevice {
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

impl HasConfig for RokuDevice {
    fn config(&self) -> &ConfigStore {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    // The address is set through set_ip
    fn config_map(&self) -> ArgMap {
        ArgMap::new()
    }
}

impl Device for RokuDevice {
    fn actions(&self) -> Vec<DeviceAction> {
        let remote = &self.remote;
        let mut actions = base_actions();
        actions.extend(configurable_actions(self.config_map()));
        actions.extend([
            DeviceAction::new(keypress::SetIp),
            DeviceAction::new(keypress::Volume::new(remote.clone())),
            DeviceAction::new(keypress::Keypress::home(remote.clone())),
            DeviceAction::new(keypress::Keypress::power_on(remote.clone())),
            DeviceAction::new(keypress::Keypress::power_off(remote.clone())),
            DeviceAction::new(keypress::Keypress::select(remote.clone())),
            DeviceAction::new(keypress::Hdmi::new(remote.clone())),
            DeviceAction::new(content::PlayRandom::new(
                remote.clone(),
                self.content_dir.clone(),
            )),
            DeviceAction::new(content::PlayContent::new(
                remote.clone(),
                self.content_dir.clone(),
            )),
        ]);
        actions
    }

    fn as_context(&mut self) -> Option<&mut dyn HasContext> {
        Some(self)
    }

    fn as_config(&mut self) -> Option<&mut dyn HasConfig> {
        Some(self)
    }
}

/// Saved base URL of the device, if any
fn address(device: &mut dyn Device) -> Option<String> {
    device
        .as_config()
        .and_then(|c| c.config().get_str("ip").map(ToString::to_string))
}
