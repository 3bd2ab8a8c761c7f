//! Device registry
//!
//! Maps device names to constructors. Built once at startup and passed by
//! reference to the dialogue controller; never mutated afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::Context;
use crate::device::generic::GENERIC_DEVICE;
use crate::device::roku::ROKU_DEVICE;
use crate::device::{Device, DeviceDescription, GenericDevice, RokuDevice, RokuRemote};
use crate::{Error, Result};

/// What a device constructor is given
#[derive(Debug)]
pub struct DeviceEnv<'a> {
    /// Dialogue context, when the caller has one
    pub context: Option<Context>,

    /// Base directory for device settings
    pub state_dir: &'a Path,
}

type Constructor = Box<dyn Fn(DeviceEnv<'_>) -> Result<Box<dyn Device>> + Send + Sync>;

/// Registered devices in registration order
pub struct Registry {
    constructors: IndexMap<String, Constructor>,
    state_dir: PathBuf,
}

impl Registry {
    /// Start building a registry whose devices keep settings under `state_dir`
    #[must_use]
    pub fn builder(state_dir: impl Into<PathBuf>) -> RegistryBuilder {
        RegistryBuilder {
            constructors: Vec::new(),
            state_dir: state_dir.into(),
        }
    }

    /// The registry of every device this hub ships with
    ///
    /// # Errors
    ///
    /// Returns error if a device fails validation
    pub fn with_defaults(state_dir: impl Into<PathBuf>, roku: Arc<dyn RokuRemote>) -> Result<Self> {
        Self::builder(state_dir)
            .device(ROKU_DEVICE, move |env| {
                let device: Box<dyn Device> =
                    Box::new(RokuDevice::open(env.state_dir, env.context, roku.clone())?);
                Ok(device)
            })
            .build()
    }

    /// Registered device names, without the generic pseudo-device
    #[must_use]
    pub fn device_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Check if a device is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Construct a fresh instance of a device by name
    ///
    /// The generic pseudo-device is available under its own name. Returns
    /// `None` for unknown names; the context is dropped in that case.
    ///
    /// # Errors
    ///
    /// Returns error if the device constructor fails
    pub fn create(&self, name: &str, context: Option<Context>) -> Result<Option<Box<dyn Device>>> {
        if name == GENERIC_DEVICE {
            return Ok(Some(Box::new(self.generic(context))));
        }

        let Some(constructor) = self.constructors.get(name) else {
            return Ok(None);
        };

        let device = constructor(DeviceEnv {
            context,
            state_dir: &self.state_dir,
        })?;
        Ok(Some(device))
    }

    /// The generic pseudo-device over this registry's devices
    #[must_use]
    pub fn generic(&self, context: Option<Context>) -> GenericDevice {
        GenericDevice::new(context, self.device_names())
    }

    /// Names of the device-independent actions
    #[must_use]
    pub fn generic_action_names(&self) -> Vec<String> {
        self.generic(None).action_names()
    }

    /// Describe one device, including the generic pseudo-device
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be constructed
    pub fn describe(&self, name: &str) -> Result<Option<DeviceDescription>> {
        self.create(name, None)?
            .map(|device| DeviceDescription::of(device.as_ref()))
            .transpose()
    }

    /// Describe every registered device
    ///
    /// # Errors
    ///
    /// Returns error if a device cannot be constructed
    pub fn describe_all(&self) -> Result<Vec<DeviceDescription>> {
        self.constructors
            .keys()
            .filter_map(|name| self.describe(name).transpose())
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("devices", &self.device_names())
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

/// Collects device constructors and validates them
pub struct RegistryBuilder {
    constructors: Vec<(String, Constructor)>,
    state_dir: PathBuf,
}

impl RegistryBuilder {
    /// Register a device constructor under a name
    #[must_use]
    pub fn device<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(DeviceEnv<'_>) -> Result<Box<dyn Device>> + Send + Sync + 'static,
    {
        self.constructors.push((name.into(), Box::new(constructor)));
        self
    }

    /// Validate every device and freeze the registry
    ///
    /// Each device is constructed once without a context and its action map
    /// is built, so duplicate action names fail here instead of mid-dialogue.
    ///
    /// # Errors
    ///
    /// Returns `Config` for a reused or reserved device name, a device whose
    /// name differs from its registration, and `DuplicateAction` for
    /// colliding action names
    pub fn build(self) -> Result<Registry> {
        let mut constructors = IndexMap::with_capacity(self.constructors.len());

        for (name, constructor) in self.constructors {
            if name == GENERIC_DEVICE {
                return Err(Error::Config(format!("device name {name} is reserved")));
            }
            if constructors.contains_key(&name) {
                return Err(Error::Config(format!("device {name} registered twice")));
            }

            let device = constructor(DeviceEnv {
                context: None,
                state_dir: &self.state_dir,
            })?;
            if device.name() != name {
                return Err(Error::Config(format!(
                    "device registered as {name} calls itself {}",
                    device.name()
                )));
            }
            let actions = device.action_map()?;

            tracing::debug!(device = %name, actions = actions.len(), "device registered");
            constructors.insert(name, constructor);
        }

        let registry = Registry {
            constructors,
            state_dir: self.state_dir,
        };
        registry.generic(None).action_map()?;

        tracing::info!(devices = ?registry.device_names(), "registry built");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{
        ActionHandler, ActionResponse, ArgMap, Args, Describable, DeviceAction,
    };

    struct Noop(&'static str);

    #[async_trait::async_trait]
    impl ActionHandler for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn argmap(&self) -> ArgMap {
            ArgMap::new()
        }

        async fn perform(
            &self,
            _args: &Args,
            _device: &mut dyn Device,
            _response: &mut ActionResponse,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct Fake {
        name: &'static str,
        actions: &'static [&'static str],
    }

    impl Describable for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "fake"
        }
    }

    impl Device for Fake {
        fn actions(&self) -> Vec<DeviceAction> {
            self.actions.iter().map(|a| DeviceAction::new(Noop(a))).collect()
        }
    }

    fn fake(
        name: &'static str,
        actions: &'static [&'static str],
    ) -> impl Fn(DeviceEnv<'_>) -> Result<Box<dyn Device>> + Send + Sync {
        move |_| {
            let device: Box<dyn Device> = Box::new(Fake { name, actions });
            Ok(device)
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = Registry::builder("/tmp/unused")
            .device("tv", fake("tv", &["on"]))
            .device("lamp", fake("lamp", &["on"]))
            .build()
            .unwrap();

        assert_eq!(registry.device_names(), ["tv", "lamp"]);
        assert!(registry.contains("lamp"));
        assert!(!registry.contains(GENERIC_DEVICE));
    }

    #[test]
    fn duplicate_action_fails_build() {
        let err = Registry::builder("/tmp/unused")
            .device("tv", fake("tv", &["on", "off", "on"]))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateAction { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn reserved_and_repeated_names_fail_build() {
        let reserved = Registry::builder("/tmp/unused")
            .device(GENERIC_DEVICE, fake(GENERIC_DEVICE, &[]))
            .build();
        assert!(matches!(reserved, Err(Error::Config(_))));

        let repeated = Registry::builder("/tmp/unused")
            .device("tv", fake("tv", &[]))
            .device("tv", fake("tv", &[]))
            .build();
        assert!(matches!(repeated, Err(Error::Config(_))));

        let mismatched = Registry::builder("/tmp/unused")
            .device("tv", fake("television", &[]))
            .build();
        assert!(matches!(mismatched, Err(Error::Config(_))));
    }

    #[test]
    fn creates_devices_and_generic() {
        let registry = Registry::builder("/tmp/unused")
            .device("tv", fake("tv", &["on"]))
            .build()
            .unwrap();

        assert_eq!(registry.create("tv", None).unwrap().unwrap().name(), "tv");
        assert_eq!(
            registry.create(GENERIC_DEVICE, None).unwrap().unwrap().name(),
            GENERIC_DEVICE
        );
        assert!(registry.create("toaster", None).unwrap().is_none());
        assert_eq!(
            registry.generic_action_names(),
            ["list_devices", "enter", "exit"]
        );
    }

    #[test]
    fn describes_devices() {
        let registry = Registry::builder("/tmp/unused")
            .device("tv", fake("tv", &["on", "off"]))
            .build()
            .unwrap();

        let all = registry.describe_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "tv");
        assert_eq!(all[0].actions.len(), 2);
        assert!(registry.describe("toaster").unwrap().is_none());
    }
}
