//! Serializable descriptions of devices and actions

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::{ArgKind, ArgSpec, Device, DeviceAction};
use crate::Result;

/// One argument as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgDescription {
    pub required: bool,
    pub datatype: ArgKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl ArgDescription {
    #[must_use]
    pub fn of(name: &str, spec: &ArgSpec) -> Self {
        Self {
            required: spec.is_required(),
            datatype: spec.kind(),
            default: spec.default().cloned(),
            description: spec.description_text().map(ToString::to_string),
            label: spec.label_for(name),
            choices: spec.choices().map(<[String]>::to_vec),
        }
    }
}

/// An action and its argument map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescription {
    pub name: String,
    pub description: String,
    pub argmap: IndexMap<String, ArgDescription>,
}

impl ActionDescription {
    #[must_use]
    pub fn of(action: &DeviceAction) -> Self {
        let argmap = action.argmap();
        Self {
            name: action.name().to_string(),
            description: action.description().to_string(),
            argmap: argmap
                .iter()
                .map(|(name, spec)| (name.to_string(), ArgDescription::of(name, spec)))
                .collect(),
        }
    }
}

/// A device with every action it supports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescription {
    pub name: String,
    pub description: String,
    pub actions: Vec<ActionDescription>,
    pub action_map: IndexMap<String, ActionDescription>,
}

impl DeviceDescription {
    /// Describe a device
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAction` if the device's action names collide
    pub fn of(device: &dyn Device) -> Result<Self> {
        let action_map: IndexMap<String, ActionDescription> = device
            .action_map()?
            .iter()
            .map(|(name, action)| (name.clone(), action.describe()))
            .collect();

        Ok(Self {
            name: device.name().to_string(),
            description: device.description().to_string(),
            actions: action_map.values().cloned().collect(),
            action_map,
        })
    }
}
