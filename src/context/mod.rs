//! Conversational context persisted between dialogue turns
//!
//! Records:
//! - the device the user is "inside" (set by the `enter` action)
//! - a fixed action, if any
//! - whether a dialogue is open (skips the wakeword on the next turn)
//! - any other captured slot values

mod store;

pub use store::{ConfigStore, JsonStore};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// On-disk shape of the context file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default)]
    pub in_dialogue: bool,

    /// Previously captured slot values
    #[serde(flatten)]
    pub slots: Map<String, Value>,
}

/// The context of the single active session
#[derive(Debug, Clone)]
pub struct Context {
    store: JsonStore<ContextRecord>,
}

impl Context {
    /// Open the context file
    ///
    /// A missing or unparsable file gives an empty context; the next save
    /// overwrites it.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::open_or_default(path)?,
        })
    }

    /// Write an empty context over whatever the file holds
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn fresh(path: impl Into<PathBuf>) -> Result<Self> {
        let mut context = Self {
            store: JsonStore::empty(path),
        };
        context.save()?;
        Ok(context)
    }

    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.store.content().device.as_deref()
    }

    pub fn set_device(&mut self, device: Option<String>) {
        self.store.content_mut().device = device;
    }

    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.store.content().action.as_deref()
    }

    pub fn set_action(&mut self, action: Option<String>) {
        self.store.content_mut().action = action;
    }

    #[must_use]
    pub const fn in_dialogue(&self) -> bool {
        self.store.content().in_dialogue
    }

    pub const fn set_in_dialogue(&mut self, open: bool) {
        self.store.content_mut().in_dialogue = open;
    }

    #[must_use]
    pub fn slot(&self, key: &str) -> Option<&Value> {
        self.store.content().slots.get(key)
    }

    pub fn set_slot(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.store
            .content_mut()
            .slots
            .insert(key.into(), value.into());
    }

    pub fn remove_slot(&mut self, key: &str) -> Option<Value> {
        self.store.content_mut().slots.remove(key)
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Persist the context
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&mut self) -> Result<()> {
        tracing::debug!(
            device = ?self.device(),
            in_dialogue = self.in_dialogue(),
            "saving context"
        );
        self.store.save()
    }

    /// Re-read the context from disk
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn reload(&mut self) -> Result<()> {
        self.store.load()
    }

    /// Keys that differ from what is on disk
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn diff(&self) -> Result<Vec<String>> {
        self.store.diff()
    }

    #[must_use]
    pub const fn record(&self) -> &ContextRecord {
        self.store.content()
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}
