//! JSON file-backed records
//!
//! A missing file is never an error: the record starts from its default and
//! the file is created on the next save. Writes are last-writer-wins; there
//! is no locking between processes or tasks sharing a file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// A record persisted as one JSON document
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    content: T,
    file_exists: bool,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Open a store, loading the file if it exists
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::empty(path);
        store.load()?;
        Ok(store)
    }

    /// Open a store, starting from the default if the file does not parse
    ///
    /// The unparsable file stays on disk until the next save replaces it.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn open_or_default(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::empty(path);
        match store.load() {
            Ok(()) => {}
            Err(Error::Serialization(e)) => {
                tracing::warn!(
                    path = %store.path.display(),
                    error = %e,
                    "unparsable record, using defaults"
                );
                store.file_exists = true;
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    /// A store holding the default record, without reading the file
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: T::default(),
            file_exists: false,
        }
    }

    /// Replace the in-memory record with the file contents
    ///
    /// A missing file resets the record to its default.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(&mut self) -> Result<()> {
        match read_record(&self.path)? {
            Some(content) => {
                self.content = content;
                self.file_exists = true;
            }
            None => {
                tracing::debug!(path = %self.path.display(), "no saved record, using defaults");
                self.content = T::default();
                self.file_exists = false;
            }
        }
        Ok(())
    }

    /// Write the record, creating parent directories as needed
    ///
    /// The record goes to a temporary file in the same directory that is
    /// then renamed over the target, so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(&self.content)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        self.file_exists = true;

        tracing::trace!(path = %self.path.display(), "record saved");
        Ok(())
    }

    /// Remove the file, keeping the in-memory record
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed
    pub fn delete(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.file_exists = false;
        Ok(())
    }

    /// Reset the in-memory record to its default
    pub fn clear(&mut self) {
        self.content = T::default();
    }

    /// Top-level keys whose values differ from a fresh reload of the file
    ///
    /// With no file on disk every key of the in-memory record differs.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn diff(&self) -> Result<Vec<String>> {
        let current = as_object(serde_json::to_value(&self.content)?);
        let saved = match read_record::<Value>(&self.path)? {
            Some(value) => as_object(value),
            None => return Ok(current.keys().cloned().collect()),
        };

        let mut keys: Vec<String> = current
            .iter()
            .filter(|(k, v)| saved.get(k.as_str()) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.extend(saved.keys().filter(|k| !current.contains_key(*k)).cloned());
        Ok(keys)
    }

    /// Whether the in-memory record differs from the file
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn has_changes(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(true);
        }
        Ok(!self.diff()?.is_empty())
    }

    #[must_use]
    pub const fn content(&self) -> &T {
        &self.content
    }

    pub const fn content_mut(&mut self) -> &mut T {
        &mut self.content
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file existed at the last load or save
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.file_exists
    }
}

/// Free-form JSON object record, used for device configuration
pub type ConfigStore = JsonStore<Map<String, Value>>;

impl JsonStore<Map<String, Value>> {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// String value of a key, if present and a string
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.content.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.content.remove(key)
    }

    /// Read a nested value by following object keys
    #[must_use]
    pub fn dig(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        rest.iter()
            .try_fold(self.content.get(*first)?, |value, key| value.get(*key))
    }
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
