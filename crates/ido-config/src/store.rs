/*
 * store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The mutable, lockable configuration store.

use crate::error::{ConfigError, Result};
use crate::merge::{expand_dotted_keys, merge_maps};
use crate::path;
use serde_json::{Map, Value};
use std::ops::Index;

static NULL: Value = Value::Null;

/// A hierarchical mapping from dot paths to values.
///
/// A store is created per request, seeded with [`load_from_map`] and then
/// usually locked before rendering starts. While locked, every mutating
/// operation fails with [`ConfigError::Immutable`].
///
/// [`load_from_map`]: ConfigStore::load_from_map
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    settings: Map<String, Value>,
    mutable: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create an empty, mutable store.
    pub fn new() -> Self {
        Self {
            settings: Map::new(),
            mutable: true,
        }
    }

    /// Create a store with initial settings.
    ///
    /// Initial settings are taken as given: dotted keys are not expanded and
    /// macros are not compiled.
    pub fn with_settings(settings: Map<String, Value>, mutable: bool) -> Self {
        Self { settings, mutable }
    }

    /// The whole settings tree.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Consume the store and return its settings tree.
    pub fn into_settings(self) -> Map<String, Value> {
        self.settings
    }

    /// Get the value at a dot path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path::lookup_in(&self.settings, path::split(path))
    }

    /// Get the value at a dot path, or `default` when it does not exist.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Get a string value at a dot path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Get a boolean value at a dot path.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Check whether a dot path exists.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Assign a value at a dot path.
    ///
    /// Missing intermediate components are created as empty mappings, and an
    /// intermediate scalar is overwritten by a mapping.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable("set")?;

        let mut segments = path::split(path);
        let first = segments.next().unwrap_or_default();
        let mut slot = self
            .settings
            .entry(first.to_string())
            .or_insert(Value::Null);
        for segment in segments {
            slot = path::slot(slot, segment);
        }
        *slot = value.into();
        Ok(())
    }

    /// Remove the value at a dot path, returning it.
    ///
    /// Removing a path that does not exist is a no-op.
    pub fn remove(&mut self, path: &str) -> Result<Option<Value>> {
        self.ensure_mutable("remove")?;

        let segments: Vec<&str> = path::split(path).collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };
        let Some((first, rest)) = parents.split_first() else {
            return Ok(self.settings.remove(*last));
        };

        let mut parent = self.settings.get_mut(*first);
        for segment in rest {
            parent = parent.and_then(|value| path::child_mut(value, segment));
        }

        let removed = match parent {
            Some(Value::Object(map)) => map.remove(*last),
            Some(Value::Array(items)) => {
                path::index_in(last, items.len()).map(|index| items.remove(index))
            }
            _ => None,
        };
        Ok(removed)
    }

    /// Prevent further mutation.
    pub fn lock(&mut self) {
        self.mutable = false;
    }

    /// Allow mutation again.
    pub fn unlock(&mut self) {
        self.mutable = true;
    }

    /// Whether mutating operations are currently allowed.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Deep-merge `data` into the settings, then compile macros.
    ///
    /// Dotted top-level keys in `data` address nested values
    /// (`{"site.name": "Acme"}` merges as `{"site": {"name": "Acme"}}`).
    /// Returns the merged settings.
    pub fn load_from_map(&mut self, data: Map<String, Value>) -> Result<&Map<String, Value>> {
        self.ensure_mutable("load configuration")?;

        merge_maps(&mut self.settings, expand_dotted_keys(data));
        self.compile()?;
        Ok(&self.settings)
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.settings
    }

    pub(crate) fn ensure_mutable(&self, operation: &'static str) -> Result<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(ConfigError::Immutable { operation })
        }
    }
}

impl Index<&str> for ConfigStore {
    type Output = Value;

    /// Index by dot path; missing paths yield `Value::Null`.
    fn index(&self, path: &str) -> &Value {
        self.get(path).unwrap_or(&NULL)
    }
}

impl From<Map<String, Value>> for ConfigStore {
    fn from(settings: Map<String, Value>) -> Self {
        Self::with_settings(settings, true)
    }
}
