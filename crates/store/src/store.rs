//! Preference store contract and the in-memory implementation
//!
//! The registry only ever sees `dyn PreferenceStore`, so tests can hand it a
//! `MemoryStore` while an application hands it a `FileStore`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::StoreError;
use crate::setting::Setting;
use crate::value::{PreferenceType, PreferenceValue};

/// Shared handle to a store. UI-thread only.
pub type SharedStore = Rc<RefCell<dyn PreferenceStore>>;

/// Key-value persistence for named preferences.
pub trait PreferenceStore {
    /// Current value for `key`: the explicit value if set, else the
    /// registered default, else `None`.
    fn get(&self, key: &str) -> Option<PreferenceValue>;

    /// Like `get`, but with a caller-supplied fallback.
    fn get_or(&self, key: &str, default: PreferenceValue) -> PreferenceValue {
        self.get(key).unwrap_or(default)
    }

    /// Explicitly set `key`.
    fn set(&mut self, key: &str, value: PreferenceValue);

    /// Persist all explicit values.
    fn write_to_disk(&mut self) -> Result<(), StoreError>;
}

/// Typed accessors on top of `PreferenceStore`.
///
/// A stored value of the wrong kind is treated as invalid: the caller's
/// default is returned and a warning logged.
pub trait PreferenceStoreExt: PreferenceStore {
    fn get_typed<T: PreferenceType>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            None => default,
            Some(value) => match T::from_value(&value) {
                Some(v) => v,
                None => {
                    log::warn!(
                        "preference '{key}' holds a {} value, expected {}; using default",
                        value.kind(),
                        T::KIND
                    );
                    default
                }
            },
        }
    }

    fn set_typed<T: PreferenceType>(&mut self, key: &str, value: T) {
        self.set(key, value.into_value());
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_typed(key, default)
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_typed(key, default)
    }

    fn get_choice(&self, key: &str, default: &str) -> String {
        self.get_typed(key, default.to_string())
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStoreExt for S {}

/// In-memory store: explicit values layered over registered defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: BTreeMap<String, PreferenceValue>,
    defaults: BTreeMap<String, PreferenceValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-loaded explicit values.
    pub fn from_values(values: BTreeMap<String, PreferenceValue>) -> Self {
        Self { values, defaults: BTreeMap::new() }
    }

    /// Register the default for `key`. Does not touch an explicit value.
    pub fn set_default(&mut self, key: &str, value: impl Into<PreferenceValue>) {
        self.defaults.insert(key.to_string(), value.into());
    }

    pub fn with_default(mut self, key: &str, value: impl Into<PreferenceValue>) -> Self {
        self.set_default(key, value);
        self
    }

    pub fn default_for(&self, key: &str) -> Option<&PreferenceValue> {
        self.defaults.get(key)
    }

    /// The explicit value for `key`, or `Inherit` if only the default applies.
    pub fn setting(&self, key: &str) -> Setting<PreferenceValue> {
        self.values.get(key).cloned().into()
    }

    /// Drop the explicit value so `key` falls back to its default.
    pub fn reset(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Explicit values only, in key order.
    pub fn values(&self) -> &BTreeMap<String, PreferenceValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store an explicit value. Returns false if it was rejected: a key's
    /// kind is fixed by its default when one is registered.
    pub fn insert(&mut self, key: &str, value: PreferenceValue) -> bool {
        if let Some(default) = self.defaults.get(key) {
            if default.kind() != value.kind() {
                log::warn!(
                    "ignoring {} value for '{key}', registered default is {}",
                    value.kind(),
                    default.kind()
                );
                return false;
            }
        }
        self.values.insert(key.to_string(), value);
        true
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.setting(key)
            .resolve_with(self.defaults.get(key).cloned().into())
            .as_value()
            .cloned()
    }

    fn set(&mut self, key: &str, value: PreferenceValue) {
        self.insert(key, value);
    }

    fn write_to_disk(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
