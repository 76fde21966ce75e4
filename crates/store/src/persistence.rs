//! Preference persistence (load/save)
//!
//! Preferences are stored in `~/.config/prefkit/preferences.json` unless the
//! host passes its own path. Only explicit values are written; defaults live
//! in code.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::setting::Setting;
use crate::store::{MemoryStore, PreferenceStore};
use crate::value::PreferenceValue;

/// Get the path to the default preferences file
pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prefkit")
        .join("preferences.json")
}

/// Read explicit values from `path`.
///
/// A missing file is not an error (first run). Lines starting with `//`
/// are stripped before parsing so the file can carry comments. Entries that
/// are not a bool, integer or string are skipped with a warning.
pub fn load_values(path: &Path) -> Result<BTreeMap<String, PreferenceValue>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let cleaned: String = contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&cleaned).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // Entries convert one by one; an unsupported one is dropped alone.
    let mut values = BTreeMap::new();
    for (key, value) in raw {
        match serde_json::from_value::<PreferenceValue>(value.clone()) {
            Ok(v) => {
                values.insert(key, v);
            }
            Err(_) => log::warn!("{}: skipping '{key}', unsupported value {value}", path.display()),
        }
    }
    Ok(values)
}

/// Write explicit values to `path` (atomic write)
///
/// Uses write-to-temp-then-rename so a crash mid-write never leaves a
/// truncated preferences file behind.
pub fn save_values(path: &Path, values: &BTreeMap<String, PreferenceValue>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let json = serde_json::to_string_pretty(values)
        .map_err(|e| StoreError::Serialize(e.to_string()))?;

    let temp = path.with_extension("json.tmp");
    fs::write(&temp, json).map_err(|e| StoreError::io(&temp, e))?;
    fs::rename(&temp, path).map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// JSON-file backed store.
///
/// Reads once on open; every `set` only touches memory until
/// `write_to_disk`. If a write fails the in-memory values stay
/// authoritative and the next successful write persists them.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    dirty: bool,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// Returns an empty store if the file doesn't exist or can't be parsed.
    /// This is intentional - a broken preferences file must not prevent
    /// the dialog from opening.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_values(&path) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("{e}; using default preferences");
                BTreeMap::new()
            }
        };
        log::debug!("loaded {} preference(s) from {}", values.len(), path.display());

        Self { path, memory: MemoryStore::from_values(values), dirty: false }
    }

    /// Open the store at `default_preferences_path()`.
    pub fn open_default() -> Self {
        Self::open(default_preferences_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if there are changes not yet written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_default(&mut self, key: &str, value: impl Into<PreferenceValue>) {
        self.memory.set_default(key, value);
    }

    pub fn with_default(mut self, key: &str, value: impl Into<PreferenceValue>) -> Self {
        self.memory.set_default(key, value);
        self
    }

    pub fn setting(&self, key: &str) -> Setting<PreferenceValue> {
        self.memory.setting(key)
    }

    pub fn reset(&mut self, key: &str) {
        if self.memory.setting(key).is_set() {
            self.memory.reset(key);
            self.dirty = true;
        }
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.memory.get(key)
    }

    fn set(&mut self, key: &str, value: PreferenceValue) {
        if self.memory.insert(key, value) {
            self.dirty = true;
        }
    }

    fn write_to_disk(&mut self) -> Result<(), StoreError> {
        if let Err(e) = save_values(&self.path, self.memory.values()) {
            log::warn!("failed to write preferences: {e}");
            return Err(e);
        }
        self.dirty = false;
        log::debug!("wrote {} preference(s) to {}", self.memory.len(), self.path.display());
        Ok(())
    }
}
