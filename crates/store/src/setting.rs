//! Three-state setting type
//!
//! `Setting<T>` keeps "the user never touched this" apart from "the user set
//! it to the default". Stores report `Inherit` for keys with no explicit
//! value, and only `Value` entries are written to disk.

/// A setting value with explicit inherit semantics.
///
/// - `Inherit`: use the registered default
/// - `Value(T)`: explicitly set to this value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    /// Use the default registered for the key
    Inherit,
    /// Explicitly set to this value
    Value(T),
}

impl<T> Setting<T> {
    /// Returns true if this setting is explicitly set
    pub fn is_set(&self) -> bool {
        matches!(self, Setting::Value(_))
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Setting::Inherit)
    }

    /// Returns the value if set, or None if inheriting
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Setting::Value(v) => Some(v),
            Setting::Inherit => None,
        }
    }

    /// Resolves this setting against a fallback value
    pub fn resolve(self, fallback: T) -> T {
        match self {
            Setting::Value(v) => v,
            Setting::Inherit => fallback,
        }
    }

    /// Layered resolution: an explicit value wins over the parent.
    pub fn resolve_with(self, parent: Setting<T>) -> Setting<T> {
        match self {
            Setting::Value(v) => Setting::Value(v),
            Setting::Inherit => parent,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Setting<U> {
        match self {
            Setting::Value(v) => Setting::Value(f(v)),
            Setting::Inherit => Setting::Inherit,
        }
    }
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Inherit
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Setting::Value(v),
            None => Setting::Inherit,
        }
    }
}
