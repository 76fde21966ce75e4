//! Preference values
//!
//! Every key holds one `PreferenceValue`. On disk the variants map to plain
//! JSON scalars: `true`, `42`, `"fancy"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The tag of a `PreferenceValue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Choice,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Choice => "choice",
        };
        f.write_str(name)
    }
}

/// A stored preference value.
///
/// `Choice` holds the id of one option out of an enumerated set; the store
/// does not know the set, the binding that reads it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Choice(String),
}

impl PreferenceValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PreferenceValue::Bool(_) => ValueKind::Bool,
            PreferenceValue::Int(_) => ValueKind::Int,
            PreferenceValue::Choice(_) => ValueKind::Choice,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            PreferenceValue::Choice(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceValue::Bool(b) => write!(f, "{b}"),
            PreferenceValue::Int(i) => write!(f, "{i}"),
            PreferenceValue::Choice(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(v: bool) -> Self {
        PreferenceValue::Bool(v)
    }
}

impl From<i64> for PreferenceValue {
    fn from(v: i64) -> Self {
        PreferenceValue::Int(v)
    }
}

impl From<String> for PreferenceValue {
    fn from(v: String) -> Self {
        PreferenceValue::Choice(v)
    }
}

impl From<&str> for PreferenceValue {
    fn from(v: &str) -> Self {
        PreferenceValue::Choice(v.to_string())
    }
}

/// Rust types that map onto exactly one `ValueKind`.
///
/// Used by typed accessors so a binding never writes a value whose tag
/// differs from the one it reads.
pub trait PreferenceType: Sized + Clone {
    const KIND: ValueKind;

    fn from_value(value: &PreferenceValue) -> Option<Self>;

    fn into_value(self) -> PreferenceValue;
}

impl PreferenceType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Bool(self)
    }
}

impl PreferenceType for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        value.as_int()
    }

    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Int(self)
    }
}

impl PreferenceType for String {
    const KIND: ValueKind = ValueKind::Choice;

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        value.as_choice().map(str::to_string)
    }

    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Choice(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shape() {
        let values = vec![
            PreferenceValue::Bool(true),
            PreferenceValue::Int(-3),
            PreferenceValue::Choice("fancy".into()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,-3,"fancy"]"#);

        let parsed: Vec<PreferenceValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, values);
    }

    #[test]
    fn test_typed_conversion_rejects_other_kinds() {
        let v = PreferenceValue::Int(5);
        assert_eq!(i64::from_value(&v), Some(5));
        assert_eq!(bool::from_value(&v), None);
        assert_eq!(String::from_value(&v), None);
        assert_eq!(v.kind(), ValueKind::Int);
    }
}
