use std::fmt;

use crate::control::Capability;

/// Configuration errors raised while wiring a dialog.
///
/// These are programming errors in the dialog description, not runtime
/// conditions: registration returns them and the caller aborts dialog
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No control with this id exists in the tree
    MissingControl { id: String },
    /// A control with this id was already added to the tree
    DuplicateControl { id: String },
    /// The control exists but lacks the capability the binding needs
    Capability { id: String, required: Capability },
    /// An enumerated binding was given no options
    EmptyOptions { id: String },
    /// Invalid dialog description (advanced options, radio groups)
    Config(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingControl { id } => write!(f, "no control with id '{id}'"),
            Self::DuplicateControl { id } => write!(f, "duplicate control id '{id}'"),
            Self::Capability { id, required } => {
                write!(f, "control '{id}' is not a {required} control")
            }
            Self::EmptyOptions { id } => write!(f, "control '{id}': option list is empty"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for BindError {}
