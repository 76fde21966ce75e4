//! Control capability contract
//!
//! The registry never names a concrete widget type. A control exposes the
//! common `Control` surface plus whichever narrow capabilities it actually
//! supports; the registry asks for a capability and fails with a
//! configuration error when it is absent.
//!
//! `set_value`/`select` are programmatic and never fire `value_changed`.
//! Only user interaction does.

use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::signal::ChangeSignal;

/// A capability a binding can require of its control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Boolean,
    Integer,
    Index,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Boolean => "boolean",
            Capability::Integer => "integer",
            Capability::Index => "index",
        };
        f.write_str(name)
    }
}

pub trait Control {
    fn id(&self) -> &str;

    fn is_active(&self) -> bool;

    /// Enable or disable the control for user input.
    fn set_active(&mut self, active: bool);

    /// Signal fired after the user changes the value.
    fn value_changed(&self) -> Rc<ChangeSignal>;

    fn as_boolean(&self) -> Option<&dyn BooleanControl> {
        None
    }

    fn as_boolean_mut(&mut self) -> Option<&mut dyn BooleanControl> {
        None
    }

    fn as_integer(&self) -> Option<&dyn IntegerControl> {
        None
    }

    fn as_integer_mut(&mut self) -> Option<&mut dyn IntegerControl> {
        None
    }

    fn as_index(&self) -> Option<&dyn IndexControl> {
        None
    }

    fn as_index_mut(&mut self) -> Option<&mut dyn IndexControl> {
        None
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Boolean => self.as_boolean().is_some(),
            Capability::Integer => self.as_integer().is_some(),
            Capability::Index => self.as_index().is_some(),
        }
    }
}

/// Toggle buttons, check boxes
pub trait BooleanControl {
    fn value(&self) -> bool;

    fn set_value(&mut self, value: bool);
}

/// Sliders, spin boxes
pub trait IntegerControl {
    fn value(&self) -> i64;

    fn set_value(&mut self, value: i64);

    fn range(&self) -> RangeInclusive<i64>;

    fn set_range(&mut self, min: i64, max: i64);

    fn set_step(&mut self, _step: i64) {}

    /// Text shown for each position, starting at the range minimum.
    fn set_value_labels(&mut self, _labels: Vec<String>) {}
}

/// One row of an index-selected control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub details: Option<String>,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Menu buttons, combo boxes, list boxes
pub trait IndexControl {
    fn selected(&self) -> usize;

    fn select(&mut self, index: usize);

    fn set_entries(&mut self, entries: Vec<MenuEntry>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
