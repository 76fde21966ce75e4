//! Toolkit-free controls
//!
//! Reference implementations of the capability contract. They hold state
//! only; the `click`/`slide_to`/`choose` helpers stand in for user input by
//! changing the value and then firing `value_changed`, exactly like a
//! toolkit would after a mouse or keyboard event.

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::control::{BooleanControl, Control, IndexControl, IntegerControl, MenuEntry};
use crate::signal::ChangeSignal;

// ============================================================================
// Toggle
// ============================================================================

#[derive(Debug)]
pub struct Toggle {
    id: String,
    value: bool,
    active: bool,
    changed: Rc<ChangeSignal>,
}

impl Toggle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), value: false, active: true, changed: ChangeSignal::new() }
    }

    pub fn checked(mut self, value: bool) -> Self {
        self.value = value;
        self
    }
}

impl Control for Toggle {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn value_changed(&self) -> Rc<ChangeSignal> {
        self.changed.clone()
    }

    fn as_boolean(&self) -> Option<&dyn BooleanControl> {
        Some(self)
    }

    fn as_boolean_mut(&mut self) -> Option<&mut dyn BooleanControl> {
        Some(self)
    }
}

impl BooleanControl for Toggle {
    fn value(&self) -> bool {
        self.value
    }

    fn set_value(&mut self, value: bool) {
        self.value = value;
    }
}

// ============================================================================
// Slider
// ============================================================================

#[derive(Debug)]
pub struct Slider {
    id: String,
    value: i64,
    min: i64,
    max: i64,
    step: i64,
    labels: Vec<String>,
    active: bool,
    changed: Rc<ChangeSignal>,
}

impl Slider {
    pub fn new(id: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            id: id.into(),
            value: min,
            min,
            max: max.max(min),
            step: 1,
            labels: Vec::new(),
            active: true,
            changed: ChangeSignal::new(),
        }
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Text for the current position: the configured label if any,
    /// otherwise the number itself.
    pub fn value_label(&self) -> String {
        usize::try_from(self.value - self.min)
            .ok()
            .and_then(|i| self.labels.get(i).cloned())
            .unwrap_or_else(|| self.value.to_string())
    }
}

impl Control for Slider {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn value_changed(&self) -> Rc<ChangeSignal> {
        self.changed.clone()
    }

    fn as_integer(&self) -> Option<&dyn IntegerControl> {
        Some(self)
    }

    fn as_integer_mut(&mut self) -> Option<&mut dyn IntegerControl> {
        Some(self)
    }
}

impl IntegerControl for Slider {
    fn value(&self) -> i64 {
        self.value
    }

    fn set_value(&mut self, value: i64) {
        self.value = value.clamp(self.min, self.max);
    }

    fn range(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }

    fn set_range(&mut self, min: i64, max: i64) {
        self.min = min;
        self.max = max.max(min);
        self.value = self.value.clamp(self.min, self.max);
    }

    fn set_step(&mut self, step: i64) {
        self.step = step.max(1);
    }

    fn set_value_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }
}

// ============================================================================
// MenuButton
// ============================================================================

#[derive(Debug)]
pub struct MenuButton {
    id: String,
    entries: Vec<MenuEntry>,
    selected: usize,
    active: bool,
    changed: Rc<ChangeSignal>,
}

impl MenuButton {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Vec::new(),
            selected: 0,
            active: true,
            changed: ChangeSignal::new(),
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.entries.get(self.selected).map(|e| e.label.as_str())
    }
}

impl Control for MenuButton {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn value_changed(&self) -> Rc<ChangeSignal> {
        self.changed.clone()
    }

    fn as_index(&self) -> Option<&dyn IndexControl> {
        Some(self)
    }

    fn as_index_mut(&mut self) -> Option<&mut dyn IndexControl> {
        Some(self)
    }
}

impl IndexControl for MenuButton {
    fn selected(&self) -> usize {
        self.selected
    }

    fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = index;
        }
    }

    fn set_entries(&mut self, entries: Vec<MenuEntry>) {
        self.entries = entries;
        if self.selected >= self.entries.len() {
            self.selected = 0;
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Simulated user input
// ============================================================================

/// Apply `edit` as a user interaction and fire the change signal.
///
/// Inactive controls ignore input; returns false in that case. The control
/// is not borrowed while handlers run, so handlers may read it.
pub fn interact<C: Control>(control: &Rc<RefCell<C>>, edit: impl FnOnce(&mut C)) -> bool {
    let signal = {
        let mut c = control.borrow_mut();
        if !c.is_active() {
            log::debug!("ignoring input on inactive control '{}'", c.id());
            return false;
        }
        edit(&mut *c);
        c.value_changed()
    };
    signal.emit();
    true
}

/// Flip a toggle.
pub fn click(toggle: &Rc<RefCell<Toggle>>) -> bool {
    interact(toggle, |t| t.value = !t.value)
}

pub fn slide_to(slider: &Rc<RefCell<Slider>>, value: i64) -> bool {
    interact(slider, |s| s.set_value(value))
}

pub fn choose(menu: &Rc<RefCell<MenuButton>>, index: usize) -> bool {
    interact(menu, |m| m.select(index))
}
