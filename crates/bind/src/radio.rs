//! Radio groups: several toggles bound to one enumerated value

use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::rc::{Rc, Weak};

use crate::control::{Capability, Control};
use crate::error::BindError;
use crate::field::{Field, Getter, OnChange, Setter};
use crate::registry::{BindingRegistry, ErasedBinding};
use crate::tree::ControlTree;

/// Toggles, each standing for one value. Exactly one member is on.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioGroup<T> {
    members: Vec<(String, T)>,
}

impl<T> RadioGroup<T> {
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    pub fn member(mut self, control_id: impl Into<String>, value: T) -> Self {
        self.members.push((control_id.into(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T> Default for RadioGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct RadioBinding<T> {
    label: String,
    controls: Vec<Weak<RefCell<dyn Control>>>,
    values: Vec<T>,
    selected: Cell<usize>,
    getter: Getter<T>,
    setter: RefCell<Setter<T>>,
    on_change: RefCell<Option<OnChange<T>>>,
    immediate: bool,
}

impl<T: Clone + PartialEq + Display + 'static> RadioBinding<T> {
    /// Turn member `index` on and every other member off.
    fn show(&self, index: usize) {
        for (i, control) in self.controls.iter().enumerate() {
            if let Some(control) = control.upgrade() {
                if let Some(b) = control.borrow_mut().as_boolean_mut() {
                    b.set_value(i == index);
                }
            }
        }
        self.selected.set(index);
    }

    fn is_on(&self, index: usize) -> bool {
        self.controls[index]
            .upgrade()
            .and_then(|c| c.borrow().as_boolean().map(|b| b.value()))
            .unwrap_or(false)
    }

    fn handle_change(&self, index: usize) {
        if !self.is_on(index) {
            // The active member can't be switched off directly.
            if index == self.selected.get() {
                self.show(index);
            }
            return;
        }

        self.show(index);
        let value = self.values[index].clone();
        if self.immediate {
            let mut setter = self.setter.borrow_mut();
            (&mut **setter)(value.clone());
        }
        self.fire_with(&value);
    }

    fn fire_with(&self, value: &T) {
        if let Some(on_change) = self.on_change.borrow_mut().as_mut() {
            on_change(value);
        }
    }
}

impl<T: Clone + PartialEq + Display + 'static> ErasedBinding for RadioBinding<T> {
    fn control_id(&self) -> &str {
        &self.label
    }

    fn is_immediate(&self) -> bool {
        self.immediate
    }

    fn load(&self) {
        let value = (self.getter)();
        let index = self.values.iter().position(|v| *v == value).unwrap_or_else(|| {
            log::warn!(
                "radio group '{}': stored value {value} has no member; using {}",
                self.label,
                self.values[0]
            );
            0
        });
        self.show(index);
    }

    fn save(&self) {
        let value = self.values[self.selected.get()].clone();
        let mut setter = self.setter.borrow_mut();
        (&mut **setter)(value);
    }
}

impl BindingRegistry {
    /// Bind a group of toggles to one value.
    ///
    /// Turning a member on turns the others off and saves its value;
    /// turning the selected member off is undone. Control ids and values
    /// must each be unique, and every member is resolved before anything
    /// is registered.
    pub fn register_radio_group<T>(
        &mut self,
        tree: &ControlTree,
        group: RadioGroup<T>,
        field: Field<T>,
    ) -> Result<(), BindError>
    where
        T: Clone + PartialEq + Display + 'static,
    {
        if group.is_empty() {
            log::error!("radio group has no members");
            return Err(BindError::Config("radio group has no members".into()));
        }

        for (i, (id, value)) in group.members.iter().enumerate() {
            let earlier = &group.members[..i];
            if earlier.iter().any(|(other, _)| other == id) {
                log::error!("radio group: control '{id}' listed twice");
                return Err(BindError::Config(format!("radio group lists control '{id}' twice")));
            }
            if earlier.iter().any(|(_, other)| other == value) {
                log::error!("radio group: value {value} listed twice");
                return Err(BindError::Config(format!("radio group lists value {value} twice")));
            }
        }

        let mut controls = Vec::with_capacity(group.len());
        for (id, _) in &group.members {
            controls.push(tree.find_with(id, Capability::Boolean)?);
        }

        let label = group.members.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>().join("|");
        let Field { getter, setter, on_change, immediate, fire_initially } = field;

        let binding = Rc::new(RadioBinding {
            label,
            controls: controls.iter().map(Rc::downgrade).collect(),
            values: group.members.into_iter().map(|(_, v)| v).collect(),
            selected: Cell::new(0),
            getter,
            setter: RefCell::new(setter),
            on_change: RefCell::new(on_change),
            immediate,
        });

        binding.load();

        for (index, control) in controls.iter().enumerate() {
            let weak = Rc::downgrade(&binding);
            control.borrow().value_changed().connect(move || {
                if let Some(binding) = weak.upgrade() {
                    binding.handle_change(index);
                }
            });
        }

        if fire_initially {
            let value = binding.values[binding.selected.get()].clone();
            binding.fire_with(&value);
        }

        self.push_binding(binding);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::BooleanControl;
    use crate::headless::{click, Toggle};
    use prefkit_store::{MemoryStore, PreferenceStoreExt};

    fn lobby_group() -> RadioGroup<String> {
        RadioGroup::new()
            .member("lobby_joins_none", "none".to_string())
            .member("lobby_joins_friends", "friends".to_string())
            .member("lobby_joins_all", "all".to_string())
    }

    #[test]
    fn test_radio_group_selects_stored_member() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        store.borrow_mut().set_typed("lobby_joins", "all".to_string());

        let mut tree = ControlTree::new();
        let none = tree.insert(Toggle::new("lobby_joins_none")).unwrap();
        let friends = tree.insert(Toggle::new("lobby_joins_friends")).unwrap();
        let all = tree.insert(Toggle::new("lobby_joins_all")).unwrap();

        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_radio_group(
                &tree,
                lobby_group(),
                Field::stored(store.clone(), "lobby_joins", "friends".to_string()),
            )
            .unwrap();
        assert!(!none.borrow().value());
        assert!(!friends.borrow().value());
        assert!(all.borrow().value());

        click(&none);
        assert!(none.borrow().value());
        assert!(!all.borrow().value());
        assert_eq!(store.borrow().get_choice("lobby_joins", ""), "none");
    }

    #[test]
    fn test_selected_member_cannot_be_switched_off() {
        let mut tree = ControlTree::new();
        tree.insert(Toggle::new("lobby_joins_none")).unwrap();
        let friends = tree.insert(Toggle::new("lobby_joins_friends")).unwrap();
        tree.insert(Toggle::new("lobby_joins_all")).unwrap();

        let saves = Rc::new(Cell::new(0));
        let counter = saves.clone();
        let mut registry = BindingRegistry::new(Rc::new(RefCell::new(MemoryStore::new())));
        registry
            .register_radio_group(
                &tree,
                lobby_group(),
                Field::new(|| "friends".to_string(), move |_| counter.set(counter.get() + 1)),
            )
            .unwrap();

        click(&friends);
        assert!(friends.borrow().value());
        assert_eq!(saves.get(), 0);
    }

    #[test]
    fn test_missing_member_registers_nothing() {
        let mut tree = ControlTree::new();
        tree.insert(Toggle::new("lobby_joins_none")).unwrap();
        let mut registry = BindingRegistry::new(Rc::new(RefCell::new(MemoryStore::new())));

        let result = registry.register_radio_group(&tree, lobby_group(), Field::new(|| "none".to_string(), |_| {}));
        assert_eq!(result, Err(BindError::MissingControl { id: "lobby_joins_friends".into() }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_repeated_members_are_rejected() {
        let mut tree = ControlTree::new();
        let a = tree.insert(Toggle::new("a")).unwrap();
        tree.insert(Toggle::new("b")).unwrap();
        let mut registry = BindingRegistry::new(Rc::new(RefCell::new(MemoryStore::new())));

        let same_control = RadioGroup::new().member("a", 1i64).member("b", 2).member("a", 3);
        let result = registry.register_radio_group(&tree, same_control, Field::new(|| 1, |_| {}));
        assert!(matches!(result, Err(BindError::Config(_))));

        let same_value = RadioGroup::new().member("a", 1i64).member("b", 1);
        let result = registry.register_radio_group(&tree, same_value, Field::new(|| 1, |_| {}));
        assert!(matches!(result, Err(BindError::Config(_))));

        assert!(registry.is_empty());
        assert_eq!(a.borrow().value_changed().handler_count(), 0);
    }
}
