//! Binding registry
//!
//! One registry per open dialog. Registration loads the stored value into
//! the control and subscribes to the control's change signal; a user change
//! then runs the setter followed by the on-change callback, synchronously
//! and in that order.
//!
//! The registry owns every binding. Control signals only hold weak
//! references, so dropping the registry (closing the dialog) turns all of
//! its handlers into no-ops even if the toolkit keeps the widgets around.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use prefkit_store::{SharedStore, StoreError};

use crate::cascade::{cascade_to, CascadeMode, DependentLink};
use crate::control::{Capability, Control, MenuEntry};
use crate::error::BindError;
use crate::field::{Field, Getter, OnChange, Setter};
use crate::tree::{ControlRef, ControlTree};

type ReadFn<T> = Box<dyn Fn(&dyn Control) -> Option<T>>;
type WriteFn<T> = Box<dyn Fn(&mut dyn Control, &T)>;

/// Type-erased view of a binding, for commit/reload.
pub(crate) trait ErasedBinding {
    fn control_id(&self) -> &str;

    fn is_immediate(&self) -> bool;

    /// Store → control
    fn load(&self);

    /// Control → store
    fn save(&self);
}

struct Binding<T> {
    control_id: String,
    control: Weak<RefCell<dyn Control>>,
    read: ReadFn<T>,
    write: WriteFn<T>,
    getter: Getter<T>,
    setter: RefCell<Setter<T>>,
    on_change: RefCell<Option<OnChange<T>>>,
    immediate: bool,
}

impl<T: Clone + 'static> Binding<T> {
    fn current(&self) -> Option<T> {
        let control = self.control.upgrade()?;
        let control = control.borrow();
        (self.read)(&*control)
    }

    fn handle_change(&self) {
        let Some(value) = self.current() else {
            log::warn!("control '{}' changed but its value cannot be read", self.control_id);
            return;
        };
        if self.immediate {
            let mut setter = self.setter.borrow_mut();
            (&mut **setter)(value.clone());
        }
        self.fire_with(&value);
    }

    fn fire(&self) {
        if let Some(value) = self.current() {
            self.fire_with(&value);
        }
    }

    fn fire_with(&self, value: &T) {
        if let Some(on_change) = self.on_change.borrow_mut().as_mut() {
            on_change(value);
        }
    }
}

impl<T: Clone + 'static> ErasedBinding for Binding<T> {
    fn control_id(&self) -> &str {
        &self.control_id
    }

    fn is_immediate(&self) -> bool {
        self.immediate
    }

    fn load(&self) {
        let value = (self.getter)();
        if let Some(control) = self.control.upgrade() {
            (self.write)(&mut *control.borrow_mut(), &value);
        }
    }

    fn save(&self) {
        if let Some(value) = self.current() {
            let mut setter = self.setter.borrow_mut();
            (&mut **setter)(value);
        }
    }
}

/// A live dependent link, re-applied on every source change.
struct LinkState {
    source: Weak<RefCell<dyn Control>>,
    target: Weak<RefCell<dyn Control>>,
    mode: CascadeMode,
}

impl LinkState {
    fn apply(&self) {
        let (Some(source), Some(target)) = (self.source.upgrade(), self.target.upgrade()) else {
            return;
        };
        let source_on = source.borrow().as_boolean().map(|b| b.value()).unwrap_or(false);
        target.borrow_mut().set_active(self.mode.target_active(source_on));
    }
}

/// One entry of an enumerated (index-selected) binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumOption {
    /// Value persisted in the store
    pub id: String,
    pub label: String,
    pub details: Option<String>,
}

impl EnumOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn entry(&self) -> MenuEntry {
        MenuEntry { label: self.label.clone(), details: self.details.clone() }
    }
}

/// Toggle + slider pair where the toggle gates the slider.
///
/// The toggle's on-change runs first, then the slider is enabled or
/// disabled to match; the cascade also runs once at registration.
pub struct OptionGroup {
    pub toggle_id: String,
    pub slider_id: String,
    pub toggle: Field<bool>,
    pub slider: Field<i64>,
}

impl OptionGroup {
    pub fn new(
        toggle_id: impl Into<String>,
        slider_id: impl Into<String>,
        toggle: Field<bool>,
        slider: Field<i64>,
    ) -> Self {
        Self { toggle_id: toggle_id.into(), slider_id: slider_id.into(), toggle, slider }
    }

    /// Ids `sound_toggle_<suffix>` and `sound_volume_<suffix>`.
    pub fn sound(suffix: &str, toggle: Field<bool>, slider: Field<i64>) -> Self {
        Self::new(format!("sound_toggle_{suffix}"), format!("sound_volume_{suffix}"), toggle, slider)
    }
}

pub struct BindingRegistry {
    store: SharedStore,
    bindings: Vec<Rc<dyn ErasedBinding>>,
    links: Vec<Rc<LinkState>>,
}

impl BindingRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store, bindings: Vec::new(), links: Vec::new() }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Ids of bound controls, in registration order.
    pub fn bound_ids(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.control_id()).collect()
    }

    pub(crate) fn push_binding(&mut self, binding: Rc<dyn ErasedBinding>) {
        log::debug!(
            "bound '{}' ({})",
            binding.control_id(),
            if binding.is_immediate() { "immediate" } else { "deferred" }
        );
        self.bindings.push(binding);
    }

    fn bind<T: Clone + 'static>(
        &mut self,
        control: ControlRef,
        read: ReadFn<T>,
        write: WriteFn<T>,
        field: Field<T>,
    ) {
        let Field { getter, setter, on_change, immediate, fire_initially } = field;
        let control_id = control.borrow().id().to_string();

        let binding = Rc::new(Binding {
            control_id,
            control: Rc::downgrade(&control),
            read,
            write,
            getter,
            setter: RefCell::new(setter),
            on_change: RefCell::new(on_change),
            immediate,
        });

        binding.load();

        let weak = Rc::downgrade(&binding);
        control.borrow().value_changed().connect(move || {
            if let Some(binding) = weak.upgrade() {
                binding.handle_change();
            }
        });

        if fire_initially {
            binding.fire();
        }

        self.push_binding(binding);
    }

    /// Bind a boolean control (toggle, check box).
    pub fn register_boolean(
        &mut self,
        tree: &ControlTree,
        control_id: &str,
        field: Field<bool>,
    ) -> Result<(), BindError> {
        let control = tree.find_with(control_id, Capability::Boolean)?;
        self.bind(
            control,
            Box::new(|c: &dyn Control| c.as_boolean().map(|b| b.value())),
            Box::new(|c: &mut dyn Control, v: &bool| {
                if let Some(b) = c.as_boolean_mut() {
                    b.set_value(*v);
                }
            }),
            field,
        );
        Ok(())
    }

    /// Bind an integer control (slider). The caller keeps the getter's
    /// values inside the control's range.
    pub fn register_integer(
        &mut self,
        tree: &ControlTree,
        control_id: &str,
        field: Field<i64>,
    ) -> Result<(), BindError> {
        let control = tree.find_with(control_id, Capability::Integer)?;
        self.bind(
            control,
            Box::new(|c: &dyn Control| c.as_integer().map(|i| i.value())),
            Box::new(|c: &mut dyn Control, v: &i64| {
                if let Some(i) = c.as_integer_mut() {
                    i.set_value(*v);
                }
            }),
            field,
        );
        Ok(())
    }

    /// Bind an index-selected control to an enumerated string value.
    ///
    /// The control's entries are replaced by `options`. A stored value that
    /// is not one of the option ids selects the first option.
    pub fn register_enum(
        &mut self,
        tree: &ControlTree,
        control_id: &str,
        options: Vec<EnumOption>,
        field: Field<String>,
    ) -> Result<(), BindError> {
        let control = tree.find_with(control_id, Capability::Index)?;
        if options.is_empty() {
            log::error!("control '{control_id}': no options to bind");
            return Err(BindError::EmptyOptions { id: control_id.to_string() });
        }

        if let Some(menu) = control.borrow_mut().as_index_mut() {
            menu.set_entries(options.iter().map(EnumOption::entry).collect());
        }

        let ids: Rc<Vec<String>> = Rc::new(options.into_iter().map(|o| o.id).collect());
        let read_ids = ids.clone();
        let id = control_id.to_string();

        self.bind(
            control,
            Box::new(move |c: &dyn Control| {
                c.as_index().and_then(|m| read_ids.get(m.selected()).cloned())
            }),
            Box::new(move |c: &mut dyn Control, v: &String| {
                let index = ids.iter().position(|o| o == v).unwrap_or_else(|| {
                    log::warn!(
                        "'{id}': stored value '{v}' is not a known option; selecting '{}'",
                        ids[0]
                    );
                    0
                });
                if let Some(m) = c.as_index_mut() {
                    m.select(index);
                }
            }),
            field,
        );
        Ok(())
    }

    /// Bind an integer control whose position indexes `values`.
    ///
    /// The control's range becomes `0..=len-1` and its value labels the
    /// values' display text. A stored value not in the list selects
    /// position 0.
    pub fn register_indexed<T>(
        &mut self,
        tree: &ControlTree,
        control_id: &str,
        values: Vec<T>,
        field: Field<T>,
    ) -> Result<(), BindError>
    where
        T: Clone + PartialEq + Display + 'static,
    {
        let control = tree.find_with(control_id, Capability::Integer)?;
        if values.is_empty() {
            log::error!("control '{control_id}': no values to bind");
            return Err(BindError::EmptyOptions { id: control_id.to_string() });
        }

        if let Some(slider) = control.borrow_mut().as_integer_mut() {
            slider.set_range(0, values.len() as i64 - 1);
            slider.set_value_labels(values.iter().map(ToString::to_string).collect());
        }

        let values = Rc::new(values);
        let read_values = values.clone();
        let id = control_id.to_string();

        self.bind(
            control,
            Box::new(move |c: &dyn Control| {
                c.as_integer()
                    .and_then(|s| usize::try_from(s.value()).ok())
                    .and_then(|i| read_values.get(i).cloned())
            }),
            Box::new(move |c: &mut dyn Control, v: &T| {
                let index = values.iter().position(|x| x == v).unwrap_or_else(|| {
                    log::warn!("'{id}': stored value {v} is not in the list; using {}", values[0]);
                    0
                });
                if let Some(s) = c.as_integer_mut() {
                    s.set_value(index as i64);
                }
            }),
            field,
        );
        Ok(())
    }

    /// Toggle gating a slider, both bound (sound option group).
    ///
    /// Both ids are resolved before anything is registered.
    pub fn register_option_group(
        &mut self,
        tree: &ControlTree,
        group: OptionGroup,
    ) -> Result<(), BindError> {
        let OptionGroup { toggle_id, slider_id, toggle, slider } = group;
        tree.find_with(&toggle_id, Capability::Boolean)?;
        tree.find_with(&slider_id, Capability::Integer)?;

        let toggle = toggle
            .and_on_change(cascade_to(tree, &slider_id, CascadeMode::Direct)?)
            .fire_initially(true);

        self.register_boolean(tree, &toggle_id, toggle)?;
        self.register_integer(tree, &slider_id, slider)
    }

    /// Set `target` active from `source`'s current value, once.
    pub fn apply_dependent_cascade(
        &self,
        tree: &ControlTree,
        source: &str,
        target: &str,
        mode: CascadeMode,
    ) -> Result<bool, BindError> {
        DependentLink::new(source, target, mode).apply(tree)
    }

    /// Keep `target`'s active state following `source` for the lifetime
    /// of this registry. Applied immediately and after every change.
    pub fn link_dependent(&mut self, tree: &ControlTree, link: DependentLink) -> Result<(), BindError> {
        let source = tree.find_with(&link.source, Capability::Boolean)?;
        let target = tree.find(&link.target)?;

        let state = Rc::new(LinkState {
            source: Rc::downgrade(&source),
            target: Rc::downgrade(&target),
            mode: link.mode,
        });
        state.apply();

        let weak = Rc::downgrade(&state);
        source.borrow().value_changed().connect(move || {
            if let Some(state) = weak.upgrade() {
                state.apply();
            }
        });
        self.links.push(state);
        Ok(())
    }

    /// Run the setters of deferred (non-immediate) bindings with the
    /// controls' current values. Returns how many were saved.
    pub fn commit(&self) -> usize {
        let mut saved = 0;
        for binding in self.bindings.iter().filter(|b| !b.is_immediate()) {
            binding.save();
            saved += 1;
        }
        log::debug!("committed {saved} deferred binding(s)");
        saved
    }

    /// Re-read every getter into its control (e.g. after a reset).
    pub fn reload(&self) {
        for binding in &self.bindings {
            binding.load();
        }
        for link in &self.links {
            link.apply();
        }
    }

    /// Close the dialog: commit deferred bindings and write the store.
    ///
    /// A write failure is returned for display as a non-fatal notice; the
    /// store keeps its in-memory values.
    pub fn finish(&self) -> Result<(), StoreError> {
        self.commit();
        self.store.borrow_mut().write_to_disk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{BooleanControl, IndexControl, IntegerControl};
    use crate::headless::{choose, click, slide_to, MenuButton, Slider, Toggle};
    use prefkit_store::{MemoryStore, PreferenceStoreExt};
    use std::cell::Cell;

    fn store() -> Rc<RefCell<MemoryStore>> {
        Rc::new(RefCell::new(MemoryStore::new()))
    }

    #[test]
    fn test_boolean_initial_load_and_save() {
        let store = store();
        store.borrow_mut().set_typed("show_grid", true);
        let mut tree = ControlTree::new();
        let grid = tree.insert(Toggle::new("show_grid")).unwrap();

        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_boolean(&tree, "show_grid", Field::stored(store.clone(), "show_grid", false))
            .unwrap();
        assert!(grid.borrow().value());

        click(&grid);
        assert!(!store.borrow().get_bool("show_grid", true));
    }

    #[test]
    fn test_integer_binding() {
        let store = store();
        let mut tree = ControlTree::new();
        let speed = tree.insert(Slider::new("scroll_speed", 1, 100)).unwrap();

        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_integer(&tree, "scroll_speed", Field::stored(store.clone(), "scroll_speed", 50))
            .unwrap();
        assert_eq!(speed.borrow().value(), 50);

        slide_to(&speed, 75);
        assert_eq!(store.borrow().get_int("scroll_speed", 0), 75);
    }

    #[test]
    fn test_enum_populates_entries() {
        let store = store();
        let mut tree = ControlTree::new();
        let menu = tree.insert(MenuButton::new("lobby_joins")).unwrap();

        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_enum(
                &tree,
                "lobby_joins",
                vec![
                    EnumOption::new("none", "Do not show"),
                    EnumOption::new("friends", "Friends only").with_details("when a friend joins"),
                    EnumOption::new("all", "All"),
                ],
                Field::stored(store.clone(), "lobby_joins", "friends".to_string()),
            )
            .unwrap();

        assert_eq!(menu.borrow().len(), 3);
        assert_eq!(menu.borrow().selected(), 1);
        assert_eq!(menu.borrow().entries()[1].details.as_deref(), Some("when a friend joins"));

        choose(&menu, 2);
        assert_eq!(store.borrow().get_choice("lobby_joins", ""), "all");
    }

    #[test]
    fn test_enum_requires_options() {
        let mut tree = ControlTree::new();
        tree.insert(MenuButton::new("theme")).unwrap();
        let mut registry = BindingRegistry::new(store());

        let err = registry
            .register_enum(&tree, "theme", Vec::new(), Field::new(String::new, |_| {}))
            .unwrap_err();
        assert_eq!(err, BindError::EmptyOptions { id: "theme".into() });
        assert!(registry.is_empty());
    }

    #[test]
    fn test_indexed_speed_list() {
        let speeds = vec![0.25, 0.5, 1.0, 2.0, 4.0];
        let current = Rc::new(Cell::new(2.0));
        let mut tree = ControlTree::new();
        let slider = tree.insert(Slider::new("turbo_slider", 0, 100)).unwrap();

        let mut registry = BindingRegistry::new(store());
        let (get, set) = (current.clone(), current.clone());
        registry
            .register_indexed(&tree, "turbo_slider", speeds, Field::new(move || get.get(), move |v| set.set(v)))
            .unwrap();

        assert_eq!(slider.borrow().range(), 0..=4);
        assert_eq!(slider.borrow().value(), 3);
        assert_eq!(slider.borrow().value_label(), "2");

        slide_to(&slider, 0);
        assert_eq!(current.get(), 0.25);
    }

    #[test]
    fn test_deferred_binding_saves_on_commit() {
        let saved = Rc::new(Cell::new(0));
        let mut tree = ControlTree::new();
        let toggle = tree.insert(Toggle::new("save_replays")).unwrap();

        let mut registry = BindingRegistry::new(store());
        let counter = saved.clone();
        registry
            .register_boolean(
                &tree,
                "save_replays",
                Field::new(|| false, move |_| counter.set(counter.get() + 1)).immediate(false),
            )
            .unwrap();

        click(&toggle);
        assert_eq!(saved.get(), 0);
        assert_eq!(registry.commit(), 1);
        assert_eq!(saved.get(), 1);
    }

    #[test]
    fn test_option_group_gates_slider() {
        let store = store();
        store.borrow_mut().set_typed("sound", false);
        let mut tree = ControlTree::new();
        let toggle = tree.insert(Toggle::new("sound_toggle_sfx")).unwrap();
        let volume = tree.insert(Slider::new("sound_volume_sfx", 0, 100)).unwrap();

        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_option_group(
                &tree,
                OptionGroup::sound(
                    "sfx",
                    Field::stored(store.clone(), "sound", true),
                    Field::stored(store.clone(), "sound_volume", 100),
                ),
            )
            .unwrap();

        assert!(!volume.borrow().is_active());
        click(&toggle);
        assert!(volume.borrow().is_active());
        slide_to(&volume, 40);
        assert_eq!(store.borrow().get_int("sound_volume", 0), 40);
    }

    #[test]
    fn test_option_group_missing_slider_registers_nothing() {
        let mut tree = ControlTree::new();
        tree.insert(Toggle::new("sound_toggle_bell")).unwrap();
        let mut registry = BindingRegistry::new(store());

        let result = registry.register_option_group(
            &tree,
            OptionGroup::sound("bell", Field::new(|| true, |_| {}), Field::new(|| 5, |_| {})),
        );
        assert_eq!(result, Err(BindError::MissingControl { id: "sound_volume_bell".into() }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_link_dependent_follows_source() {
        let mut tree = ControlTree::new();
        let auto = tree.insert(Toggle::new("auto_pixel_scale").checked(true)).unwrap();
        let scale = tree.insert(Slider::new("pixel_scale_slider", 1, 4)).unwrap();

        let mut registry = BindingRegistry::new(store());
        registry
            .link_dependent(
                &tree,
                DependentLink::new("auto_pixel_scale", "pixel_scale_slider", CascadeMode::Inverted),
            )
            .unwrap();
        assert!(!scale.borrow().is_active());

        click(&auto);
        assert!(scale.borrow().is_active());

        drop(registry);
        click(&auto);
        assert!(scale.borrow().is_active(), "link should die with the registry");
    }

    #[test]
    fn test_reload_pulls_getter_values() {
        let store = store();
        let mut tree = ControlTree::new();
        let toggle = tree.insert(Toggle::new("vsync")).unwrap();
        let mut registry = BindingRegistry::new(store.clone());
        registry
            .register_boolean(&tree, "vsync", Field::stored(store.clone(), "vsync", false))
            .unwrap();

        store.borrow_mut().set_typed("vsync", true);
        assert!(!toggle.borrow().value());
        registry.reload();
        assert!(toggle.borrow().value());
    }
}
