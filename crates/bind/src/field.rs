//! Field: the getter/setter pair behind one binding

use prefkit_store::{PreferenceStoreExt, PreferenceType, SharedStore};

pub type Getter<T> = Box<dyn Fn() -> T>;
pub type Setter<T> = Box<dyn FnMut(T)>;
/// Side effect run after the setter, with the value just saved.
pub type OnChange<T> = Box<dyn FnMut(&T)>;

/// What a binding does with a control's value.
///
/// - the getter runs once at registration (store → control) and again on
///   `reload`
/// - the setter runs on every user change when `immediate` (the default),
///   otherwise only when the registry commits
/// - `on_change` runs after the setter on every user change
/// - `fire_initially` also runs `on_change` right after the initial load,
///   so dependent controls start in the right state
pub struct Field<T> {
    pub(crate) getter: Getter<T>,
    pub(crate) setter: Setter<T>,
    pub(crate) on_change: Option<OnChange<T>>,
    pub(crate) immediate: bool,
    pub(crate) fire_initially: bool,
}

impl<T: 'static> Field<T> {
    pub fn new(getter: impl Fn() -> T + 'static, setter: impl FnMut(T) + 'static) -> Self {
        Self {
            getter: Box::new(getter),
            setter: Box::new(setter),
            on_change: None,
            immediate: true,
            fire_initially: false,
        }
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn on_change(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn fire_initially(mut self, fire: bool) -> Self {
        self.fire_initially = fire;
        self
    }

    /// Run `f` after whatever on-change callback is already set.
    pub fn and_on_change(mut self, mut f: impl FnMut(&T) + 'static) -> Self {
        let chained: OnChange<T> = match self.on_change.take() {
            Some(mut first) => Box::new(move |v: &T| {
                first(v);
                f(v);
            }),
            None => Box::new(f),
        };
        self.on_change = Some(chained);
        self
    }
}

impl<T: PreferenceType + 'static> Field<T> {
    /// Field reading and writing `key` in the shared store, with `default`
    /// when the key is unset or holds a value of another kind.
    pub fn stored(store: SharedStore, key: &str, default: T) -> Self {
        let read_store = store.clone();
        let read_key = key.to_string();
        let write_key = key.to_string();
        Self::new(
            move || read_store.borrow().get_typed(&read_key, default.clone()),
            move |value: T| store.borrow_mut().set_typed(&write_key, value),
        )
    }
}
