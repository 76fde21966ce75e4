//! Two-way binding between preferences and dialog controls
//!
//! A dialog builds a `ControlTree` of its controls, then registers each
//! preference with a `BindingRegistry`:
//!
//! ```ignore
//! let mut registry = BindingRegistry::new(store.clone());
//! registry.register_boolean(&tree, "show_grid", Field::stored(store.clone(), "show_grid", true))?;
//! registry.register_option_group(&tree, OptionGroup::sound("music", music_on, music_volume))?;
//! // ... dialog runs ...
//! registry.finish()?;
//! ```
//!
//! Controls are reached only through the capability traits in `control`;
//! `headless` provides toolkit-free implementations.
//!
//! # Threading
//!
//! Everything here is single-threaded and `!Send`: controls, signals and
//! the store are shared through `Rc<RefCell<_>>` and must stay on the UI
//! thread. A multi-threaded toolkit would need `Arc<Mutex<_>>` in
//! `ControlRef`, `SharedStore` and the signal handler list.

mod advanced;
mod cascade;
mod control;
mod error;
mod field;
pub mod headless;
mod radio;
mod registry;
mod signal;
mod tree;

pub use advanced::{AdvancedKind, AdvancedOption, ComboChoice};
pub use cascade::{cascade_to, CascadeMode, DependentLink};
pub use control::{BooleanControl, Capability, Control, IndexControl, IntegerControl, MenuEntry};
pub use error::BindError;
pub use field::{Field, Getter, OnChange, Setter};
pub use radio::RadioGroup;
pub use registry::{BindingRegistry, EnumOption, OptionGroup};
pub use signal::{ChangeHandler, ChangeSignal};
pub use tree::{ControlRef, ControlTree};
