//! Preference store for prefkit
//!
//! This crate provides the storage side of the preference system:
//! - `PreferenceValue`: the tagged value kept per key (bool, integer, choice)
//! - `Setting<T>`: explicit three-state semantics (Inherit/Value)
//! - `PreferenceStore`: the contract the binding registry talks to
//! - `MemoryStore` / `FileStore`: in-memory and JSON-backed implementations
//!
//! Stores are single-threaded. They are shared through `Rc<RefCell<_>>`
//! (see `SharedStore`) and must only be touched from the UI thread.

mod error;
mod persistence;
mod setting;
mod store;
mod value;

pub use error::*;
pub use persistence::*;
pub use setting::*;
pub use store::*;
pub use value::*;
