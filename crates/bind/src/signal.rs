//! Value-changed signal shared by controls.
//!
//! Handlers run synchronously, in connection order, on the UI thread. A
//! handler must not cause the same signal to fire again: nested emission is
//! detected, logged and dropped instead of recursing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type ChangeHandler = Rc<dyn Fn()>;

#[derive(Default)]
pub struct ChangeSignal {
    handlers: RefCell<Vec<ChangeHandler>>,
    emitting: Cell<bool>,
}

/// Clears the emitting flag even if a handler panics.
struct EmitGuard<'a>(&'a Cell<bool>);

impl Drop for EmitGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ChangeSignal {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn connect(&self, handler: impl Fn() + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting.get()
    }

    /// Run every handler. Returns false if the emission was dropped
    /// because this signal is already emitting.
    pub fn emit(&self) -> bool {
        if self.emitting.replace(true) {
            log::error!(
                "re-entrant value-changed emission dropped; a change handler re-triggered its own control"
            );
            return false;
        }
        let _guard = EmitGuard(&self.emitting);

        // Snapshot so handlers may connect further handlers while running.
        let handlers: Vec<ChangeHandler> = self.handlers.borrow().clone();
        for handler in &handlers {
            handler();
        }
        true
    }
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("handlers", &self.handler_count())
            .field("emitting", &self.is_emitting())
            .finish()
    }
}
