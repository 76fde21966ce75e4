//! Dialog-scoped control lookup

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::control::{Capability, Control};
use crate::error::BindError;

pub type ControlRef = Rc<RefCell<dyn Control>>;

/// All controls of one dialog, by id.
///
/// The toolkit owns the widgets; the tree only holds shared handles so the
/// registry can resolve ids. Lookups never panic: a missing id is a
/// `BindError::MissingControl`.
#[derive(Default)]
pub struct ControlTree {
    controls: HashMap<String, ControlRef>,
    order: Vec<String>,
}

impl ControlTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a concrete control and get a typed handle back.
    pub fn insert<C: Control + 'static>(&mut self, control: C) -> Result<Rc<RefCell<C>>, BindError> {
        let handle = Rc::new(RefCell::new(control));
        self.add(handle.clone())?;
        Ok(handle)
    }

    pub fn add(&mut self, control: ControlRef) -> Result<(), BindError> {
        let id = control.borrow().id().to_string();
        if self.controls.contains_key(&id) {
            return Err(BindError::DuplicateControl { id });
        }
        self.order.push(id.clone());
        self.controls.insert(id, control);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ControlRef> {
        self.controls.get(id).cloned()
    }

    pub fn find(&self, id: &str) -> Result<ControlRef, BindError> {
        self.get(id).ok_or_else(|| {
            log::error!("control '{id}' not found");
            BindError::MissingControl { id: id.to_string() }
        })
    }

    /// Find a control and check it supports `capability`.
    pub fn find_with(&self, id: &str, capability: Capability) -> Result<ControlRef, BindError> {
        let control = self.find(id)?;
        if !control.borrow().supports(capability) {
            log::error!("control '{id}' lacks the {capability} capability");
            return Err(BindError::Capability { id: id.to_string(), required: capability });
        }
        Ok(control)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
