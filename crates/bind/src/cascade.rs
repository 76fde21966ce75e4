//! Dependent-control cascades
//!
//! A toggle can enable or disable another control: "animate map" gates
//! "animate water", "auto pixel scale" disables the manual scale slider.
//! Links are not persisted; they are re-evaluated from current control
//! state every time the source changes.

use std::cell::RefCell;
use std::rc::Weak;

use crate::control::{Capability, Control};
use crate::error::BindError;
use crate::tree::ControlTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeMode {
    /// Target is active while the source is on
    Direct,
    /// Target is active while the source is off
    Inverted,
}

impl CascadeMode {
    pub fn target_active(self, source_on: bool) -> bool {
        match self {
            CascadeMode::Direct => source_on,
            CascadeMode::Inverted => !source_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentLink {
    pub source: String,
    pub target: String,
    pub mode: CascadeMode,
}

impl DependentLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>, mode: CascadeMode) -> Self {
        Self { source: source.into(), target: target.into(), mode }
    }

    /// Read the source's current boolean value and set the target's active
    /// state from it. Returns the state applied to the target.
    pub fn apply(&self, tree: &ControlTree) -> Result<bool, BindError> {
        let source = tree.find_with(&self.source, Capability::Boolean)?;
        let target = tree.find(&self.target)?;

        let source_on = source
            .borrow()
            .as_boolean()
            .map(|b| b.value())
            .ok_or_else(|| BindError::Capability {
                id: self.source.clone(),
                required: Capability::Boolean,
            })?;

        let active = self.mode.target_active(source_on);
        target.borrow_mut().set_active(active);
        log::debug!("cascade {} -> {}: active={active}", self.source, self.target);
        Ok(active)
    }
}

/// Build an on-change callback that sets `target`'s active state from the
/// source value it receives.
///
/// The target is resolved now, so a missing id fails at registration like
/// every other lookup. The callback holds the target weakly and does
/// nothing once the control is gone.
pub fn cascade_to(
    tree: &ControlTree,
    target: &str,
    mode: CascadeMode,
) -> Result<impl FnMut(&bool) + 'static, BindError> {
    let target: Weak<RefCell<dyn Control>> = std::rc::Rc::downgrade(&tree.find(target)?);
    Ok(move |source_on: &bool| {
        if let Some(control) = target.upgrade() {
            control.borrow_mut().set_active(mode.target_active(*source_on));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::BooleanControl;
    use crate::headless::{Slider, Toggle};

    #[test]
    fn test_modes() {
        assert!(CascadeMode::Direct.target_active(true));
        assert!(!CascadeMode::Direct.target_active(false));
        assert!(CascadeMode::Inverted.target_active(false));
        assert!(!CascadeMode::Inverted.target_active(true));
    }

    #[test]
    fn test_apply_reads_current_source_state() {
        let mut tree = ControlTree::new();
        let source = tree.insert(Toggle::new("animate_terrains").checked(false)).unwrap();
        let target = tree.insert(Toggle::new("animate_water")).unwrap();

        let link = DependentLink::new("animate_terrains", "animate_water", CascadeMode::Direct);
        assert_eq!(link.apply(&tree), Ok(false));
        assert!(!target.borrow().is_active());

        source.borrow_mut().set_value(true);
        assert_eq!(link.apply(&tree), Ok(true));
        assert!(target.borrow().is_active());
    }

    #[test]
    fn test_apply_requires_boolean_source() {
        let mut tree = ControlTree::new();
        tree.insert(Slider::new("idle_anim_frequency", 0, 10)).unwrap();
        tree.insert(Toggle::new("animate_units_idle")).unwrap();

        let link = DependentLink::new("idle_anim_frequency", "animate_units_idle", CascadeMode::Direct);
        assert!(matches!(link.apply(&tree), Err(BindError::Capability { .. })));
    }

    #[test]
    fn test_cascade_to_missing_target_fails() {
        let tree = ControlTree::new();
        assert!(matches!(
            cascade_to(&tree, "pixel_scale_slider", CascadeMode::Inverted),
            Err(BindError::MissingControl { .. })
        ));
    }
}
