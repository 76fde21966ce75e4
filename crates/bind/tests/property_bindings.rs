// Property-based tests for enum mapping and cascades.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::cell::RefCell;
use std::rc::Rc;

use prefkit_bind::headless::{click, MenuButton, Toggle};
use prefkit_bind::{
    BindingRegistry, CascadeMode, Control, ControlTree, DependentLink, EnumOption, Field, IndexControl,
};
use prefkit_store::{MemoryStore, PreferenceStoreExt};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// 1..8 distinct option ids.
fn arb_option_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 1..8).prop_map(|set| set.into_iter().collect())
}

fn arb_mode() -> impl Strategy<Value = CascadeMode> {
    prop_oneof![Just(CascadeMode::Direct), Just(CascadeMode::Inverted)]
}

fn bind_enum(ids: &[String], stored: &str) -> (Rc<RefCell<MenuButton>>, Rc<RefCell<MemoryStore>>, BindingRegistry) {
    let store = Rc::new(RefCell::new(MemoryStore::new()));
    store.borrow_mut().set_typed("choice", stored.to_string());

    let mut tree = ControlTree::new();
    let menu = tree.insert(MenuButton::new("choice")).unwrap();
    let options = ids.iter().map(|id| EnumOption::new(id.clone(), id.to_uppercase())).collect();

    let mut registry = BindingRegistry::new(store.clone());
    registry
        .register_enum(&tree, "choice", options, Field::stored(store.clone(), "choice", String::new()))
        .unwrap();
    (menu, store, registry)
}

// ---------------------------------------------------------------------------
// Enum mapping
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn enum_selects_position_of_stored_id(ids in arb_option_ids(), pick in any::<prop::sample::Index>()) {
        let index = pick.index(ids.len());
        let (menu, _store, _registry) = bind_enum(&ids, &ids[index]);
        prop_assert_eq!(menu.borrow().selected(), index);
        prop_assert_eq!(menu.borrow().len(), ids.len());
    }

    #[test]
    fn enum_unknown_id_selects_first(ids in arb_option_ids(), stored in "[A-Z0-9]{1,6}") {
        // Generated ids are lowercase, so `stored` never matches.
        let (menu, store, _registry) = bind_enum(&ids, &stored);
        prop_assert_eq!(menu.borrow().selected(), 0);
        prop_assert_eq!(store.borrow().get_choice("choice", ""), stored);
    }
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn live_cascade_tracks_every_click(
        initial in any::<bool>(),
        mode in arb_mode(),
        clicks in 0usize..12,
    ) {
        let mut tree = ControlTree::new();
        let source = tree.insert(Toggle::new("source").checked(initial)).unwrap();
        let target = tree.insert(Toggle::new("target")).unwrap();
        let bystander = tree.insert(Toggle::new("bystander")).unwrap();

        let mut registry = BindingRegistry::new(Rc::new(RefCell::new(MemoryStore::new())));
        registry.link_dependent(&tree, DependentLink::new("source", "target", mode)).unwrap();

        for _ in 0..clicks {
            click(&source);
        }

        let source_on = initial ^ (clicks % 2 == 1);
        prop_assert_eq!(target.borrow().is_active(), mode.target_active(source_on));
        prop_assert!(bystander.borrow().is_active());
    }
}
