//! Scenario tests for lighting, visibility and reachability.
//!
//! Each scenario drives the world through `TestHarness`, so every step goes
//! through the change factories and `apply` before scope is queried.

use fiction_core::testing::{
    assert_dark, assert_lit, assert_reachable, assert_rejected, assert_visible_in, fixtures,
    TestHarness,
};
use fiction_core::{AttributeId, Item, Location, ParentEntity, WorldBuilder};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// =============================================================================
// TEST 1: The box and key in the dark cellar
// =============================================================================

#[test]
fn test_box_and_key_in_the_dark() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());

    assert_dark(&harness, "cellar");
    assert_reachable(&harness, &[]);

    // Opening the box in the dark changes nothing the player can touch.
    harness.open("box").unwrap();
    assert_reachable(&harness, &[]);
    assert_visible_in(&harness, "cellar", &[]);
}

#[test]
fn test_box_and_key_with_lamp() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());

    harness.go_to("hallway").unwrap();
    harness.take("lamp").unwrap();
    harness.go_to("cellar").unwrap();

    // The lamp is carried but off.
    assert_dark(&harness, "cellar");
    assert_reachable(&harness, &["lamp"]);

    harness.turn_on("lamp").unwrap();
    assert_lit(&harness, "cellar");
    assert_reachable(&harness, &["box", "lamp"]);
    assert_visible_in(&harness, "cellar", &["box"]);

    harness.open("box").unwrap();
    assert_reachable(&harness, &["box", "key", "lamp"]);
    assert!(harness.state.scope().is_item_visible(&"key".into()));

    harness.close("box").unwrap();
    assert_reachable(&harness, &["box", "lamp"]);
    assert_eq!(harness.history_len(), 6);
}

#[test]
fn test_open_box_then_light_cellar() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());
    assert_dark(&harness, "cellar");
    assert_visible_in(&harness, "cellar", &[]);
    assert_reachable(&harness, &[]);

    harness.open("box").unwrap();
    harness.turn_on("lamp").unwrap();
    harness
        .move_item("lamp", ParentEntity::location("cellar"))
        .unwrap();

    assert_lit(&harness, "cellar");
    // The lamp now sits in the cellar too, so it is reachable alongside them.
    assert_reachable(&harness, &["box", "key", "lamp"]);
}

#[test]
fn test_lamp_dropped_in_cellar_keeps_it_lit() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());

    harness.go_to("hallway").unwrap();
    harness.take("lamp").unwrap();
    harness.turn_on("lamp").unwrap();
    harness.go_to("cellar").unwrap();
    harness
        .move_item("lamp", ParentEntity::location("cellar"))
        .unwrap();

    assert_lit(&harness, "cellar");
    assert_visible_in(&harness, "cellar", &["box", "lamp"]);

    harness.turn_off("lamp").unwrap();
    assert_dark(&harness, "cellar");
    assert_reachable(&harness, &[]);
}

#[test]
fn test_stale_take_is_rejected_after_key_moves() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());
    let stale = harness
        .state
        .move_item(&"key".into(), ParentEntity::Player)
        .unwrap();

    harness
        .move_item("key", ParentEntity::location("hallway"))
        .unwrap();

    assert_rejected(harness.apply(stale));
    assert_eq!(
        harness.state.item(&"key".into()).unwrap().parent(),
        ParentEntity::location("hallway")
    );
}

// =============================================================================
// TEST 2: Lighting overrides
// =============================================================================

#[test]
fn test_inherently_lit_toggle() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());

    let change = harness
        .state
        .set_location_attribute(&"cellar".into(), AttributeId::InherentlyLit, true)
        .unwrap();
    harness.apply(change).unwrap();
    assert_lit(&harness, "cellar");
    assert_visible_in(&harness, "cellar", &["box"]);

    let change = harness
        .state
        .set_location_attribute(&"hallway".into(), AttributeId::InherentlyLit, false)
        .unwrap();
    harness.apply(change).unwrap();
    assert_dark(&harness, "hallway");
}

// =============================================================================
// TEST 3: Container reachability
// =============================================================================

fn containers_world(lit: bool) -> TestHarness {
    let room = if lit {
        Location::new("study").lit()
    } else {
        Location::new("study")
    };
    let container = |id: &str| {
        Item::new(id)
            .with_flag(AttributeId::IsContainer)
            .with_parent(ParentEntity::location("study"))
    };
    let state = WorldBuilder::new("Containers")
        .location(room)
        .items([
            container("open-crate").with_flag(AttributeId::IsOpen),
            Item::new("apple").with_parent(ParentEntity::item("open-crate")),
            container("closed-crate"),
            Item::new("pear").with_parent(ParentEntity::item("closed-crate")),
            container("glass-case").with_flag(AttributeId::IsTransparent),
            Item::new("medal").with_parent(ParentEntity::item("glass-case")),
            Item::new("satchel")
                .with_flag(AttributeId::IsContainer)
                .with_flag(AttributeId::IsOpen)
                .with_parent(ParentEntity::Player),
            Item::new("letter").with_parent(ParentEntity::item("satchel")),
            Item::new("locket-case")
                .with_flag(AttributeId::IsContainer)
                .with_flag(AttributeId::IsTransparent)
                .with_parent(ParentEntity::Player),
            Item::new("ring").with_parent(ParentEntity::item("locket-case")),
            Item::new("tin")
                .with_flag(AttributeId::IsContainer)
                .with_parent(ParentEntity::Player),
            Item::new("mint").with_parent(ParentEntity::item("tin")),
        ])
        .start_in("study")
        .build()
        .expect("valid world");
    TestHarness::new(state)
}

#[test]
fn test_container_reachability_in_lit_room() {
    setup();
    let harness = containers_world(true);
    assert_reachable(
        &harness,
        &[
            "apple",
            "closed-crate",
            "glass-case",
            "letter",
            "locket-case",
            "medal",
            "open-crate",
            "ring",
            "satchel",
            "tin",
        ],
    );
    assert_visible_in(
        &harness,
        "study",
        &["closed-crate", "glass-case", "open-crate"],
    );
}

#[test]
fn test_container_reachability_in_dark_room() {
    setup();
    let harness = containers_world(false);
    // Only the inventory, and what open or transparent containers in it expose.
    assert_reachable(
        &harness,
        &["letter", "locket-case", "ring", "satchel", "tin"],
    );
    assert!(harness.state.scope().items_visible_to_player().is_empty());
}

#[test]
fn test_inventory_and_room_containers_agree() {
    setup();
    let harness = containers_world(true);
    let scope = harness.state.scope();
    let reachable = |id: &str| scope.is_item_reachable(&id.into());

    // Open, closed opaque and closed transparent, carried vs in the room.
    for (carried, in_room) in [
        (("satchel", "letter"), ("open-crate", "apple")),
        (("tin", "mint"), ("closed-crate", "pear")),
        (("locket-case", "ring"), ("glass-case", "medal")),
    ] {
        assert_eq!(reachable(carried.0), reachable(in_room.0));
        assert_eq!(
            reachable(carried.1),
            reachable(in_room.1),
            "{} in {} vs {} in {}",
            carried.1,
            carried.0,
            in_room.1,
            in_room.0
        );
    }
    assert!(!reachable("mint"));
    assert!(reachable("ring"));
}

#[test]
fn test_opening_closed_container_exposes_contents() {
    setup();
    let mut harness = containers_world(true);
    assert!(!harness.state.scope().is_item_reachable(&"pear".into()));

    harness.open("closed-crate").unwrap();
    assert!(harness.state.scope().is_item_reachable(&"pear".into()));

    harness.close("satchel").unwrap();
    assert!(!harness.state.scope().is_item_reachable(&"letter".into()));
}
