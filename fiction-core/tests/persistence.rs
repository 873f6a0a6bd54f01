//! Save/load tests for the world store.
//!
//! A store serialized mid-game must come back with the same records, the
//! same history and the same scope answers.

use fiction_core::testing::{fixtures, TestHarness};
use fiction_core::{
    AttributeId, CombatState, Direction, EntityId, Exit, GameState, GlobalState, Item, Location,
    ParentEntity, PropertyKey, StateChange, StateValue, StoreConfig, WorldBuilder,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn save_and_load(state: &GameState) -> GameState {
    let json = serde_json::to_string_pretty(state).expect("Failed to serialize state");
    serde_json::from_str(&json).expect("Failed to deserialize state")
}

// =============================================================================
// TEST 1: Mid-game round trip
// =============================================================================

#[test]
fn test_save_and_load_mid_game() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());
    harness.go_to("hallway").unwrap();
    harness.take("lamp").unwrap();
    harness.turn_on("lamp").unwrap();
    harness.go_to("cellar").unwrap();
    harness.open("box").unwrap();

    let restored = save_and_load(&harness.state);

    assert_eq!(restored.session_id(), harness.state.session_id());
    assert_eq!(restored.title(), "Box and Key");
    assert_eq!(restored.change_history(), harness.state.change_history());
    assert_eq!(
        restored.scope().items_reachable_by_player(),
        harness.state.scope().items_reachable_by_player()
    );
    assert!(restored.scope().player_location_is_lit());
}

#[test]
fn test_restored_store_still_validates() {
    setup();
    let mut harness = TestHarness::new(fixtures::box_and_key());
    harness.open("box").unwrap();

    let mut restored = save_and_load(&harness.state);
    let stale = StateChange::new(
        EntityId::item("box"),
        PropertyKey::ItemAttribute(AttributeId::IsOpen),
        false,
    )
    .expecting(false);

    assert!(restored.apply(stale).unwrap_err().is_validation());

    let close = restored
        .set_item_attribute(&"box".into(), AttributeId::IsOpen, false)
        .unwrap();
    restored.apply(close).unwrap();
    assert_eq!(restored.change_history().len(), 2);
}

// =============================================================================
// TEST 2: Exits, globals and configuration survive
// =============================================================================

#[test]
fn test_exits_and_globals_round_trip() {
    setup();
    let mut state = WorldBuilder::new("Round Trip")
        .config(StoreConfig::new("Round Trip").with_parent_cycle_guard(false))
        .locations([
            Location::new("kitchen")
                .lit()
                .with_exit(Direction::North, Exit::to("garden"))
                .with_exit(Direction::Up, Exit::blocked("attic", "The ladder is broken.")),
            Location::new("garden")
                .lit()
                .with_exit(Direction::South, Exit::to("kitchen")),
        ])
        .global(
            GlobalState::new()
                .with_flag("metTroll")
                .with_value("lampBattery", 330i64)
                .with_fuse("candles", 40)
                .with_daemon("thief"),
        )
        .start_in("kitchen")
        .build()
        .unwrap();
    state
        .apply(state.set_combat_state(CombatState::new("troll", 10)).unwrap())
        .unwrap();

    let restored = save_and_load(&state);

    let kitchen = restored.location(&"kitchen".into()).unwrap();
    assert_eq!(kitchen.exit(Direction::North), Some(&Exit::to("garden")));
    assert!(kitchen.exit(Direction::Up).unwrap().is_blocked());
    let garden = restored.location(&"garden".into()).unwrap();
    assert_eq!(
        garden.exit(Direction::North.opposite()).map(|exit| exit.destination.as_str()),
        Some("kitchen")
    );
    assert!(!restored.config().guard_parent_cycles);
    assert_eq!(restored.global(), state.global());
    assert_eq!(restored.fuse_turns(&"candles".into()), Some(40));
    assert_eq!(
        restored.combat_state().map(|combat| combat.enemy.as_str()),
        Some("troll")
    );
}

// =============================================================================
// TEST 3: Author-defined attributes
// =============================================================================

#[test]
fn test_custom_attributes_round_trip() {
    setup();
    let mut state = WorldBuilder::new("Custom Keys")
        .location(Location::new("hall").lit())
        .item(
            Item::new("box")
                .with_flag(AttributeId::IsContainer)
                .with_attribute(AttributeId::IsOpen, false)
                .with_parent(ParentEntity::location("hall")),
        )
        .start_in("hall")
        .build()
        .unwrap();
    let haunted = AttributeId::custom("isHaunted");
    let change = state
        .set_item_attribute(&"box".into(), haunted.clone(), true)
        .unwrap();
    state.apply(change).unwrap();

    let restored = save_and_load(&state);

    let record = restored.item(&"box".into()).unwrap();
    assert_eq!(record, state.item(&"box".into()).unwrap());
    assert_eq!(record.attribute(&haunted), Some(&StateValue::Bool(true)));
    assert_eq!(record.parent(), ParentEntity::location("hall"));
    assert!(!record.is_open());
}

#[test]
fn test_custom_key_with_builtin_name_is_the_builtin_key() {
    setup();
    let mut state = WorldBuilder::new("Custom Keys")
        .location(Location::new("hall").lit())
        .item(Item::new("box").with_parent(ParentEntity::location("hall")))
        .start_in("hall")
        .build()
        .unwrap();

    // A bool is not a parent, so the parent type check still applies.
    let bogus = StateChange::new(
        EntityId::item("box"),
        PropertyKey::ItemAttribute(AttributeId::custom("parent")),
        true,
    );
    assert!(!state.apply(bogus).unwrap_err().is_validation());

    let open = StateChange::new(
        EntityId::item("box"),
        PropertyKey::ItemAttribute(AttributeId::custom("isOpen")),
        true,
    );
    state.apply(open).unwrap();

    let restored = save_and_load(&state);
    let record = restored.item(&"box".into()).unwrap();
    assert!(record.is_open());
    assert_eq!(record.parent(), ParentEntity::location("hall"));
    assert_eq!(restored.change_history(), state.change_history());
}
