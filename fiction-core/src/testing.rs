//! Testing utilities for world-state scenarios.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripting authored actions against a store
//! - `fixtures` with small ready-made worlds
//! - Assertion helpers for lighting, scope and history

use crate::builder::WorldBuilder;
use crate::change::StateChange;
use crate::ids::{ItemId, LocationId};
use crate::state::{GameState, StoreError};
use crate::value::AttributeId;
use crate::world::{Item, Location, ParentEntity};
use std::collections::BTreeSet;

/// Test harness that plays the part of the action pipeline.
///
/// Every helper goes through the change factories and `apply`, so scenarios
/// exercise the same validation path real game logic does.
pub struct TestHarness {
    pub state: GameState,
}

impl TestHarness {
    pub fn new(state: GameState) -> Self {
        Self { state }
    }

    /// Apply a hand-built change.
    pub fn apply(&mut self, change: StateChange) -> Result<(), StoreError> {
        self.state.apply(change)
    }

    pub fn set_flag(
        &mut self,
        item: &str,
        attribute: AttributeId,
        on: bool,
    ) -> Result<(), StoreError> {
        let change = self
            .state
            .set_item_attribute(&ItemId::from(item), attribute, on)?;
        self.state.apply(change)
    }

    pub fn open(&mut self, item: &str) -> Result<(), StoreError> {
        self.set_flag(item, AttributeId::IsOpen, true)
    }

    pub fn close(&mut self, item: &str) -> Result<(), StoreError> {
        self.set_flag(item, AttributeId::IsOpen, false)
    }

    pub fn turn_on(&mut self, item: &str) -> Result<(), StoreError> {
        self.set_flag(item, AttributeId::IsOn, true)
    }

    pub fn turn_off(&mut self, item: &str) -> Result<(), StoreError> {
        self.set_flag(item, AttributeId::IsOn, false)
    }

    pub fn move_item(&mut self, item: &str, to: ParentEntity) -> Result<(), StoreError> {
        let change = self.state.move_item(&ItemId::from(item), to)?;
        self.state.apply(change)
    }

    pub fn take(&mut self, item: &str) -> Result<(), StoreError> {
        self.move_item(item, ParentEntity::Player)
    }

    pub fn go_to(&mut self, location: &str) -> Result<(), StoreError> {
        let change = self.state.move_player(&LocationId::from(location))?;
        self.state.apply(change)
    }

    pub fn is_lit(&self, location: &str) -> bool {
        self.state.scope().is_location_lit(&LocationId::from(location))
    }

    pub fn reachable(&self) -> BTreeSet<ItemId> {
        self.state.scope().items_reachable_by_player()
    }

    pub fn visible_in(&self, location: &str) -> BTreeSet<ItemId> {
        self.state.scope().visible_items_in(&LocationId::from(location))
    }

    pub fn history_len(&self) -> usize {
        self.state.change_history().len()
    }

    pub fn last_change(&self) -> Option<&StateChange> {
        self.state.change_history().last()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub mod fixtures {
    use super::*;

    /// A dark cellar holding a closed box with a key inside, a lit hallway
    /// next to it, and an unlit lamp in the hallway. The player starts in the
    /// cellar.
    pub fn box_and_key() -> GameState {
        WorldBuilder::new("Box and Key")
            .locations([
                Location::new("cellar").with_name("Cellar"),
                Location::new("hallway").with_name("Hallway").lit(),
            ])
            .items([
                Item::new("box")
                    .with_name("wooden box")
                    .with_flag(AttributeId::IsContainer)
                    .with_flag(AttributeId::IsOpenable)
                    .with_parent(ParentEntity::location("cellar")),
                Item::new("key")
                    .with_name("small key")
                    .with_parent(ParentEntity::item("box")),
                Item::new("lamp")
                    .with_name("brass lantern")
                    .with_flag(AttributeId::IsLightSource)
                    .with_parent(ParentEntity::location("hallway")),
            ])
            .start_in("cellar")
            .build()
            .unwrap_or_else(|err| panic!("box_and_key fixture is invalid: {err}"))
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

fn id_set(ids: &[&str]) -> BTreeSet<ItemId> {
    ids.iter().map(|id| ItemId::from(*id)).collect()
}

/// Assert the reachable set is exactly `expected`.
#[track_caller]
pub fn assert_reachable(harness: &TestHarness, expected: &[&str]) {
    let actual = harness.reachable();
    assert_eq!(
        actual,
        id_set(expected),
        "Expected reachable items {expected:?}, got {actual:?}"
    );
}

/// Assert the visible set of a location is exactly `expected`.
#[track_caller]
pub fn assert_visible_in(harness: &TestHarness, location: &str, expected: &[&str]) {
    let actual = harness.visible_in(location);
    assert_eq!(
        actual,
        id_set(expected),
        "Expected visible items {expected:?} in '{location}', got {actual:?}"
    );
}

#[track_caller]
pub fn assert_lit(harness: &TestHarness, location: &str) {
    assert!(harness.is_lit(location), "Expected '{location}' to be lit");
}

#[track_caller]
pub fn assert_dark(harness: &TestHarness, location: &str) {
    assert!(!harness.is_lit(location), "Expected '{location}' to be dark");
}

/// Assert a result is a validation rejection.
#[track_caller]
pub fn assert_rejected(result: Result<(), StoreError>) {
    match result {
        Err(StoreError::StateValidation { .. }) => {}
        other => panic!("Expected a state validation failure, got {other:?}"),
    }
}
