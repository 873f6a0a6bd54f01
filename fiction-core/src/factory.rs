//! Change factories.
//!
//! Game logic should read before it writes. These helpers do the read: each
//! one looks up the current value of the targeted property and returns a
//! [`StateChange`] expecting exactly that value, so a change built from a
//! stale snapshot is rejected by `apply` instead of silently overwriting.
//! A property that currently holds nothing produces a change with no
//! expected old value.

use crate::change::{PropertyKey, StateChange};
use crate::ids::{DaemonId, EntityId, FuseId, GlobalId, ItemId, LocationId};
use crate::state::{GameState, StoreError};
use crate::value::{AttributeId, StateValue};
use crate::world::{CombatState, ParentEntity};
use std::collections::BTreeSet;

impl GameState {
    fn build_change(
        &self,
        entity: EntityId,
        property: PropertyKey,
        new_value: impl Into<StateValue>,
    ) -> Result<StateChange, StoreError> {
        let current = self.current_value(&entity, &property)?;
        Ok(StateChange::new(entity, property, new_value).expecting_current(current))
    }

    fn current_int(&self, entity: EntityId, property: PropertyKey) -> Result<i64, StoreError> {
        Ok(self
            .current_value(&entity, &property)?
            .and_then(|value| value.as_int())
            .unwrap_or_default())
    }

    // =========================================================================
    // Items and locations
    // =========================================================================

    /// Move `item` under a new parent.
    pub fn move_item(&self, item: &ItemId, to: ParentEntity) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Item(item.clone()), PropertyKey::ItemParent, to)
    }

    /// Set one attribute on an item. `StateValue::Undefined` removes it.
    pub fn set_item_attribute(
        &self,
        item: &ItemId,
        attribute: AttributeId,
        value: impl Into<StateValue>,
    ) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Item(item.clone()),
            PropertyKey::ItemAttribute(attribute),
            value,
        )
    }

    /// Set one attribute on a location. `StateValue::Undefined` removes it.
    pub fn set_location_attribute(
        &self,
        location: &LocationId,
        attribute: AttributeId,
        value: impl Into<StateValue>,
    ) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Location(location.clone()),
            PropertyKey::LocationAttribute(attribute),
            value,
        )
    }

    // =========================================================================
    // Player
    // =========================================================================

    /// Destination existence is checked when the change is applied.
    pub fn move_player(&self, to: &LocationId) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Player, PropertyKey::PlayerLocation, to.clone())
    }

    /// Set the score outright.
    pub fn set_score(&self, score: i64) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Player, PropertyKey::PlayerScore, score)
    }

    /// Add `delta` to the current score. Fails with an internal error if the
    /// score would overflow.
    pub fn add_to_score(&self, delta: i64) -> Result<StateChange, StoreError> {
        let score = self.current_int(EntityId::Player, PropertyKey::PlayerScore)?;
        let total = score.checked_add(delta).ok_or_else(|| {
            StoreError::Internal(format!("score {score} plus {delta} overflows"))
        })?;
        self.set_score(total)
    }

    /// Count one more move. Fails with an internal error if the counter would
    /// overflow.
    pub fn increment_moves(&self) -> Result<StateChange, StoreError> {
        let moves = self.current_int(EntityId::Player, PropertyKey::PlayerMoves)?;
        let next = moves.checked_add(1).ok_or_else(|| {
            StoreError::Internal(format!("move counter {moves} overflows"))
        })?;
        self.build_change(EntityId::Player, PropertyKey::PlayerMoves, next)
    }

    /// Set the player's current health.
    pub fn set_player_health(&self, health: i64) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Player, PropertyKey::PlayerHealth, health)
    }

    // =========================================================================
    // Global state
    // =========================================================================

    /// Raise a global flag.
    pub fn set_flag(&self, flag: &GlobalId) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Global, PropertyKey::SetFlag(flag.clone()), true)
    }

    /// Lower a global flag.
    pub fn clear_flag(&self, flag: &GlobalId) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Global, PropertyKey::ClearFlag(flag.clone()), false)
    }

    /// Point `pronoun` at a set of items.
    pub fn bind_pronoun(
        &self,
        pronoun: &str,
        items: impl IntoIterator<Item = ItemId>,
    ) -> Result<StateChange, StoreError> {
        let items: BTreeSet<ItemId> = items.into_iter().collect();
        self.build_change(
            EntityId::Global,
            PropertyKey::PronounReference(pronoun.to_string()),
            items,
        )
    }

    /// Starts a fuse, or restarts it with a new countdown if already running.
    pub fn add_fuse(&self, fuse: &FuseId, turns: i64) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Global, PropertyKey::AddActiveFuse(fuse.clone()), turns)
    }

    /// Change the remaining turns of a running fuse.
    pub fn update_fuse(&self, fuse: &FuseId, turns: i64) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Global,
            PropertyKey::UpdateFuseTurns(fuse.clone()),
            turns,
        )
    }

    /// Stop a fuse. Stopping one that is not running is allowed.
    pub fn remove_fuse(&self, fuse: &FuseId) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Global,
            PropertyKey::RemoveActiveFuse(fuse.clone()),
            StateValue::Undefined,
        )
    }

    /// Activate a daemon.
    pub fn add_daemon(&self, daemon: &DaemonId) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Global,
            PropertyKey::AddActiveDaemon(daemon.clone()),
            true,
        )
    }

    /// Deactivate a daemon. Deactivating an inactive one is allowed.
    pub fn remove_daemon(&self, daemon: &DaemonId) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Global,
            PropertyKey::RemoveActiveDaemon(daemon.clone()),
            StateValue::Undefined,
        )
    }

    /// Store a game-specific value under `key`.
    pub fn set_global_value(
        &self,
        key: &GlobalId,
        value: impl Into<StateValue>,
    ) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Global, PropertyKey::GlobalValue(key.clone()), value)
    }

    /// Start a fight or record its progress.
    pub fn set_combat_state(&self, combat: CombatState) -> Result<StateChange, StoreError> {
        self.build_change(EntityId::Global, PropertyKey::CombatState, combat)
    }

    /// End the current fight.
    pub fn clear_combat_state(&self) -> Result<StateChange, StoreError> {
        self.build_change(
            EntityId::Global,
            PropertyKey::CombatState,
            StateValue::Undefined,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::WorldBuilder;
    use crate::change::{PropertyKey, StateChange};
    use crate::ids::{DaemonId, EntityId, FuseId, GlobalId, ItemId, LocationId};
    use crate::state::{GameState, StoreError};
    use crate::value::{AttributeId, StateValue};
    use crate::world::{CombatState, GlobalState, Item, Location, ParentEntity};

    fn world() -> GameState {
        WorldBuilder::new("Test")
            .locations([Location::new("kitchen").lit(), Location::new("attic")])
            .item(Item::new("sack").with_parent(ParentEntity::location("kitchen")))
            .global(GlobalState::new().with_fuse("candles", 4))
            .start_in("kitchen")
            .build()
            .unwrap()
    }

    #[test]
    fn test_move_item_expects_current_parent() {
        let mut state = world();
        let sack = ItemId::from("sack");
        let change = state.move_item(&sack, ParentEntity::Player).unwrap();

        assert_eq!(
            change.old_value,
            Some(StateValue::Parent(ParentEntity::location("kitchen")))
        );
        state.apply(change).unwrap();
        assert_eq!(state.item(&sack).unwrap().parent(), ParentEntity::Player);
    }

    #[test]
    fn test_stale_factory_change_is_rejected() {
        let mut state = world();
        let sack = ItemId::from("sack");
        let first = state.move_item(&sack, ParentEntity::Player).unwrap();
        let stale = state.move_item(&sack, ParentEntity::Nowhere).unwrap();

        state.apply(first).unwrap();
        let err = state.apply(stale).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(state.item(&sack).unwrap().parent(), ParentEntity::Player);
    }

    #[test]
    fn test_absent_attribute_has_no_expectation() {
        let state = world();
        let change = state
            .set_item_attribute(&"sack".into(), AttributeId::IsOpen, true)
            .unwrap();
        assert_eq!(change.old_value, None);
    }

    #[test]
    fn test_factory_for_unknown_item_fails() {
        let state = world();
        assert!(state.move_item(&"ghost".into(), ParentEntity::Player).is_err());
    }

    #[test]
    fn test_player_counters() {
        let mut state = world();
        state.apply(state.add_to_score(10).unwrap()).unwrap();
        state.apply(state.add_to_score(5).unwrap()).unwrap();
        state.apply(state.increment_moves().unwrap()).unwrap();
        state.apply(state.set_player_health(12).unwrap()).unwrap();

        assert_eq!(state.player().score(), 15);
        assert_eq!(state.player().moves(), 1);
        assert_eq!(state.player().character().health, 12);
        assert_eq!(state.change_history().len(), 4);
    }

    #[test]
    fn test_score_overflow_is_an_error() {
        let mut state = world();
        state.apply(state.set_score(i64::MAX).unwrap()).unwrap();

        let err = state.add_to_score(1).unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
        assert_eq!(state.player().score(), i64::MAX);

        state.apply(state.add_to_score(-1).unwrap()).unwrap();
        assert_eq!(state.player().score(), i64::MAX - 1);
    }

    #[test]
    fn test_moves_overflow_is_an_error() {
        let mut state = world();
        let change = StateChange::new(EntityId::Player, PropertyKey::PlayerMoves, i64::MAX);
        state.apply(change).unwrap();

        assert!(matches!(
            state.increment_moves().unwrap_err(),
            StoreError::Internal(_)
        ));
        assert_eq!(state.change_history().len(), 1);
    }

    #[test]
    fn test_move_player() {
        let mut state = world();
        state
            .apply(state.move_player(&LocationId::from("attic")).unwrap())
            .unwrap();
        assert_eq!(state.player().location().as_str(), "attic");
    }

    #[test]
    fn test_flags_and_pronouns() {
        let mut state = world();
        let flag = GlobalId::from("trapDoorOpen");

        state.apply(state.set_flag(&flag).unwrap()).unwrap();
        assert!(state.is_flag_set(&flag));
        state.apply(state.clear_flag(&flag).unwrap()).unwrap();
        assert!(!state.is_flag_set(&flag));

        state
            .apply(state.bind_pronoun("it", [ItemId::from("sack")]).unwrap())
            .unwrap();
        assert!(state.pronoun("it").unwrap().contains(&ItemId::from("sack")));
    }

    #[test]
    fn test_fuse_lifecycle() {
        let mut state = world();
        let candles = FuseId::from("candles");

        let update = state.update_fuse(&candles, 3).unwrap();
        assert_eq!(update.old_value, Some(StateValue::Int(4)));
        state.apply(update).unwrap();
        assert_eq!(state.fuse_turns(&candles), Some(3));

        state.apply(state.remove_fuse(&candles).unwrap()).unwrap();
        assert_eq!(state.fuse_turns(&candles), None);
    }

    #[test]
    fn test_daemon_lifecycle() {
        let mut state = world();
        let thief = DaemonId::from("thief");

        state.apply(state.add_daemon(&thief).unwrap()).unwrap();
        assert!(state.is_daemon_active(&thief));

        let remove = state.remove_daemon(&thief).unwrap();
        assert_eq!(remove.old_value, Some(StateValue::Bool(true)));
        state.apply(remove).unwrap();
        assert!(!state.is_daemon_active(&thief));
    }

    #[test]
    fn test_combat_state() {
        let mut state = world();
        let mut combat = CombatState::new("troll", 8);

        state
            .apply(state.set_combat_state(combat.clone()).unwrap())
            .unwrap();
        assert_eq!(state.combat_state(), Some(&combat));

        combat.next_turn();
        let advance = state.set_combat_state(combat.clone()).unwrap();
        assert_eq!(
            advance.old_value,
            Some(StateValue::Combat(CombatState::new("troll", 8)))
        );
        state.apply(advance).unwrap();
        assert!(!state.combat_state().unwrap().player_turn);

        state.apply(state.clear_combat_state().unwrap()).unwrap();
        assert_eq!(state.combat_state(), None);
    }

    #[test]
    fn test_global_value_roundtrip() {
        let mut state = world();
        let key = GlobalId::from("lampBattery");

        state.apply(state.set_global_value(&key, 200i64).unwrap()).unwrap();
        let drain = state.set_global_value(&key, 199i64).unwrap();
        assert_eq!(drain.old_value, Some(StateValue::Int(200)));
        state.apply(drain).unwrap();
        assert_eq!(state.global_value(&key), Some(&StateValue::Int(199)));
    }
}
