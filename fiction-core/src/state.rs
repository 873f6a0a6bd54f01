//! The world store.
//!
//! [`GameState`] owns every item, location, the player, the global singleton
//! and the append-only change history. [`GameState::apply`] is the only way
//! to mutate any of it:
//!
//! 1. The change's target is resolved (wrong record kind or unknown id is an
//!    internal error).
//! 2. If the change carries an expected old value, it must equal what is
//!    stored now, otherwise the change is rejected as a validation failure.
//! 3. Store-level invariants are checked and the single write is performed.
//! 4. The change is appended to the history.
//!
//! A failure at any step leaves both the records and the history untouched.

use crate::change::{PropertyKey, StateChange, TargetKind};
use crate::ids::{DaemonId, EntityId, FuseId, GlobalId, ItemId, LocationId};
use crate::value::{AttributeId, StateValue};
use crate::world::{CombatState, GlobalState, Item, Location, ParentEntity, Player};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by [`GameState::apply`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The caller's expected old value does not match what is stored.
    #[error("state validation failed for {change}: actual value is {actual_value:?}")]
    StateValidation {
        change: Box<StateChange>,
        actual_value: Option<StateValue>,
    },

    /// A structural invariant of the store would be violated.
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::StateValidation { .. })
    }

    fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal(message.into())
    }
}

/// Configuration for a world store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Title of the story, used in log events.
    pub title: String,
    /// Reject parent changes that would put an item inside itself.
    pub guard_parent_cycles: bool,
}

impl StoreConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            guard_parent_cycles: true,
        }
    }

    /// Content that is known to be acyclic can skip the ancestor walk.
    pub fn with_parent_cycle_guard(mut self, enabled: bool) -> Self {
        self.guard_parent_cycles = enabled;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("Untitled Story")
    }
}

/// The authoritative, mutation-audited store of one game's world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    session_id: Uuid,
    config: StoreConfig,
    items: HashMap<ItemId, Item>,
    locations: HashMap<LocationId, Location>,
    player: Player,
    global: GlobalState,
    change_history: Vec<StateChange>,
}

impl GameState {
    /// Assemble a store from loaded records. Use
    /// [`WorldBuilder`](crate::builder::WorldBuilder) for checked construction.
    pub(crate) fn from_parts(
        config: StoreConfig,
        items: HashMap<ItemId, Item>,
        locations: HashMap<LocationId, Location>,
        player: Player,
        global: GlobalState,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(
            session = %session_id,
            title = %config.title,
            items = items.len(),
            locations = locations.len(),
            "Created world store"
        );
        Self {
            session_id,
            config,
            items,
            locations,
            player,
            global,
            change_history: Vec::new(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Unique id of this store, carried in its log events.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Story title from the configuration.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Look up an item.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Look up a location.
    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Every item, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Every location, in no particular order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// The player record.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The global singleton.
    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    /// Every change applied so far, oldest first.
    pub fn change_history(&self) -> &[StateChange] {
        &self.change_history
    }

    /// Applied changes that targeted one record.
    pub fn changes_for<'a>(
        &'a self,
        entity: &'a EntityId,
    ) -> impl Iterator<Item = &'a StateChange> + 'a {
        self.change_history
            .iter()
            .filter(move |change| &change.entity == entity)
    }

    /// Items whose parent is exactly `parent`.
    pub fn items_with_parent(&self, parent: &ParentEntity) -> BTreeSet<ItemId> {
        self.items
            .values()
            .filter(|item| &item.parent() == parent)
            .map(|item| item.id.clone())
            .collect()
    }

    /// Whether a global flag is set.
    pub fn is_flag_set(&self, flag: &GlobalId) -> bool {
        self.global.is_flag_set(flag)
    }

    /// Items a pronoun currently refers to.
    pub fn pronoun(&self, pronoun: &str) -> Option<&BTreeSet<ItemId>> {
        self.global.pronouns.get(pronoun)
    }

    /// Remaining turns of a running fuse.
    pub fn fuse_turns(&self, fuse: &FuseId) -> Option<i64> {
        self.global.active_fuses.get(fuse).copied()
    }

    /// Whether a daemon is active.
    pub fn is_daemon_active(&self, daemon: &DaemonId) -> bool {
        self.global.active_daemons.contains(daemon)
    }

    /// A game-specific global value.
    pub fn global_value(&self, key: &GlobalId) -> Option<&StateValue> {
        self.global.values.get(key)
    }

    /// The fight in progress, if any.
    pub fn combat_state(&self) -> Option<&CombatState> {
        self.global.combat.as_ref()
    }

    /// The value `apply` compares a change's expected old value against.
    ///
    /// `Ok(None)` means nothing is stored. Additive keys always read as
    /// `None`. Fails only when the entity/property pair does not address an
    /// existing record.
    pub fn current_value(
        &self,
        entity: &EntityId,
        property: &PropertyKey,
    ) -> Result<Option<StateValue>, StoreError> {
        let value = match property {
            PropertyKey::ItemParent | PropertyKey::ItemAttribute(AttributeId::Parent) => {
                let item = self.target_item(entity)?;
                Some(StateValue::Parent(item.parent()))
            }
            PropertyKey::ItemAttribute(attribute) => {
                self.target_item(entity)?.attribute(attribute).cloned()
            }
            PropertyKey::LocationAttribute(attribute) => {
                self.target_location(entity)?.attribute(attribute).cloned()
            }
            PropertyKey::PlayerLocation => {
                self.expect_entity(entity, property)?;
                Some(StateValue::LocationId(self.player.location.clone()))
            }
            PropertyKey::PlayerScore => {
                self.expect_entity(entity, property)?;
                Some(StateValue::Int(self.player.score))
            }
            PropertyKey::PlayerMoves => {
                self.expect_entity(entity, property)?;
                Some(StateValue::Int(self.player.moves))
            }
            PropertyKey::PlayerCarryingCapacity => {
                self.expect_entity(entity, property)?;
                Some(StateValue::Int(self.player.carrying_capacity))
            }
            PropertyKey::PlayerHealth => {
                self.expect_entity(entity, property)?;
                Some(StateValue::Int(self.player.character.health))
            }
            PropertyKey::SetFlag(flag) | PropertyKey::ClearFlag(flag) => {
                self.expect_entity(entity, property)?;
                Some(StateValue::Bool(self.global.flags.contains(flag)))
            }
            PropertyKey::PronounReference(pronoun) => {
                self.expect_entity(entity, property)?;
                self.global
                    .pronouns
                    .get(pronoun)
                    .map(|items| StateValue::ItemIdSet(items.clone()))
            }
            PropertyKey::AddActiveFuse(_) | PropertyKey::AddActiveDaemon(_) => {
                self.expect_entity(entity, property)?;
                None
            }
            PropertyKey::RemoveActiveFuse(fuse) | PropertyKey::UpdateFuseTurns(fuse) => {
                self.expect_entity(entity, property)?;
                self.global.active_fuses.get(fuse).map(|turns| StateValue::Int(*turns))
            }
            PropertyKey::RemoveActiveDaemon(daemon) => {
                self.expect_entity(entity, property)?;
                self.global
                    .active_daemons
                    .contains(daemon)
                    .then_some(StateValue::Bool(true))
            }
            PropertyKey::GlobalValue(key) => {
                self.expect_entity(entity, property)?;
                self.global.values.get(key).cloned()
            }
            PropertyKey::CombatState => {
                self.expect_entity(entity, property)?;
                self.global.combat.clone().map(StateValue::Combat)
            }
        };
        Ok(value)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Validate, perform and record one change.
    pub fn apply(&mut self, change: StateChange) -> Result<(), StoreError> {
        let current = self.current_value(&change.entity, &change.property)?;

        if let (false, Some(expected)) = (change.property.is_additive(), &change.old_value) {
            if current.as_ref() != Some(expected) {
                tracing::warn!(
                    session = %self.session_id,
                    change = %change,
                    actual = ?current,
                    "Rejected state change with stale old value"
                );
                return Err(StoreError::StateValidation {
                    change: Box::new(change),
                    actual_value: current,
                });
            }
        }

        if let Err(err) = self.write(&change) {
            tracing::warn!(
                session = %self.session_id,
                change = %change,
                error = %err,
                "Rejected state change"
            );
            return Err(err);
        }

        tracing::debug!(
            session = %self.session_id,
            change = %change,
            history_len = self.change_history.len() + 1,
            "Applied state change"
        );
        self.change_history.push(change);
        Ok(())
    }

    /// Apply changes in order, stopping at the first failure.
    ///
    /// Changes applied before the failure stay applied.
    pub fn apply_all(
        &mut self,
        changes: impl IntoIterator<Item = StateChange>,
    ) -> Result<(), StoreError> {
        for change in changes {
            self.apply(change)?;
        }
        Ok(())
    }

    /// Check invariants and perform the single write. Every check happens
    /// before anything is written.
    fn write(&mut self, change: &StateChange) -> Result<(), StoreError> {
        let new_value = &change.new_value;
        match &change.property {
            PropertyKey::ItemParent | PropertyKey::ItemAttribute(AttributeId::Parent) => {
                let id = self.target_item(&change.entity)?.id.clone();
                let parent = new_value
                    .as_parent()
                    .ok_or_else(|| wrong_kind(change, "parent"))?;
                if self.config.guard_parent_cycles && self.would_create_cycle(&id, parent) {
                    return Err(StoreError::internal(format!(
                        "moving {id} into {parent} would create a containment cycle"
                    )));
                }
                self.item_mut(&id)?
                    .set_attribute(AttributeId::Parent, new_value.clone());
            }
            PropertyKey::ItemAttribute(attribute) => {
                let id = self.target_item(&change.entity)?.id.clone();
                self.item_mut(&id)?
                    .set_attribute(attribute.clone(), new_value.clone());
            }
            PropertyKey::LocationAttribute(attribute) => {
                let id = self.target_location(&change.entity)?.id.clone();
                self.location_mut(&id)?
                    .set_attribute(attribute.clone(), new_value.clone());
            }
            PropertyKey::PlayerLocation => {
                let destination = new_value
                    .as_location_id()
                    .ok_or_else(|| wrong_kind(change, "locationId"))?;
                if !self.locations.contains_key(destination) {
                    return Err(StoreError::internal(format!(
                        "cannot move player to unknown location '{destination}'"
                    )));
                }
                self.player.location = destination.clone();
            }
            PropertyKey::PlayerScore => self.player.score = int_value(change)?,
            PropertyKey::PlayerMoves => self.player.moves = int_value(change)?,
            PropertyKey::PlayerCarryingCapacity => {
                self.player.carrying_capacity = int_value(change)?;
            }
            PropertyKey::PlayerHealth => self.player.character.health = int_value(change)?,
            PropertyKey::SetFlag(flag) => {
                self.global.flags.insert(flag.clone());
            }
            PropertyKey::ClearFlag(flag) => {
                self.global.flags.remove(flag);
            }
            PropertyKey::PronounReference(pronoun) => {
                if new_value.is_undefined() {
                    self.global.pronouns.remove(pronoun);
                } else {
                    let items = new_value
                        .as_item_ids()
                        .ok_or_else(|| wrong_kind(change, "itemIdSet"))?;
                    self.global.pronouns.insert(pronoun.clone(), items);
                }
            }
            PropertyKey::AddActiveFuse(fuse) => {
                let turns = int_value(change)?;
                self.global.active_fuses.insert(fuse.clone(), turns);
            }
            PropertyKey::UpdateFuseTurns(fuse) => {
                let turns = int_value(change)?;
                match self.global.active_fuses.get_mut(fuse) {
                    Some(remaining) => *remaining = turns,
                    None => {
                        return Err(StoreError::internal(format!(
                            "cannot update turns of inactive fuse '{fuse}'"
                        )))
                    }
                }
            }
            PropertyKey::RemoveActiveFuse(fuse) => {
                self.global.active_fuses.remove(fuse);
            }
            PropertyKey::AddActiveDaemon(daemon) => {
                self.global.active_daemons.insert(daemon.clone());
            }
            PropertyKey::RemoveActiveDaemon(daemon) => {
                self.global.active_daemons.remove(daemon);
            }
            PropertyKey::GlobalValue(key) => match new_value {
                StateValue::Undefined => {
                    self.global.values.remove(key);
                }
                StateValue::Bool(_)
                | StateValue::Int(_)
                | StateValue::String(_)
                | StateValue::ItemId(_)
                | StateValue::LocationId(_)
                | StateValue::ItemIdSet(_)
                | StateValue::StringSet(_) => {
                    self.global.values.insert(key.clone(), new_value.clone());
                }
                unsupported => {
                    return Err(StoreError::internal(format!(
                        "unsupported {} value for global '{key}'",
                        unsupported.kind()
                    )))
                }
            },
            PropertyKey::CombatState => match new_value {
                StateValue::Combat(state) => self.global.combat = Some(state.clone()),
                StateValue::Undefined => self.global.combat = None,
                _ => return Err(wrong_kind(change, "combat")),
            },
        }
        Ok(())
    }

    /// Whether putting `item` inside `parent` would make it its own ancestor.
    fn would_create_cycle(&self, item: &ItemId, parent: &ParentEntity) -> bool {
        let mut cursor = parent.clone();
        // Bounded so a cycle already present in loaded content cannot hang us.
        for _ in 0..=self.items.len() {
            let ancestor = match &cursor {
                ParentEntity::Item(ancestor) => ancestor,
                _ => return false,
            };
            if ancestor == item {
                return true;
            }
            match self.items.get(ancestor) {
                Some(next) => cursor = next.parent(),
                None => return false,
            }
        }
        true
    }

    // =========================================================================
    // Target resolution
    // =========================================================================

    fn target_item(&self, entity: &EntityId) -> Result<&Item, StoreError> {
        match entity {
            EntityId::Item(id) => self
                .items
                .get(id)
                .ok_or_else(|| StoreError::internal(format!("unknown item '{id}'"))),
            other => Err(StoreError::internal(format!(
                "{other} cannot take an item property"
            ))),
        }
    }

    fn target_location(&self, entity: &EntityId) -> Result<&Location, StoreError> {
        match entity {
            EntityId::Location(id) => self
                .locations
                .get(id)
                .ok_or_else(|| StoreError::internal(format!("unknown location '{id}'"))),
            other => Err(StoreError::internal(format!(
                "{other} cannot take a location property"
            ))),
        }
    }

    fn expect_entity(&self, entity: &EntityId, property: &PropertyKey) -> Result<(), StoreError> {
        let matches = match property.target_kind() {
            TargetKind::Player => *entity == EntityId::Player,
            TargetKind::Global => *entity == EntityId::Global,
            TargetKind::Item | TargetKind::Location => false,
        };
        if matches {
            Ok(())
        } else {
            Err(StoreError::internal(format!(
                "{property} does not apply to {entity}"
            )))
        }
    }

    fn item_mut(&mut self, id: &ItemId) -> Result<&mut Item, StoreError> {
        self.items
            .get_mut(id)
            .ok_or_else(|| StoreError::internal(format!("unknown item '{id}'")))
    }

    fn location_mut(&mut self, id: &LocationId) -> Result<&mut Location, StoreError> {
        self.locations
            .get_mut(id)
            .ok_or_else(|| StoreError::internal(format!("unknown location '{id}'")))
    }
}

fn int_value(change: &StateChange) -> Result<i64, StoreError> {
    change
        .new_value
        .as_int()
        .ok_or_else(|| wrong_kind(change, "int"))
}

fn wrong_kind(change: &StateChange, expected: &str) -> StoreError {
    StoreError::internal(format!(
        "{} requires a {expected} value, got {}",
        change.property,
        change.new_value.kind()
    ))
}
