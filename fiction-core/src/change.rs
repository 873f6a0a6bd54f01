//! Proposed mutations of the world store.
//!
//! A [`StateChange`] names the record, the property, the value the caller
//! believes is stored now, and the value to install. Changes are plain data:
//! they are built by game logic, validated and applied by
//! [`GameState::apply`](crate::state::GameState::apply), and then kept verbatim
//! in the change history.

use crate::ids::{DaemonId, EntityId, FuseId, GlobalId};
use crate::value::{AttributeId, StateValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which property of a record a change targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    /// Any attribute of an item. `Parent` behaves like [`PropertyKey::ItemParent`].
    ItemAttribute(AttributeId),
    ItemParent,
    LocationAttribute(AttributeId),
    PlayerLocation,
    PlayerScore,
    PlayerMoves,
    PlayerCarryingCapacity,
    PlayerHealth,
    SetFlag(GlobalId),
    ClearFlag(GlobalId),
    PronounReference(String),
    AddActiveFuse(FuseId),
    RemoveActiveFuse(FuseId),
    UpdateFuseTurns(FuseId),
    AddActiveDaemon(DaemonId),
    RemoveActiveDaemon(DaemonId),
    GlobalValue(GlobalId),
    CombatState,
}

/// The kind of record a property lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Item,
    Location,
    Player,
    Global,
}

impl PropertyKey {
    pub fn target_kind(&self) -> TargetKind {
        match self {
            PropertyKey::ItemAttribute(_) | PropertyKey::ItemParent => TargetKind::Item,
            PropertyKey::LocationAttribute(_) => TargetKind::Location,
            PropertyKey::PlayerLocation
            | PropertyKey::PlayerScore
            | PropertyKey::PlayerMoves
            | PropertyKey::PlayerCarryingCapacity
            | PropertyKey::PlayerHealth => TargetKind::Player,
            PropertyKey::SetFlag(_)
            | PropertyKey::ClearFlag(_)
            | PropertyKey::PronounReference(_)
            | PropertyKey::AddActiveFuse(_)
            | PropertyKey::RemoveActiveFuse(_)
            | PropertyKey::UpdateFuseTurns(_)
            | PropertyKey::AddActiveDaemon(_)
            | PropertyKey::RemoveActiveDaemon(_)
            | PropertyKey::GlobalValue(_)
            | PropertyKey::CombatState => TargetKind::Global,
        }
    }

    /// "Add" keys have no prior value to compare against.
    pub fn is_additive(&self) -> bool {
        matches!(
            self,
            PropertyKey::AddActiveFuse(_) | PropertyKey::AddActiveDaemon(_)
        )
    }

    /// Whether the key moves an item within the containment graph.
    pub fn changes_parent(&self) -> bool {
        matches!(
            self,
            PropertyKey::ItemParent | PropertyKey::ItemAttribute(AttributeId::Parent)
        )
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::ItemAttribute(attr) => write!(f, "itemAttribute({attr})"),
            PropertyKey::ItemParent => f.write_str("itemParent"),
            PropertyKey::LocationAttribute(attr) => write!(f, "locationAttribute({attr})"),
            PropertyKey::PlayerLocation => f.write_str("playerLocation"),
            PropertyKey::PlayerScore => f.write_str("playerScore"),
            PropertyKey::PlayerMoves => f.write_str("playerMoves"),
            PropertyKey::PlayerCarryingCapacity => f.write_str("playerCarryingCapacity"),
            PropertyKey::PlayerHealth => f.write_str("playerHealth"),
            PropertyKey::SetFlag(flag) => write!(f, "setFlag({flag})"),
            PropertyKey::ClearFlag(flag) => write!(f, "clearFlag({flag})"),
            PropertyKey::PronounReference(pronoun) => write!(f, "pronoun({pronoun})"),
            PropertyKey::AddActiveFuse(fuse) => write!(f, "addActiveFuse({fuse})"),
            PropertyKey::RemoveActiveFuse(fuse) => write!(f, "removeActiveFuse({fuse})"),
            PropertyKey::UpdateFuseTurns(fuse) => write!(f, "updateFuseTurns({fuse})"),
            PropertyKey::AddActiveDaemon(daemon) => write!(f, "addActiveDaemon({daemon})"),
            PropertyKey::RemoveActiveDaemon(daemon) => write!(f, "removeActiveDaemon({daemon})"),
            PropertyKey::GlobalValue(key) => write!(f, "globalValue({key})"),
            PropertyKey::CombatState => f.write_str("combatState"),
        }
    }
}

/// One proposed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateChange {
    pub entity: EntityId,
    pub property: PropertyKey,
    /// What the caller believes is stored now. `None` skips validation.
    pub old_value: Option<StateValue>,
    pub new_value: StateValue,
}

impl StateChange {
    /// A change with no expected old value.
    pub fn new(entity: EntityId, property: PropertyKey, new_value: impl Into<StateValue>) -> Self {
        Self {
            entity,
            property,
            old_value: None,
            new_value: new_value.into(),
        }
    }

    /// Require the store to currently hold `old_value`.
    pub fn expecting(mut self, old_value: impl Into<StateValue>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }

    /// Set the expected old value from an optional lookup result.
    pub fn expecting_current(mut self, current: Option<StateValue>) -> Self {
        self.old_value = current;
        self
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.entity, self.property, self.new_value)?;
        if let Some(old) = &self.old_value {
            write!(f, " (expecting {old})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kinds() {
        assert_eq!(PropertyKey::ItemParent.target_kind(), TargetKind::Item);
        assert_eq!(
            PropertyKey::LocationAttribute(AttributeId::IsVisited).target_kind(),
            TargetKind::Location
        );
        assert_eq!(PropertyKey::PlayerMoves.target_kind(), TargetKind::Player);
        assert_eq!(
            PropertyKey::AddActiveFuse(FuseId::from("lampTimer")).target_kind(),
            TargetKind::Global
        );
    }

    #[test]
    fn test_parent_keys() {
        assert!(PropertyKey::ItemParent.changes_parent());
        assert!(PropertyKey::ItemAttribute(AttributeId::Parent).changes_parent());
        assert!(!PropertyKey::ItemAttribute(AttributeId::IsOpen).changes_parent());
    }

    #[test]
    fn test_builder_and_display() {
        let change = StateChange::new(
            EntityId::item("box"),
            PropertyKey::ItemAttribute(AttributeId::IsOpen),
            true,
        )
        .expecting(false);

        assert_eq!(change.old_value, Some(StateValue::Bool(false)));
        assert_eq!(
            change.to_string(),
            "item:box.itemAttribute(isOpen) -> true (expecting false)"
        );
    }
}
