//! Attribute values and the keys they are stored under.
//!
//! Every entity record is a bag of [`StateValue`]s keyed by [`AttributeId`].
//! Authors can add arbitrary keys through [`AttributeId::custom`] without the
//! core knowing about them; the typed accessors are total projections that
//! hand back `None` whenever the stored shape does not match the request.

use crate::ids::{EntityId, ItemId, LocationId};
use crate::world::{CombatState, ExitTable, ParentEntity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Attribute Keys
// ============================================================================

/// Key of a single attribute on an item or location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AttributeId {
    Name,
    Adjectives,
    Synonyms,
    Description,
    ShortDescription,
    FirstDescription,
    ReadText,
    Size,
    Capacity,
    Parent,
    LockKey,
    IsContainer,
    IsLightSource,
    IsOn,
    IsOpen,
    IsOpenable,
    IsTransparent,
    IsInvisible,
    IsLocked,
    IsTakable,
    IsScenery,
    Exits,
    InherentlyLit,
    IsOutside,
    IsSacred,
    IsVisited,
    LocalGlobals,
    /// Author-defined key the engine has no built-in meaning for.
    Custom(CustomAttribute),
}

/// Name of an author-defined attribute.
///
/// Only built through [`AttributeId::custom`] or `From<String>`, so it never
/// holds the name of a built-in key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomAttribute(String);

impl CustomAttribute {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AttributeId {
    /// Build a key from raw text. Well-known names map onto their variant, so
    /// `AttributeId::custom("isOpen") == AttributeId::IsOpen`.
    pub fn custom(raw: impl Into<String>) -> Self {
        Self::from(raw.into())
    }

    pub fn name(&self) -> &str {
        match self {
            AttributeId::Name => "name",
            AttributeId::Adjectives => "adjectives",
            AttributeId::Synonyms => "synonyms",
            AttributeId::Description => "description",
            AttributeId::ShortDescription => "shortDescription",
            AttributeId::FirstDescription => "firstDescription",
            AttributeId::ReadText => "readText",
            AttributeId::Size => "size",
            AttributeId::Capacity => "capacity",
            AttributeId::Parent => "parent",
            AttributeId::LockKey => "lockKey",
            AttributeId::IsContainer => "isContainer",
            AttributeId::IsLightSource => "isLightSource",
            AttributeId::IsOn => "isOn",
            AttributeId::IsOpen => "isOpen",
            AttributeId::IsOpenable => "isOpenable",
            AttributeId::IsTransparent => "isTransparent",
            AttributeId::IsInvisible => "isInvisible",
            AttributeId::IsLocked => "isLocked",
            AttributeId::IsTakable => "isTakable",
            AttributeId::IsScenery => "isScenery",
            AttributeId::Exits => "exits",
            AttributeId::InherentlyLit => "inherentlyLit",
            AttributeId::IsOutside => "isOutside",
            AttributeId::IsSacred => "isSacred",
            AttributeId::IsVisited => "isVisited",
            AttributeId::LocalGlobals => "localGlobals",
            AttributeId::Custom(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AttributeId {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "name" => AttributeId::Name,
            "adjectives" => AttributeId::Adjectives,
            "synonyms" => AttributeId::Synonyms,
            "description" => AttributeId::Description,
            "shortDescription" => AttributeId::ShortDescription,
            "firstDescription" => AttributeId::FirstDescription,
            "readText" => AttributeId::ReadText,
            "size" => AttributeId::Size,
            "capacity" => AttributeId::Capacity,
            "parent" => AttributeId::Parent,
            "lockKey" => AttributeId::LockKey,
            "isContainer" => AttributeId::IsContainer,
            "isLightSource" => AttributeId::IsLightSource,
            "isOn" => AttributeId::IsOn,
            "isOpen" => AttributeId::IsOpen,
            "isOpenable" => AttributeId::IsOpenable,
            "isTransparent" => AttributeId::IsTransparent,
            "isInvisible" => AttributeId::IsInvisible,
            "isLocked" => AttributeId::IsLocked,
            "isTakable" => AttributeId::IsTakable,
            "isScenery" => AttributeId::IsScenery,
            "exits" => AttributeId::Exits,
            "inherentlyLit" => AttributeId::InherentlyLit,
            "isOutside" => AttributeId::IsOutside,
            "isSacred" => AttributeId::IsSacred,
            "isVisited" => AttributeId::IsVisited,
            "localGlobals" => AttributeId::LocalGlobals,
            _ => AttributeId::Custom(CustomAttribute(raw)),
        }
    }
}

impl From<&str> for AttributeId {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<AttributeId> for String {
    fn from(id: AttributeId) -> Self {
        match id {
            AttributeId::Custom(raw) => raw.0,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Values
// ============================================================================

/// Any value an attribute, a player field or a global slot can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    String(String),
    ItemId(ItemId),
    LocationId(LocationId),
    ItemIdSet(BTreeSet<ItemId>),
    StringSet(BTreeSet<String>),
    Exits(ExitTable),
    Parent(ParentEntity),
    /// Mixed references; `None` is a null set and reads as empty.
    EntityRefSet(Option<BTreeSet<EntityId>>),
    Combat(CombatState),
    /// Deliberately absent. Writing it removes the stored value.
    Undefined,
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_item_id(&self) -> Option<&ItemId> {
        match self {
            StateValue::ItemId(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_location_id(&self) -> Option<&LocationId> {
        match self {
            StateValue::LocationId(id) => Some(id),
            _ => None,
        }
    }

    /// Item-id set projection.
    ///
    /// Also accepts an entity-reference set made up only of items, and reads a
    /// null entity-reference set as empty.
    pub fn as_item_ids(&self) -> Option<BTreeSet<ItemId>> {
        match self {
            StateValue::ItemIdSet(ids) => Some(ids.clone()),
            StateValue::EntityRefSet(None) => Some(BTreeSet::new()),
            StateValue::EntityRefSet(Some(refs)) => refs
                .iter()
                .map(|r| r.as_item().cloned())
                .collect::<Option<BTreeSet<_>>>(),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&BTreeSet<String>> {
        match self {
            StateValue::StringSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_exits(&self) -> Option<&ExitTable> {
        match self {
            StateValue::Exits(exits) => Some(exits),
            _ => None,
        }
    }

    pub fn as_parent(&self) -> Option<&ParentEntity> {
        match self {
            StateValue::Parent(parent) => Some(parent),
            _ => None,
        }
    }

    pub fn as_combat(&self) -> Option<&CombatState> {
        match self {
            StateValue::Combat(state) => Some(state),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, StateValue::Undefined)
    }

    /// Short name of the active variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Bool(_) => "bool",
            StateValue::Int(_) => "int",
            StateValue::String(_) => "string",
            StateValue::ItemId(_) => "itemId",
            StateValue::LocationId(_) => "locationId",
            StateValue::ItemIdSet(_) => "itemIdSet",
            StateValue::StringSet(_) => "stringSet",
            StateValue::Exits(_) => "exits",
            StateValue::Parent(_) => "parent",
            StateValue::EntityRefSet(_) => "entityRefSet",
            StateValue::Combat(_) => "combat",
            StateValue::Undefined => "undefined",
        }
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        StateValue::Int(n)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::String(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::String(s)
    }
}

impl From<ItemId> for StateValue {
    fn from(id: ItemId) -> Self {
        StateValue::ItemId(id)
    }
}

impl From<LocationId> for StateValue {
    fn from(id: LocationId) -> Self {
        StateValue::LocationId(id)
    }
}

impl From<ParentEntity> for StateValue {
    fn from(parent: ParentEntity) -> Self {
        StateValue::Parent(parent)
    }
}

impl From<ExitTable> for StateValue {
    fn from(exits: ExitTable) -> Self {
        StateValue::Exits(exits)
    }
}

impl From<CombatState> for StateValue {
    fn from(state: CombatState) -> Self {
        StateValue::Combat(state)
    }
}

impl From<BTreeSet<ItemId>> for StateValue {
    fn from(ids: BTreeSet<ItemId>) -> Self {
        StateValue::ItemIdSet(ids)
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{b}"),
            StateValue::Int(n) => write!(f, "{n}"),
            StateValue::String(s) => write!(f, "{s:?}"),
            StateValue::ItemId(id) => write!(f, "item:{id}"),
            StateValue::LocationId(id) => write!(f, "location:{id}"),
            StateValue::Parent(parent) => write!(f, "{parent}"),
            StateValue::Undefined => f.write_str("undefined"),
            other => write!(f, "{other:?}"),
        }
    }
}
