//! Identifier types for everything the world store can address.
//!
//! Content authors pick the ids (`"brassLantern"`, `"westOfHouse"`), so every
//! id is a string newtype rather than a generated UUID.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id!(
    /// Unique identifier for an item.
    ItemId
);

string_id!(
    /// Unique identifier for a location.
    LocationId
);

string_id!(
    /// Key for a flag or a free-form value in the global state.
    GlobalId
);

string_id!(
    /// Identifier of a one-shot countdown.
    FuseId
);

string_id!(
    /// Identifier of a recurring background process.
    DaemonId
);

/// Addresses any record held by the world store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Item(ItemId),
    Location(LocationId),
    Player,
    /// The singleton holding flags, pronouns, fuses, daemons and combat.
    Global,
}

impl EntityId {
    pub fn item(id: impl Into<ItemId>) -> Self {
        EntityId::Item(id.into())
    }

    pub fn location(id: impl Into<LocationId>) -> Self {
        EntityId::Location(id.into())
    }

    pub fn as_item(&self) -> Option<&ItemId> {
        match self {
            EntityId::Item(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Item(id) => write!(f, "item:{id}"),
            EntityId::Location(id) => write!(f, "location:{id}"),
            EntityId::Player => f.write_str("player"),
            EntityId::Global => f.write_str("global"),
        }
    }
}
