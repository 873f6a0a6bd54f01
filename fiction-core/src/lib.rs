//! World-model core for interactive fiction.
//!
//! This crate provides:
//! - A mutation-audited store of items, locations, the player and global state
//! - Old-value validation on every change, with a full change history
//! - Scope resolution: lighting, visibility and reachability through containers
//!
//! # Quick Start
//!
//! ```
//! use fiction_core::{AttributeId, Item, Location, ParentEntity, WorldBuilder};
//!
//! let mut state = WorldBuilder::new("Zork")
//!     .location(Location::new("cellar"))
//!     .item(
//!         Item::new("lamp")
//!             .with_flag(AttributeId::IsLightSource)
//!             .with_parent(ParentEntity::Player),
//!     )
//!     .start_in("cellar")
//!     .build()?;
//!
//! assert!(!state.scope().player_location_is_lit());
//!
//! let switch_on = state.set_item_attribute(&"lamp".into(), AttributeId::IsOn, true)?;
//! state.apply(switch_on)?;
//!
//! assert!(state.scope().player_location_is_lit());
//! assert_eq!(state.change_history().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod change;
mod factory;
pub mod ids;
pub mod scope;
pub mod state;
pub mod testing;
pub mod value;
pub mod world;

// Primary public API
pub use builder::{BuilderError, WorldBuilder};
pub use change::{PropertyKey, StateChange};
pub use ids::{DaemonId, EntityId, FuseId, GlobalId, ItemId, LocationId};
pub use scope::ScopeResolver;
pub use state::{GameState, StoreConfig, StoreError};
pub use value::{AttributeId, CustomAttribute, StateValue};
pub use world::{
    Ability, AbilityScores, CharacterSheet, CombatState, Direction, Exit, ExitTable, GlobalState,
    Item, Location, ParentEntity, Player,
};
