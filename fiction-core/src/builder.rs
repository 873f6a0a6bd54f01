//! World builder used by content loaders.
//!
//! Collects the initial items, locations, player and global state and turns
//! them into a [`GameState`]. Only the checks needed to produce a usable store
//! happen here: ids must be unique and the player must start somewhere real.
//! Exits, lock keys and parents pointing at missing records are not checked;
//! they surface when something tries to use them.

use crate::ids::{ItemId, LocationId};
use crate::state::{GameState, StoreConfig};
use crate::world::{GlobalState, Item, Location, Player};
use std::collections::HashMap;
use thiserror::Error;

/// Error from world building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("a starting location is required")]
    MissingStartingLocation,

    #[error("starting location '{0}' is not defined")]
    UnknownStartingLocation(LocationId),

    #[error("item '{0}' is defined more than once")]
    DuplicateItem(ItemId),

    #[error("location '{0}' is defined more than once")]
    DuplicateLocation(LocationId),
}

/// Builder for a [`GameState`].
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    config: StoreConfig,
    items: Vec<Item>,
    locations: Vec<Location>,
    player: Option<Player>,
    global: GlobalState,
}

impl WorldBuilder {
    /// Create a new builder for a story with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            config: StoreConfig::new(title),
            ..Self::default()
        }
    }

    /// Replace the store configuration, title included.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    /// Set the full player record, starting location included.
    pub fn player(mut self, player: Player) -> Self {
        self.player = Some(player);
        self
    }

    /// Set where the player starts, keeping any other player settings.
    pub fn start_in(mut self, location: impl Into<LocationId>) -> Self {
        let location = location.into();
        match self.player.as_mut() {
            Some(player) => player.location = location,
            None => self.player = Some(Player::new(location)),
        }
        self
    }

    pub fn global(mut self, global: GlobalState) -> Self {
        self.global = global;
        self
    }

    /// Build the store.
    pub fn build(self) -> Result<GameState, BuilderError> {
        let player = self.player.ok_or(BuilderError::MissingStartingLocation)?;

        let mut locations = HashMap::with_capacity(self.locations.len());
        for location in self.locations {
            if locations.contains_key(&location.id) {
                return Err(BuilderError::DuplicateLocation(location.id));
            }
            locations.insert(location.id.clone(), location);
        }

        let mut items = HashMap::with_capacity(self.items.len());
        for item in self.items {
            if items.contains_key(&item.id) {
                return Err(BuilderError::DuplicateItem(item.id));
            }
            items.insert(item.id.clone(), item);
        }

        if !locations.contains_key(player.location()) {
            return Err(BuilderError::UnknownStartingLocation(
                player.location().clone(),
            ));
        }

        Ok(GameState::from_parts(
            self.config,
            items,
            locations,
            player,
            self.global,
        ))
    }
}
