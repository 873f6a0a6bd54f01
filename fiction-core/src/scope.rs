//! Scope resolution: light, visibility and reachability.
//!
//! [`ScopeResolver`] is a read-only view over a [`GameState`]. Every answer is
//! computed fresh from the current records, so there is nothing to invalidate
//! when the world changes between turns. Queries never fail: unknown ids read
//! as dark, empty or unreachable.

use crate::ids::{ItemId, LocationId};
use crate::state::GameState;
use crate::world::ParentEntity;
use std::collections::{BTreeSet, VecDeque};

/// Computes what the player can perceive and touch.
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver<'a> {
    state: &'a GameState,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }

    /// Whether a location has light.
    ///
    /// An inherently lit location always does. Otherwise a switched-on light
    /// source must sit directly in the location or be carried by the player;
    /// a lamp inside a container does not count.
    pub fn is_location_lit(&self, location: &LocationId) -> bool {
        let Some(record) = self.state.location(location) else {
            return false;
        };
        if record.is_inherently_lit() {
            return true;
        }

        let lit = self
            .state
            .items()
            .filter(|item| item.is_providing_light())
            .any(|item| match item.parent() {
                ParentEntity::Player => true,
                ParentEntity::Location(id) => &id == location,
                _ => false,
            });
        tracing::trace!(location = %location, lit, "Resolved location lighting");
        lit
    }

    pub fn player_location_is_lit(&self) -> bool {
        self.is_location_lit(self.state.player().location())
    }

    /// Items directly in a lit location that are not invisible.
    ///
    /// Contents of containers are not included.
    pub fn visible_items_in(&self, location: &LocationId) -> BTreeSet<ItemId> {
        if !self.is_location_lit(location) {
            return BTreeSet::new();
        }
        let here = ParentEntity::Location(location.clone());
        self.state
            .items()
            .filter(|item| item.parent() == here && !item.is_invisible())
            .map(|item| item.id.clone())
            .collect()
    }

    /// Everything the player can physically interact with.
    ///
    /// Starts from the inventory and, when the current location is lit, the
    /// location's direct contents. Any reachable container that is open or
    /// transparent adds its contents, recursively. Invisibility is not
    /// considered here.
    pub fn items_reachable_by_player(&self) -> BTreeSet<ItemId> {
        let mut roots = self.state.items_with_parent(&ParentEntity::Player);
        if self.player_location_is_lit() {
            let here = ParentEntity::Location(self.state.player().location().clone());
            roots.extend(self.state.items_with_parent(&here));
        }
        let reachable = self.expand_containers(roots, false);
        tracing::trace!(count = reachable.len(), "Resolved reachable items");
        reachable
    }

    pub fn is_item_reachable(&self, item: &ItemId) -> bool {
        self.items_reachable_by_player().contains(item)
    }

    /// Everything the player can see: nothing in the dark, otherwise the
    /// inventory and the location's contents plus the contents of open or
    /// transparent containers, skipping invisible items throughout.
    pub fn items_visible_to_player(&self) -> BTreeSet<ItemId> {
        if !self.player_location_is_lit() {
            return BTreeSet::new();
        }
        let mut roots = self.visible_items_in(self.state.player().location());
        roots.extend(
            self.state
                .items_with_parent(&ParentEntity::Player)
                .into_iter()
                .filter(|id| self.state.item(id).is_some_and(|item| !item.is_invisible())),
        );
        self.expand_containers(roots, true)
    }

    pub fn is_item_visible(&self, item: &ItemId) -> bool {
        self.items_visible_to_player().contains(item)
    }

    /// Scenery attached to the player's location. Always in scope, lit or not.
    pub fn scenery_in_scope(&self) -> BTreeSet<ItemId> {
        self.state
            .location(self.state.player().location())
            .map(|location| location.local_globals())
            .unwrap_or_default()
    }

    /// Reachable items plus the current location's scenery.
    pub fn items_in_scope(&self) -> BTreeSet<ItemId> {
        let mut scope = self.items_reachable_by_player();
        scope.extend(self.scenery_in_scope());
        scope
    }

    /// Close `roots` under "an open or transparent container exposes its
    /// direct children".
    fn expand_containers(
        &self,
        roots: BTreeSet<ItemId>,
        skip_invisible: bool,
    ) -> BTreeSet<ItemId> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<ItemId> = roots.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            if !found.insert(id.clone()) {
                continue;
            }
            let Some(item) = self.state.item(&id) else {
                continue;
            };
            if !item.exposes_contents() {
                continue;
            }
            for child in self.state.items_with_parent(&ParentEntity::Item(id)) {
                let hidden = skip_invisible
                    && self
                        .state
                        .item(&child)
                        .is_some_and(|record| record.is_invisible());
                if !hidden && !found.contains(&child) {
                    queue.push_back(child);
                }
            }
        }
        found
    }
}

impl GameState {
    /// A scope resolver over the current state.
    pub fn scope(&self) -> ScopeResolver<'_> {
        ScopeResolver::new(self)
    }
}
