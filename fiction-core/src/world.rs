//! Interactive-fiction world records.
//!
//! Contains the entity types held by the world store: items, locations, the
//! player, the global singleton, and the small value records (exits,
//! containment parents, combat) they refer to.
//!
//! Records are built freely by the content loader, but once handed to a
//! [`GameState`](crate::state::GameState) they change only through
//! `GameState::apply`.

use crate::ids::{DaemonId, EntityId, FuseId, GlobalId, ItemId, LocationId};
use crate::value::{AttributeId, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Size of an item with no explicit size.
pub const DEFAULT_ITEM_SIZE: i64 = 1;

/// Capacity of a container with no explicit limit.
pub const DEFAULT_ITEM_CAPACITY: i64 = 1000;

/// How much the player can carry unless content says otherwise.
pub const DEFAULT_CARRYING_CAPACITY: i64 = 100;

// ============================================================================
// Containment
// ============================================================================

/// Where an item currently resides.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ParentEntity {
    Player,
    Location(LocationId),
    Item(ItemId),
    #[default]
    Nowhere,
}

impl ParentEntity {
    pub fn item(id: impl Into<ItemId>) -> Self {
        ParentEntity::Item(id.into())
    }

    pub fn location(id: impl Into<LocationId>) -> Self {
        ParentEntity::Location(id.into())
    }

    /// The store record this parent points at, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            ParentEntity::Player => Some(EntityId::Player),
            ParentEntity::Location(id) => Some(EntityId::Location(id.clone())),
            ParentEntity::Item(id) => Some(EntityId::Item(id.clone())),
            ParentEntity::Nowhere => None,
        }
    }
}

impl fmt::Display for ParentEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentEntity::Player => f.write_str("player"),
            ParentEntity::Location(id) => write!(f, "location:{id}"),
            ParentEntity::Item(id) => write!(f, "item:{id}"),
            ParentEntity::Nowhere => f.write_str("nowhere"),
        }
    }
}

// ============================================================================
// Exits
// ============================================================================

/// Compass, vertical and in/out movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
    Up,
    Down,
    Inside,
    Outside,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::Northeast => "northeast",
            Direction::East => "east",
            Direction::Southeast => "southeast",
            Direction::South => "south",
            Direction::Southwest => "southwest",
            Direction::West => "west",
            Direction::Northwest => "northwest",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Inside => "inside",
            Direction::Outside => "outside",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::Northeast => Direction::Southwest,
            Direction::East => Direction::West,
            Direction::Southeast => Direction::Northwest,
            Direction::South => Direction::North,
            Direction::Southwest => Direction::Northeast,
            Direction::West => Direction::East,
            Direction::Northwest => Direction::Southeast,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Inside => Direction::Outside,
            Direction::Outside => Direction::Inside,
        }
    }

    pub fn all() -> [Direction; 12] {
        [
            Direction::North,
            Direction::Northeast,
            Direction::East,
            Direction::Southeast,
            Direction::South,
            Direction::Southwest,
            Direction::West,
            Direction::Northwest,
            Direction::Up,
            Direction::Down,
            Direction::Inside,
            Direction::Outside,
        ]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A way out of a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exit {
    pub destination: LocationId,
    /// Shown instead of moving when the exit is blocked.
    pub blocked_message: Option<String>,
}

impl Exit {
    pub fn to(destination: impl Into<LocationId>) -> Self {
        Self {
            destination: destination.into(),
            blocked_message: None,
        }
    }

    pub fn blocked(destination: impl Into<LocationId>, message: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            blocked_message: Some(message.into()),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked_message.is_some()
    }
}

pub type ExitTable = BTreeMap<Direction, Exit>;

// ============================================================================
// Items
// ============================================================================

/// An object in the world: a lamp, a mailbox, the leaflet inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    attributes: BTreeMap<AttributeId, StateValue>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeId, value: impl Into<StateValue>) -> Self {
        self.set_attribute(attribute, value.into());
        self
    }

    pub fn with_flag(self, attribute: AttributeId) -> Self {
        self.with_attribute(attribute, true)
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_attribute(AttributeId::Name, name.into())
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_attribute(AttributeId::Description, description.into())
    }

    pub fn with_parent(self, parent: ParentEntity) -> Self {
        self.with_attribute(AttributeId::Parent, parent)
    }

    pub fn with_size(self, size: i64) -> Self {
        self.with_attribute(AttributeId::Size, size)
    }

    pub fn with_capacity(self, capacity: i64) -> Self {
        self.with_attribute(AttributeId::Capacity, capacity)
    }

    pub fn with_adjectives<S: Into<String>>(self, words: impl IntoIterator<Item = S>) -> Self {
        let words = words.into_iter().map(Into::into).collect();
        self.with_attribute(AttributeId::Adjectives, StateValue::StringSet(words))
    }

    pub fn with_synonyms<S: Into<String>>(self, words: impl IntoIterator<Item = S>) -> Self {
        let words = words.into_iter().map(Into::into).collect();
        self.with_attribute(AttributeId::Synonyms, StateValue::StringSet(words))
    }

    pub fn attribute(&self, attribute: &AttributeId) -> Option<&StateValue> {
        self.attributes.get(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&AttributeId, &StateValue)> {
        self.attributes.iter()
    }

    /// `Undefined` removes the attribute.
    pub(crate) fn set_attribute(&mut self, attribute: AttributeId, value: StateValue) {
        if value.is_undefined() {
            self.attributes.remove(&attribute);
        } else {
            self.attributes.insert(attribute, value);
        }
    }

    /// Display name, falling back to the raw id.
    pub fn name(&self) -> &str {
        self.attribute(&AttributeId::Name)
            .and_then(StateValue::as_string)
            .unwrap_or_else(|| self.id.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.attribute(&AttributeId::Description)
            .and_then(StateValue::as_string)
    }

    pub fn parent(&self) -> ParentEntity {
        self.attribute(&AttributeId::Parent)
            .and_then(StateValue::as_parent)
            .cloned()
            .unwrap_or_default()
    }

    pub fn size(&self) -> i64 {
        self.attribute(&AttributeId::Size)
            .and_then(StateValue::as_int)
            .unwrap_or(DEFAULT_ITEM_SIZE)
    }

    pub fn capacity(&self) -> i64 {
        self.attribute(&AttributeId::Capacity)
            .and_then(StateValue::as_int)
            .unwrap_or(DEFAULT_ITEM_CAPACITY)
    }

    pub fn adjectives(&self) -> BTreeSet<String> {
        self.string_set(&AttributeId::Adjectives)
    }

    pub fn synonyms(&self) -> BTreeSet<String> {
        self.string_set(&AttributeId::Synonyms)
    }

    pub fn lock_key(&self) -> Option<&ItemId> {
        self.attribute(&AttributeId::LockKey)
            .and_then(StateValue::as_item_id)
    }

    /// A flag is set only when stored as `Bool(true)`.
    pub fn has_flag(&self, attribute: &AttributeId) -> bool {
        self.attribute(attribute)
            .and_then(StateValue::as_bool)
            .unwrap_or(false)
    }

    pub fn is_container(&self) -> bool {
        self.has_flag(&AttributeId::IsContainer)
    }

    pub fn is_open(&self) -> bool {
        self.has_flag(&AttributeId::IsOpen)
    }

    pub fn is_transparent(&self) -> bool {
        self.has_flag(&AttributeId::IsTransparent)
    }

    pub fn is_invisible(&self) -> bool {
        self.has_flag(&AttributeId::IsInvisible)
    }

    pub fn is_light_source(&self) -> bool {
        self.has_flag(&AttributeId::IsLightSource)
    }

    pub fn is_on(&self) -> bool {
        self.has_flag(&AttributeId::IsOn)
    }

    /// A light source that is switched on.
    pub fn is_providing_light(&self) -> bool {
        self.is_light_source() && self.is_on()
    }

    /// Whether a reachable container also exposes its contents.
    pub fn exposes_contents(&self) -> bool {
        self.is_container() && (self.is_open() || self.is_transparent())
    }

    fn string_set(&self, attribute: &AttributeId) -> BTreeSet<String> {
        self.attribute(attribute)
            .and_then(StateValue::as_strings)
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// Locations
// ============================================================================

/// A room or outdoor area the player can stand in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    attributes: BTreeMap<AttributeId, StateValue>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeId, value: impl Into<StateValue>) -> Self {
        self.set_attribute(attribute, value.into());
        self
    }

    pub fn with_flag(self, attribute: AttributeId) -> Self {
        self.with_attribute(attribute, true)
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_attribute(AttributeId::Name, name.into())
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_attribute(AttributeId::Description, description.into())
    }

    /// Mark the location as lit regardless of light sources.
    pub fn lit(self) -> Self {
        self.with_flag(AttributeId::InherentlyLit)
    }

    pub fn with_exit(self, direction: Direction, exit: Exit) -> Self {
        let mut exits = self.exits();
        exits.insert(direction, exit);
        self.with_attribute(AttributeId::Exits, exits)
    }

    pub fn with_local_globals<I: Into<ItemId>>(self, items: impl IntoIterator<Item = I>) -> Self {
        let items: BTreeSet<ItemId> = items.into_iter().map(Into::into).collect();
        self.with_attribute(AttributeId::LocalGlobals, items)
    }

    pub fn attribute(&self, attribute: &AttributeId) -> Option<&StateValue> {
        self.attributes.get(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&AttributeId, &StateValue)> {
        self.attributes.iter()
    }

    pub(crate) fn set_attribute(&mut self, attribute: AttributeId, value: StateValue) {
        if value.is_undefined() {
            self.attributes.remove(&attribute);
        } else {
            self.attributes.insert(attribute, value);
        }
    }

    pub fn name(&self) -> &str {
        self.attribute(&AttributeId::Name)
            .and_then(StateValue::as_string)
            .unwrap_or_else(|| self.id.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.attribute(&AttributeId::Description)
            .and_then(StateValue::as_string)
    }

    pub fn exits(&self) -> ExitTable {
        self.attribute(&AttributeId::Exits)
            .and_then(StateValue::as_exits)
            .cloned()
            .unwrap_or_default()
    }

    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.attribute(&AttributeId::Exits)
            .and_then(StateValue::as_exits)
            .and_then(|exits| exits.get(&direction))
    }

    pub fn has_flag(&self, attribute: &AttributeId) -> bool {
        self.attribute(attribute)
            .and_then(StateValue::as_bool)
            .unwrap_or(false)
    }

    pub fn is_inherently_lit(&self) -> bool {
        self.has_flag(&AttributeId::InherentlyLit)
    }

    /// Scenery items that are always in scope here.
    pub fn local_globals(&self) -> BTreeSet<ItemId> {
        self.attribute(&AttributeId::LocalGlobals)
            .and_then(StateValue::as_item_ids)
            .unwrap_or_default()
    }
}

// ============================================================================
// Player
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// `(score - 10) / 2`, rounded toward negative infinity.
    pub fn modifier(&self, ability: Ability) -> i8 {
        let score = self.get(ability) as i16;
        (score - 10).div_euclid(2) as i8
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Combat-relevant numbers for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    /// The six ability scores.
    pub abilities: AbilityScores,
    /// Current health.
    pub health: i64,
    /// Health when fully rested.
    pub max_health: i64,
}

impl CharacterSheet {
    /// A sheet at full health.
    pub fn new(abilities: AbilityScores, max_health: i64) -> Self {
        Self {
            abilities,
            health: max_health,
            max_health,
        }
    }

    /// Whether the character still has health left.
    pub fn is_conscious(&self) -> bool {
        self.health > 0
    }
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self::new(AbilityScores::default(), 50)
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Where the player is; always an existing location.
    pub(crate) location: LocationId,
    /// Points earned so far.
    pub(crate) score: i64,
    /// Turns taken so far.
    pub(crate) moves: i64,
    /// Total size the player can carry.
    pub(crate) carrying_capacity: i64,
    /// Ability scores and health.
    pub(crate) character: CharacterSheet,
}

impl Player {
    /// A fresh player at `location` with default capacity and character.
    pub fn new(location: impl Into<LocationId>) -> Self {
        Self {
            location: location.into(),
            score: 0,
            moves: 0,
            carrying_capacity: DEFAULT_CARRYING_CAPACITY,
            character: CharacterSheet::default(),
        }
    }

    /// Override the default carrying capacity.
    pub fn with_carrying_capacity(mut self, capacity: i64) -> Self {
        self.carrying_capacity = capacity;
        self
    }

    /// Replace the default character sheet.
    pub fn with_character(mut self, character: CharacterSheet) -> Self {
        self.character = character;
        self
    }

    /// Current location id.
    pub fn location(&self) -> &LocationId {
        &self.location
    }

    /// Current score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Number of moves taken.
    pub fn moves(&self) -> i64 {
        self.moves
    }

    /// Total size the player can carry.
    pub fn carrying_capacity(&self) -> i64 {
        self.carrying_capacity
    }

    /// Ability scores and health.
    pub fn character(&self) -> &CharacterSheet {
        &self.character
    }
}

// ============================================================================
// Combat
// ============================================================================

/// An ongoing fight between the player and one opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatState {
    /// The item being fought.
    pub enemy: ItemId,
    /// Round number, starting at 1.
    pub round: u32,
    /// Whether the player acts next.
    pub player_turn: bool,
    /// Remaining enemy health.
    pub enemy_health: i64,
}

impl CombatState {
    /// Start a fight on round 1 with the player to act.
    pub fn new(enemy: impl Into<ItemId>, enemy_health: i64) -> Self {
        Self {
            enemy: enemy.into(),
            round: 1,
            player_turn: true,
            enemy_health,
        }
    }

    /// Pass the turn; a new round starts after the enemy acts.
    pub fn next_turn(&mut self) {
        if !self.player_turn {
            self.round += 1;
        }
        self.player_turn = !self.player_turn;
    }

    /// Whether the enemy is out of health.
    pub fn is_enemy_defeated(&self) -> bool {
        self.enemy_health <= 0
    }
}

// ============================================================================
// Global State
// ============================================================================

/// The singleton record addressed as [`EntityId::Global`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Flags currently set.
    pub(crate) flags: BTreeSet<GlobalId>,
    /// Items each pronoun currently refers to.
    pub(crate) pronouns: BTreeMap<String, BTreeSet<ItemId>>,
    /// Running fuses and their remaining turns.
    pub(crate) active_fuses: BTreeMap<FuseId, i64>,
    /// Daemons that run every turn.
    pub(crate) active_daemons: BTreeSet<DaemonId>,
    /// Game-specific values.
    pub(crate) values: BTreeMap<GlobalId, StateValue>,
    /// The fight in progress, if any.
    pub(crate) combat: Option<CombatState>,
}

impl GlobalState {
    /// Empty global state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `flag` set.
    pub fn with_flag(mut self, flag: impl Into<GlobalId>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Start with a game-specific value.
    pub fn with_value(mut self, key: impl Into<GlobalId>, value: impl Into<StateValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Start with a fuse already running.
    pub fn with_fuse(mut self, fuse: impl Into<FuseId>, turns: i64) -> Self {
        self.active_fuses.insert(fuse.into(), turns);
        self
    }

    /// Start with a daemon already active.
    pub fn with_daemon(mut self, daemon: impl Into<DaemonId>) -> Self {
        self.active_daemons.insert(daemon.into());
        self
    }

    /// Flags currently set.
    pub fn flags(&self) -> &BTreeSet<GlobalId> {
        &self.flags
    }

    /// Whether `flag` is set.
    pub fn is_flag_set(&self, flag: &GlobalId) -> bool {
        self.flags.contains(flag)
    }

    /// Pronoun bindings.
    pub fn pronouns(&self) -> &BTreeMap<String, BTreeSet<ItemId>> {
        &self.pronouns
    }

    /// Running fuses and their remaining turns.
    pub fn active_fuses(&self) -> &BTreeMap<FuseId, i64> {
        &self.active_fuses
    }

    /// Active daemons.
    pub fn active_daemons(&self) -> &BTreeSet<DaemonId> {
        &self.active_daemons
    }

    /// Game-specific values.
    pub fn values(&self) -> &BTreeMap<GlobalId, StateValue> {
        &self.values
    }

    /// The fight in progress, if any.
    pub fn combat(&self) -> Option<&CombatState> {
        self.combat.as_ref()
    }
}
