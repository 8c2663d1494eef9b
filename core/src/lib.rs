#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wave Defence simulation.
//!
//! This crate defines the vocabulary every other crate speaks: entity
//! identities, grid coordinates, the plain-data components stored by the
//! world, the [`Event`] values systems push into the per-tick outbox, and the
//! rejection reasons returned by player-facing commands. Systems never hold
//! references into one another; they exchange these values through the
//! world's entity store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

mod data;

pub use data::{
    DataError, DataSource, EnemyTable, EnemyTemplate, LevelDefinition, SpawnGroupDefinition,
    TowerTable, TowerTemplate, WaveDefinition, DEFAULT_INITIAL_GOLD, DEFAULT_INITIAL_LIFE,
};

/// Terrain code for an empty, buildable cell.
pub const TERRAIN_EMPTY: i32 = 0;

/// Terrain code for a cell blocked by an obstacle or a tower.
pub const TERRAIN_BLOCKED: i32 = 1;

/// Ability tag that makes a tower's hits apply a slow.
pub const SLOW_ABILITY: &str = "slow";

/// Unique identifier assigned to an entity by the store.
///
/// Identifiers increase monotonically and are never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Serialised as a two element `[x, y]` array to match level files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// World-space centre of the cell for tiles of side `tile_size`.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Position {
        let half = tile_size / 2.0;
        Position::new(
            self.column() as f32 * tile_size + half,
            self.row() as f32 * tile_size + half,
        )
    }
}

impl From<[u32; 2]> for CellCoord {
    fn from(value: [u32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<CellCoord> for [u32; 2] {
    fn from(value: CellCoord) -> Self {
        [value.column, value.row]
    }
}

/// World-space coordinates of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate in world units.
    pub x: f32,
    /// Vertical coordinate in world units.
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Elemental affinity carried by towers and enemies.
///
/// Tags outside the known set deserialise to [`Element::Neutral`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Kinetic damage mitigated by armor.
    Physical,
    /// Magical damage mitigated by resistance.
    Arcane,
    /// Fire damage mitigated by resistance.
    Fire,
    /// Frost damage mitigated by resistance.
    Frost,
    /// Ground-bound creatures.
    Earth,
    /// Airborne creatures.
    Air,
    /// Anything without a recognised affinity.
    #[default]
    #[serde(other)]
    Neutral,
}

impl Element {
    /// Reports whether damage of this element is reduced by armor.
    #[must_use]
    pub const fn mitigated_by_armor(self) -> bool {
        matches!(self, Self::Physical)
    }

    /// Reports whether damage of this element is reduced by resistance.
    #[must_use]
    pub const fn mitigated_by_resistance(self) -> bool {
        matches!(self, Self::Arcane | Self::Fire | Self::Frost)
    }
}

/// Health, defences and affinity of a combatant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Health at spawn time.
    pub max_health: f32,
    /// Remaining health; may dip below zero until the entity is removed.
    pub health: f32,
    /// Reduces physical damage.
    pub armor: f32,
    /// Reduces arcane, fire and frost damage.
    pub resistance: f32,
    /// Elemental affinity of the combatant.
    pub element: Element,
}

impl CombatStats {
    /// Reports whether the combatant has run out of health.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Attack parameters and bookkeeping of a placed tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Name of the tower template the tower was built from.
    pub tower_type: String,
    /// Reach measured in tiles.
    pub range: f32,
    /// Damage dealt per hit before modifiers.
    pub damage: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Elemental affinity of the tower's hits.
    pub element: Element,
    /// Ability tags such as [`SLOW_ABILITY`].
    pub effects: BTreeSet<String>,
    /// Seconds until the tower may fire again.
    pub cooldown: f32,
    /// Total damage dealt so far.
    pub experience: f32,
}

impl TowerStats {
    /// Reports whether the tower carries the provided ability tag.
    #[must_use]
    pub fn has_ability(&self, tag: &str) -> bool {
        self.effects.contains(tag)
    }

    /// Tower reach converted into world units.
    #[must_use]
    pub fn reach(&self, tile_size: f32) -> f32 {
        self.range * tile_size
    }
}

/// Movement state of an enemy walking a fixed path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Cells from spawn to goal, fixed at spawn time.
    pub path: Vec<CellCoord>,
    /// Cells travelled per second before slows.
    pub speed: f32,
    /// Index of the cell the enemy currently occupies.
    pub path_index: usize,
    /// Fraction of the way to the next cell, kept below one.
    pub progress: f32,
    /// Gold credited when the enemy is killed.
    pub bounty: u32,
}

impl EnemyStats {
    /// Creates movement state positioned at the head of the path.
    #[must_use]
    pub fn new(path: Vec<CellCoord>, speed: f32, bounty: u32) -> Self {
        Self {
            path,
            speed,
            path_index: 0,
            progress: 0.0,
            bounty,
        }
    }

    /// Cell currently occupied by the enemy.
    #[must_use]
    pub fn current_cell(&self) -> Option<CellCoord> {
        self.path.get(self.path_index).copied()
    }

    /// Reports whether the enemy stands on the last cell of its path.
    #[must_use]
    pub fn at_final_cell(&self) -> bool {
        self.path_index + 1 >= self.path.len()
    }
}

/// Timed multiplicative speed penalty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier in `(0, 1]`.
    pub ratio: f32,
    /// Seconds until the slow expires.
    pub remaining: f32,
}

impl SlowEffect {
    /// Creates a slow with the provided ratio and duration.
    #[must_use]
    pub const fn new(ratio: f32, remaining: f32) -> Self {
        Self { ratio, remaining }
    }
}

/// Temporary effects applied to an enemy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectSet {
    /// Concurrently active slows; each expires on its own clock.
    pub slows: Vec<SlowEffect>,
}

/// Last target selected by a tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLink {
    /// Enemy most recently fired upon, if any.
    pub enemy: Option<EntityId>,
}

/// Tagged union of every component kind the store understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// World-space position.
    Position(Position),
    /// Health and defences.
    Combat(CombatStats),
    /// Tower attack parameters.
    Tower(TowerStats),
    /// Enemy movement state.
    Enemy(EnemyStats),
    /// Whole status effect set, replacing any existing one.
    Effects(StatusEffectSet),
    /// Single slow appended to the existing status effect set.
    Slow(SlowEffect),
    /// Tower target link.
    Target(TargetLink),
}

impl Component {
    /// Kind discriminator of the component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Combat(_) => ComponentKind::Combat,
            Self::Tower(_) => ComponentKind::Tower,
            Self::Enemy(_) => ComponentKind::Enemy,
            Self::Effects(_) => ComponentKind::Effects,
            Self::Slow(_) => ComponentKind::Slow,
            Self::Target(_) => ComponentKind::Target,
        }
    }
}

/// Discriminator naming each [`Component`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Position`].
    Position,
    /// [`CombatStats`].
    Combat,
    /// [`TowerStats`].
    Tower,
    /// [`EnemyStats`].
    Enemy,
    /// [`StatusEffectSet`].
    Effects,
    /// [`SlowEffect`].
    Slow,
    /// [`TargetLink`].
    Target,
}

impl ComponentKind {
    /// Every kind in declaration order.
    pub const ALL: [ComponentKind; 7] = [
        Self::Position,
        Self::Combat,
        Self::Tower,
        Self::Enemy,
        Self::Effects,
        Self::Slow,
        Self::Target,
    ];

    /// Canonical snake_case name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Combat => "combat",
            Self::Tower => "tower",
            Self::Enemy => "enemy",
            Self::Effects => "effects",
            Self::Slow => "slow",
            Self::Target => "target",
        }
    }

    /// Resolves a kind from its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Strength modifiers applied to enemies spawned during a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyModifier {
    /// Multiplier applied to template health.
    pub health_multiplier: f32,
    /// Multiplier applied to template speed.
    pub speed_multiplier: f32,
}

impl Default for EnemyModifier {
    fn default() -> Self {
        Self {
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        }
    }
}

/// Events pushed into the per-tick outbox by systems and commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A wave began spawning.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: usize,
        /// Modifier captured for every enemy of the wave.
        modifier: EnemyModifier,
    },
    /// Every group of the wave spawned and the board emptied.
    WaveCleared {
        /// Zero-based index of the wave.
        wave: usize,
    },
    /// The last wave cleared and no further waves remain.
    WavesFinished,
    /// An enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EntityId,
        /// Template name of the enemy.
        enemy_type: String,
    },
    /// An enemy ran out of health and was removed.
    EnemyKilled {
        /// Identifier of the removed enemy.
        enemy: EntityId,
        /// Gold owed to the player.
        bounty: u32,
    },
    /// An enemy reached the goal and was removed.
    EnemyEscaped {
        /// Identifier of the removed enemy.
        enemy: EntityId,
    },
    /// A tower was built.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: EntityId,
        /// Template name of the tower.
        tower_type: String,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// A tower was dismantled.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: EntityId,
        /// Cell freed by the removal.
        cell: CellCoord,
    },
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell is an obstacle, a tower or path-marked terrain.
    #[error("cell is not buildable")]
    NotBuildable,
    /// Blocking the cell would disconnect the start from the goal.
    #[error("placement would block every path to the goal")]
    BlocksPath,
    /// No tower template with the requested name exists.
    #[error("unknown tower type")]
    UnknownTowerType,
    /// The player cannot afford the tower.
    #[error("not enough gold")]
    InsufficientGold,
}

/// Reasons a wave start request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum WaveStartError {
    /// A wave is running and enemies remain on the board.
    #[error("a wave is already in progress")]
    WaveInProgress,
    /// Every wave of the level has been started.
    #[error("no waves remain")]
    WavesExhausted,
}

/// Reasons a tower removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Immutable representation of an enemy used for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EntityId,
    /// World-space position.
    pub position: Position,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn time.
    pub max_health: f32,
    /// Elemental affinity.
    pub element: Element,
}

/// Immutable representation of a tower used for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier of the tower.
    pub id: EntityId,
    /// Template name of the tower.
    pub tower_type: String,
    /// World-space position.
    pub position: Position,
    /// Enemy most recently fired upon.
    pub target: Option<EntityId>,
}

/// Tower entry of a [`StateExport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerExport {
    /// Identifier of the tower.
    pub id: EntityId,
    /// Template name of the tower.
    #[serde(rename = "type")]
    pub tower_type: String,
    /// World-space position.
    pub position: Position,
}

/// Read-only summary of a session for external consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateExport {
    /// Gold available to the player.
    pub gold: u32,
    /// Remaining player life.
    pub life: u32,
    /// Zero-based index of the current wave, `None` before the first starts.
    pub wave: Option<usize>,
    /// Every tower on the board in identifier order.
    pub towers: Vec<TowerExport>,
}
