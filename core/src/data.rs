//! Data-table and level schemas consumed from the loading collaborator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CombatStats, Element, EnemyModifier, TowerStats};

/// Starting gold used when a level omits `initial_gold`.
pub const DEFAULT_INITIAL_GOLD: u32 = 100;

/// Starting life used when a level omits `initial_life`.
pub const DEFAULT_INITIAL_LIFE: u32 = 10;

/// Tower templates keyed by tower type name.
pub type TowerTable = BTreeMap<String, TowerTemplate>;

/// Enemy templates keyed by enemy type name.
pub type EnemyTable = BTreeMap<String, EnemyTemplate>;

/// Row of the `towers` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTemplate {
    /// Display name of the tower.
    pub name: String,
    /// Gold required to build the tower.
    pub cost: u32,
    /// Reach measured in tiles.
    pub range: f32,
    /// Damage dealt per hit.
    pub damage: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Elemental affinity of the tower's hits.
    pub element: Element,
    /// Ability tags.
    #[serde(default)]
    pub effects: Vec<String>,
}

impl TowerTemplate {
    /// Builds fresh tower stats for a tower of the named type.
    #[must_use]
    pub fn instantiate(&self, tower_type: &str) -> TowerStats {
        TowerStats {
            tower_type: tower_type.to_owned(),
            range: self.range,
            damage: self.damage,
            attack_speed: self.attack_speed,
            element: self.element,
            effects: self.effects.iter().cloned().collect::<BTreeSet<_>>(),
            cooldown: 0.0,
            experience: 0.0,
        }
    }
}

/// Row of the `enemies` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Base health before wave modifiers.
    pub health: f32,
    /// Physical damage reduction.
    pub armor: f32,
    /// Arcane, fire and frost damage reduction.
    pub resistance: f32,
    /// Elemental affinity.
    pub element: Element,
    /// Cells per second before wave modifiers.
    pub speed: f32,
    /// Gold paid out on kill.
    pub bounty: u32,
}

impl EnemyTemplate {
    /// Combat stats scaled by the wave modifier.
    #[must_use]
    pub fn combat_stats(&self, modifier: EnemyModifier) -> CombatStats {
        let health = self.health * modifier.health_multiplier;
        CombatStats {
            max_health: health,
            health,
            armor: self.armor,
            resistance: self.resistance,
            element: self.element,
        }
    }

    /// Movement speed scaled by the wave modifier.
    #[must_use]
    pub fn scaled_speed(&self, modifier: EnemyModifier) -> f32 {
        self.speed * modifier.speed_multiplier
    }
}

/// One spawn group of a wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroupDefinition {
    /// Enemy template name.
    #[serde(rename = "type")]
    pub enemy_type: String,
    /// Number of enemies spawned by the group.
    pub count: u32,
    /// Delay between spawns in milliseconds.
    pub interval_ms: f32,
}

/// Scripted batch of spawn groups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Groups that spawn concurrently during the wave.
    pub enemies: Vec<SpawnGroupDefinition>,
}

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Terrain codes in row-major order, `grid[row][column]`.
    pub grid: Vec<Vec<i32>>,
    /// Cell where enemies spawn.
    pub start: CellCoord,
    /// Cell enemies try to reach.
    pub goal: CellCoord,
    /// Gold available at the start of the level.
    #[serde(default)]
    pub initial_gold: Option<u32>,
    /// Life available at the start of the level.
    #[serde(default)]
    pub initial_life: Option<u32>,
    /// Waves in play order.
    #[serde(default)]
    pub waves: Vec<WaveDefinition>,
}

/// Failures reported by a [`DataSource`].
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The named resource could not be read.
    #[error("failed to read {resource}")]
    Io {
        /// Name or path of the resource.
        resource: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The named resource did not match its schema.
    #[error("malformed {resource}: {reason}")]
    Malformed {
        /// Name or path of the resource.
        resource: String,
        /// Human readable decoding failure.
        reason: String,
    },
}

/// Loading collaborator that supplies tables and levels to the simulation.
pub trait DataSource {
    /// Loads the `towers` table.
    fn tower_table(&self) -> Result<TowerTable, DataError>;

    /// Loads the `enemies` table.
    fn enemy_table(&self) -> Result<EnemyTable, DataError>;

    /// Loads the named level.
    fn level(&self, name: &str) -> Result<LevelDefinition, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_missing_economy_fields() {
        let level: LevelDefinition = serde_json::from_str(
            r#"{
                "grid": [[0, 2, 0]],
                "start": [0, 0],
                "goal": [2, 0],
                "waves": [{"enemies": [{"type": "grunt", "count": 3, "interval_ms": 500}]}]
            }"#,
        )
        .expect("parse level");

        assert_eq!(level.initial_gold, None);
        assert_eq!(level.initial_life, None);
        assert_eq!(level.waves.len(), 1);
        assert_eq!(level.waves[0].enemies[0].enemy_type, "grunt");
        assert_eq!(level.goal, CellCoord::new(2, 0));
    }

    #[test]
    fn enemy_template_scales_health_and_speed() {
        let template = EnemyTemplate {
            health: 100.0,
            armor: 2.0,
            resistance: 1.0,
            element: Element::Earth,
            speed: 1.5,
            bounty: 5,
        };
        let modifier = EnemyModifier {
            health_multiplier: 1.5,
            speed_multiplier: 1.2,
        };

        let stats = template.combat_stats(modifier);
        assert!((stats.max_health - 150.0).abs() < 1e-4);
        assert!((stats.health - stats.max_health).abs() < f32::EPSILON);
        assert!((template.scaled_speed(modifier) - 1.8).abs() < 1e-4);
    }

    #[test]
    fn tower_template_collects_effects_into_a_set() {
        let template: TowerTemplate = serde_json::from_str(
            r#"{"name": "Frost", "cost": 40, "range": 2.5, "damage": 8,
                "attack_speed": 1.0, "element": "frost", "effects": ["slow", "slow"]}"#,
        )
        .expect("parse tower");

        let stats = template.instantiate("frost");
        assert_eq!(stats.tower_type, "frost");
        assert_eq!(stats.effects.len(), 1);
        assert!(stats.has_ability(crate::SLOW_ABILITY));
        assert!(stats.cooldown.abs() < f32::EPSILON);
    }
}
