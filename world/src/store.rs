//! Component storage keyed by entity identity.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use wave_defence_core::{
    CombatStats, Component, ComponentKind, EnemyStats, EntityId, Position, StatusEffectSet,
    TargetLink, TowerStats,
};

/// Failures raised when inserting components.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The named component kind does not exist.
    #[error("unknown component kind `{kind}`")]
    InvalidComponent {
        /// Name supplied by the caller.
        kind: String,
    },
    /// The payload could not be decoded into the named kind.
    #[error("malformed `{kind}` component")]
    MalformedComponent {
        /// Canonical name of the kind.
        kind: &'static str,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed storage for every component kind.
///
/// Maps are ordered by entity id so iteration is deterministic and matches
/// creation order.
#[derive(Debug)]
pub struct EntityStore {
    next_id: u64,
    positions: BTreeMap<EntityId, Position>,
    combats: BTreeMap<EntityId, CombatStats>,
    towers: BTreeMap<EntityId, TowerStats>,
    enemies: BTreeMap<EntityId, EnemyStats>,
    effects: BTreeMap<EntityId, StatusEffectSet>,
    targets: BTreeMap<EntityId, TargetLink>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates an empty store whose first identifier is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            positions: BTreeMap::new(),
            combats: BTreeMap::new(),
            towers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            effects: BTreeMap::new(),
            targets: BTreeMap::new(),
        }
    }

    /// Allocates a fresh entity identity.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts or replaces a component.
    ///
    /// A [`Component::Slow`] is appended to the entity's status effects
    /// instead, creating the set when the entity has none, so that concurrent
    /// slows coexist.
    pub fn add_component(&mut self, id: EntityId, component: Component) {
        match component {
            Component::Position(position) => {
                let _ = self.positions.insert(id, position);
            }
            Component::Combat(combat) => {
                let _ = self.combats.insert(id, combat);
            }
            Component::Tower(tower) => {
                let _ = self.towers.insert(id, tower);
            }
            Component::Enemy(enemy) => {
                let _ = self.enemies.insert(id, enemy);
            }
            Component::Effects(effects) => {
                let _ = self.effects.insert(id, effects);
            }
            Component::Slow(slow) => self.effects.entry(id).or_default().slows.push(slow),
            Component::Target(target) => {
                let _ = self.targets.insert(id, target);
            }
        }
    }

    /// Inserts a component named by its kind string and JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidComponent`] for an unknown kind name and
    /// [`StoreError::MalformedComponent`] when the payload does not decode.
    pub fn insert_named(
        &mut self,
        id: EntityId,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<(), StoreError> {
        let Some(resolved) = ComponentKind::from_name(kind) else {
            return Err(StoreError::InvalidComponent {
                kind: kind.to_owned(),
            });
        };

        let component = match resolved {
            ComponentKind::Position => Component::Position(decode(resolved, payload)?),
            ComponentKind::Combat => Component::Combat(decode(resolved, payload)?),
            ComponentKind::Tower => Component::Tower(decode(resolved, payload)?),
            ComponentKind::Enemy => Component::Enemy(decode(resolved, payload)?),
            ComponentKind::Effects => Component::Effects(decode(resolved, payload)?),
            ComponentKind::Slow => Component::Slow(decode(resolved, payload)?),
            ComponentKind::Target => Component::Target(decode(resolved, payload)?),
        };
        self.add_component(id, component);
        Ok(())
    }

    /// Deletes the entity from every component map. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntityId) {
        let _ = self.positions.remove(&id);
        let _ = self.combats.remove(&id);
        let _ = self.towers.remove(&id);
        let _ = self.enemies.remove(&id);
        let _ = self.effects.remove(&id);
        let _ = self.targets.remove(&id);
    }

    /// Reports whether any component is stored for the entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.positions.contains_key(&id)
            || self.combats.contains_key(&id)
            || self.towers.contains_key(&id)
            || self.enemies.contains_key(&id)
            || self.effects.contains_key(&id)
            || self.targets.contains_key(&id)
    }

    /// Position of the entity, if any.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<&Position> {
        self.positions.get(&id)
    }

    /// Mutable position of the entity, if any.
    pub fn position_mut(&mut self, id: EntityId) -> Option<&mut Position> {
        self.positions.get_mut(&id)
    }

    /// Combat stats of the entity, if any.
    #[must_use]
    pub fn combat(&self, id: EntityId) -> Option<&CombatStats> {
        self.combats.get(&id)
    }

    /// Mutable combat stats of the entity, if any.
    pub fn combat_mut(&mut self, id: EntityId) -> Option<&mut CombatStats> {
        self.combats.get_mut(&id)
    }

    /// Tower stats of the entity, if any.
    #[must_use]
    pub fn tower(&self, id: EntityId) -> Option<&TowerStats> {
        self.towers.get(&id)
    }

    /// Mutable tower stats of the entity, if any.
    pub fn tower_mut(&mut self, id: EntityId) -> Option<&mut TowerStats> {
        self.towers.get_mut(&id)
    }

    /// Enemy movement state of the entity, if any.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyStats> {
        self.enemies.get(&id)
    }

    /// Mutable enemy movement state of the entity, if any.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut EnemyStats> {
        self.enemies.get_mut(&id)
    }

    /// Status effects of the entity, if any.
    #[must_use]
    pub fn effects(&self, id: EntityId) -> Option<&StatusEffectSet> {
        self.effects.get(&id)
    }

    /// Mutable status effects of the entity, if any.
    pub fn effects_mut(&mut self, id: EntityId) -> Option<&mut StatusEffectSet> {
        self.effects.get_mut(&id)
    }

    /// Target link of the entity, if any.
    #[must_use]
    pub fn target(&self, id: EntityId) -> Option<&TargetLink> {
        self.targets.get(&id)
    }

    /// Mutable target link of the entity, if any.
    pub fn target_mut(&mut self, id: EntityId) -> Option<&mut TargetLink> {
        self.targets.get_mut(&id)
    }

    /// Enemies in ascending id order.
    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &EnemyStats)> {
        self.enemies.iter().map(|(id, enemy)| (*id, enemy))
    }

    /// Towers in ascending id order.
    pub fn towers(&self) -> impl Iterator<Item = (EntityId, &TowerStats)> {
        self.towers.iter().map(|(id, tower)| (*id, tower))
    }

    /// Identifiers of every enemy, collected so callers may mutate while walking.
    #[must_use]
    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.enemies.keys().copied().collect()
    }

    /// Identifiers of every tower, collected so callers may mutate while walking.
    #[must_use]
    pub fn tower_ids(&self) -> Vec<EntityId> {
        self.towers.keys().copied().collect()
    }

    /// Number of enemies on the board.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether any enemy remains on the board.
    #[must_use]
    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }
}

fn decode<T: DeserializeOwned>(
    kind: ComponentKind,
    payload: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(payload).map_err(|source| StoreError::MalformedComponent {
        kind: kind.name(),
        source,
    })
}
