#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower target selection driven by learned elemental preferences.
//!
//! Every tower keeps its own table of preferences keyed by enemy element.
//! An element enters the table at [`DEFAULT_PREFERENCE`] the first time the
//! tower scores an enemy of that element, and [`TowerTargeting::learn`]
//! nudges the table toward elements the tower damages most.

use std::collections::BTreeMap;

use wave_defence_core::{Element, EntityId};
use wave_defence_world::EntityStore;

/// Preference assumed for an element the tower has not scored before.
pub const DEFAULT_PREFERENCE: f32 = 1.0;

/// Factor applied to every tracked preference when the tower learns.
pub const PREFERENCE_DECAY: f32 = 0.98;

/// Preference gained per point of damage dealt.
pub const LEARNING_RATE: f32 = 0.01;

const HEALTH_BIAS: f32 = 1.2;

/// Targeting AI holding per-tower elemental preferences.
#[derive(Clone, Debug)]
pub struct TowerTargeting {
    tile_size: f32,
    preferences: BTreeMap<EntityId, BTreeMap<Element, f32>>,
}

impl TowerTargeting {
    /// Creates a targeting AI for cells of the provided side length.
    #[must_use]
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            preferences: BTreeMap::new(),
        }
    }

    /// Picks the best enemy within reach of `tower`.
    ///
    /// Enemies are scanned in ascending id order and only a strictly higher
    /// score replaces the current best. Elements seen during scoring are
    /// recorded in the tower's preference table.
    pub fn select_target(&mut self, tower: EntityId, store: &EntityStore) -> Option<EntityId> {
        let stats = store.tower(tower)?;
        let origin = *store.position(tower)?;
        let reach = stats.reach(self.tile_size);
        let table = self.preferences.entry(tower).or_default();

        let mut best: Option<(EntityId, f32)> = None;
        for (enemy, _) in store.enemies() {
            let (Some(position), Some(combat)) = (store.position(enemy), store.combat(enemy)) else {
                continue;
            };

            let distance = origin.distance(*position);
            if distance > reach {
                continue;
            }

            let preference = *table.entry(combat.element).or_insert(DEFAULT_PREFERENCE);
            let wounded = HEALTH_BIAS - combat.health / combat.max_health.max(1.0);
            let score = preference * wounded + closeness(distance, reach);

            if best.map_or(true, |(_, top)| score > top) {
                best = Some((enemy, score));
            }
        }

        best.map(|(enemy, _)| enemy)
    }

    /// Current preference of `tower` for `element`.
    #[must_use]
    pub fn preference(&self, tower: EntityId, element: Element) -> f32 {
        self.preferences
            .get(&tower)
            .and_then(|table| table.get(&element))
            .copied()
            .unwrap_or(DEFAULT_PREFERENCE)
    }

    /// Decays every tracked preference of `tower`, then reinforces `element`
    /// by the damage just dealt.
    pub fn learn(&mut self, tower: EntityId, element: Element, damage: f32) {
        let table = self.preferences.entry(tower).or_default();
        for value in table.values_mut() {
            *value *= PREFERENCE_DECAY;
        }
        *table.entry(element).or_insert(DEFAULT_PREFERENCE) += damage * LEARNING_RATE;
    }

    /// Drops the preference table of a removed tower.
    pub fn forget(&mut self, tower: EntityId) {
        let _ = self.preferences.remove(&tower);
    }
}

/// Proximity bonus in `[0, 1]`, zero at the edge of reach.
fn closeness(distance: f32, reach: f32) -> f32 {
    1.0 - (distance / reach.max(f32::EPSILON)).min(1.0)
}
