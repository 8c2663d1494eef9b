#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Wave Defence.
//!
//! The world is split into two owners. [`EntityStore`] holds every component
//! keyed by entity id and is the only place systems read or write entity
//! data. [`GridMap`] exclusively owns the terrain and is the only way to block
//! or free a cell, so the "a path always exists" invariant cannot be bypassed.

mod grid;
mod navigation;
mod store;

pub use grid::{GridError, GridMap};
pub use store::{EntityStore, StoreError};

/// Query functions that provide read-only projections of the world state.
pub mod query {
    use wave_defence_core::{EnemySnapshot, TowerSnapshot};

    use super::EntityStore;

    /// Captures every enemy that has both a position and combat stats.
    #[must_use]
    pub fn enemy_snapshots(store: &EntityStore) -> Vec<EnemySnapshot> {
        store
            .enemies()
            .filter_map(|(id, _)| {
                let position = store.position(id)?;
                let combat = store.combat(id)?;
                Some(EnemySnapshot {
                    id,
                    position: *position,
                    health: combat.health,
                    max_health: combat.max_health,
                    element: combat.element,
                })
            })
            .collect()
    }

    /// Captures every tower that has a position.
    #[must_use]
    pub fn tower_snapshots(store: &EntityStore) -> Vec<TowerSnapshot> {
        store
            .towers()
            .filter_map(|(id, tower)| {
                let position = store.position(id)?;
                Some(TowerSnapshot {
                    id,
                    tower_type: tower.tower_type.clone(),
                    position: *position,
                    target: store.target(id).and_then(|link| link.enemy),
                })
            })
            .collect()
    }
}
