#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Advances enemies along their fixed paths and ages their slows.

use tracing::trace;
use wave_defence_core::StatusEffectSet;
use wave_defence_world::EntityStore;

/// Upper bound of the in-cell progress after integration.
pub const MAX_PROGRESS: f32 = 0.999;

/// Movement system that integrates enemy progress each tick.
#[derive(Clone, Copy, Debug)]
pub struct Movement {
    tile_size: f32,
}

impl Movement {
    /// Creates a movement system for cells of the provided side length.
    #[must_use]
    pub const fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// Moves every enemy by `dt` seconds.
    ///
    /// Slows are aged first so this tick's speed already reflects expiries.
    pub fn handle(&self, dt: f32, store: &mut EntityStore) {
        for id in store.enemy_ids() {
            let multiplier = store
                .effects_mut(id)
                .map_or(1.0, |effects| decay_slows(effects, dt));

            let Some(enemy) = store.enemy_mut(id) else {
                continue;
            };

            enemy.progress += enemy.speed * multiplier * dt;
            while enemy.progress >= 1.0 && !enemy.at_final_cell() {
                enemy.progress -= 1.0;
                enemy.path_index += 1;
            }
            enemy.progress = enemy.progress.min(MAX_PROGRESS);

            let Some(cell) = enemy.current_cell() else {
                continue;
            };
            trace!(
                enemy = id.get(),
                path_index = enemy.path_index,
                progress = enemy.progress,
                "enemy advanced"
            );

            let center = cell.center(self.tile_size);
            if let Some(position) = store.position_mut(id) {
                *position = center;
            }
        }
    }
}

/// Ages every slow by `dt`, drops the expired ones and returns the combined
/// speed multiplier of the survivors.
pub fn decay_slows(effects: &mut StatusEffectSet, dt: f32) -> f32 {
    for slow in &mut effects.slows {
        slow.remaining -= dt;
    }
    effects.slows.retain(|slow| slow.remaining > 0.0);
    effects.slows.iter().map(|slow| slow.ratio).product()
}
