#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Removes enemies that died or reached the goal.

use tracing::debug;
use wave_defence_core::{CellCoord, Event, Position};
use wave_defence_world::EntityStore;

/// Cleanup system that sweeps finished enemies off the board.
#[derive(Clone, Copy, Debug)]
pub struct Cleanup {
    goal_center: Position,
    half_tile: f32,
}

impl Cleanup {
    /// Creates a cleanup system for the provided goal cell.
    #[must_use]
    pub fn new(goal: CellCoord, tile_size: f32) -> Self {
        Self {
            goal_center: goal.center(tile_size),
            half_tile: tile_size / 2.0,
        }
    }

    /// Removes dead enemies and enemies standing on the goal.
    ///
    /// A dead enemy is reported as [`Event::EnemyKilled`] even when it also
    /// stands on the goal.
    pub fn handle(&self, store: &mut EntityStore, out: &mut Vec<Event>) {
        for enemy in store.enemy_ids() {
            if store.combat(enemy).is_some_and(|combat| combat.is_dead()) {
                let bounty = store.enemy(enemy).map_or(0, |stats| stats.bounty);
                store.remove(enemy);
                debug!(enemy = enemy.get(), bounty, "dead enemy swept");
                out.push(Event::EnemyKilled { enemy, bounty });
                continue;
            }

            let Some(position) = store.position(enemy) else {
                continue;
            };
            if self.reached_goal(*position) {
                store.remove(enemy);
                debug!(enemy = enemy.get(), "enemy escaped");
                out.push(Event::EnemyEscaped { enemy });
            }
        }
    }

    fn reached_goal(&self, position: Position) -> bool {
        (position.x - self.goal_center.x).abs() < self.half_tile
            && (position.y - self.goal_center.y).abs() < self.half_tile
    }
}
