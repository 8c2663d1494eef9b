#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack pass that lets every tower pick a target and strike it once reloaded.

use tracing::debug;
use wave_defence_core::{Component, EntityId, Event, TargetLink};
use wave_defence_system_combat::CombatResolver;
use wave_defence_system_tower_targeting::TowerTargeting;
use wave_defence_world::EntityStore;

/// Lowest attack speed used when computing the reload delay.
pub const MIN_ATTACK_SPEED: f32 = 0.1;

/// Tower combat system that reuses a scratch buffer of tower ids.
#[derive(Debug, Default)]
pub struct TowerCombat {
    towers: Vec<EntityId>,
}

impl TowerCombat {
    /// Creates a tower combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every tower's cooldown down by `dt` seconds, stopping at zero.
    pub fn cool_down(&self, dt: f32, store: &mut EntityStore) {
        for id in store.tower_ids() {
            if let Some(tower) = store.tower_mut(id) {
                tower.cooldown = (tower.cooldown - dt).max(0.0);
            }
        }
    }

    /// Lets every tower scan for a target and fires those whose cooldown is
    /// spent.
    ///
    /// Reloading towers still score the enemies in reach, which keeps their
    /// preference tables tracking every element they have seen. Enemies
    /// killed by a hit are removed from the store at once and an
    /// [`Event::EnemyKilled`] carrying their bounty is pushed to `out`, so
    /// later towers in the same pass never target a corpse.
    pub fn attack(
        &mut self,
        store: &mut EntityStore,
        targeting: &mut TowerTargeting,
        resolver: &CombatResolver,
        out: &mut Vec<Event>,
    ) {
        self.towers.clear();
        self.towers.extend(store.tower_ids());

        for tower in self.towers.drain(..) {
            let Some(enemy) = targeting.select_target(tower, store) else {
                continue;
            };
            let (Some(stats), Some(combat)) = (store.tower(tower), store.combat(enemy)) else {
                continue;
            };
            if stats.cooldown > 0.0 {
                continue;
            }

            let strike = resolver.resolve(stats, combat);
            let element = combat.element;
            let reload = 1.0 / stats.attack_speed.max(MIN_ATTACK_SPEED);

            if let Some(stats) = store.tower_mut(tower) {
                stats.cooldown = reload;
                stats.experience += strike.damage;
            }
            store.add_component(tower, Component::Target(TargetLink { enemy: Some(enemy) }));
            targeting.learn(tower, element, strike.damage);

            if let Some(slow) = strike.slow {
                store.add_component(enemy, Component::Slow(slow));
            }

            let Some(combat) = store.combat_mut(enemy) else {
                continue;
            };
            combat.health -= strike.damage;
            if !combat.is_dead() {
                continue;
            }

            let bounty = store.enemy(enemy).map_or(0, |stats| stats.bounty);
            store.remove(enemy);
            debug!(enemy = enemy.get(), tower = tower.get(), bounty, "enemy killed");
            out.push(Event::EnemyKilled { enemy, bounty });
        }
    }
}
