#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless damage resolution between a tower and its target.

use std::collections::BTreeMap;

use wave_defence_core::{CombatStats, Element, SlowEffect, TowerStats, SLOW_ABILITY};

/// Share of armor subtracted from physical damage.
pub const ARMOR_FACTOR: f32 = 0.4;

/// Share of resistance subtracted from arcane, fire and frost damage.
pub const RESISTANCE_FACTOR: f32 = 0.3;

/// Smallest damage a hit can deal.
pub const MINIMUM_DAMAGE: f32 = 1.0;

/// Speed multiplier applied by a slowing hit.
pub const SLOW_RATIO: f32 = 0.6;

/// Seconds a slowing hit lasts.
pub const SLOW_DURATION: f32 = 2.0;

/// Outcome of a single hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Health removed from the target.
    pub damage: f32,
    /// Slow applied to the target, if the tower carries the ability.
    pub slow: Option<SlowEffect>,
}

/// Resolves hits using the elemental matchup table.
#[derive(Clone, Debug)]
pub struct CombatResolver {
    multipliers: BTreeMap<(Element, Element), f32>,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatResolver {
    /// Creates a resolver with the standard matchup table.
    #[must_use]
    pub fn new() -> Self {
        let mut multipliers = BTreeMap::new();
        for (attacker, defender, multiplier) in [
            (Element::Physical, Element::Earth, 0.9),
            (Element::Physical, Element::Air, 1.0),
            (Element::Arcane, Element::Earth, 1.1),
            (Element::Arcane, Element::Air, 1.2),
            (Element::Fire, Element::Earth, 1.2),
            (Element::Fire, Element::Air, 0.8),
            (Element::Frost, Element::Earth, 1.0),
            (Element::Frost, Element::Air, 1.1),
        ] {
            let _ = multipliers.insert((attacker, defender), multiplier);
        }
        Self { multipliers }
    }

    /// Adds or overrides a matchup.
    #[must_use]
    pub fn with_multiplier(
        mut self,
        attacker: Element,
        defender: Element,
        multiplier: f32,
    ) -> Self {
        let _ = self.multipliers.insert((attacker, defender), multiplier);
        self
    }

    /// Damage multiplier of the matchup, `1.0` when unlisted.
    #[must_use]
    pub fn multiplier(&self, attacker: Element, defender: Element) -> f32 {
        self.multipliers
            .get(&(attacker, defender))
            .copied()
            .unwrap_or(1.0)
    }

    /// Resolves a hit from `tower` on `target`.
    #[must_use]
    pub fn resolve(&self, tower: &TowerStats, target: &CombatStats) -> Strike {
        let base = tower.damage * self.multiplier(tower.element, target.element);
        let mitigation = if tower.element.mitigated_by_armor() {
            target.armor * ARMOR_FACTOR
        } else if tower.element.mitigated_by_resistance() {
            target.resistance * RESISTANCE_FACTOR
        } else {
            0.0
        };

        let slow = tower
            .has_ability(SLOW_ABILITY)
            .then(|| SlowEffect::new(SLOW_RATIO, SLOW_DURATION));

        Strike {
            damage: (base - mitigation).max(MINIMUM_DAMAGE),
            slow,
        }
    }
}
