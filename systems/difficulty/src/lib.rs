#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive enemy strength derived from how well the player is doing.

use tracing::debug;
use wave_defence_core::EnemyModifier;

/// Life ratio above which enemies grow stronger.
pub const STRONG_PLAYER_RATIO: f32 = 0.8;

/// Life ratio below which enemies grow weaker.
pub const STRUGGLING_PLAYER_RATIO: f32 = 0.4;

/// Cap of the health multiplier.
pub const MAX_HEALTH_MULTIPLIER: f32 = 2.5;

/// Cap of the speed multiplier.
pub const MAX_SPEED_MULTIPLIER: f32 = 1.8;

/// Session-long difficulty tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyDifficulty {
    score: f32,
}

impl Default for EnemyDifficulty {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyDifficulty {
    /// Creates a tracker with a neutral score of `1.0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { score: 1.0 }
    }

    /// Accumulated difficulty score.
    #[must_use]
    pub const fn score(&self) -> f32 {
        self.score
    }

    /// Adjusts the score for a wave about to start and returns the modifier
    /// applied to every enemy of that wave.
    ///
    /// `wave` is the zero-based index of the starting wave and `life_ratio`
    /// the share of the player's starting life that remains.
    pub fn update(&mut self, wave: usize, life_ratio: f32) -> EnemyModifier {
        if life_ratio > STRONG_PLAYER_RATIO {
            self.score *= 1.05;
        } else if life_ratio < STRUGGLING_PLAYER_RATIO {
            self.score *= 0.95;
        }

        let base = 1.0 + wave as f32 * 0.05;
        let scaled = base * self.score;
        let modifier = EnemyModifier {
            health_multiplier: scaled.min(MAX_HEALTH_MULTIPLIER),
            speed_multiplier: (0.9 + 0.1 * scaled).min(MAX_SPEED_MULTIPLIER),
        };
        debug!(
            wave,
            life_ratio,
            score = self.score,
            health = modifier.health_multiplier,
            speed = modifier.speed_multiplier,
            "difficulty updated"
        );
        modifier
    }
}
