#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave lifecycle state machine that spawns enemies on a timer.
//!
//! The director walks the scripted waves of a level in order. Starting a wave
//! captures an [`EnemyModifier`] from the adaptive difficulty tracker; every
//! enemy the wave spawns is scaled by that modifier. Once every group of the
//! running wave has spawned and the board is empty the director clears the
//! wave and immediately starts the next one, or finishes when none remain.

use tracing::{debug, info};
use wave_defence_core::{
    Component, EnemyModifier, EnemyStats, EnemyTable, Event, StatusEffectSet, WaveDefinition,
    WaveStartError,
};
use wave_defence_system_difficulty::EnemyDifficulty;
use wave_defence_world::{EntityStore, GridMap};

/// Failures raised while configuring the director.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectorError {
    /// A wave references an enemy type missing from the enemy table.
    #[error("wave {wave} references unknown enemy type `{enemy_type}`")]
    UnknownEnemyType {
        /// Zero-based index of the offending wave.
        wave: usize,
        /// Enemy type name that failed to resolve.
        enemy_type: String,
    },
}

/// Lifecycle phase of the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No wave has started yet.
    Idle,
    /// A wave is spawning or its enemies are still on the board.
    Spawning,
    /// The running wave was cleared and the next one has not started.
    Cleared,
    /// Every wave has been cleared.
    Finished,
}

#[derive(Clone, Debug)]
struct SpawnGroup {
    enemy_type: String,
    remaining: u32,
    interval: f32,
    timer: f32,
}

/// Wave director driving spawns for a single level.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    waves: Vec<WaveDefinition>,
    enemies: EnemyTable,
    groups: Vec<SpawnGroup>,
    started: usize,
    phase: WavePhase,
    difficulty: EnemyDifficulty,
    modifier: EnemyModifier,
}

impl WaveDirector {
    /// Creates a director for the level's waves.
    ///
    /// # Errors
    ///
    /// Returns [`DirectorError::UnknownEnemyType`] when a wave names an enemy
    /// missing from `enemies`.
    pub fn new(waves: Vec<WaveDefinition>, enemies: EnemyTable) -> Result<Self, DirectorError> {
        validate(&waves, &enemies)?;
        Ok(Self {
            waves,
            enemies,
            groups: Vec::new(),
            started: 0,
            phase: WavePhase::Idle,
            difficulty: EnemyDifficulty::new(),
            modifier: EnemyModifier::default(),
        })
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Number of waves started so far.
    #[must_use]
    pub const fn waves_started(&self) -> usize {
        self.started
    }

    /// Zero-based index of the most recently started wave.
    #[must_use]
    pub const fn current_wave(&self) -> Option<usize> {
        self.started.checked_sub(1)
    }

    /// Number of waves scripted for the level.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    /// Modifier captured when the current wave started.
    #[must_use]
    pub const fn modifier(&self) -> EnemyModifier {
        self.modifier
    }

    /// Adaptive difficulty tracker shared by every wave of the session.
    #[must_use]
    pub const fn difficulty(&self) -> &EnemyDifficulty {
        &self.difficulty
    }

    /// Swaps in a reloaded enemy table.
    ///
    /// Enemies already on the board keep their stats; later spawns use the
    /// new templates.
    ///
    /// # Errors
    ///
    /// Returns [`DirectorError::UnknownEnemyType`] and keeps the previous
    /// table when a wave names an enemy missing from `enemies`.
    pub fn replace_enemy_table(&mut self, enemies: EnemyTable) -> Result<(), DirectorError> {
        validate(&self.waves, &enemies)?;
        self.enemies = enemies;
        Ok(())
    }

    /// Starts the next scripted wave.
    ///
    /// Returns the zero-based index of the started wave.
    ///
    /// # Errors
    ///
    /// Returns [`WaveStartError::WaveInProgress`] while a wave is running and
    /// enemies remain, and [`WaveStartError::WavesExhausted`] once every wave
    /// has started.
    pub fn start_next_wave(
        &mut self,
        life_ratio: f32,
        store: &EntityStore,
        out: &mut Vec<Event>,
    ) -> Result<usize, WaveStartError> {
        if self.phase == WavePhase::Spawning && store.has_enemies() {
            return Err(WaveStartError::WaveInProgress);
        }

        let wave = self.started;
        let Some(definition) = self.waves.get(wave) else {
            return Err(WaveStartError::WavesExhausted);
        };

        self.groups = definition
            .enemies
            .iter()
            .map(|group| SpawnGroup {
                enemy_type: group.enemy_type.clone(),
                remaining: group.count,
                interval: group.interval_ms / 1000.0,
                timer: 0.0,
            })
            .collect();
        self.modifier = self.difficulty.update(wave, life_ratio);
        self.started += 1;
        self.phase = WavePhase::Spawning;

        info!(
            wave,
            groups = self.groups.len(),
            health = self.modifier.health_multiplier,
            speed = self.modifier.speed_multiplier,
            "wave started"
        );
        out.push(Event::WaveStarted {
            wave,
            modifier: self.modifier,
        });
        Ok(wave)
    }

    /// Advances spawn timers by `dt` seconds and spawns due enemies.
    ///
    /// A spawn that finds no path from start to goal is deferred to the next
    /// tick without consuming the group's count.
    pub fn update(
        &mut self,
        dt: f32,
        life_ratio: f32,
        store: &mut EntityStore,
        grid: &GridMap,
        out: &mut Vec<Event>,
    ) {
        if self.phase != WavePhase::Spawning {
            return;
        }

        for index in 0..self.groups.len() {
            let group = &mut self.groups[index];
            if group.remaining == 0 {
                continue;
            }

            group.timer -= dt;
            if group.timer > 0.0 {
                continue;
            }

            let enemy_type = group.enemy_type.clone();
            if self.spawn(&enemy_type, store, grid, out) {
                let group = &mut self.groups[index];
                group.remaining -= 1;
                group.timer = group.interval;
            }
        }

        let exhausted = self.groups.iter().all(|group| group.remaining == 0);
        if !exhausted || store.has_enemies() {
            return;
        }

        let wave = self.started.saturating_sub(1);
        self.phase = WavePhase::Cleared;
        info!(wave, "wave cleared");
        out.push(Event::WaveCleared { wave });

        if let Err(WaveStartError::WavesExhausted) = self.start_next_wave(life_ratio, store, out) {
            self.phase = WavePhase::Finished;
            info!("all waves finished");
            out.push(Event::WavesFinished);
        }
    }

    fn spawn(
        &self,
        enemy_type: &str,
        store: &mut EntityStore,
        grid: &GridMap,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(template) = self.enemies.get(enemy_type) else {
            debug!(enemy_type, "spawn deferred: unknown enemy type");
            return false;
        };
        let Some(path) = grid.find_path() else {
            debug!(enemy_type, "spawn deferred: no path to the goal");
            return false;
        };
        let Some(first) = path.first().copied() else {
            return false;
        };

        let enemy = store.create();
        store.add_component(enemy, Component::Position(grid.cell_center(first)));
        store.add_component(enemy, Component::Combat(template.combat_stats(self.modifier)));
        store.add_component(
            enemy,
            Component::Enemy(EnemyStats::new(
                path,
                template.scaled_speed(self.modifier),
                template.bounty,
            )),
        );
        store.add_component(enemy, Component::Effects(StatusEffectSet::default()));

        debug!(enemy = enemy.get(), enemy_type, "enemy spawned");
        out.push(Event::EnemySpawned {
            enemy,
            enemy_type: enemy_type.to_owned(),
        });
        true
    }
}

fn validate(waves: &[WaveDefinition], enemies: &EnemyTable) -> Result<(), DirectorError> {
    for (wave, definition) in waves.iter().enumerate() {
        if let Some(group) = definition
            .enemies
            .iter()
            .find(|group| !enemies.contains_key(&group.enemy_type))
        {
            return Err(DirectorError::UnknownEnemyType {
                wave,
                enemy_type: group.enemy_type.clone(),
            });
        }
    }
    Ok(())
}
