#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session that composes the world and every system into a playable level.
//!
//! A [`Session`] owns the entity store, the terrain grid, the player ledger
//! and one instance of each system. [`Session::tick`] runs the systems in a
//! fixed order: tower cooldowns, movement, the attack pass, cleanup, ledger
//! settlement and finally the wave director. Every observable change is
//! pushed into an event outbox that integrators drain after each tick.

mod config;
mod ledger;

use tracing::{debug, info, warn};
use wave_defence_core::{
    CellCoord, Component, DataError, DataSource, EnemySnapshot, EnemyTable, EntityId, Event,
    LevelDefinition, PlacementError, RemovalError, StateExport, TargetLink, TowerExport,
    TowerSnapshot, TowerTable, WaveStartError,
};
use wave_defence_system_cleanup::Cleanup;
use wave_defence_system_combat::CombatResolver;
use wave_defence_system_movement::Movement;
use wave_defence_system_tower_combat::TowerCombat;
use wave_defence_system_tower_targeting::TowerTargeting;
use wave_defence_system_wave_director::{DirectorError, WaveDirector};
use wave_defence_world::{query, EntityStore, GridError, GridMap};

pub use config::SessionConfig;
pub use ledger::Ledger;
pub use wave_defence_system_wave_director::WavePhase;

/// Failures raised while building or reconfiguring a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The level grid is malformed.
    #[error("invalid level grid")]
    Grid(#[from] GridError),
    /// The level's waves do not match the enemy table.
    #[error("invalid wave script")]
    Director(#[from] DirectorError),
    /// The data source failed to supply a table or level.
    #[error("failed to load game data")]
    Data(#[from] DataError),
}

/// Running game of a single level.
#[derive(Debug)]
pub struct Session {
    store: EntityStore,
    grid: GridMap,
    tower_table: TowerTable,
    ledger: Ledger,
    movement: Movement,
    targeting: TowerTargeting,
    resolver: CombatResolver,
    combat: TowerCombat,
    cleanup: Cleanup,
    director: WaveDirector,
    events: Vec<Event>,
}

impl Session {
    /// Builds a session for `level` using the provided tables.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Grid`] for a malformed grid and
    /// [`SessionError::Director`] when a wave names an unknown enemy type.
    pub fn new(
        config: &SessionConfig,
        level: LevelDefinition,
        tower_table: TowerTable,
        enemy_table: EnemyTable,
    ) -> Result<Self, SessionError> {
        let grid = GridMap::from_rows(&level.grid, level.start, level.goal, config.tile_size)?;
        let director = WaveDirector::new(level.waves, enemy_table)?;
        let ledger = Ledger::new(
            level.initial_gold.unwrap_or(config.default_initial_gold),
            level.initial_life.unwrap_or(config.default_initial_life),
        );

        let mut session = Self {
            store: EntityStore::new(),
            movement: Movement::new(config.tile_size),
            targeting: TowerTargeting::new(config.tile_size),
            resolver: CombatResolver::new(),
            combat: TowerCombat::new(),
            cleanup: Cleanup::new(grid.goal(), config.tile_size),
            grid,
            tower_table,
            ledger,
            director,
            events: Vec::new(),
        };

        info!(
            columns = session.grid.columns(),
            rows = session.grid.rows(),
            waves = session.director.total_waves(),
            gold = session.ledger.gold(),
            life = session.ledger.life(),
            "session created"
        );

        if config.auto_start_first_wave {
            if let Err(reason) = session.start_next_wave() {
                debug!(%reason, "first wave did not start");
            }
        }

        Ok(session)
    }

    /// Loads tables and the named level from `source` and builds a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Data`] when loading fails and the errors of
    /// [`Session::new`] otherwise.
    pub fn load<S>(config: &SessionConfig, source: &S, level: &str) -> Result<Self, SessionError>
    where
        S: DataSource + ?Sized,
    {
        let tower_table = source.tower_table()?;
        let enemy_table = source.enemy_table()?;
        let level = source.level(level)?;
        Self::new(config, level, tower_table, enemy_table)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Does nothing once the player has run out of life.
    pub fn tick(&mut self, dt: f32) {
        if self.ledger.is_defeated() {
            return;
        }

        let settled = self.events.len();

        self.combat.cool_down(dt, &mut self.store);
        self.movement.handle(dt, &mut self.store);
        self.combat.attack(
            &mut self.store,
            &mut self.targeting,
            &self.resolver,
            &mut self.events,
        );
        self.cleanup.handle(&mut self.store, &mut self.events);

        let mut bounty = 0_u32;
        let mut escaped = 0_usize;
        for event in &self.events[settled..] {
            match event {
                Event::EnemyKilled { bounty: paid, .. } => bounty = bounty.saturating_add(*paid),
                Event::EnemyEscaped { .. } => escaped += 1,
                _ => {}
            }
        }
        self.on_enemy_killed(bounty);
        for _ in 0..escaped {
            self.on_enemy_escaped();
        }

        self.director.update(
            dt,
            self.ledger.life_ratio(),
            &mut self.store,
            &self.grid,
            &mut self.events,
        );
    }

    /// Credits the bounty of a killed enemy.
    pub fn on_enemy_killed(&mut self, bounty: u32) {
        self.ledger.on_enemy_killed(bounty);
    }

    /// Deducts one life for an escaped enemy.
    pub fn on_enemy_escaped(&mut self) {
        let already_defeated = self.ledger.is_defeated();
        self.ledger.on_enemy_escaped();
        if !already_defeated && self.ledger.is_defeated() {
            warn!("defence collapsed");
        }
    }

    /// Starts the next wave on the player's request.
    ///
    /// # Errors
    ///
    /// Returns [`WaveStartError`] when a wave is still running or none remain.
    pub fn start_next_wave(&mut self) -> Result<usize, WaveStartError> {
        self.director
            .start_next_wave(self.ledger.life_ratio(), &self.store, &mut self.events)
    }

    /// Builds a tower of `tower_type` on `cell` and charges its cost.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError`] and leaves gold and grid untouched when the
    /// type is unknown, the player cannot afford it, or the grid refuses the
    /// cell.
    pub fn place_tower(
        &mut self,
        tower_type: &str,
        cell: CellCoord,
    ) -> Result<EntityId, PlacementError> {
        let result = self.try_place_tower(tower_type, cell);
        if let Err(reason) = result {
            debug!(
                tower_type,
                column = cell.column(),
                row = cell.row(),
                %reason,
                "tower placement rejected"
            );
        }
        result
    }

    fn try_place_tower(
        &mut self,
        tower_type: &str,
        cell: CellCoord,
    ) -> Result<EntityId, PlacementError> {
        let template = self
            .tower_table
            .get(tower_type)
            .ok_or(PlacementError::UnknownTowerType)?;
        if self.ledger.gold() < template.cost {
            return Err(PlacementError::InsufficientGold);
        }

        self.grid.try_place_tower(cell)?;
        if !self.ledger.try_spend(template.cost) {
            let _ = self.grid.remove_tower(cell);
            return Err(PlacementError::InsufficientGold);
        }

        let tower = self.store.create();
        self.store
            .add_component(tower, Component::Position(self.grid.cell_center(cell)));
        self.store
            .add_component(tower, Component::Tower(template.instantiate(tower_type)));
        self.store
            .add_component(tower, Component::Target(TargetLink::default()));

        info!(
            tower = tower.get(),
            tower_type,
            column = cell.column(),
            row = cell.row(),
            gold = self.ledger.gold(),
            "tower placed"
        );
        self.events.push(Event::TowerPlaced {
            tower,
            tower_type: tower_type.to_owned(),
            cell,
        });
        Ok(tower)
    }

    /// Dismantles a tower and frees its cell.
    ///
    /// # Errors
    ///
    /// Returns [`RemovalError::MissingTower`] when `tower` is not a tower.
    pub fn remove_tower(&mut self, tower: EntityId) -> Result<CellCoord, RemovalError> {
        if self.store.tower(tower).is_none() {
            return Err(RemovalError::MissingTower);
        }

        let cell = self
            .store
            .position(tower)
            .and_then(|position| self.grid.cell_at(*position))
            .ok_or(RemovalError::MissingTower)?;

        let _ = self.grid.remove_tower(cell);
        self.store.remove(tower);
        self.targeting.forget(tower);

        info!(tower = tower.get(), column = cell.column(), row = cell.row(), "tower removed");
        self.events.push(Event::TowerRemoved { tower, cell });
        Ok(cell)
    }

    /// Swaps in reloaded data tables between ticks.
    ///
    /// Entities already on the board keep their stats.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Director`] and keeps both previous tables when
    /// the enemy table lacks a type the level needs.
    pub fn replace_tables(
        &mut self,
        tower_table: TowerTable,
        enemy_table: EnemyTable,
    ) -> Result<(), SessionError> {
        self.director.replace_enemy_table(enemy_table)?;
        self.tower_table = tower_table;
        debug!(towers = self.tower_table.len(), "data tables replaced");
        Ok(())
    }

    /// Re-reads both tables from `source` and swaps them in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Data`] when loading fails and the errors of
    /// [`Session::replace_tables`] otherwise.
    pub fn reload<S>(&mut self, source: &S) -> Result<(), SessionError>
    where
        S: DataSource + ?Sized,
    {
        let tower_table = source.tower_table()?;
        let enemy_table = source.enemy_table()?;
        self.replace_tables(tower_table, enemy_table)
    }

    /// Takes every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Enemies on the board in identifier order.
    #[must_use]
    pub fn enemies(&self) -> Vec<EnemySnapshot> {
        query::enemy_snapshots(&self.store)
    }

    /// Towers on the board in identifier order.
    #[must_use]
    pub fn towers(&self) -> Vec<TowerSnapshot> {
        query::tower_snapshots(&self.store)
    }

    /// Summary of the session for external consumers.
    #[must_use]
    pub fn export_state(&self) -> StateExport {
        StateExport {
            gold: self.ledger.gold(),
            life: self.ledger.life(),
            wave: self.director.current_wave(),
            towers: self
                .store
                .towers()
                .filter_map(|(id, tower)| {
                    Some(TowerExport {
                        id,
                        tower_type: tower.tower_type.clone(),
                        position: *self.store.position(id)?,
                    })
                })
                .collect(),
        }
    }

    /// Player economy.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Terrain of the level.
    #[must_use]
    pub const fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// Entity store backing the session.
    #[must_use]
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Lifecycle phase of the wave director.
    #[must_use]
    pub const fn wave_phase(&self) -> WavePhase {
        self.director.phase()
    }

    /// Number of waves scripted for the level.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.director.total_waves()
    }

    /// Reports whether the player has lost.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.ledger.is_defeated()
    }
}
