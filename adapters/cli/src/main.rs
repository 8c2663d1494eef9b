#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver that plays a Wave Defence level.

mod data;
mod placement;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wave_defence_core::Event;
use wave_defence_simulation::{Session, SessionConfig};

use crate::{data::JsonDirectory, placement::TowerRequest};

/// Runs a level for a fixed number of ticks and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "wave-defence", version, about)]
struct Cli {
    /// Directory holding `tables/` and `levels/`.
    #[arg(long, default_value = "data")]
    data: PathBuf,
    /// Level to load from `levels/<LEVEL>.json`.
    #[arg(long, default_value = "level1")]
    level: String,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1800)]
    ticks: u32,
    /// Seconds advanced per tick.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,
    /// Tower to build before the first tick; may be repeated.
    #[arg(long = "tower", value_name = "TYPE@X,Y")]
    towers: Vec<TowerRequest>,
    /// JSON file overriding session settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Re-read the data tables every N ticks.
    #[arg(long, value_name = "N")]
    reload_every: Option<u32>,
    /// Print the final state as JSON on stdout.
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let source = JsonDirectory::new(&cli.data);
    let mut session = Session::load(&config, &source, &cli.level).with_context(|| {
        format!(
            "failed to start level `{}` from {}",
            cli.level,
            cli.data.display()
        )
    })?;

    for request in &cli.towers {
        if let Err(reason) = session.place_tower(&request.tower_type, request.cell) {
            warn!(
                tower_type = %request.tower_type,
                column = request.cell.column(),
                row = request.cell.row(),
                %reason,
                "tower not built"
            );
        }
    }
    for event in session.drain_events() {
        log_event(0, &event);
    }

    let reload_every = cli.reload_every.filter(|every| *every > 0);
    for tick in 1..=cli.ticks {
        if reload_every.is_some_and(|every| tick % every == 0) {
            if let Err(error) = session.reload(&source) {
                warn!(%error, "reload failed, keeping previous tables");
            }
        }

        session.tick(cli.dt);
        for event in session.drain_events() {
            log_event(tick, &event);
        }

        if session.is_game_over() {
            warn!(tick, "defence collapsed");
            break;
        }
    }

    let export = session.export_state();
    info!(
        gold = export.gold,
        life = export.life,
        wave = ?export.wave,
        towers = export.towers.len(),
        "run finished"
    );

    if cli.export {
        let json = serde_json::to_string_pretty(&export).context("failed to serialise state")?;
        println!("{json}");
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))
}

fn log_event(tick: u32, event: &Event) {
    match event {
        Event::WaveStarted { wave, modifier } => info!(
            tick,
            wave,
            health = modifier.health_multiplier,
            speed = modifier.speed_multiplier,
            "wave started"
        ),
        Event::WaveCleared { wave } => info!(tick, wave, "wave cleared"),
        Event::WavesFinished => info!(tick, "all waves cleared"),
        Event::EnemySpawned { enemy, enemy_type } => {
            debug!(tick, enemy = enemy.get(), %enemy_type, "enemy spawned");
        }
        Event::EnemyKilled { enemy, bounty } => {
            debug!(tick, enemy = enemy.get(), bounty, "enemy killed");
        }
        Event::EnemyEscaped { enemy } => info!(tick, enemy = enemy.get(), "enemy escaped"),
        Event::TowerPlaced {
            tower,
            tower_type,
            cell,
        } => info!(
            tick,
            tower = tower.get(),
            %tower_type,
            column = cell.column(),
            row = cell.row(),
            "tower placed"
        ),
        Event::TowerRemoved { tower, cell } => info!(
            tick,
            tower = tower.get(),
            column = cell.column(),
            row = cell.row(),
            "tower removed"
        ),
    }
}
