use wave_defence_core::{
    CellCoord, Element, EnemyTable, EnemyTemplate, Event, SpawnGroupDefinition, WaveDefinition,
    WaveStartError,
};
use wave_defence_system_wave_director::{WaveDirector, WavePhase};
use wave_defence_world::{EntityStore, GridMap};

fn table() -> EnemyTable {
    let mut table = EnemyTable::new();
    let _ = table.insert(
        "runner".to_owned(),
        EnemyTemplate {
            health: 20.0,
            armor: 0.0,
            resistance: 0.0,
            element: Element::Air,
            speed: 2.0,
            bounty: 3,
        },
    );
    table
}

fn wave(count: u32, interval_ms: f32) -> WaveDefinition {
    WaveDefinition {
        enemies: vec![SpawnGroupDefinition {
            enemy_type: "runner".to_owned(),
            count,
            interval_ms,
        }],
    }
}

fn open_grid() -> GridMap {
    GridMap::from_rows(
        &[vec![0, 0, 0, 0]],
        CellCoord::new(0, 0),
        CellCoord::new(3, 0),
        10.0,
    )
    .expect("valid grid")
}

fn spawned(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count()
}

#[test]
fn groups_spawn_on_their_interval() {
    let grid = open_grid();
    let mut store = EntityStore::new();
    let mut director = WaveDirector::new(vec![wave(3, 500.0)], table()).expect("valid");
    let mut events = Vec::new();
    let _ = director
        .start_next_wave(1.0, &store, &mut events)
        .expect("first wave starts");

    director.update(0.1, 1.0, &mut store, &grid, &mut events);
    assert_eq!(spawned(&events), 1, "timers start expired");

    director.update(0.25, 1.0, &mut store, &grid, &mut events);
    assert_eq!(spawned(&events), 1);
    director.update(0.25, 1.0, &mut store, &grid, &mut events);
    assert_eq!(spawned(&events), 2);
    assert_eq!(store.enemy_count(), 2);

    let enemy = store.enemy_ids()[0];
    let stats = store.enemy(enemy).expect("enemy stats");
    assert_eq!(stats.path.len(), 4);
    assert!((stats.speed - 2.0 * 1.005).abs() < 1e-4);
    let combat = store.combat(enemy).expect("combat stats");
    assert!((combat.max_health - 21.0).abs() < 1e-4);
    assert!(store.effects(enemy).is_some());
}

#[test]
fn second_start_is_rejected_while_enemies_live() {
    let grid = open_grid();
    let mut store = EntityStore::new();
    let mut director = WaveDirector::new(vec![wave(2, 100.0), wave(1, 100.0)], table())
        .expect("valid");
    let mut events = Vec::new();

    let _ = director
        .start_next_wave(1.0, &store, &mut events)
        .expect("first wave starts");
    director.update(0.05, 1.0, &mut store, &grid, &mut events);

    assert_eq!(
        director.start_next_wave(1.0, &store, &mut events),
        Err(WaveStartError::WaveInProgress)
    );
    assert_eq!(director.waves_started(), 1);
}

#[test]
fn sealed_goal_defers_spawns_without_consuming_them() {
    let sealed = GridMap::from_rows(
        &[vec![0, 1, 0]],
        CellCoord::new(0, 0),
        CellCoord::new(2, 0),
        10.0,
    )
    .expect("valid grid");
    let mut store = EntityStore::new();
    let mut director = WaveDirector::new(vec![wave(1, 100.0)], table()).expect("valid");
    let mut events = Vec::new();
    let _ = director
        .start_next_wave(1.0, &store, &mut events)
        .expect("first wave starts");

    for _ in 0..5 {
        director.update(0.1, 1.0, &mut store, &sealed, &mut events);
    }
    assert_eq!(spawned(&events), 0);
    assert_eq!(director.phase(), WavePhase::Spawning);

    director.update(0.1, 1.0, &mut store, &open_grid(), &mut events);
    assert_eq!(spawned(&events), 1);
}

#[test]
fn cleared_waves_advance_until_finished() {
    let grid = open_grid();
    let mut store = EntityStore::new();
    let mut director = WaveDirector::new(vec![wave(1, 100.0), wave(1, 100.0)], table())
        .expect("valid");
    let mut events = Vec::new();
    let _ = director
        .start_next_wave(1.0, &store, &mut events)
        .expect("first wave starts");

    director.update(0.1, 1.0, &mut store, &grid, &mut events);
    for enemy in store.enemy_ids() {
        store.remove(enemy);
    }
    director.update(0.1, 1.0, &mut store, &grid, &mut events);

    assert_eq!(director.waves_started(), 2);
    assert_eq!(director.phase(), WavePhase::Spawning);
    assert!(events.contains(&Event::WaveCleared { wave: 0 }));

    director.update(0.1, 0.5, &mut store, &grid, &mut events);
    for enemy in store.enemy_ids() {
        store.remove(enemy);
    }
    director.update(0.1, 0.5, &mut store, &grid, &mut events);

    assert_eq!(director.phase(), WavePhase::Finished);
    assert_eq!(events.last(), Some(&Event::WavesFinished));
    assert!(events.contains(&Event::WaveCleared { wave: 1 }));
}
