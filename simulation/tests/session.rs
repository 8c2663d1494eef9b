use wave_defence_core::{
    CellCoord, DataError, DataSource, Element, EnemyTable, EnemyTemplate, Event, LevelDefinition,
    PlacementError, RemovalError, SpawnGroupDefinition, TowerTable, TowerTemplate, WaveDefinition,
    WaveStartError,
};
use wave_defence_simulation::{Session, SessionConfig, SessionError, WavePhase};

const DT: f32 = 0.1;

fn tower_table(cost: u32) -> TowerTable {
    let mut table = TowerTable::new();
    let _ = table.insert(
        "arrow".to_owned(),
        TowerTemplate {
            name: "Arrow Tower".to_owned(),
            cost,
            range: 2.0,
            damage: 20.0,
            attack_speed: 1.0,
            element: Element::Physical,
            effects: Vec::new(),
        },
    );
    table
}

fn enemy_table() -> EnemyTable {
    let mut table = EnemyTable::new();
    let _ = table.insert(
        "grunt".to_owned(),
        EnemyTemplate {
            health: 10.0,
            armor: 0.0,
            resistance: 0.0,
            element: Element::Earth,
            speed: 1.0,
            bounty: 7,
        },
    );
    table
}

fn lane(
    waves: Vec<WaveDefinition>,
    initial_gold: Option<u32>,
    initial_life: Option<u32>,
) -> LevelDefinition {
    LevelDefinition {
        grid: vec![
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0],
            vec![1, 1, 1, 1, 1],
        ],
        start: CellCoord::new(0, 1),
        goal: CellCoord::new(4, 1),
        initial_gold,
        initial_life,
        waves,
    }
}

fn wave(count: u32, interval_ms: f32) -> WaveDefinition {
    WaveDefinition {
        enemies: vec![SpawnGroupDefinition {
            enemy_type: "grunt".to_owned(),
            count,
            interval_ms,
        }],
    }
}

fn session(level: LevelDefinition) -> Session {
    Session::new(&SessionConfig::default(), level, tower_table(30), enemy_table())
        .expect("session builds")
}

fn run(session: &mut Session, ticks: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        session.tick(DT);
        events.extend(session.drain_events());
    }
    events
}

#[test]
fn level_defaults_apply_and_first_wave_starts() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));

    assert_eq!(session.ledger().gold(), 100);
    assert_eq!(session.ledger().life(), 10);
    assert_eq!(session.wave_phase(), WavePhase::Spawning);
    assert!(matches!(
        session.drain_events().as_slice(),
        [Event::WaveStarted { wave: 0, .. }]
    ));
}

#[test]
fn killed_enemy_credits_its_bounty() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));
    let tower = session
        .place_tower("arrow", CellCoord::new(2, 0))
        .expect("placement succeeds");
    assert_eq!(session.ledger().gold(), 70);

    let events = run(&mut session, 40);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { bounty: 7, .. })));
    assert_eq!(session.ledger().gold(), 77);
    assert_eq!(session.ledger().life(), 10);
    assert!(session.enemies().is_empty());
    assert_eq!(session.wave_phase(), WavePhase::Finished);

    let snapshot = session
        .towers()
        .into_iter()
        .find(|snapshot| snapshot.id == tower)
        .expect("tower snapshot");
    assert!(snapshot.target.is_some());
    assert!(session.store().tower(tower).expect("tower").experience > 0.0);
}

#[test]
fn escaped_enemy_costs_a_life() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));

    let events = run(&mut session, 80);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyEscaped { .. })));
    assert_eq!(session.ledger().life(), 9);
    assert!(events.contains(&Event::WavesFinished));
}

#[test]
fn exhausted_life_freezes_the_session() {
    let mut session = session(lane(vec![wave(3, 300.0)], None, Some(1)));

    let _ = run(&mut session, 80);
    assert!(session.is_game_over());
    assert_eq!(session.ledger().life(), 0);

    let enemies = session.enemies();
    let export = session.export_state();
    assert!(run(&mut session, 10).is_empty());
    assert_eq!(session.enemies(), enemies);
    assert_eq!(session.export_state(), export);
}

#[test]
fn second_wave_cannot_start_while_enemies_live() {
    let mut session = session(lane(vec![wave(2, 100.0), wave(1, 100.0)], None, None));
    let _ = run(&mut session, 1);

    assert_eq!(session.start_next_wave(), Err(WaveStartError::WaveInProgress));
    assert_eq!(session.export_state().wave, Some(0));
}

#[test]
fn placement_rejections_leave_gold_and_grid_untouched() {
    let mut poor = session(lane(vec![wave(1, 100.0)], Some(20), None));
    assert_eq!(
        poor.place_tower("arrow", CellCoord::new(2, 0)),
        Err(PlacementError::InsufficientGold)
    );
    assert_eq!(poor.ledger().gold(), 20);

    let mut session = session(lane(vec![wave(1, 100.0)], None, None));
    assert_eq!(
        session.place_tower("cannon", CellCoord::new(2, 0)),
        Err(PlacementError::UnknownTowerType)
    );

    let _ = session
        .place_tower("arrow", CellCoord::new(2, 0))
        .expect("first placement succeeds");
    let codes = session.grid().codes().to_vec();

    assert_eq!(
        session.place_tower("arrow", CellCoord::new(2, 1)),
        Err(PlacementError::BlocksPath)
    );
    assert_eq!(
        session.place_tower("arrow", CellCoord::new(2, 2)),
        Err(PlacementError::NotBuildable)
    );
    assert_eq!(
        session.place_tower("arrow", CellCoord::new(7, 0)),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(session.grid().codes(), codes.as_slice());
    assert_eq!(session.ledger().gold(), 70);
    assert_eq!(session.towers().len(), 1);
}

#[test]
fn removed_tower_frees_its_cell() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));
    let tower = session
        .place_tower("arrow", CellCoord::new(1, 0))
        .expect("placement succeeds");
    let _ = session.drain_events();

    assert_eq!(session.remove_tower(tower), Ok(CellCoord::new(1, 0)));
    assert!(session.grid().is_buildable(CellCoord::new(1, 0)));
    assert!(session.towers().is_empty());
    assert_eq!(
        session.drain_events(),
        vec![Event::TowerRemoved {
            tower,
            cell: CellCoord::new(1, 0)
        }]
    );
    assert_eq!(session.remove_tower(tower), Err(RemovalError::MissingTower));
}

#[test]
fn export_lists_towers_with_type_keys() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));
    let _ = session
        .place_tower("arrow", CellCoord::new(3, 0))
        .expect("placement succeeds");

    let value = serde_json::to_value(session.export_state()).expect("serialize export");

    assert_eq!(value["gold"], 70);
    assert_eq!(value["life"], 10);
    assert_eq!(value["wave"], 0);
    assert_eq!(value["towers"][0]["type"], "arrow");
    assert_eq!(value["towers"][0]["position"]["x"], 224.0);
}

#[test]
fn replaced_tables_apply_to_later_placements() {
    let mut session = session(lane(vec![wave(1, 100.0)], None, None));

    assert!(matches!(
        session.replace_tables(tower_table(500), EnemyTable::new()),
        Err(SessionError::Director(_))
    ));
    assert!(session.place_tower("arrow", CellCoord::new(0, 0)).is_ok());

    session
        .replace_tables(tower_table(500), enemy_table())
        .expect("tables swap");
    assert_eq!(
        session.place_tower("arrow", CellCoord::new(1, 0)),
        Err(PlacementError::InsufficientGold)
    );
}

#[test]
fn identical_inputs_replay_identically() {
    fn play() -> (Vec<Event>, wave_defence_core::StateExport) {
        let mut session = session(lane(vec![wave(4, 400.0), wave(3, 250.0)], None, None));
        let _ = session
            .place_tower("arrow", CellCoord::new(2, 0))
            .expect("placement succeeds");
        let mut events = session.drain_events();
        events.extend(run(&mut session, 300));
        (events, session.export_state())
    }

    let (first_events, first_export) = play();
    let (second_events, second_export) = play();

    assert!(!first_events.is_empty());
    assert_eq!(first_events, second_events);
    assert_eq!(first_export, second_export);
}

struct Fixture;

impl DataSource for Fixture {
    fn tower_table(&self) -> Result<TowerTable, DataError> {
        Ok(tower_table(30))
    }

    fn enemy_table(&self) -> Result<EnemyTable, DataError> {
        Ok(enemy_table())
    }

    fn level(&self, name: &str) -> Result<LevelDefinition, DataError> {
        match name {
            "lane" => Ok(lane(vec![wave(1, 100.0)], Some(55), Some(3))),
            other => Err(DataError::Malformed {
                resource: other.to_owned(),
                reason: "no such level".to_owned(),
            }),
        }
    }
}

#[test]
fn sessions_load_from_a_data_source() {
    let config = SessionConfig {
        auto_start_first_wave: false,
        ..SessionConfig::default()
    };
    let mut session = Session::load(&config, &Fixture, "lane").expect("level loads");

    assert_eq!(session.ledger().gold(), 55);
    assert_eq!(session.ledger().life(), 3);
    assert_eq!(session.wave_phase(), WavePhase::Idle);
    assert_eq!(session.export_state().wave, None);
    assert!(session.drain_events().is_empty());
    session.reload(&Fixture).expect("tables reload");

    assert!(matches!(
        Session::load(&config, &Fixture, "missing"),
        Err(SessionError::Data(_))
    ));
}
