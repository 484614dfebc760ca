use std::time::Duration;

use percent_maze_core::{Command, Event, Phase, Variant};
use percent_maze_system_chase::{Chase, Config};
use percent_maze_world::{self as world, query, World};

fn pump(world: &mut World, chase: &mut Chase, events: Vec<Event>) -> Vec<Event> {
    let mut commands = Vec::new();
    chase.handle(
        &events,
        query::player(world).cell,
        &query::adversary_view(world),
        query::grid_size(world),
        |cell| query::is_wall(world, cell),
        &mut commands,
    );

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn adversaries_move_once_per_interval_and_avoid_walls() {
    let config = Variant::Game.config();
    let interval = config.adversary_interval();
    let mut world = World::new(config.clone());
    let mut chase = Chase::new(Config::from_session(&config));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession { seed: 31 }, &mut events);
    assert_eq!(query::phase(&world), Phase::Collecting);
    let _ = pump(&mut world, &mut chase, events);

    let mut moves = 0;
    for _ in 0..50 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt: interval }, &mut events);
        let produced = pump(&mut world, &mut chase, events);
        let moved = produced
            .iter()
            .filter(|event| matches!(event, Event::AdversaryMoved { .. }))
            .count();
        assert!(moved <= 2, "each adversary moves at most once per interval");
        moves += moved;

        if query::phase(&world) != Phase::Collecting {
            break;
        }
        for adversary in query::adversary_view(&world).iter() {
            assert!(!query::is_wall(&world, adversary.cell));
        }
    }

    assert!(moves > 0, "adversaries never moved");
}

#[test]
fn same_seed_replays_same_adversary_path() {
    let config = Variant::Home.config();
    let trace = |seed: u64| {
        let mut world = World::new(config.clone());
        let mut chase = Chase::new(Config::from_session(&config));
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartSession { seed }, &mut events);
        let mut log = pump(&mut world, &mut chase, events);
        for _ in 0..20 {
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
            log.extend(pump(&mut world, &mut chase, events));
        }
        log
    };

    assert_eq!(trace(8), trace(8));
}
