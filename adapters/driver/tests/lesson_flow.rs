use std::time::Duration;

use percent_maze_core::{
    CellCoord, Direction, Distribution, Event, Phase, SessionConfig, TargetDistribution, Variant,
};
use percent_maze_driver::Simulation;
use percent_maze_handoff::{persist_tally, resolve_tally, MemoryStore, TallySource};
use percent_maze_world::query;

fn open_field() -> SessionConfig {
    SessionConfig {
        adversary_count: 0,
        wall_probability: 0.0,
        distribution: Distribution::Presets {
            menu: vec![TargetDistribution::new(25, [1, 3, 4, 7, 10])],
        },
        completion_delay_ms: 1000,
        ..Variant::Game.config()
    }
}

fn walk_to(simulation: &mut Simulation, target: CellCoord) -> Vec<Event> {
    let mut events = Vec::new();
    while simulation.phase() == Phase::Collecting {
        let here = query::player(simulation.world()).cell;
        let direction = if here.column() < target.column() {
            Direction::Right
        } else if here.column() > target.column() {
            Direction::Left
        } else if here.row() < target.row() {
            Direction::Down
        } else if here.row() > target.row() {
            Direction::Up
        } else {
            break;
        };
        events.extend(simulation.press(direction));
    }
    events
}

#[test]
fn completed_session_publishes_after_delay_and_hands_off() {
    let mut simulation = Simulation::new(open_field()).unwrap();
    let _ = simulation.start(42);

    let targets: Vec<_> = query::entity_view(simulation.world())
        .iter()
        .map(|entity| entity.cell)
        .collect();
    let mut events = Vec::new();
    for target in targets {
        events.extend(walk_to(&mut simulation, target));
    }

    assert_eq!(simulation.phase(), Phase::Complete);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SessionCompleted { .. })));
    assert_eq!(simulation.published_tally(), None);

    let early = simulation.advance(Duration::from_millis(600));
    assert!(early.iter().all(|event| !matches!(event, Event::TallyPublished { .. })));

    let late = simulation.advance(Duration::from_millis(400));
    let published = simulation.published_tally().unwrap();
    assert!(late.contains(&Event::TallyPublished { tally: published }));
    assert_eq!(published.counts(), [1, 3, 4, 7, 10]);

    let _ = simulation.advance(Duration::from_secs(5));
    assert!(query::tally_published(simulation.world()));

    let mut store = MemoryStore::new();
    persist_tally(&mut store, &published).unwrap();
    assert_eq!(
        resolve_tally(simulation.published_tally(), &store),
        (published, TallySource::Navigation)
    );
    assert_eq!(
        resolve_tally(None, &store).0.share_percent(percent_maze_core::Category::Fish),
        Some(40.0)
    );
}

#[test]
fn restarting_clears_published_tally() {
    let mut simulation = Simulation::new(SessionConfig {
        completion_delay_ms: 0,
        distribution: Distribution::Presets {
            menu: vec![TargetDistribution::new(1, [0, 0, 1, 0, 0])],
        },
        ..open_field()
    })
    .unwrap();
    let _ = simulation.start(1);

    let Some(target) = query::entity_view(simulation.world()).iter().next().map(|e| e.cell) else {
        panic!("no collectible placed");
    };
    let events = walk_to(&mut simulation, target);
    assert!(events.contains(&Event::PhaseChanged {
        from: Phase::Collecting,
        to: Phase::Complete,
    }));
    assert_eq!(
        simulation.published_tally().map(|tally| tally.counts()),
        Some([0, 0, 1, 0, 0])
    );

    let _ = simulation.start(2);
    assert_eq!(simulation.published_tally(), None);
    assert_eq!(query::tally(simulation.world()).total(), 0);
}

#[test]
fn losing_every_life_returns_to_idle() {
    let mut simulation = Simulation::new(SessionConfig {
        max_lives: 1,
        adversary_count: 2,
        chase_probability: 1.0,
        ..Variant::Home.config()
    })
    .unwrap();
    let _ = simulation.start(5);

    let mut lost = false;
    for _ in 0..2_000 {
        let events = simulation.advance(Duration::from_millis(300));
        if events.contains(&Event::RunLost) {
            lost = true;
            break;
        }
    }

    assert!(lost, "pure chase never caught a stationary player");
    assert_eq!(simulation.phase(), Phase::Idle);
    assert!(query::entity_view(simulation.world()).is_empty());
}
