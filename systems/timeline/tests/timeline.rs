use std::time::Duration;

use percent_maze_core::{Command, Event, Phase, Variant};
use percent_maze_system_timeline::{Config, Timeline};
use percent_maze_world::{self as world, query, World};

fn tick(world: &mut World, timeline: &mut Timeline, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    let mut commands = Vec::new();
    timeline.handle(&events, &mut commands);

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    timeline.handle(&produced, &mut Vec::new());
    produced
}

#[test]
fn intro_sequence_hands_over_to_collecting() {
    let config = Variant::PercentageOfNumber.config();
    let mut world = World::new(config.clone());
    let mut timeline = Timeline::new(Config::from_session(&config));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession { seed: 4 }, &mut events);
    let mut commands = Vec::new();
    timeline.handle(&events, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(query::phase(&world), Phase::Intro);

    let step = Duration::from_millis(500);
    let mut elapsed = Duration::ZERO;
    while query::phase(&world) == Phase::Intro {
        let _ = tick(&mut world, &mut timeline, step);
        elapsed += step;
        assert!(elapsed <= Duration::from_secs(10), "intro never finished");
    }

    assert_eq!(elapsed, Duration::from_millis(4500));
    assert_eq!(query::intro_step(&world), 2);
    assert_eq!(query::phase(&world), Phase::Collecting);
    assert!(!timeline.is_armed());
}

#[test]
fn abandoning_the_intro_stops_the_timeline() {
    let config = Variant::WholeFromPercentage.config();
    let mut world = World::new(config.clone());
    let mut timeline = Timeline::new(Config::from_session(&config));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession { seed: 9 }, &mut events);
    world::apply(&mut world, Command::Abandon, &mut events);
    timeline.handle(&events, &mut Vec::new());
    assert!(!timeline.is_armed());

    let produced = tick(&mut world, &mut timeline, Duration::from_secs(60));
    assert!(produced.is_empty());
    assert_eq!(query::phase(&world), Phase::Idle);
}
