#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-threaded session loop shared by every screen that hosts the minigame.
//!
//! A [`Simulation`] owns the world plus the chase and timeline systems. Each
//! submitted command is applied, the resulting events are fed to the systems,
//! and the commands they emit are applied in turn until nothing is left.

use std::time::Duration;

use percent_maze_core::{
    Command, ConfigError, Direction, Event, Phase, SessionConfig, Tally,
};
use percent_maze_system_chase::{self as chase, Chase};
use percent_maze_system_timeline::{self as timeline, Timeline};
use percent_maze_world::{self as world, query, World};
use tracing::{trace, warn};

/// Upper bound on system rounds triggered by one submitted command.
const MAX_ROUNDS: usize = 64;

/// World and systems wired together for one configured minigame.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    chase: Chase,
    timeline: Timeline,
    published: Option<Tally>,
}

impl Simulation {
    /// Validates `config` and builds an idle simulation around it.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            chase: Chase::new(chase::Config::from_session(&config)),
            timeline: Timeline::new(timeline::Config::from_session(&config)),
            world: World::new(config),
            published: None,
        })
    }

    /// Read-only access to the world for queries and rendering.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Phase the session is currently in.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Tally broadcast by the last completed session, used as navigation state.
    #[must_use]
    pub fn published_tally(&self) -> Option<Tally> {
        self.published
    }

    /// Time until the timeline fires its next step, if one is armed.
    #[must_use]
    pub fn pending_timeline(&self) -> Option<Duration> {
        self.timeline.until_next()
    }

    /// Starts a fresh session, discarding whatever ran before.
    pub fn start(&mut self, seed: u64) -> Vec<Event> {
        self.submit(Command::StartSession { seed })
    }

    /// Advances the simulation clock by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        self.submit(Command::Tick { dt })
    }

    /// Forwards one directional key press to the player.
    pub fn press(&mut self, direction: Direction) -> Vec<Event> {
        self.submit(Command::StepPlayer { direction })
    }

    /// Drops the running session and returns to idle.
    pub fn abandon(&mut self) -> Vec<Event> {
        self.submit(Command::Abandon)
    }

    /// Applies `command` and runs the systems until they stop emitting commands.
    ///
    /// Returns every event produced along the way, in order.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        for round in 0.. {
            if events.is_empty() {
                break;
            }
            if round == MAX_ROUNDS {
                warn!(rounds = MAX_ROUNDS, "system loop did not settle; dropping events");
                log.append(&mut events);
                break;
            }

            self.observe(&events);
            let commands = self.run_systems(&events);
            log.append(&mut events);

            for command in commands {
                trace!(?command, "system command");
                world::apply(&mut self.world, command, &mut events);
            }
        }

        log
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SessionStarted { .. } => self.published = None,
                Event::TallyPublished { tally } => self.published = Some(*tally),
                _ => {}
            }
        }
    }

    fn run_systems(&mut self, events: &[Event]) -> Vec<Command> {
        let mut commands = Vec::new();
        let world = &self.world;

        self.chase.handle(
            events,
            query::player(world).cell,
            &query::adversary_view(world),
            query::grid_size(world),
            |cell| query::is_wall(world, cell),
            &mut commands,
        );
        self.timeline.handle(events, &mut commands);

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_maze_core::Variant;

    #[test]
    fn rejects_invalid_configuration() {
        let config = SessionConfig {
            max_lives: 0,
            ..SessionConfig::default()
        };
        assert_eq!(Simulation::new(config).unwrap_err(), ConfigError::NoLives);
    }

    #[test]
    fn start_returns_full_event_trail() {
        let mut simulation = Simulation::new(Variant::Game.config()).unwrap();
        let events = simulation.start(1);

        assert!(matches!(events.first(), Some(Event::SessionStarted { .. })));
        assert_eq!(
            events.last(),
            Some(&Event::PhaseChanged {
                from: Phase::Idle,
                to: Phase::Collecting,
            })
        );
        assert_eq!(simulation.phase(), Phase::Collecting);
    }

    #[test]
    fn ticks_drive_adversaries() {
        let mut simulation = Simulation::new(Variant::Game.config()).unwrap();
        let _ = simulation.start(2);

        let events = simulation.advance(Duration::from_millis(200));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::AdversaryMoved { .. })));
    }

    #[test]
    fn intro_runs_on_timers_alone() {
        let mut simulation = Simulation::new(Variant::WholeFromPercentage.config()).unwrap();
        let _ = simulation.start(3);
        assert_eq!(simulation.phase(), Phase::Intro);
        assert_eq!(simulation.pending_timeline(), Some(Duration::from_millis(2000)));

        let _ = simulation.advance(Duration::from_millis(2000));
        assert_eq!(simulation.phase(), Phase::Intro);
        let _ = simulation.advance(Duration::from_millis(2000));
        assert_eq!(simulation.phase(), Phase::Collecting);
        assert_eq!(simulation.pending_timeline(), None);
    }
}
