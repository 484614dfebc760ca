#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cancelable phase timeline that drives the intro sequence and the
//! delayed tally hand-off.
//!
//! Entering a phase arms an ordered list of `(delay, command)` steps. Every
//! phase change and every session start tears down whatever was armed, so a
//! stale step can never fire into a later phase.

use std::{collections::VecDeque, time::Duration};

use percent_maze_core::{Command, Event, Phase, SessionConfig};
use tracing::debug;

/// Configuration parameters required to construct the timeline system.
#[derive(Clone, Debug, Default)]
pub struct Config {
    intro_steps: Vec<Duration>,
    completion_delay: Duration,
}

impl Config {
    /// Creates a new configuration from the intro step durations and the completion delay.
    #[must_use]
    pub fn new(intro_steps: Vec<Duration>, completion_delay: Duration) -> Self {
        Self {
            intro_steps,
            completion_delay,
        }
    }

    /// Extracts the timeline durations from a session configuration.
    #[must_use]
    pub fn from_session(config: &SessionConfig) -> Self {
        Self::new(config.intro_steps(), config.completion_delay())
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Step {
    delay: Duration,
    command: Command,
}

/// Pure system that turns elapsed time into scheduled phase commands.
#[derive(Debug)]
pub struct Timeline {
    config: Config,
    steps: VecDeque<Step>,
    elapsed: Duration,
}

impl Timeline {
    /// Creates a new timeline system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            steps: VecDeque::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Consumes world events and emits the commands whose delay has elapsed.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SessionStarted { .. } => self.cancel(),
                Event::PhaseChanged { to, .. } => {
                    self.cancel();
                    match to {
                        Phase::Intro => self.arm_intro(),
                        Phase::Complete => {
                            let delay = self.config.completion_delay;
                            self.arm(vec![Step {
                                delay,
                                command: Command::PublishTally,
                            }]);
                        }
                        Phase::Idle | Phase::Collecting => {}
                    }
                }
                Event::TimeAdvanced { dt } if !self.steps.is_empty() => {
                    self.elapsed = self.elapsed.saturating_add(*dt);
                }
                _ => {}
            }
        }

        while let Some(step) = self.steps.front() {
            if step.delay > self.elapsed {
                break;
            }
            self.elapsed -= step.delay;
            if let Some(step) = self.steps.pop_front() {
                debug!(command = ?step.command, "timeline step fired");
                out.push(step.command);
            }
        }

        if self.steps.is_empty() {
            self.elapsed = Duration::ZERO;
        }
    }

    /// Reports whether any step is still waiting to fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Time left until the next armed step fires.
    #[must_use]
    pub fn until_next(&self) -> Option<Duration> {
        self.steps
            .front()
            .map(|step| step.delay.saturating_sub(self.elapsed))
    }

    fn arm_intro(&mut self) {
        let count = self.config.intro_steps.len();
        let steps = self
            .config
            .intro_steps
            .iter()
            .enumerate()
            .map(|(index, delay)| Step {
                delay: *delay,
                command: if index + 1 == count {
                    Command::BeginCollecting
                } else {
                    Command::AdvanceIntro
                },
            })
            .collect();
        self.arm(steps);
    }

    fn arm(&mut self, steps: Vec<Step>) {
        debug!(steps = steps.len(), "timeline armed");
        self.steps = steps.into();
        self.elapsed = Duration::ZERO;
    }

    fn cancel(&mut self) {
        if !self.steps.is_empty() {
            debug!(pending = self.steps.len(), "timeline cancelled");
        }
        self.steps.clear();
        self.elapsed = Duration::ZERO;
    }
}
