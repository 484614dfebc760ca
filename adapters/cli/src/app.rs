//! Terminal session loop around the simulation.

use std::{io::Write, time::Duration};

use anyhow::Result;
use percent_maze_core::{Event, Phase, Tally, Variant};
use percent_maze_driver::Simulation;
use percent_maze_world::query;
use tracing::{debug, warn};

use crate::{input::Action, lesson, render};

/// Safety cap on time steps spent waiting for the tally hand-off.
const MAX_SETTLE_STEPS: u32 = 1_000;

/// Outcome of feeding one action to the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Finished(Tally),
    Quit,
}

pub(crate) struct App {
    simulation: Simulation,
    variant: Variant,
    step: Duration,
    next_seed: u64,
}

impl App {
    pub(crate) fn new(simulation: Simulation, variant: Variant, step: Duration, seed: u64) -> Self {
        Self {
            simulation,
            variant,
            step,
            next_seed: seed,
        }
    }

    pub(crate) fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Starts a new run and plays through its intro, if any.
    pub(crate) fn start<W: Write>(&mut self, out: &mut W) -> Result<Flow> {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);

        writeln!(out, "{}", query::welcome_banner(self.simulation.world()))?;
        writeln!(out, "Lesson: {} (seed {seed})", self.variant)?;
        let events = self.simulation.start(seed);
        self.report(&events, out)?;
        self.settle(out)
    }

    /// Applies one decoded action and advances the clock by one step.
    pub(crate) fn apply<W: Write>(&mut self, action: Action, out: &mut W) -> Result<Flow> {
        let mut events = match action {
            Action::Quit => return Ok(Flow::Quit),
            Action::Restart => return self.start(out),
            Action::Move(direction) => {
                if self.simulation.phase() == Phase::Idle {
                    writeln!(out, "No run in progress. Press r to start again.")?;
                    return Ok(Flow::Continue);
                }
                self.simulation.press(direction)
            }
            Action::Wait => Vec::new(),
        };

        if self.simulation.phase() == Phase::Collecting {
            events.extend(self.simulation.advance(self.step));
        }
        self.report(&events, out)?;
        self.settle(out)
    }

    /// Runs timers that need no player input: the intro and the completion hand-off.
    fn settle<W: Write>(&mut self, out: &mut W) -> Result<Flow> {
        let intro = lesson::intro_lines(self.variant);
        let mut steps = 0;

        loop {
            match self.simulation.phase() {
                Phase::Intro => {
                    let index = query::intro_step(self.simulation.world()) as usize;
                    if let Some(line) = intro.get(index) {
                        writeln!(out, "{line}")?;
                    }
                }
                Phase::Complete => {
                    if let Some(tally) = self.simulation.published_tally() {
                        return Ok(Flow::Finished(tally));
                    }
                }
                Phase::Idle | Phase::Collecting => return Ok(Flow::Continue),
            }

            if steps == MAX_SETTLE_STEPS {
                warn!(steps, "timeline never settled");
                return Ok(Flow::Continue);
            }
            steps += 1;

            let wait = self.simulation.pending_timeline().unwrap_or(self.step);
            let events = self.simulation.advance(wait);
            self.report(&events, out)?;
        }
    }

    fn report<W: Write>(&self, events: &[Event], out: &mut W) -> Result<()> {
        for event in events {
            match event {
                Event::PlayerCaught {
                    lives_remaining, ..
                } if *lives_remaining > 0 => {
                    writeln!(out, "Caught! {lives_remaining} lives left.")?;
                }
                Event::RunLost => {
                    writeln!(out, "Out of lives. Press r to try again.")?;
                }
                Event::PlacementShortfall { requested, placed } => {
                    writeln!(
                        out,
                        "Only {placed} of {requested} animals fit in this maze."
                    )?;
                }
                Event::SessionCompleted { .. } => {
                    writeln!(out, "All animals collected!")?;
                }
                other => debug!(event = ?other, "event"),
            }
        }
        Ok(())
    }

    /// Writes the board and the status line.
    pub(crate) fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", render::board(self.simulation.world()))?;
        Ok(())
    }
}
