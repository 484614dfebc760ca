#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy chase policy that steers adversaries toward the player.
//!
//! The system accumulates `TimeAdvanced` events while the session is
//! collecting and, once per configured interval, emits one
//! `StepAdversary` command for every adversary that can move.

use std::time::Duration;

use percent_maze_core::{
    AdversaryView, CellCoord, Command, Direction, Event, Phase, SessionConfig,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const RNG_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Configuration parameters required to construct the chase system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
    chase_probability: f64,
    strict_fallback: bool,
}

impl Config {
    /// Creates a new configuration using the provided cadence and chase policy.
    #[must_use]
    pub const fn new(interval: Duration, chase_probability: f64, strict_fallback: bool) -> Self {
        Self {
            interval,
            chase_probability,
            strict_fallback,
        }
    }

    /// Extracts the chase tuning from a session configuration.
    #[must_use]
    pub fn from_session(config: &SessionConfig) -> Self {
        Self::new(
            config.adversary_interval(),
            config.chase_probability,
            config.strict_fallback,
        )
    }
}

/// Pure system that emits adversary steps on a fixed cadence.
#[derive(Debug)]
pub struct Chase {
    config: Config,
    phase: Phase,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Chase {
    /// Creates a new chase system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(RNG_SALT),
        }
    }

    /// Consumes events and immutable views to emit adversary step commands.
    ///
    /// Every round in one call plans from the same player position; later
    /// rounds see the adversary positions the earlier rounds requested.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        player_cell: CellCoord,
        adversaries: &AdversaryView,
        grid_size: u32,
        is_wall: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::SessionStarted { seed, .. } => {
                    self.rng = ChaCha8Rng::seed_from_u64(seed ^ RNG_SALT);
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::PhaseChanged { to, .. } => {
                    self.phase = *to;
                    if *to != Phase::Collecting {
                        self.accumulator = Duration::ZERO;
                        accumulated = Duration::ZERO;
                    }
                }
                Event::TimeAdvanced { dt } if self.phase == Phase::Collecting => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if self.phase != Phase::Collecting || accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let rounds = self.resolve_rounds();
        if rounds == 0 {
            return;
        }

        let mut positions: Vec<_> = adversaries
            .iter()
            .map(|adversary| (adversary.id, adversary.cell))
            .collect();

        for _ in 0..rounds {
            for (adversary, cell) in &mut positions {
                let preferred = self.preferred_direction(*cell, player_cell);
                let Some(direction) =
                    self.resolve_direction(*cell, preferred, grid_size, &is_wall)
                else {
                    continue;
                };
                *cell = cell.step_clamped(direction, grid_size);
                out.push(Command::StepAdversary {
                    adversary: *adversary,
                    direction,
                });
            }
        }
    }

    fn resolve_rounds(&mut self) -> usize {
        if self.config.interval.is_zero() {
            return 0;
        }

        let mut rounds = 0;
        while self.accumulator >= self.config.interval {
            self.accumulator -= self.config.interval;
            rounds += 1;
        }
        rounds
    }

    fn preferred_direction(&mut self, from: CellCoord, player: CellCoord) -> Direction {
        let probability = self.config.chase_probability.clamp(0.0, 1.0);
        if self.rng.gen_bool(probability) {
            if let Some(direction) = chase_direction(from, player) {
                return direction;
            }
        }
        *Direction::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Direction::Down)
    }

    /// First open direction out of the preferred one and its fallbacks.
    fn resolve_direction<F>(
        &self,
        from: CellCoord,
        preferred: Direction,
        grid_size: u32,
        is_wall: &F,
    ) -> Option<Direction>
    where
        F: Fn(CellCoord) -> bool,
    {
        let [first, second] = preferred.perpendicular();
        let candidates = [preferred, first, second, preferred.opposite()];
        let limit = if self.config.strict_fallback { 4 } else { 3 };

        candidates.into_iter().take(limit).find(|direction| {
            let to = from.step_clamped(*direction, grid_size);
            to != from && !is_wall(to)
        })
    }
}

/// Axis step that most reduces the Manhattan distance to `target`.
///
/// The larger offset wins; equal offsets prefer the vertical axis. `None`
/// when both cells coincide.
#[must_use]
pub fn chase_direction(from: CellCoord, target: CellCoord) -> Option<Direction> {
    let dx = i64::from(target.column()) - i64::from(from.column());
    let dy = i64::from(target.row()) - i64::from(from.row());

    if dx == 0 && dy == 0 {
        return None;
    }

    if dx.abs() > dy.abs() {
        Some(if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        Some(if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}
