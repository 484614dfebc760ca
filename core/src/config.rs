//! Session configuration shared by the world, systems, and adapters.
//!
//! Every screen that hosts the minigame supplies a [`SessionConfig`]; the
//! [`Variant`] presets capture the per-screen tuning so consumers only pick a
//! variant and read the completion tally.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CATEGORY_COUNT;

/// Smallest grid that leaves an interior around the start cell.
pub const MIN_GRID_SIZE: u32 = 5;

/// Preset `(total, per-category counts)` pair selected at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDistribution {
    /// Number of collectibles the session places.
    pub total: u32,
    /// Per-category counts in [`crate::Category::ALL`] order.
    pub counts: [u32; CATEGORY_COUNT],
}

impl TargetDistribution {
    /// Creates a distribution from a total and its per-category split.
    #[must_use]
    pub const fn new(total: u32, counts: [u32; CATEGORY_COUNT]) -> Self {
        Self { total, counts }
    }

    fn split_sum(&self) -> u32 {
        self.counts.iter().copied().fold(0, u32::saturating_add)
    }
}

/// Policy that decides how many collectibles of each category are placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Distribution {
    /// One preset is drawn uniformly from the menu for every session.
    Presets {
        /// Candidate distributions.
        menu: Vec<TargetDistribution>,
    },
    /// Total drawn uniformly from `min..=max`; each entity gets a uniform category.
    UniformRandom {
        /// Smallest possible total.
        min: u32,
        /// Largest possible total.
        max: u32,
    },
}

/// Configuration errors detected by [`SessionConfig::validate`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot fit a border, the start cell, and an interior.
    #[error("grid size {size} is below the minimum of 5")]
    GridTooSmall {
        /// Rejected side length.
        size: u32,
    },
    /// Sessions need at least one life.
    #[error("max_lives must be at least 1")]
    NoLives,
    /// A probability fell outside `0.0..=1.0`.
    #[error("{field} must lie within 0.0..=1.0, got {value}")]
    InvalidProbability {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The adversary timer would never fire.
    #[error("adversary_interval_ms must be greater than zero")]
    ZeroInterval,
    /// Lattice strides below two would wall in every interior cell.
    #[error("lattice_stride must be at least 2, got {stride}")]
    InvalidStride {
        /// Rejected stride.
        stride: u32,
    },
    /// Rejection sampling needs at least one attempt.
    #[error("placement_attempts must be at least 1")]
    ZeroAttempts,
    /// The preset menu has nothing to choose from.
    #[error("distribution preset menu is empty")]
    EmptyPresetMenu,
    /// A preset's split does not add up to its total.
    #[error("preset total {total} does not match its category split sum {sum}")]
    PresetMismatch {
        /// Declared total.
        total: u32,
        /// Sum of the per-category counts.
        sum: u32,
    },
    /// A preset or random range would place nothing.
    #[error("distributions must place at least one collectible")]
    EmptyDistribution,
    /// No variant goes by the provided name.
    #[error("unknown variant `{name}`")]
    UnknownVariant {
        /// Rejected name.
        name: String,
    },
    /// The uniform range is inverted.
    #[error("uniform distribution range {min}..={max} is empty")]
    InvalidRange {
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },
}

/// Tuning for one collection session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length N of the square grid.
    pub grid_size: u32,
    /// Halves the wall probability and keeps the 4x4 region near the start open.
    pub sparse_obstacles: bool,
    /// Interior walls sit on cells whose column and row are multiples of this stride.
    pub lattice_stride: u32,
    /// Independent inclusion probability of each lattice wall.
    pub wall_probability: f64,
    /// Regenerate or seal the maze until every open cell is reachable from the start.
    pub ensure_reachable: bool,
    /// Lives granted at session start.
    pub max_lives: u32,
    /// Number of adversaries placed per session.
    pub adversary_count: u32,
    /// Rejection-sampling attempts per placement before falling back.
    pub placement_attempts: u32,
    /// Probability an adversary chases instead of wandering.
    pub chase_probability: f64,
    /// Fixed adversary movement interval in milliseconds.
    pub adversary_interval_ms: u64,
    /// Blocked adversaries try all three alternatives instead of the perpendicular pair.
    pub strict_fallback: bool,
    /// Collectible count policy.
    pub distribution: Distribution,
    /// Ordered intro step durations in milliseconds; empty skips the intro.
    pub intro_steps_ms: Vec<u64>,
    /// Delay between completion and tally handoff in milliseconds.
    pub completion_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Variant::Game.config()
    }
}

impl SessionConfig {
    /// Adversary movement interval.
    #[must_use]
    pub fn adversary_interval(&self) -> Duration {
        Duration::from_millis(self.adversary_interval_ms)
    }

    /// Intro step durations in order.
    #[must_use]
    pub fn intro_steps(&self) -> Vec<Duration> {
        self.intro_steps_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    /// Delay between completion and tally handoff.
    #[must_use]
    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Reports whether sessions pass through the intro phase.
    #[must_use]
    pub fn has_intro(&self) -> bool {
        !self.intro_steps_ms.is_empty()
    }

    /// Checks every field for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
            });
        }
        if self.max_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        check_probability("wall_probability", self.wall_probability)?;
        check_probability("chase_probability", self.chase_probability)?;
        if self.adversary_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.lattice_stride < 2 {
            return Err(ConfigError::InvalidStride {
                stride: self.lattice_stride,
            });
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        match &self.distribution {
            Distribution::Presets { menu } => {
                if menu.is_empty() {
                    return Err(ConfigError::EmptyPresetMenu);
                }
                for preset in menu {
                    let sum = preset.split_sum();
                    if sum != preset.total {
                        return Err(ConfigError::PresetMismatch {
                            total: preset.total,
                            sum,
                        });
                    }
                    if preset.total == 0 {
                        return Err(ConfigError::EmptyDistribution);
                    }
                }
            }
            Distribution::UniformRandom { min, max } => {
                if min > max {
                    return Err(ConfigError::InvalidRange {
                        min: *min,
                        max: *max,
                    });
                }
                if *max == 0 {
                    return Err(ConfigError::EmptyDistribution);
                }
            }
        }

        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

/// Screens that host the minigame, each with its own tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Landing screen warm-up round.
    Home,
    /// Index screen with a random total and per-entity random categories.
    Index,
    /// Free-play game screen.
    Game,
    /// "Percentage of a number" lesson.
    PercentageOfNumber,
    /// "Whole from a percentage" lesson.
    WholeFromPercentage,
    /// "Percentage difference" lesson.
    PercentageDifference,
}

const SMALL_SPLIT: TargetDistribution = TargetDistribution::new(25, [1, 3, 4, 7, 10]);
const MEDIUM_SPLIT: TargetDistribution = TargetDistribution::new(50, [2, 5, 8, 15, 20]);
const LARGE_SPLIT: TargetDistribution = TargetDistribution::new(100, [5, 15, 20, 25, 35]);
const DIFFERENCE_SPLIT: TargetDistribution = TargetDistribution::new(50, [4, 6, 10, 12, 18]);

impl Variant {
    /// Every variant in declaration order.
    pub const ALL: [Variant; 6] = [
        Self::Home,
        Self::Index,
        Self::Game,
        Self::PercentageOfNumber,
        Self::WholeFromPercentage,
        Self::PercentageDifference,
    ];

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Index => "index",
            Self::Game => "game",
            Self::PercentageOfNumber => "percentage_of_number",
            Self::WholeFromPercentage => "whole_from_percentage",
            Self::PercentageDifference => "percentage_difference",
        }
    }

    /// Session configuration used by the variant's screen.
    #[must_use]
    pub fn config(self) -> SessionConfig {
        let base = SessionConfig {
            grid_size: 20,
            sparse_obstacles: false,
            lattice_stride: 3,
            wall_probability: 0.6,
            ensure_reachable: true,
            max_lives: 9,
            adversary_count: 2,
            placement_attempts: 50,
            chase_probability: 0.7,
            adversary_interval_ms: 200,
            strict_fallback: false,
            distribution: Distribution::Presets {
                menu: vec![SMALL_SPLIT, MEDIUM_SPLIT, LARGE_SPLIT],
            },
            intro_steps_ms: Vec::new(),
            completion_delay_ms: 1_000,
        };

        match self {
            Self::Home => SessionConfig {
                grid_size: 15,
                adversary_interval_ms: 300,
                chase_probability: 0.6,
                distribution: Distribution::Presets {
                    menu: vec![SMALL_SPLIT],
                },
                ..base
            },
            Self::Index => SessionConfig {
                grid_size: 16,
                adversary_interval_ms: 250,
                distribution: Distribution::UniformRandom { min: 20, max: 50 },
                ..base
            },
            Self::Game => base,
            Self::PercentageOfNumber => SessionConfig {
                sparse_obstacles: true,
                lattice_stride: 6,
                chase_probability: 0.8,
                distribution: Distribution::Presets {
                    menu: vec![LARGE_SPLIT],
                },
                intro_steps_ms: vec![1_500, 1_500, 1_500],
                completion_delay_ms: 1_500,
                ..base
            },
            Self::WholeFromPercentage => SessionConfig {
                sparse_obstacles: true,
                lattice_stride: 6,
                chase_probability: 0.8,
                adversary_interval_ms: 150,
                distribution: Distribution::Presets {
                    menu: vec![SMALL_SPLIT, LARGE_SPLIT],
                },
                intro_steps_ms: vec![2_000, 2_000],
                completion_delay_ms: 1_500,
                ..base
            },
            Self::PercentageDifference => SessionConfig {
                grid_size: 16,
                adversary_interval_ms: 250,
                chase_probability: 0.6,
                strict_fallback: true,
                distribution: Distribution::Presets {
                    menu: vec![DIFFERENCE_SPLIT],
                },
                intro_steps_ms: vec![1_500, 1_500],
                completion_delay_ms: 1_500,
                ..base
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownVariant {
                name: value.to_owned(),
            })
    }
}
