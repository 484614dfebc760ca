#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Percent Maze collection minigame.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod config;
pub mod percent;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use config::{ConfigError, Distribution, SessionConfig, TargetDistribution, Variant};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Percent Maze.";

/// Cell the player occupies when a session starts and after every respawn.
pub const START_CELL: CellCoord = CellCoord::new(1, 1);

/// Number of collectible categories tracked by a session.
pub const CATEGORY_COUNT: usize = 5;

/// Phases a collection session moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session is running; all session state is discarded.
    Idle,
    /// Non-interactive explanation shown before gameplay begins.
    Intro,
    /// Live gameplay: the player collects entities while adversaries chase.
    Collecting,
    /// Every entity was collected; the tally awaits handoff.
    Complete,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards any previous session and generates a fresh one from the seed.
    StartSession {
        /// Seed for every random decision made while generating the session.
        seed: u64,
    },
    /// Moves the intro sequence to its next step.
    AdvanceIntro,
    /// Ends the intro sequence and starts live collection.
    BeginCollecting,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player move a single cell in the given direction.
    StepPlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an adversary move a single cell in the given direction.
    StepAdversary {
        /// Identifier of the adversary attempting to move.
        adversary: AdversaryId,
        /// Direction of travel chosen by the chase policy.
        direction: Direction,
    },
    /// Hands the final tally of a completed session to downstream consumers.
    PublishTally,
    /// Ends the current session and returns to idle.
    Abandon,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new session was generated.
    SessionStarted {
        /// Seed the session layout was generated from.
        seed: u64,
        /// Number of collectible entities placed for this session.
        target_total: u32,
        /// Number of wall cells in the generated maze.
        wall_count: u32,
    },
    /// Announces that the session moved between phases.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: Phase,
        /// Phase that became active.
        to: Phase,
    },
    /// Reports that the intro sequence reached a new step.
    IntroAdvanced {
        /// Zero-based index of the step now displayed.
        step: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a player step was rejected by a wall.
    PlayerBlocked {
        /// Cell the player remains on.
        at: CellCoord,
        /// Direction of the rejected step.
        direction: Direction,
    },
    /// Confirms that an adversary moved between two cells.
    AdversaryMoved {
        /// Identifier of the adversary that moved.
        adversary: AdversaryId,
        /// Cell the adversary occupied before moving.
        from: CellCoord,
        /// Cell the adversary occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the player picked up a collectible entity.
    EntityCollected {
        /// Identifier of the entity that was removed.
        entity: EntityId,
        /// Category credited in the tally.
        category: Category,
        /// Cell where the pickup happened.
        cell: CellCoord,
        /// Sum of all collected counts after the pickup.
        collected_total: u32,
    },
    /// Transient notification that an adversary caught the player.
    PlayerCaught {
        /// Adversary sharing the player's cell.
        adversary: AdversaryId,
        /// Cell where the collision happened.
        cell: CellCoord,
        /// Lives left after the collision was applied.
        lives_remaining: u32,
    },
    /// Confirms that the player was returned to the start cell.
    PlayerRespawned {
        /// Cell the player now occupies.
        cell: CellCoord,
    },
    /// Reports that the player ran out of lives and the run was discarded.
    RunLost,
    /// Reports that every placed entity was collected.
    SessionCompleted {
        /// Final collected counts.
        tally: Tally,
    },
    /// Carries the final tally to downstream consumers.
    TallyPublished {
        /// Final collected counts.
        tally: Tally,
    },
    /// Reports that placement ran out of free cells.
    PlacementShortfall {
        /// Number of collectibles the distribution asked for.
        requested: u32,
        /// Number of collectibles actually placed.
        placed: u32,
    },
}

/// Cardinal movement directions shared by the player and adversaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed order used for uniform random choices.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The two perpendicular directions in fixed preference order.
    #[must_use]
    pub const fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::Up | Self::Down => [Self::Left, Self::Right],
            Self::Left | Self::Right => [Self::Up, Self::Down],
        }
    }
}

/// Collectible categories credited in a [`Tally`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// First category.
    Cat,
    /// Second category.
    Dog,
    /// Third category.
    Rabbit,
    /// Fourth category.
    Bird,
    /// Fifth category.
    Fish,
}

impl Category {
    /// Every category in distribution order.
    pub const ALL: [Category; CATEGORY_COUNT] =
        [Self::Cat, Self::Dog, Self::Rabbit, Self::Bird, Self::Fish];

    /// Position of the category within [`Category::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Cat => 0,
            Self::Dog => 1,
            Self::Rabbit => 2,
            Self::Bird => 3,
            Self::Fish => 4,
        }
    }

    /// Human readable plural label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cat => "cats",
            Self::Dog => "dogs",
            Self::Rabbit => "rabbits",
            Self::Bird => "birds",
            Self::Fish => "fish",
        }
    }

    /// Visual tag adapters draw for entities of this category.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Cat => 'c',
            Self::Dog => 'd',
            Self::Rabbit => 'r',
            Self::Bird => 'b',
            Self::Fish => 'f',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unique identifier assigned to a collectible entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}

/// Unique identifier assigned to an adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdversaryId(u32);

impl AdversaryId {
    /// Creates a new adversary identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AdversaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adversary-{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell in `direction`, clamped to a square grid of `side` cells.
    #[must_use]
    pub fn step_clamped(self, direction: Direction, side: u32) -> Self {
        let last = side.saturating_sub(1);
        match direction {
            Direction::Up => Self::new(self.column, self.row.saturating_sub(1)),
            Direction::Down => Self::new(self.column, self.row.saturating_add(1).min(last)),
            Direction::Left => Self::new(self.column.saturating_sub(1), self.row),
            Direction::Right => Self::new(self.column.saturating_add(1).min(last), self.row),
        }
    }

    /// Reports whether the cell lies on the outer ring of a square grid.
    #[must_use]
    pub const fn is_border(self, side: u32) -> bool {
        let last = side.saturating_sub(1);
        self.column == 0 || self.row == 0 || self.column >= last || self.row >= last
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Collected counts per category; serialises as a flat JSON object.
///
/// Older screens wrote plural category names, which are accepted on read.
/// Any other field is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tally {
    #[serde(alias = "cats")]
    cat: u32,
    #[serde(alias = "dogs")]
    dog: u32,
    #[serde(alias = "rabbits")]
    rabbit: u32,
    #[serde(alias = "birds")]
    bird: u32,
    fish: u32,
}

impl Tally {
    /// Builds a tally from counts listed in [`Category::ALL`] order.
    #[must_use]
    pub const fn from_counts(counts: [u32; CATEGORY_COUNT]) -> Self {
        Self {
            cat: counts[0],
            dog: counts[1],
            rabbit: counts[2],
            bird: counts[3],
            fish: counts[4],
        }
    }

    /// Counts listed in [`Category::ALL`] order.
    #[must_use]
    pub const fn counts(&self) -> [u32; CATEGORY_COUNT] {
        [self.cat, self.dog, self.rabbit, self.bird, self.fish]
    }

    /// Count recorded for a single category.
    #[must_use]
    pub const fn get(&self, category: Category) -> u32 {
        self.counts()[category.index()]
    }

    /// Credits one pickup to `category`.
    pub fn increment(&mut self, category: Category) {
        let slot = match category {
            Category::Cat => &mut self.cat,
            Category::Dog => &mut self.dog,
            Category::Rabbit => &mut self.rabbit,
            Category::Bird => &mut self.bird,
            Category::Fish => &mut self.fish,
        };
        *slot = slot.saturating_add(1);
    }

    /// Sum of every category count.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts().iter().copied().fold(0, u32::saturating_add)
    }

    /// Share of the total held by `category`, as a percentage.
    ///
    /// Returns `None` for an empty tally.
    #[must_use]
    pub fn share_percent(&self, category: Category) -> Option<f64> {
        percent::percentage_of(self.get(category), self.total())
    }

    /// Iterator over `(category, count)` pairs in distribution order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

/// Immutable representation of a collectible entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Category credited when the entity is collected.
    pub category: Category,
    /// Grid cell currently occupied by the entity.
    pub cell: CellCoord,
    /// Visual tag adapters draw for the entity.
    pub tag: char,
}

/// Read-only snapshot describing every active collectible.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured entity snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Number of active entities captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no entities remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Entity occupying `cell`, if any.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<&EntitySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an adversary used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdversarySnapshot {
    /// Unique identifier assigned to the adversary.
    pub id: AdversaryId,
    /// Grid cell currently occupied by the adversary.
    pub cell: CellCoord,
    /// Direction of the adversary's most recent move.
    pub facing: Direction,
}

/// Read-only snapshot describing every adversary.
#[derive(Clone, Debug, Default)]
pub struct AdversaryView {
    snapshots: Vec<AdversarySnapshot>,
}

impl AdversaryView {
    /// Creates a new adversary view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AdversarySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured adversary snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AdversarySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AdversarySnapshot> {
        self.snapshots
    }
}

/// Snapshot of the player's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Lives left before the run is lost.
    pub lives_remaining: u32,
    /// Lives granted at session start.
    pub max_lives: u32,
}

/// Read-only view into the dense wall grid.
#[derive(Clone, Copy, Debug)]
pub struct WallView<'a> {
    cells: &'a [bool],
    side: u32,
}

impl<'a> WallView<'a> {
    /// Captures a new wall view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [bool], side: u32) -> Self {
        Self { cells, side }
    }

    /// Reports whether `cell` is impassable. Cells outside the grid count as walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(true)
    }

    /// Side length of the square grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Number of wall cells in the grid.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|wall| **wall).count()
    }

    /// Iterator over every wall cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let side = self.side;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % side, index / side))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.side && cell.row() < self.side {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.side).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_clamped_stays_inside_grid() {
        let side = 5;
        assert_eq!(
            CellCoord::new(0, 0).step_clamped(Direction::Up, side),
            CellCoord::new(0, 0)
        );
        assert_eq!(
            CellCoord::new(0, 0).step_clamped(Direction::Left, side),
            CellCoord::new(0, 0)
        );
        assert_eq!(
            CellCoord::new(4, 4).step_clamped(Direction::Down, side),
            CellCoord::new(4, 4)
        );
        assert_eq!(
            CellCoord::new(4, 4).step_clamped(Direction::Right, side),
            CellCoord::new(4, 4)
        );
        assert_eq!(
            CellCoord::new(2, 2).step_clamped(Direction::Up, side),
            CellCoord::new(2, 1)
        );
    }

    #[test]
    fn perpendicular_directions_follow_fixed_order() {
        assert_eq!(
            Direction::Up.perpendicular(),
            [Direction::Left, Direction::Right]
        );
        assert_eq!(
            Direction::Right.perpendicular(),
            [Direction::Up, Direction::Down]
        );
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }

    #[test]
    fn tally_serialises_as_flat_object() {
        let tally = Tally::from_counts([1, 3, 4, 7, 10]);
        let json = serde_json::to_value(tally).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"cat": 1, "dog": 3, "rabbit": 4, "bird": 7, "fish": 10})
        );
        assert_eq!(tally.total(), 25);
    }

    #[test]
    fn tally_fills_missing_categories_with_zero() {
        let tally: Tally = serde_json::from_str(r#"{"dog": 2}"#).expect("deserialize");
        assert_eq!(tally.counts(), [0, 2, 0, 0, 0]);
    }

    #[test]
    fn tally_rejects_unrelated_objects() {
        assert!(serde_json::from_str::<Tally>(r#"{"foo": 1}"#).is_err());
        assert!(serde_json::from_str::<Tally>(r#"{"cat": 1, "price": 3}"#).is_err());

        let legacy: Tally =
            serde_json::from_str(r#"{"cats": 1, "dogs": 2, "rabbits": 3, "birds": 4, "fish": 5}"#)
                .expect("deserialize");
        assert_eq!(legacy.counts(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn tally_share_requires_non_empty_total() {
        let mut tally = Tally::default();
        assert_eq!(tally.share_percent(Category::Cat), None);
        tally.increment(Category::Cat);
        tally.increment(Category::Dog);
        tally.increment(Category::Dog);
        tally.increment(Category::Fish);
        assert_eq!(tally.share_percent(Category::Dog), Some(50.0));
    }

    #[test]
    fn wall_view_treats_outside_cells_as_walls() {
        let cells = vec![true, false, false, true];
        let view = WallView::new(&cells, 2);
        assert!(view.is_wall(CellCoord::new(0, 0)));
        assert!(!view.is_wall(CellCoord::new(1, 0)));
        assert!(view.is_wall(CellCoord::new(2, 0)));
        assert_eq!(view.count(), 2);
        assert_eq!(
            view.iter().collect::<Vec<_>>(),
            vec![CellCoord::new(0, 0), CellCoord::new(1, 1)]
        );
    }
}
