#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the Percent Maze collection minigame.
//!
//! The world owns the walls, the active collectibles, the adversaries, and the
//! player. Every mutation arrives as a [`Command`] through [`apply`]; the world
//! validates it against the current [`Phase`], resolves collisions, and
//! reports the outcome as [`Event`] values.

mod maze;
mod placement;
mod reachability;

use percent_maze_core::{
    AdversaryId, CellCoord, Category, Command, Direction, EntityId, Event, Phase, SessionConfig,
    Tally, START_CELL, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{maze::WallGrid, placement::Placer};

/// Represents one collection session and everything it owns.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SessionConfig,
    phase: Phase,
    seed: Option<u64>,
    walls: WallGrid,
    entities: Vec<Entity>,
    adversaries: Vec<Adversary>,
    player: Player,
    tally: Tally,
    target_total: u32,
    intro_step: u32,
    tally_published: bool,
    tick_index: u64,
}

impl World {
    /// Creates an idle world that runs sessions with the provided configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            phase: Phase::Idle,
            seed: None,
            walls: WallGrid::empty(config.grid_size),
            entities: Vec::new(),
            adversaries: Vec::new(),
            player: Player::fresh(config.max_lives),
            tally: Tally::default(),
            target_total: 0,
            intro_step: 0,
            tally_published: false,
            tick_index: 0,
            config,
        }
    }

    fn discard_session(&mut self) {
        self.seed = None;
        self.walls = WallGrid::empty(self.config.grid_size);
        self.entities.clear();
        self.adversaries.clear();
        self.player = Player::fresh(self.config.max_lives);
        self.tally = Tally::default();
        self.target_total = 0;
        self.intro_step = 0;
        self.tally_published = false;
    }

    fn set_phase(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        info!(?from, ?to, "session phase changed");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn start_session(&mut self, seed: u64, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Idle {
            self.set_phase(Phase::Idle, out_events);
        }
        self.discard_session();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let walls = maze::generate(&self.config, &mut rng);
        let categories = placement::collectible_categories(&self.config.distribution, &mut rng);
        let requested = u32::try_from(categories.len()).unwrap_or(u32::MAX);

        let mut placer = Placer::new(&walls, self.config.placement_attempts);
        let mut entities = Vec::with_capacity(categories.len());
        for category in categories {
            let Some(cell) = placer.place(&mut rng) else {
                break;
            };
            let id = EntityId::new(u32::try_from(entities.len()).unwrap_or(u32::MAX));
            entities.push(Entity { id, category, cell });
        }

        let mut adversaries = Vec::new();
        for index in 0..self.config.adversary_count {
            let Some(cell) = placer.place(&mut rng) else {
                warn!(
                    requested = self.config.adversary_count,
                    placed = index,
                    "no free cell left for adversary"
                );
                break;
            };
            adversaries.push(Adversary {
                id: AdversaryId::new(index),
                cell,
                facing: Direction::Down,
            });
        }

        let placed = u32::try_from(entities.len()).unwrap_or(u32::MAX);
        if placed < requested {
            warn!(requested, placed, "maze ran out of free cells for collectibles");
            out_events.push(Event::PlacementShortfall { requested, placed });
        }

        self.seed = Some(seed);
        self.walls = walls;
        self.entities = entities;
        self.adversaries = adversaries;
        self.target_total = placed;

        info!(
            seed,
            target_total = self.target_total,
            walls = self.walls.count(),
            adversaries = self.adversaries.len(),
            "session started"
        );
        out_events.push(Event::SessionStarted {
            seed,
            target_total: self.target_total,
            wall_count: self.walls.count(),
        });

        if self.config.has_intro() {
            self.set_phase(Phase::Intro, out_events);
        } else {
            self.enter_collecting(out_events);
        }
    }

    fn enter_collecting(&mut self, out_events: &mut Vec<Event>) {
        self.set_phase(Phase::Collecting, out_events);
        if self.tally.total() >= self.target_total {
            self.complete(out_events);
        }
    }

    fn complete(&mut self, out_events: &mut Vec<Event>) {
        self.set_phase(Phase::Complete, out_events);
        info!(total = self.tally.total(), "every collectible gathered");
        out_events.push(Event::SessionCompleted { tally: self.tally });
    }

    fn step_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.cell;
        let to = from.step_clamped(direction, self.walls.side());
        if to == from {
            return;
        }
        if self.walls.is_wall(to) {
            out_events.push(Event::PlayerBlocked {
                at: from,
                direction,
            });
            return;
        }

        self.player.cell = to;
        out_events.push(Event::PlayerMoved { from, to });

        if self.collect_at_player(out_events) {
            return;
        }
        if let Some(adversary) = self.adversary_at(to) {
            self.catch_player(adversary, out_events);
        }
    }

    fn step_adversary(
        &mut self,
        adversary_id: AdversaryId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let side = self.walls.side();
        let Some(adversary) = self
            .adversaries
            .iter_mut()
            .find(|adversary| adversary.id == adversary_id)
        else {
            return;
        };

        let from = adversary.cell;
        let to = from.step_clamped(direction, side);
        if to == from || self.walls.is_wall(to) {
            return;
        }

        adversary.cell = to;
        adversary.facing = direction;
        out_events.push(Event::AdversaryMoved {
            adversary: adversary_id,
            from,
            to,
        });

        if to == self.player.cell {
            self.catch_player(adversary_id, out_events);
        }
    }

    /// Removes the entity under the player, if any. Returns whether the session completed.
    fn collect_at_player(&mut self, out_events: &mut Vec<Event>) -> bool {
        let cell = self.player.cell;
        let Some(position) = self.entities.iter().position(|entity| entity.cell == cell) else {
            return false;
        };

        let entity = self.entities.remove(position);
        self.tally.increment(entity.category);
        let collected_total = self.tally.total();
        debug!(entity = %entity.id, category = %entity.category, collected_total, "collected");
        out_events.push(Event::EntityCollected {
            entity: entity.id,
            category: entity.category,
            cell,
            collected_total,
        });

        if collected_total == self.target_total {
            self.complete(out_events);
            return true;
        }
        false
    }

    fn adversary_at(&self, cell: CellCoord) -> Option<AdversaryId> {
        self.adversaries
            .iter()
            .find(|adversary| adversary.cell == cell)
            .map(|adversary| adversary.id)
    }

    fn catch_player(&mut self, adversary: AdversaryId, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;
        self.player.lives_remaining = self.player.lives_remaining.saturating_sub(1);
        let lives_remaining = self.player.lives_remaining;
        debug!(%adversary, %cell, lives_remaining, "player caught");
        out_events.push(Event::PlayerCaught {
            adversary,
            cell,
            lives_remaining,
        });

        if lives_remaining == 0 {
            info!("player ran out of lives; discarding run");
            out_events.push(Event::RunLost);
            self.set_phase(Phase::Idle, out_events);
            self.discard_session();
            return;
        }

        self.player.cell = START_CELL;
        out_events.push(Event::PlayerRespawned { cell: START_CELL });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession { seed } => world.start_session(seed, out_events),
        Command::AdvanceIntro => {
            if world.phase == Phase::Intro {
                world.intro_step = world.intro_step.saturating_add(1);
                out_events.push(Event::IntroAdvanced {
                    step: world.intro_step,
                });
            }
        }
        Command::BeginCollecting => {
            if world.phase == Phase::Intro {
                world.enter_collecting(out_events);
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StepPlayer { direction } => {
            if world.phase == Phase::Collecting {
                world.step_player(direction, out_events);
            }
        }
        Command::StepAdversary {
            adversary,
            direction,
        } => {
            if world.phase == Phase::Collecting {
                world.step_adversary(adversary, direction, out_events);
            }
        }
        Command::PublishTally => {
            if world.phase == Phase::Complete && !world.tally_published {
                world.tally_published = true;
                info!(total = world.tally.total(), "tally handed off");
                out_events.push(Event::TallyPublished { tally: world.tally });
            }
        }
        Command::Abandon => {
            if world.phase != Phase::Idle {
                world.set_phase(Phase::Idle, out_events);
                world.discard_session();
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use percent_maze_core::{
        AdversarySnapshot, AdversaryView, CellCoord, EntitySnapshot, EntityView, Phase,
        PlayerSnapshot, SessionConfig, Tally, WallView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world runs sessions with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Phase the session is currently in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Seed of the running session, if one is running.
    #[must_use]
    pub fn seed(world: &World) -> Option<u64> {
        world.seed
    }

    /// Side length of the square grid.
    #[must_use]
    pub fn grid_size(world: &World) -> u32 {
        world.walls.side()
    }

    /// Exposes a read-only view of the wall grid.
    #[must_use]
    pub fn wall_view(world: &World) -> WallView<'_> {
        world.walls.view()
    }

    /// Reports whether `cell` is impassable.
    #[must_use]
    pub fn is_wall(world: &World, cell: CellCoord) -> bool {
        world.walls.is_wall(cell)
    }

    /// Captures a read-only view of the collectibles still on the grid.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(
            world
                .entities
                .iter()
                .map(|entity| EntitySnapshot {
                    id: entity.id,
                    category: entity.category,
                    cell: entity.cell,
                    tag: entity.category.glyph(),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the adversaries.
    #[must_use]
    pub fn adversary_view(world: &World) -> AdversaryView {
        AdversaryView::from_snapshots(
            world
                .adversaries
                .iter()
                .map(|adversary| AdversarySnapshot {
                    id: adversary.id,
                    cell: adversary.cell,
                    facing: adversary.facing,
                })
                .collect(),
        )
    }

    /// Snapshot of the player's position and lives.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            lives_remaining: world.player.lives_remaining,
            max_lives: world.config.max_lives,
        }
    }

    /// Counts collected so far in the running session.
    #[must_use]
    pub fn tally(world: &World) -> Tally {
        world.tally
    }

    /// Number of collectibles placed for the running session.
    #[must_use]
    pub fn target_total(world: &World) -> u32 {
        world.target_total
    }

    /// Zero-based index of the intro step currently displayed.
    #[must_use]
    pub fn intro_step(world: &World) -> u32 {
        world.intro_step
    }

    /// Number of ticks the world has observed since it was created.
    #[must_use]
    pub fn tick_count(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the completed session's tally was already handed off.
    #[must_use]
    pub fn tally_published(world: &World) -> bool {
        world.tally_published
    }
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    id: EntityId,
    category: Category,
    cell: CellCoord,
}

#[derive(Clone, Copy, Debug)]
struct Adversary {
    id: AdversaryId,
    cell: CellCoord,
    facing: Direction,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    lives_remaining: u32,
}

impl Player {
    const fn fresh(max_lives: u32) -> Self {
        Self {
            cell: START_CELL,
            lives_remaining: max_lives,
        }
    }
}
