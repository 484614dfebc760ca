//! Grid and wall generation.

use percent_maze_core::{CellCoord, SessionConfig, WallView, START_CELL};
use rand::Rng;
use tracing::{debug, warn};

use crate::reachability::Reachable;

/// Number of fresh layouts tried before unreachable pockets are sealed.
const MAX_REGENERATIONS: u32 = 16;

/// Side of the square region next to the start kept open in sparse mode.
const SPARSE_CLEARING: u32 = 4;

/// Dense row-major wall grid owned by a session.
#[derive(Clone, Debug)]
pub(crate) struct WallGrid {
    side: u32,
    cells: Vec<bool>,
}

impl WallGrid {
    /// Grid of the provided side length without any walls.
    pub(crate) fn empty(side: u32) -> Self {
        let capacity_u64 = u64::from(side) * u64::from(side);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            side,
            cells: vec![false; capacity],
        }
    }

    pub(crate) const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether `cell` is impassable. Cells outside the grid count as walls.
    pub(crate) fn is_wall(&self, cell: CellCoord) -> bool {
        self.view().is_wall(cell)
    }

    pub(crate) fn view(&self) -> WallView<'_> {
        WallView::new(&self.cells, self.side)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn count(&self) -> u32 {
        u32::try_from(self.view().count()).unwrap_or(u32::MAX)
    }

    /// Every non-wall cell in row-major order.
    pub(crate) fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.side).flat_map(move |row| {
            (0..self.side)
                .map(move |column| CellCoord::new(column, row))
                .filter(move |cell| !self.is_wall(*cell))
        })
    }

    pub(crate) fn set(&mut self, cell: CellCoord, wall: bool) {
        if cell.column() >= self.side || cell.row() >= self.side {
            return;
        }
        let Ok(row) = usize::try_from(cell.row()) else {
            return;
        };
        let Ok(column) = usize::try_from(cell.column()) else {
            return;
        };
        let Ok(width) = usize::try_from(self.side) else {
            return;
        };
        if let Some(slot) = self.cells.get_mut(row * width + column) {
            *slot = wall;
        }
    }
}

/// Generates the walls for a new session.
///
/// The border is always solid, interior walls sit on the configured lattice,
/// and the start cell is always open. With `ensure_reachable` the layout is
/// regenerated until every open cell can be reached from the start; if the
/// attempts run out the remaining pockets are filled in.
pub(crate) fn generate<R: Rng>(config: &SessionConfig, rng: &mut R) -> WallGrid {
    if !config.ensure_reachable {
        return generate_lattice(config, rng);
    }
    generate_connected(|| generate_lattice(config, rng))
}

/// Draws layouts from `layout` until one has no pockets, sealing the last one.
fn generate_connected<F>(mut layout: F) -> WallGrid
where
    F: FnMut() -> WallGrid,
{
    let mut attempt = 1;
    loop {
        let mut walls = layout();
        let pockets = Reachable::flood(&walls, START_CELL).pockets(&walls);
        if pockets.is_empty() {
            return walls;
        }

        if attempt >= MAX_REGENERATIONS {
            let sealed = seal_pockets(&mut walls);
            warn!(
                sealed,
                attempts = attempt,
                "sealing unreachable cells after exhausting maze regenerations"
            );
            return walls;
        }

        debug!(
            pockets = pockets.len(),
            attempt, "regenerating maze with unreachable cells"
        );
        attempt += 1;
    }
}

/// Turns every open cell that cannot be reached from the start into a wall.
///
/// Returns the number of cells sealed.
pub(crate) fn seal_pockets(walls: &mut WallGrid) -> usize {
    let pockets = Reachable::flood(walls, START_CELL).pockets(walls);
    for &cell in &pockets {
        walls.set(cell, true);
    }
    pockets.len()
}

fn generate_lattice<R: Rng>(config: &SessionConfig, rng: &mut R) -> WallGrid {
    let side = config.grid_size;
    let stride = config.lattice_stride.max(2);
    let probability = if config.sparse_obstacles {
        config.wall_probability / 2.0
    } else {
        config.wall_probability
    }
    .clamp(0.0, 1.0);

    let mut walls = WallGrid::empty(side);
    for row in 0..side {
        for column in 0..side {
            let cell = CellCoord::new(column, row);
            let wall = if cell.is_border(side) {
                true
            } else if column % stride == 0 && row % stride == 0 {
                rng.gen_bool(probability)
            } else {
                false
            };
            walls.set(cell, wall);
        }
    }

    if config.sparse_obstacles {
        for row in 1..=SPARSE_CLEARING {
            for column in 1..=SPARSE_CLEARING {
                let cell = CellCoord::new(column, row);
                if !cell.is_border(side) {
                    walls.set(cell, false);
                }
            }
        }
    }
    walls.set(START_CELL, false);

    walls
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dense_config(side: u32) -> SessionConfig {
        SessionConfig {
            grid_size: side,
            wall_probability: 1.0,
            lattice_stride: 3,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn border_is_solid_and_start_is_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let walls = generate(&dense_config(20), &mut rng);

        for index in 0..20 {
            assert!(walls.is_wall(CellCoord::new(index, 0)));
            assert!(walls.is_wall(CellCoord::new(index, 19)));
            assert!(walls.is_wall(CellCoord::new(0, index)));
            assert!(walls.is_wall(CellCoord::new(19, index)));
        }
        assert!(!walls.is_wall(START_CELL));
    }

    #[test]
    fn interior_walls_stay_on_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let walls = generate(&dense_config(16), &mut rng);

        for cell in walls.view().iter() {
            if cell.is_border(16) {
                continue;
            }
            assert_eq!(cell.column() % 3, 0, "{cell} is off the lattice");
            assert_eq!(cell.row() % 3, 0, "{cell} is off the lattice");
        }
        // With probability 1.0 every interior lattice point is a wall.
        assert!(walls.is_wall(CellCoord::new(3, 3)));
        assert!(walls.is_wall(CellCoord::new(12, 9)));
    }

    #[test]
    fn zero_probability_leaves_only_the_border() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = SessionConfig {
            grid_size: 10,
            wall_probability: 0.0,
            ..SessionConfig::default()
        };
        let walls = generate(&config, &mut rng);
        assert_eq!(walls.count(), 4 * 10 - 4);
    }

    #[test]
    fn sparse_mode_clears_region_near_start() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = SessionConfig {
            grid_size: 20,
            sparse_obstacles: true,
            lattice_stride: 2,
            wall_probability: 1.0,
            ..SessionConfig::default()
        };
        let walls = generate(&config, &mut rng);

        for row in 1..=SPARSE_CLEARING {
            for column in 1..=SPARSE_CLEARING {
                assert!(!walls.is_wall(CellCoord::new(column, row)));
            }
        }
    }

    /// 7x7 grid with a solid border and a walled ring around (4, 4).
    fn grid_with_pocket() -> WallGrid {
        let mut walls = WallGrid::empty(7);
        for index in 0..7 {
            walls.set(CellCoord::new(index, 0), true);
            walls.set(CellCoord::new(index, 6), true);
            walls.set(CellCoord::new(0, index), true);
            walls.set(CellCoord::new(6, index), true);
        }
        for cell in [(3, 4), (5, 4), (4, 3), (4, 5)] {
            walls.set(CellCoord::new(cell.0, cell.1), true);
        }
        walls
    }

    fn assert_fully_reachable(walls: &WallGrid) {
        let pockets = Reachable::flood(walls, START_CELL).pockets(walls);
        assert!(pockets.is_empty(), "unreachable cells: {pockets:?}");
    }

    #[test]
    fn seal_pockets_walls_off_enclosed_cells() {
        let mut walls = grid_with_pocket();
        let enclosed = CellCoord::new(4, 4);
        assert!(!walls.is_wall(enclosed));

        assert_eq!(seal_pockets(&mut walls), 1);
        assert!(walls.is_wall(enclosed));
        assert!(!walls.is_wall(START_CELL));
        assert_fully_reachable(&walls);

        assert_eq!(seal_pockets(&mut walls), 0);
    }

    #[test]
    fn regeneration_stops_at_first_connected_layout() {
        let mut calls = 0_u32;
        let walls = generate_connected(|| {
            calls += 1;
            if calls < 3 {
                grid_with_pocket()
            } else {
                WallGrid::empty(7)
            }
        });

        assert_eq!(calls, 3);
        assert_eq!(walls.count(), 0);
    }

    #[test]
    fn regeneration_gives_up_and_seals_after_cap() {
        let mut calls = 0_u32;
        let walls = generate_connected(|| {
            calls += 1;
            grid_with_pocket()
        });

        assert_eq!(calls, MAX_REGENERATIONS);
        assert!(walls.is_wall(CellCoord::new(4, 4)));
        assert_fully_reachable(&walls);
    }

    #[test]
    fn generated_layouts_are_fully_reachable() {
        let config = SessionConfig {
            grid_size: 15,
            lattice_stride: 2,
            wall_probability: 0.9,
            ..SessionConfig::default()
        };
        for seed in 0..20 {
            let walls = generate(&config, &mut ChaCha8Rng::seed_from_u64(seed));
            assert_fully_reachable(&walls);
        }
    }

    #[test]
    fn same_seed_produces_same_layout() {
        let config = SessionConfig::default();
        let first = generate(&config, &mut ChaCha8Rng::seed_from_u64(42));
        let second = generate(&config, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(first.cells, second.cells);
    }
}
