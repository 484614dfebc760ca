//! Entity placement: collectible distribution and free-cell sampling.

use std::collections::HashSet;

use percent_maze_core::{CellCoord, Category, Distribution, START_CELL};
use rand::{seq::SliceRandom, Rng};

use crate::maze::WallGrid;

/// Expands the configured distribution into one category per collectible.
///
/// Presets are chosen uniformly from the menu and expanded in category order;
/// the uniform mode draws the total and then a category for every entity.
pub(crate) fn collectible_categories<R: Rng>(
    distribution: &Distribution,
    rng: &mut R,
) -> Vec<Category> {
    match distribution {
        Distribution::Presets { menu } => {
            let Some(preset) = menu.choose(rng) else {
                return Vec::new();
            };
            Category::ALL
                .iter()
                .zip(preset.counts.iter())
                .flat_map(|(category, count)| {
                    std::iter::repeat(*category).take(usize::try_from(*count).unwrap_or(0))
                })
                .collect()
        }
        Distribution::UniformRandom { min, max } => {
            let total = if min <= max {
                rng.gen_range(*min..=*max)
            } else {
                *max
            };
            (0..total)
                .map(|_| Category::ALL[rng.gen_range(0..Category::ALL.len())])
                .collect()
        }
    }
}

/// Hands out distinct open cells for collectibles and adversaries.
///
/// Cells are drawn by rejection sampling over the interior. Once the attempt
/// cap is spent the placer falls back to a uniform choice among the free cells
/// that remain, so placements never overlap. `None` means the grid is full.
#[derive(Debug)]
pub(crate) struct Placer<'a> {
    walls: &'a WallGrid,
    occupied: HashSet<CellCoord>,
    attempts: u32,
}

impl<'a> Placer<'a> {
    pub(crate) fn new(walls: &'a WallGrid, attempts: u32) -> Self {
        let mut occupied = HashSet::new();
        let _ = occupied.insert(START_CELL);
        Self {
            walls,
            occupied,
            attempts: attempts.max(1),
        }
    }

    pub(crate) fn place<R: Rng>(&mut self, rng: &mut R) -> Option<CellCoord> {
        let side = self.walls.side();
        if side < 3 {
            return None;
        }

        for _ in 0..self.attempts {
            let cell = CellCoord::new(rng.gen_range(1..side - 1), rng.gen_range(1..side - 1));
            if self.is_free(cell) {
                return Some(self.claim(cell));
            }
        }

        let free: Vec<CellCoord> = self
            .walls
            .open_cells()
            .filter(|cell| self.is_free(*cell))
            .collect();
        let cell = free.choose(rng).copied()?;
        Some(self.claim(cell))
    }

    fn is_free(&self, cell: CellCoord) -> bool {
        !self.walls.is_wall(cell) && !self.occupied.contains(&cell)
    }

    fn claim(&mut self, cell: CellCoord) -> CellCoord {
        let _ = self.occupied.insert(cell);
        cell
    }
}
