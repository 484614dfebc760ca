//! Flood fill used to validate generated mazes.

use std::collections::VecDeque;

use percent_maze_core::{CellCoord, Direction};

use crate::maze::WallGrid;

/// Open cells that can be walked to from an origin.
#[derive(Clone, Debug)]
pub(crate) struct Reachable {
    side: u32,
    visited: Vec<bool>,
}

impl Reachable {
    /// Visits every open cell connected to `origin` through 4-neighbour steps.
    ///
    /// A walled origin reaches nothing.
    pub(crate) fn flood(walls: &WallGrid, origin: CellCoord) -> Self {
        let side = walls.side();
        let mut reachable = Self {
            side,
            visited: vec![false; walls.cell_count()],
        };
        if walls.is_wall(origin) {
            return reachable;
        }

        let mut queue = VecDeque::from([origin]);
        reachable.mark(origin);
        while let Some(cell) = queue.pop_front() {
            for direction in Direction::ALL {
                let next = cell.step_clamped(direction, side);
                if walls.is_wall(next) || reachable.contains(next) {
                    continue;
                }
                reachable.mark(next);
                queue.push_back(next);
            }
        }
        reachable
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.slot(cell)
            .and_then(|slot| self.visited.get(slot).copied())
            .unwrap_or(false)
    }

    /// Open cells of `walls` the flood never reached.
    pub(crate) fn pockets(&self, walls: &WallGrid) -> Vec<CellCoord> {
        walls
            .open_cells()
            .filter(|cell| !self.contains(*cell))
            .collect()
    }

    fn mark(&mut self, cell: CellCoord) {
        if let Some(visited) = self.slot(cell).and_then(|slot| self.visited.get_mut(slot)) {
            *visited = true;
        }
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.side || cell.row() >= self.side {
            return None;
        }
        let width = usize::try_from(self.side).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * width + column)
    }
}
