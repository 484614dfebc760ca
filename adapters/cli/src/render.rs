//! ASCII board rendering.

use std::fmt::Write as _;

use percent_maze_core::{CellCoord, Phase};
use percent_maze_world::{query, World};

const WALL: char = '#';
const FLOOR: char = '.';
const PLAYER: char = '@';
const ADVERSARY: char = 'X';

/// Draws the board followed by a status line.
pub(crate) fn board(world: &World) -> String {
    let side = query::grid_size(world);
    let walls = query::wall_view(world);
    let entities = query::entity_view(world);
    let adversaries = query::adversary_view(world);
    let player = query::player(world);
    let show_actors = matches!(query::phase(world), Phase::Collecting | Phase::Complete);

    let mut output = String::new();
    for row in 0..side {
        for column in 0..side {
            let cell = CellCoord::new(column, row);
            let glyph = if walls.is_wall(cell) {
                WALL
            } else if show_actors && cell == player.cell {
                PLAYER
            } else if show_actors && adversaries.iter().any(|adversary| adversary.cell == cell) {
                ADVERSARY
            } else if let Some(entity) = entities.at(cell) {
                entity.tag
            } else {
                FLOOR
            };
            output.push(glyph);
        }
        output.push('\n');
    }

    output.push_str(&status_line(world));
    output
}

/// One-line summary of phase, lives, and progress.
pub(crate) fn status_line(world: &World) -> String {
    let player = query::player(world);
    let tally = query::tally(world);

    let mut line = format!(
        "{:?} | lives {}/{} | collected {}/{}",
        query::phase(world),
        player.lives_remaining,
        player.max_lives,
        tally.total(),
        query::target_total(world),
    );
    for (category, count) in tally.iter() {
        let _ = write!(line, " | {} {count}", category.label());
    }
    line.push('\n');
    line
}
