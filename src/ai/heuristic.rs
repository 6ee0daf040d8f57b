//! One-ply rule-based play: win if possible, otherwise block, otherwise
//! take the centre, otherwise play randomly. Double threats are not
//! anticipated.

use rand::Rng;
use tracing::trace;

use crate::ai::pick_uniform;
use crate::board::{Board, CENTER, WIN_LINES};
use crate::types::{Cell, Mark};

pub fn select<R: Rng + ?Sized>(board: &Board, mark: Mark, rng: &mut R) -> Option<usize> {
    if let Some(index) = completing_move(board, mark) {
        trace!(index, "heuristic: win");
        return Some(index);
    }
    if let Some(index) = completing_move(board, mark.opponent()) {
        trace!(index, "heuristic: block");
        return Some(index);
    }
    if board.cell(CENTER) == Some(Cell::Empty) {
        return Some(CENTER);
    }
    pick_uniform(rng, &board.legal_moves())
}

/// Empty cell of the first line (in [`WIN_LINES`] order) holding two of `mark` and one empty.
pub fn completing_move(board: &Board, mark: Mark) -> Option<usize> {
    let cells = board.cells();
    WIN_LINES.iter().find_map(|line| {
        let mut owned = 0;
        let mut empty = None;
        for &index in line {
            match cells[index] {
                Cell::Empty => empty = Some(index),
                Cell::Occupied(m) if m == mark => owned += 1,
                Cell::Occupied(_) => return None,
            }
        }
        if owned == 2 { empty } else { None }
    })
}
