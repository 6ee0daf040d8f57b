use std::fmt;

use tracing::trace;

use crate::error::{MoveError, UndoError};
use crate::types::{Cell, Mark};

pub const BOARD_SIZE: usize = 3;
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;
pub const CENTER: usize = 4;

/// Rows top-to-bottom, columns left-to-right, then the two diagonals.
/// Win reporting and the heuristic's first-match scan depend on this order.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 board with its turn marker and the log of applied moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
    turn: Mark,
    move_log: Vec<usize>,
}

impl Board {
    /// Creates an empty board with X to move.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; NUM_CELLS],
            turn: Mark::X,
            move_log: Vec::with_capacity(NUM_CELLS),
        }
    }

    /// Builds a board by replaying `moves` from the empty position, alternating from X.
    pub fn from_moves(moves: &[usize]) -> Result<Self, MoveError> {
        let mut board = Self::new();
        for &index in moves {
            board.apply_move(index, board.turn)?;
        }
        Ok(board)
    }

    /// Places `mark` at `index`. Rejected moves leave the board unchanged.
    pub fn apply_move(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        if index >= NUM_CELLS {
            return Err(MoveError::IndexOutOfRange { index });
        }
        if self.is_terminal() {
            return Err(MoveError::GameAlreadyOver);
        }
        if !self.cells[index].is_empty() {
            return Err(MoveError::CellOccupied { index });
        }
        if mark != self.turn {
            return Err(MoveError::OutOfTurn {
                expected: self.turn,
                got: mark,
            });
        }

        self.place(index, mark);
        trace!(index, %mark, "move applied");
        Ok(())
    }

    /// Takes back the most recent move and returns the cleared index.
    /// Only permitted while the game is still in progress.
    pub fn undo_last(&mut self) -> Result<usize, UndoError> {
        if self.move_log.is_empty() {
            return Err(UndoError::NoMovesToUndo);
        }
        if self.is_terminal() {
            return Err(UndoError::GameAlreadyOver);
        }

        let index = self.retract();
        trace!(index, "move undone");
        Ok(index)
    }

    /// Returns the first complete line in [`WIN_LINES`] order.
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        WIN_LINES.iter().copied().find(|&[a, b, c]| {
            !self.cells[a].is_empty()
                && self.cells[a] == self.cells[b]
                && self.cells[a] == self.cells[c]
        })
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winning_line().and_then(|[a, _, _]| self.cells[a].mark())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Empty cell indices in ascending order.
    pub fn legal_moves(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    /// Clears the board back to the starting position.
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; NUM_CELLS];
        self.turn = Mark::X;
        self.move_log.clear();
    }

    pub fn cells(&self) -> &[Cell; NUM_CELLS] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn move_log(&self) -> &[usize] {
        &self.move_log
    }

    pub fn last_move(&self) -> Option<usize> {
        self.move_log.last().copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.move_log.len()
    }

    /// Converts cells to `[Option<Mark>; 9]` for serialization.
    pub fn to_array(&self) -> [Option<Mark>; NUM_CELLS] {
        self.cells.map(Cell::mark)
    }

    /// Unchecked placement for search on a scratch board.
    /// Caller contract: `index` is in range and empty.
    pub(crate) fn place(&mut self, index: usize, mark: Mark) {
        debug_assert!(
            self.cells[index].is_empty(),
            "place() on occupied cell {index}"
        );
        self.cells[index] = Cell::Occupied(mark);
        self.move_log.push(index);
        self.turn = turn_for_ply(self.move_log.len());
    }

    /// Unchecked inverse of [`Board::place`]; also works on terminal boards.
    /// Caller contract: the log is non-empty.
    pub(crate) fn retract(&mut self) -> usize {
        let index = self
            .move_log
            .pop()
            .unwrap_or_else(|| unreachable!("retract() called on an empty board"));
        self.cells[index] = Cell::Empty;
        self.turn = turn_for_ply(self.move_log.len());
        index
    }
}

/// X moves on even plies, O on odd ones, whatever mark was placed.
fn turn_for_ply(ply: usize) -> Mark {
    if ply % 2 == 0 { Mark::X } else { Mark::O }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Renders as `X|O|.` rows separated by newlines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(BOARD_SIZE).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, cell) in cells.iter().enumerate() {
                if col > 0 {
                    f.write_str("|")?;
                }
                match cell {
                    Cell::Empty => f.write_str(".")?,
                    Cell::Occupied(mark) => write!(f, "{mark}")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn board_from_str(layout: &str) -> Board {
    // Test helper: 9 chars of X/O/_ in row-major order; whitespace and '/' ignored.
    // Marks are placed X-first alternately so the turn invariant holds.
    let chars: Vec<char> = layout
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/')
        .collect();
    assert_eq!(chars.len(), NUM_CELLS, "layout must have 9 cells: {layout}");
    let mut xs: Vec<usize> = Vec::new();
    let mut os: Vec<usize> = Vec::new();
    for (index, c) in chars.iter().enumerate() {
        match c {
            'X' => xs.push(index),
            'O' => os.push(index),
            '_' | '.' => {}
            other => panic!("unexpected layout character {other:?}"),
        }
    }
    assert!(
        xs.len() == os.len() || xs.len() == os.len() + 1,
        "layout has impossible mark counts: {layout}"
    );
    let mut board = Board::new();
    let mut os = os.into_iter();
    for x in xs {
        board.place(x, Mark::X);
        if let Some(o) = os.next() {
            board.place(o, Mark::O);
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_empty_with_x_to_move() {
        let board = Board::new();

        assert_eq!(board.turn(), Mark::X);
        assert_eq!(board.legal_moves(), (0..9).collect::<Vec<_>>());
        assert_eq!(board.winning_line(), None);
        assert!(!board.is_terminal());
    }

    #[test]
    fn apply_move_places_mark_and_flips_turn() {
        let mut board = Board::new();

        board.apply_move(4, Mark::X).unwrap();

        assert_eq!(board.cell(4), Some(Cell::Occupied(Mark::X)));
        assert_eq!(board.turn(), Mark::O);
        assert_eq!(board.move_log(), &[4]);
        assert_eq!(board.legal_moves(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn rejected_moves_keep_board_unchanged() {
        let mut board = Board::from_moves(&[0]).unwrap();
        let before = board.clone();

        assert_eq!(
            board.apply_move(9, Mark::O),
            Err(MoveError::IndexOutOfRange { index: 9 })
        );
        assert_eq!(
            board.apply_move(0, Mark::O),
            Err(MoveError::CellOccupied { index: 0 })
        );
        assert_eq!(
            board.apply_move(1, Mark::X),
            Err(MoveError::OutOfTurn {
                expected: Mark::O,
                got: Mark::X,
            })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn moves_after_a_win_are_rejected() {
        // X: 0,1,2 ; O: 3,4
        let mut board = Board::from_moves(&[0, 3, 1, 4, 2]).unwrap();

        assert_eq!(board.winner(), Some(Mark::X));
        assert_eq!(board.apply_move(5, Mark::O), Err(MoveError::GameAlreadyOver));
    }

    #[test]
    fn undo_restores_cell_and_turn() {
        let mut board = Board::from_moves(&[4, 0]).unwrap();

        assert_eq!(board.undo_last(), Ok(0));
        assert_eq!(board.cell(0), Some(Cell::Empty));
        assert_eq!(board.turn(), Mark::O);
        assert_eq!(board.move_log(), &[4]);
    }

    #[test]
    fn undo_rejects_empty_and_finished_games() {
        let mut empty = Board::new();
        assert_eq!(empty.undo_last(), Err(UndoError::NoMovesToUndo));

        let mut won = Board::from_moves(&[0, 3, 1, 4, 2]).unwrap();
        let before = won.clone();
        assert_eq!(won.undo_last(), Err(UndoError::GameAlreadyOver));
        assert_eq!(won, before);
    }

    #[test]
    fn undo_then_reapply_round_trips() {
        let mut board = Board::from_moves(&[4, 0, 8]).unwrap();
        let before = board.clone();

        let index = board.undo_last().unwrap();
        board.apply_move(index, Mark::X).unwrap();

        assert_eq!(board, before);
    }

    #[test]
    fn winning_line_reports_first_line_in_declared_order() {
        // Row 0 and column 0 both complete; only reachable via raw placement.
        let mut board = Board::new();
        for index in [0, 1, 2, 3, 6] {
            board.cells[index] = Cell::Occupied(Mark::X);
        }

        assert_eq!(board.winning_line(), Some([0, 1, 2]));
    }

    #[test]
    fn diagonal_win_is_detected() {
        let board = board_from_str("O X X / _ X O / X _ O");

        assert_eq!(board.winning_line(), Some([2, 4, 6]));
        assert_eq!(board.winner(), Some(Mark::X));
        assert!(board.is_terminal());
        assert!(!board.is_draw());
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let board = board_from_str("X O X / X O O / O X X");

        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
        assert!(board.is_terminal());
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn win_on_last_cell_is_not_a_draw() {
        let board = board_from_str("X O X / O X O / O X X");

        assert!(board.is_full());
        assert_eq!(board.winner(), Some(Mark::X));
        assert!(!board.is_draw());
    }

    #[test]
    fn reset_clears_everything() {
        let mut board = Board::from_moves(&[4, 0, 8]).unwrap();

        board.reset();

        assert_eq!(board, Board::new());
    }

    #[test]
    fn place_and_retract_work_past_terminal_states() {
        let mut board = board_from_str("X X _ / O O _ / _ _ _");

        board.place(2, Mark::X);
        assert!(board.is_terminal());
        assert_eq!(board.retract(), 2);
        assert_eq!(board.turn(), Mark::X);
        assert!(!board.is_terminal());
    }

    #[test]
    fn place_and_retract_restore_turn_for_the_side_not_on_move() {
        let mut board = board_from_str("X O X / O X O / _ _ _");
        let before = board.clone();

        board.place(6, Mark::O);
        assert_eq!(board.turn(), Mark::O);
        board.retract();

        assert_eq!(board, before);
        assert_eq!(board.turn(), Mark::X);
    }

    #[test]
    fn last_move_tracks_the_log() {
        let mut board = Board::new();
        assert_eq!(board.last_move(), None);

        board.apply_move(4, Mark::X).unwrap();
        board.apply_move(0, Mark::O).unwrap();
        assert_eq!(board.last_move(), Some(0));

        board.undo_last().unwrap();
        assert_eq!(board.last_move(), Some(4));
    }

    #[test]
    fn display_renders_rows() {
        let board = Board::from_moves(&[0, 4]).unwrap();

        assert_eq!(board.to_string(), "X|.|.\n.|O|.\n.|.|.");
    }
}
