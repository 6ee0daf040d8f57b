use tracing::debug;
use web_time::Instant;

use crate::board::Board;
use crate::types::Mark;

const WIN_SCORE: i32 = 10;
const LOSS_SCORE: i32 = -10;
const DRAW_SCORE: i32 = 0;

/// Exhaustive minimax for one side.
///
/// Scores are from `me`'s perspective and carry no depth discount, so a
/// slow win and a fast win compare equal.
pub struct Searcher {
    me: Mark,
    nodes: u64,
}

impl Searcher {
    pub fn new(me: Mark) -> Self {
        Self { me, nodes: 0 }
    }

    /// Searches the best move for `me`.
    /// Ties go to the smallest index. Returns `None` when no cell is free.
    pub fn search(&mut self, board: &Board) -> Option<usize> {
        let start = Instant::now();
        let best = self
            .score_moves(board)
            .into_iter()
            .fold(None, |best: Option<(usize, i32)>, (mv, score)| {
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    Some((mv, score))
                } else {
                    best
                }
            });

        debug!(
            me = %self.me,
            best = ?best,
            nodes = self.nodes,
            elapsed = ?start.elapsed(),
            "minimax search finished"
        );
        best.map(|(mv, _)| mv)
    }

    /// Minimax value of every legal move for `me`, in ascending index order.
    pub fn score_moves(&mut self, board: &Board) -> Vec<(usize, i32)> {
        self.nodes = 0;
        // The scratch copy is exclusively borrowed by this call for the whole search.
        let mut scratch = board.clone();
        let scores = scratch
            .legal_moves()
            .into_iter()
            .map(|mv| {
                scratch.place(mv, self.me);
                let score = self.minimax(&mut scratch, false);
                scratch.retract();
                (mv, score)
            })
            .collect();

        debug_assert_eq!(&scratch, board, "search must restore the scratch board");
        scores
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn minimax(&mut self, scratch: &mut Board, maximizing: bool) -> i32 {
        self.nodes += 1;

        if let Some(score) = self.terminal_score(scratch) {
            return score;
        }

        let (mark, mut best) = if maximizing {
            (self.me, i32::MIN)
        } else {
            (self.me.opponent(), i32::MAX)
        };

        for mv in scratch.legal_moves() {
            scratch.place(mv, mark);
            let score = self.minimax(scratch, !maximizing);
            scratch.retract();

            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }

        best
    }

    fn terminal_score(&self, board: &Board) -> Option<i32> {
        match board.winner() {
            Some(mark) if mark == self.me => Some(WIN_SCORE),
            Some(_) => Some(LOSS_SCORE),
            None if board.is_full() => Some(DRAW_SCORE),
            None => None,
        }
    }
}
