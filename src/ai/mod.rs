//! Automated-player move selection.
//!
//! [`DecisionEngine`] dispatches on [`Difficulty`]:
//! - `Random`: uniform over legal moves.
//! - `Heuristic`: win, else block, else centre, else random ([`heuristic`]).
//! - `Optimal`: exhaustive minimax ([`search`]).

pub mod heuristic;
pub mod search;

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use web_time::SystemTime;

use crate::board::Board;
use crate::error::ParseDifficultyError;
use crate::types::Mark;

use self::search::Searcher;

/// Serializes as the lowercase tier name; deserializes through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Random,
    Heuristic,
    #[default]
    Optimal,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Random => "random",
            Difficulty::Heuristic => "heuristic",
            Difficulty::Optimal => "optimal",
        })
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(Difficulty::Random),
            "heuristic" | "medium" => Ok(Difficulty::Heuristic),
            "optimal" | "hard" => Ok(Difficulty::Optimal),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = ParseDifficultyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Chooses a cell for `mark` on `board`. Returns `None` when no cell is free.
pub trait MoveSelector: Send + Sync {
    fn select_move(&mut self, board: &Board, mark: Mark, difficulty: Difficulty)
    -> Option<usize>;
}

/// The default selector: three difficulty tiers sharing one random source.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    rng: StdRng,
}

impl DecisionEngine {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(clock_seed);
        debug!(seed, "decision engine seeded");
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform choice over the legal moves.
    pub fn random_move(&mut self, board: &Board) -> Option<usize> {
        pick_uniform(&mut self.rng, &board.legal_moves())
    }

    pub fn heuristic_move(&mut self, board: &Board, mark: Mark) -> Option<usize> {
        heuristic::select(board, mark, &mut self.rng)
    }

    pub fn optimal_move(&self, board: &Board, mark: Mark) -> Option<usize> {
        Searcher::new(mark).search(board)
    }
}

impl MoveSelector for DecisionEngine {
    #[instrument(level = "debug", skip(self, board), fields(board = %board), ret)]
    fn select_move(&mut self, board: &Board, mark: Mark, difficulty: Difficulty) -> Option<usize> {
        match difficulty {
            Difficulty::Random => self.random_move(board),
            Difficulty::Heuristic => self.heuristic_move(board, mark),
            Difficulty::Optimal => self.optimal_move(board, mark),
        }
    }
}

pub(crate) fn pick_uniform<R: Rng + ?Sized>(rng: &mut R, moves: &[usize]) -> Option<usize> {
    if moves.is_empty() {
        None
    } else {
        Some(moves[rng.random_range(0..moves.len())])
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::board_from_str;

    #[test]
    fn difficulty_parses_tier_names_and_legacy_labels() {
        assert_eq!("random".parse::<Difficulty>().unwrap(), Difficulty::Random);
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Heuristic);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Optimal);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_deserializes_like_it_parses() {
        use serde::de::IntoDeserializer;
        use serde::de::value::{Error, StrDeserializer};

        let de: StrDeserializer<'_, Error> = "Medium".into_deserializer();
        assert_eq!(Difficulty::deserialize(de).unwrap(), Difficulty::Heuristic);

        let de: StrDeserializer<'_, Error> = "impossible".into_deserializer();
        assert!(Difficulty::deserialize(de).is_err());
    }

    #[test]
    fn optimal_tier_can_answer_for_the_side_not_on_move() {
        let mut engine = DecisionEngine::new(Some(1));
        let crowded = Board::from_moves(&[0, 1, 2, 3, 4, 5]).unwrap();
        let empty = Board::new();

        assert_eq!(crowded.turn(), Mark::X);
        assert_eq!(engine.select_move(&crowded, Mark::O, Difficulty::Optimal), Some(6));
        assert_eq!(engine.select_move(&empty, Mark::O, Difficulty::Optimal), Some(0));
    }

    #[test]
    fn every_tier_returns_none_on_a_full_board() {
        let board = board_from_str("X O X / X O O / O X X");
        let mut engine = DecisionEngine::new(Some(1));

        for difficulty in [
            Difficulty::Random,
            Difficulty::Heuristic,
            Difficulty::Optimal,
        ] {
            assert_eq!(engine.select_move(&board, Mark::O, difficulty), None);
        }
    }

    #[test]
    fn random_tier_only_picks_empty_cells() {
        let board = board_from_str("X O X / _ O _ / _ X _");
        let legal = board.legal_moves();
        let mut engine = DecisionEngine::new(Some(7));

        for _ in 0..50 {
            let mv = engine.select_move(&board, Mark::X, Difficulty::Random).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn random_tier_is_reproducible_for_a_fixed_seed() {
        let board = Board::new();
        let mut first = DecisionEngine::new(Some(42));
        let mut second = DecisionEngine::new(Some(42));

        let a: Vec<_> = (0..10).map(|_| first.random_move(&board)).collect();
        let b: Vec<_> = (0..10).map(|_| second.random_move(&board)).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn random_tier_eventually_covers_every_legal_move() {
        let board = board_from_str("X _ _ / _ O _ / _ _ _");
        let mut engine = DecisionEngine::new(Some(3));
        let mut seen = [false; 9];

        for _ in 0..500 {
            seen[engine.random_move(&board).unwrap()] = true;
        }

        for index in board.legal_moves() {
            assert!(seen[index], "cell {index} never chosen");
        }
    }
}
