//! Error types for board, engine and session operations.
//!
//! Every variant is a caller-contract violation: the rejected operation leaves
//! state untouched.

use thiserror::Error;

use crate::types::Mark;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell {index} is out of range (must be 0-8)")]
    IndexOutOfRange { index: usize },

    #[error("game already over")]
    GameAlreadyOver,

    #[error("cell {index} is already occupied")]
    CellOccupied { index: usize },

    #[error("it is {expected}'s turn, not {got}'s")]
    OutOfTurn { expected: Mark, got: Mark },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoError {
    #[error("no moves to undo")]
    NoMovesToUndo,

    #[error("game already over")]
    GameAlreadyOver,
}

/// Errors surfaced by [`crate::game::GameSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Undo(#[from] UndoError),

    #[error("it is not the player's turn")]
    NotHumanTurn,

    #[error("it is not the automated player's turn")]
    NotAutomatedTurn,

    #[error("automated player could not select a move")]
    NoMoveSelected,

    #[error("automated player selected an illegal move: {index}")]
    IllegalSelection { index: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid mark '{0}' (expected 'X' or 'O')")]
pub struct ParseMarkError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid difficulty '{0}' (expected random, heuristic or optimal)")]
pub struct ParseDifficultyError(pub String);

pub type Result<T> = std::result::Result<T, GameError>;
