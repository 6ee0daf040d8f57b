use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseMarkError;

/// One of the two symbols on the board. `X` always moves first.
///
/// Deserializes through [`FromStr`], so `"x"` is accepted as well as `"X"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" => Ok(Mark::O),
            other => Err(ParseMarkError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Mark {
    type Error = ParseMarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Mark),
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Which mark the human plays. The automated player always holds the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    human: Mark,
}

impl RoleAssignment {
    pub fn new(human: Mark) -> Self {
        Self { human }
    }

    pub fn human(&self) -> Mark {
        self.human
    }

    pub fn automated(&self) -> Mark {
        self.human.opponent()
    }

    pub fn swapped(&self) -> Self {
        Self::new(self.automated())
    }
}

impl Default for RoleAssignment {
    fn default() -> Self {
        Self::new(Mark::X)
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    /// `line` is the winning triple, for highlighting.
    Win { mark: Mark, line: [u8; 3] },
    Draw,
}

/// Running totals across games, from the human's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTally {
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
}

impl ScoreTally {
    pub fn record(&mut self, outcome: &Outcome, roles: RoleAssignment) {
        match outcome {
            Outcome::Win { mark, .. } if *mark == roles.human() => self.player_wins += 1,
            Outcome::Win { .. } => self.opponent_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }
}

/// One finished game in the result history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub outcome: Outcome,
    pub human_mark: Mark,
    pub moves: u8,
    /// Milliseconds since the Unix epoch.
    pub finished_at: u64,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Row-major cells: `null`, `"X"` or `"O"`.
    pub cells: [Option<Mark>; 9],
    pub turn: Mark,
    pub human_mark: Mark,
    pub automated_mark: Mark,
    pub automated_turn: bool,
    pub is_game_over: bool,
    /// Contract:
    /// - `Some` once the game is over.
    /// - `None` while play continues.
    pub outcome: Option<Outcome>,
    pub move_log: Vec<u8>,
    pub score: ScoreTally,
}

/// Notifications the presentation layer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// `last_index` is the cell that changed: placed on a move, cleared on undo.
    #[serde(rename_all = "camelCase")]
    BoardChanged {
        cells: [Option<Mark>; 9],
        last_index: Option<u8>,
    },
    #[serde(rename_all = "camelCase")]
    TurnChanged { turn: Mark, automated: bool },
    #[serde(rename_all = "camelCase")]
    TerminalReached { outcome: Outcome, score: ScoreTally },
}
