use tracing::{debug, info, warn};
use web_time::{Duration, SystemTime};

use crate::ai::{DecisionEngine, Difficulty, MoveSelector};
use crate::board::{Board, NUM_CELLS};
use crate::config::EngineConfig;
use crate::error::{GameError, MoveError, Result, UndoError};
use crate::types::{
    Cell, GameEvent, GameState, HistoryEntry, Mark, Outcome, RoleAssignment, ScoreTally,
};

/// Where a session is in the two-phase turn protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHuman,
    /// The caller should (after its cosmetic delay) call
    /// [`GameSession::play_automated_move`].
    AwaitingAutomated,
    Terminal(Outcome),
}

/// One human against the automated player, across any number of games.
pub struct GameSession {
    board: Board,
    roles: RoleAssignment,
    difficulty: Difficulty,
    phase: Phase,
    score: ScoreTally,
    history: Vec<HistoryEntry>,
    response_delay: Duration,
    selector: Box<dyn MoveSelector>,
}

impl GameSession {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_selector(config, Box::new(DecisionEngine::new(config.seed)))
    }

    /// Like [`GameSession::new`], with a caller-supplied selector.
    pub fn with_selector(config: &EngineConfig, selector: Box<dyn MoveSelector>) -> Result<Self> {
        config.validate()?;
        let roles = RoleAssignment::new(config.human_mark);
        let board = Board::new();
        Ok(Self {
            phase: phase_for_turn(&board, roles),
            board,
            roles,
            difficulty: config.difficulty,
            score: ScoreTally::default(),
            history: Vec::new(),
            response_delay: config.response_delay(),
            selector,
        })
    }

    pub fn apply_human_move(&mut self, index: usize) -> Result<Vec<GameEvent>> {
        match self.phase {
            Phase::Terminal(_) => {
                return Err(self.reject(MoveError::GameAlreadyOver.into()));
            }
            Phase::AwaitingAutomated => return Err(self.reject(GameError::NotHumanTurn)),
            Phase::AwaitingHuman => {}
        }

        self.apply_move(index, self.roles.human())
    }

    /// `true` when the automated player is due to move.
    pub fn is_automated_turn(&self) -> bool {
        self.phase == Phase::AwaitingAutomated
    }

    /// How long the presentation layer should wait before asking for the automated move.
    pub fn automated_move_delay(&self) -> Duration {
        self.response_delay
    }

    pub fn play_automated_move(&mut self) -> Result<Vec<GameEvent>> {
        match self.phase {
            Phase::Terminal(_) => {
                return Err(self.reject(MoveError::GameAlreadyOver.into()));
            }
            Phase::AwaitingHuman => return Err(self.reject(GameError::NotAutomatedTurn)),
            Phase::AwaitingAutomated => {}
        }

        let mark = self.roles.automated();
        let selected = self
            .selector
            .select_move(&self.board, mark, self.difficulty)
            .ok_or_else(|| self.reject(GameError::NoMoveSelected))?;

        if self.board.cell(selected) != Some(Cell::Empty) {
            return Err(self.reject(GameError::IllegalSelection { index: selected }));
        }

        debug!(
            index = selected,
            %mark,
            difficulty = %self.difficulty,
            "automated move selected"
        );
        self.apply_move(selected, mark)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        debug!(%difficulty, "difficulty changed");
        self.difficulty = difficulty;
    }

    /// Assigns `human` to the player and restarts, as role changes only apply between games.
    pub fn set_role_assignment(&mut self, human: Mark) -> Vec<GameEvent> {
        self.roles = RoleAssignment::new(human);
        self.new_game()
    }

    /// Swaps marks and restarts.
    pub fn new_game_swapping_roles(&mut self) -> Vec<GameEvent> {
        self.roles = self.roles.swapped();
        self.new_game()
    }

    /// Clears the board. Score and history carry over.
    pub fn new_game(&mut self) -> Vec<GameEvent> {
        self.board.reset();
        self.phase = phase_for_turn(&self.board, self.roles);
        debug!(human = %self.roles.human(), "new game");

        vec![
            GameEvent::BoardChanged {
                cells: self.board.to_array(),
                last_index: None,
            },
            self.turn_changed(),
        ]
    }

    /// Takes back the human's most recent move together with any automated reply,
    /// leaving the human to move again.
    pub fn undo(&mut self) -> Result<Vec<GameEvent>> {
        if let Phase::Terminal(_) = self.phase {
            return Err(self.reject(UndoError::GameAlreadyOver.into()));
        }

        let human_parity = match self.roles.human() {
            Mark::X => 0,
            Mark::O => 1,
        };
        let Some(last_human) = (0..self.board.move_log().len())
            .rev()
            .find(|ply| ply % 2 == human_parity)
        else {
            return Err(self.reject(UndoError::NoMovesToUndo.into()));
        };

        let mut events = Vec::new();
        while self.board.move_log().len() > last_human {
            let index = self.board.undo_last()?;
            events.push(GameEvent::BoardChanged {
                cells: self.board.to_array(),
                last_index: Some(index as u8),
            });
        }

        self.phase = phase_for_turn(&self.board, self.roles);
        events.push(self.turn_changed());
        Ok(events)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn roles(&self) -> RoleAssignment {
        self.roles
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> ScoreTally {
        self.score
    }

    /// Finished games, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn to_game_state(&self) -> GameState {
        let turn = self.board.turn();
        let outcome = match self.phase {
            Phase::Terminal(outcome) => Some(outcome),
            _ => None,
        };
        GameState {
            cells: self.board.to_array(),
            turn,
            human_mark: self.roles.human(),
            automated_mark: self.roles.automated(),
            automated_turn: self.is_automated_turn(),
            is_game_over: outcome.is_some(),
            outcome,
            move_log: self.board.move_log().iter().map(|&i| i as u8).collect(),
            score: self.score,
        }
    }

    fn apply_move(&mut self, index: usize, mark: Mark) -> Result<Vec<GameEvent>> {
        if let Err(err) = self.board.apply_move(index, mark) {
            return Err(self.reject(err.into()));
        }

        let mut events = vec![GameEvent::BoardChanged {
            cells: self.board.to_array(),
            last_index: self.board.last_move().map(|last| last as u8),
        }];

        match board_outcome(&self.board) {
            Some(outcome) => events.push(self.finish(outcome)),
            None => {
                self.phase = phase_for_turn(&self.board, self.roles);
                events.push(self.turn_changed());
            }
        }

        Ok(events)
    }

    fn finish(&mut self, outcome: Outcome) -> GameEvent {
        self.phase = Phase::Terminal(outcome);
        self.score.record(&outcome, self.roles);
        self.history.insert(
            0,
            HistoryEntry {
                outcome,
                human_mark: self.roles.human(),
                moves: self.board.occupied_count() as u8,
                finished_at: now_millis(),
            },
        );
        info!(?outcome, score = ?self.score, "game over");

        GameEvent::TerminalReached {
            outcome,
            score: self.score,
        }
    }

    fn turn_changed(&self) -> GameEvent {
        let turn = self.board.turn();
        GameEvent::TurnChanged {
            turn,
            automated: turn == self.roles.automated(),
        }
    }

    fn reject(&self, err: GameError) -> GameError {
        warn!(error = %err, phase = ?self.phase, "operation rejected");
        err
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board) {
        self.board = board;
        self.phase = match board_outcome(&self.board) {
            Some(outcome) => Phase::Terminal(outcome),
            None => phase_for_turn(&self.board, self.roles),
        };
    }
}

fn board_outcome(board: &Board) -> Option<Outcome> {
    if let Some([a, b, c]) = board.winning_line() {
        let mark = board.winner()?;
        return Some(Outcome::Win {
            mark,
            line: [a as u8, b as u8, c as u8],
        });
    }
    if board.occupied_count() == NUM_CELLS {
        return Some(Outcome::Draw);
    }
    None
}

fn phase_for_turn(board: &Board, roles: RoleAssignment) -> Phase {
    if board.turn() == roles.automated() {
        Phase::AwaitingAutomated
    } else {
        Phase::AwaitingHuman
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
