use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod types;

pub use ai::{DecisionEngine, Difficulty, MoveSelector};
pub use board::{Board, WIN_LINES};
pub use config::EngineConfig;
pub use error::{GameError, MoveError, UndoError};
pub use game::{GameSession, Phase};
pub use types::{
    Cell, GameEvent, GameState, HistoryEntry, Mark, Outcome, RoleAssignment, ScoreTally,
};

// Empty cells cross the boundary as `null`, not `undefined`.
const SERIALIZER: Serializer = Serializer::json_compatible();

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// JS handle to one game session.
///
/// Mutating methods return the array of events the page should render.
/// Rejected calls throw a string and leave the session unchanged.
#[wasm_bindgen]
pub struct TicTacToe {
    session: GameSession,
}

#[wasm_bindgen]
impl TicTacToe {
    /// `config` may be omitted or hold any of `difficulty`, `humanMark`,
    /// `responseDelayMs`, `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TicTacToe, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<EngineConfig>(config)
                .map_err(|err| JsValue::from_str(&format!("invalid configuration: {err}")))?
        };
        let session = GameSession::new(&config).map_err(to_js_error)?;
        Ok(Self { session })
    }

    #[wasm_bindgen(js_name = applyHumanMove)]
    pub fn apply_human_move(&mut self, index: u32) -> Result<JsValue, JsValue> {
        let events = self
            .session
            .apply_human_move(index as usize)
            .map_err(to_js_error)?;
        to_js(&events)
    }

    #[wasm_bindgen(js_name = playAutomatedMove)]
    pub fn play_automated_move(&mut self) -> Result<JsValue, JsValue> {
        let events = self.session.play_automated_move().map_err(to_js_error)?;
        to_js(&events)
    }

    #[wasm_bindgen(js_name = isAutomatedTurn)]
    pub fn is_automated_turn(&self) -> bool {
        self.session.is_automated_turn()
    }

    #[wasm_bindgen(js_name = automatedMoveDelayMs)]
    pub fn automated_move_delay_ms(&self) -> u32 {
        self.session.automated_move_delay().as_millis() as u32
    }

    /// Accepts `random|heuristic|optimal` or `easy|medium|hard`.
    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, tier: &str) -> Result<(), JsValue> {
        let difficulty = tier.parse::<Difficulty>().map_err(to_js_error)?;
        self.session.set_difficulty(difficulty);
        Ok(())
    }

    #[wasm_bindgen(js_name = setRoleAssignment)]
    pub fn set_role_assignment(&mut self, human_mark: &str) -> Result<JsValue, JsValue> {
        let mark = human_mark.parse::<Mark>().map_err(to_js_error)?;
        to_js(&self.session.set_role_assignment(mark))
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.session.new_game())
    }

    #[wasm_bindgen(js_name = swapRolesAndRestart)]
    pub fn swap_roles_and_restart(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.session.new_game_swapping_roles())
    }

    pub fn undo(&mut self) -> Result<JsValue, JsValue> {
        let events = self.session.undo().map_err(to_js_error)?;
        to_js(&events)
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Vec<u8> {
        self.session
            .board()
            .legal_moves()
            .into_iter()
            .map(|index| index as u8)
            .collect()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.to_game_state())
    }

    pub fn score(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.score())
    }

    pub fn history(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.history())
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&mut self) {
        self.session.clear_history();
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value.serialize(&SERIALIZER).map_err(JsValue::from)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
