use serde::Deserialize;
use web_time::Duration;

use crate::ai::Difficulty;
use crate::error::GameError;
use crate::types::Mark;

/// Pause the browser page takes before showing the automated reply.
pub const DEFAULT_RESPONSE_DELAY_MS: u32 = 350;
const MAX_RESPONSE_DELAY_MS: u32 = 10_000;

/// Session settings. Every field is optional when deserialized; JS callers use
/// camelCase keys, e.g. `{ difficulty: "medium", humanMark: "O", seed: 7 }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    pub difficulty: Difficulty,
    pub human_mark: Mark,
    /// Cosmetic pause before the automated move; zero in headless use.
    pub response_delay_ms: u32,
    /// Fixed seed for the Random and Heuristic tiers.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.response_delay_ms > MAX_RESPONSE_DELAY_MS {
            return Err(GameError::InvalidConfig {
                message: format!(
                    "responseDelayMs must be at most {MAX_RESPONSE_DELAY_MS}, got {}",
                    self.response_delay_ms
                ),
            });
        }
        Ok(())
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.response_delay_ms))
    }

    /// Settings for tests and headless drivers: no delay, fixed seed.
    pub fn headless(seed: u64) -> Self {
        Self {
            response_delay_ms: 0,
            seed: Some(seed),
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            human_mark: Mark::X,
            response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
            seed: None,
        }
    }
}
