use crate::{
    clock::TickClock,
    error::{HistoryError, HistoryResult},
    types::{TickRate, WallClockTime, DEFAULT_WINDOW},
};
use serde::{Deserialize, Serialize};

/// Per-session parameters. Fixed once a `History` is built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate: TickRate,
    /// Checkpoints retained; also the deepest possible rollback.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Session start. `None` means "when the session is created".
    #[serde(default)]
    pub origin: Option<WallClockTime>,
    /// Master seed for `rng::RngBank`.
    #[serde(default)]
    pub seed: u64,
}

fn default_tick_rate() -> TickRate { 60 }
fn default_window() -> usize       { DEFAULT_WINDOW }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            window:    default_window(),
            origin:    None,
            seed:      0,
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> HistoryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> HistoryResult<()> {
        if self.tick_rate == 0 {
            return Err(HistoryError::InvalidTickRate);
        }
        if self.window == 0 {
            return Err(HistoryError::InvalidWindow);
        }
        Ok(())
    }

    /// The session clock, anchored at `origin` or else at `now`.
    pub fn clock(&self, now: WallClockTime) -> HistoryResult<TickClock> {
        TickClock::new(self.origin.unwrap_or(now), self.tick_rate)
    }

    /// Config with hardcoded values for use in unit tests: 1 tick per second.
    pub fn default_test() -> Self {
        Self {
            tick_rate: 1,
            window:    DEFAULT_WINDOW,
            origin:    None,
            seed:      0xDEAD_BEEF,
        }
    }
}
