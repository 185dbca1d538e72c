use crate::types::Tick;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tick rate: must be at least 1 tick per second")]
    InvalidTickRate,

    #[error("Invalid checkpoint window: must retain at least 1 checkpoint")]
    InvalidWindow,

    #[error("Tick {tick} is not available: oldest retained checkpoint is tick {oldest}")]
    TickUnavailable { tick: Tick, oldest: Tick },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;
