//! Shared primitive types used across the entire core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// A simulation tick. Signed so timestamps before the origin stay total.
pub type Tick = i64;

/// Ticks per second. Fixed for the lifetime of a session.
pub type TickRate = u32;

/// Fractional position between `tick` and `tick + 1`, in `[0, 1)`.
pub type Alpha = f32;

/// Wall-clock time in the local simulation's time base.
pub type WallClockTime = DateTime<Utc>;

/// Number of checkpoints retained when no window size is configured.
pub const DEFAULT_WINDOW: usize = 60;

/// Identifies one input source for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(Uuid);

impl PeerId {
    /// A fresh random peer id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// A stable peer id, for scripted peers and tests.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// The peer id of this process. Generated once, on first use.
    pub fn local() -> Self {
        static LOCAL: OnceLock<PeerId> = OnceLock::new();
        *LOCAL.get_or_init(PeerId::random)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
