//! Deterministic rollback simulation core.
//!
//! A `History` drives any `Simulation` at a fixed tick rate, caches the
//! most recent ticks as checkpoints, and transparently recomputes them
//! when a peer's input turns up for a tick that was already simulated.
//!
//! Modules, leaf first:
//! - `clock`: wall-clock time to (tick, alpha)
//! - `input`: timestamped samples and the per-peer append-only log
//! - `checkpoint`: the bounded window of (tick, snapshot) pairs
//! - `simulation`: the trait a payload implements to be driven
//! - `engine`: `History`, input invalidation and lazy replay
//! - `host`: per-frame capture and interpolation pairs for a host loop

pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod input;
pub mod interp;
pub mod rng;
pub mod simulation;
pub mod types;

pub use checkpoint::{CheckpointWindow, TickState};
pub use clock::TickClock;
pub use config::SessionConfig;
pub use engine::{History, HistoryStats};
pub use error::{HistoryError, HistoryResult};
pub use host::{Frame, FrameDriver, InputSource};
pub use input::{DeviceState, Input, KeyboardState, MouseState, PeerInputLog};
pub use simulation::{RenderContext, Simulation, UpdateContext};
pub use types::{Alpha, PeerId, Tick, TickRate, WallClockTime, DEFAULT_WINDOW};
