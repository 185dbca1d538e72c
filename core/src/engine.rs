//! The rollback history engine — the heart of the core.
//!
//! RULES:
//!   - Inputs are append-only. Nothing is ever dropped from a peer's log.
//!   - A late input invalidates every checkpoint after its tick, but only
//!     when that tick is still inside the checkpoint window.
//!   - Recomputation is lazy: `add_input` only truncates, `get_state`
//!     replays forward one tick at a time from the newest valid checkpoint.
//!   - Tick N is computed from checkpoint N-1 plus, for each peer, the
//!     latest input whose tick is strictly before N.

use crate::{
    checkpoint::{CheckpointWindow, TickState},
    clock::TickClock,
    config::SessionConfig,
    error::{HistoryError, HistoryResult},
    input::{Input, PeerInputLog},
    simulation::{Simulation, UpdateContext},
    types::{Alpha, PeerId, Tick, WallClockTime},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters describing how much work the engine has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub inputs_received:        u64,
    pub rollbacks:              u64,
    pub checkpoints_discarded:  u64,
    pub ticks_simulated:        u64,
    pub cache_hits:             u64,
    pub unavailable_reads:      u64,
}

pub struct History<S: Simulation> {
    clock:  TickClock,
    inputs: BTreeMap<PeerId, PeerInputLog<S::Device>>,
    items:  CheckpointWindow<S>,
    stats:  HistoryStats,
}

impl<S: Simulation> History<S> {
    /// Start a session with `initial` as the checkpoint for tick 0.
    pub fn new(clock: TickClock, window: usize, initial: S) -> HistoryResult<Self> {
        if window == 0 {
            return Err(HistoryError::InvalidWindow);
        }
        Ok(Self {
            clock,
            inputs: BTreeMap::new(),
            items:  CheckpointWindow::seeded(TickState::new(0, initial), window),
            stats:  HistoryStats::default(),
        })
    }

    /// Build from a session config. `now` is the origin when the config has none.
    pub fn from_config(config: &SessionConfig, now: WallClockTime, initial: S) -> HistoryResult<Self> {
        config.validate()?;
        Self::new(config.clock(now)?, config.window, initial)
    }

    /// Record an input for `peer` and invalidate checkpoints it makes stale.
    pub fn add_input(&mut self, peer: PeerId, input: Input<S::Device>) {
        let (tick, _) = self.clock.time_to_tick(input.timestamp);
        self.stats.inputs_received += 1;

        if self.inputs.entry(peer).or_default().push(input) {
            log::warn!("Input for peer {peer} at tick {tick} is older than its previous input");
        }

        match self.items.truncate_after(tick) {
            Some(0) => {}
            Some(discarded) => {
                self.stats.rollbacks += 1;
                self.stats.checkpoints_discarded += discarded as u64;
                log::debug!("Rolled back to tick {tick} for peer {peer}: {discarded} checkpoints discarded");
            }
            None => {
                log::trace!("Input for peer {peer} at tick {tick} matches no retained checkpoint");
            }
        }

        debug_assert!(self.items.is_contiguous(), "checkpoint window has a gap");
    }

    /// The simulation state after `tick`, replaying forward if needed.
    ///
    /// Returns `None` when `tick` is older than every retained checkpoint.
    pub fn get_state(&mut self, tick: Tick) -> Option<S> {
        let mut index = self.items.len().checked_sub(1)?;

        loop {
            let current = self.items.get(index)?;

            if current.tick == tick {
                self.stats.cache_hits += 1;
                return Some(current.state.clone());
            }

            if current.tick < tick {
                let next = self.step(current);
                self.stats.ticks_simulated += 1;

                let trimmed = self.items.push(next);
                if trimmed > 0 {
                    log::trace!("Checkpoint window full, dropped {trimmed} oldest");
                }
                index = self.items.len() - 1;
                continue;
            }

            match index.checked_sub(1) {
                Some(previous) => index = previous,
                None => {
                    self.stats.unavailable_reads += 1;
                    log::trace!("Tick {tick} predates the oldest checkpoint (tick {})", current.tick);
                    return None;
                }
            }
        }
    }

    /// Like `get_state`, but reports why a tick is unavailable.
    pub fn try_state(&mut self, tick: Tick) -> HistoryResult<S> {
        self.get_state(tick).ok_or_else(|| HistoryError::TickUnavailable {
            tick,
            oldest: self.oldest_tick(),
        })
    }

    /// Compute the checkpoint following `from`.
    fn step(&self, from: &TickState<S>) -> TickState<S> {
        let tick = from.tick + 1;
        let inputs = self
            .inputs
            .iter()
            .filter_map(|(peer, log)| log.latest_before(&self.clock, tick).map(|input| (*peer, input)))
            .collect();

        let ctx = UpdateContext::new(inputs, tick, self.clock.tick_rate());
        let mut state = from.state.clone();
        state.update(&ctx);
        TickState::new(tick, state)
    }

    pub fn time_to_tick(&self, t: WallClockTime) -> (Tick, Alpha) {
        self.clock.time_to_tick(t)
    }

    pub fn clock(&self) -> &TickClock                   { &self.clock }
    pub fn window(&self) -> &CheckpointWindow<S>        { &self.items }
    pub fn stats(&self) -> HistoryStats                 { self.stats }

    pub fn inputs_for(&self, peer: PeerId) -> Option<&PeerInputLog<S::Device>> {
        self.inputs.get(&peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.inputs.keys().copied()
    }

    pub fn oldest_tick(&self) -> Tick {
        self.items.oldest().map_or(0, |item| item.tick)
    }

    pub fn newest_tick(&self) -> Tick {
        self.items.newest().map_or(0, |item| item.tick)
    }
}
