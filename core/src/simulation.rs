//! Simulation trait — the contract every simulated payload fulfils.
//!
//! RULE: `update` must be a pure function of (snapshot, inputs, tick).
//! The engine replays the same tick many times across rollbacks and
//! expects bit-identical results each time. All randomness flows
//! through `rng::RngBank`, never through a platform RNG.

use crate::{
    input::Input,
    types::{Alpha, PeerId, Tick, TickRate},
};
use std::collections::BTreeMap;

/// A state type the rollback engine can drive.
///
/// `Clone` must be a deep copy: the engine branches timelines by cloning a
/// checkpoint and mutating the clone.
pub trait Simulation: Clone {
    /// Per-peer control payload carried by `Input`.
    type Device;

    /// Whatever `render` produces for the host.
    type View;

    /// Advance this snapshot by one tick, in place.
    ///
    /// `self` is a fresh clone of the checkpoint for `ctx.tick - 1`.
    fn update(&mut self, ctx: &UpdateContext<'_, Self::Device>);

    /// Project two adjacent snapshots into something presentable.
    fn render(ctx: &RenderContext<'_, Self>) -> Self::View;
}

/// Everything `Simulation::update` may read.
#[derive(Debug)]
pub struct UpdateContext<'a, D> {
    /// At most one input per peer: the latest one strictly before `tick`.
    /// Sorted by peer id, so iteration order is stable.
    pub inputs:    BTreeMap<PeerId, &'a Input<D>>,
    /// The tick being computed.
    pub tick:      Tick,
    pub tick_rate: TickRate,
}

impl<'a, D> UpdateContext<'a, D> {
    pub fn new(inputs: BTreeMap<PeerId, &'a Input<D>>, tick: Tick, tick_rate: TickRate) -> Self {
        Self { inputs, tick, tick_rate }
    }

    pub fn input(&self, peer: PeerId) -> Option<&'a Input<D>> {
        self.inputs.get(&peer).copied()
    }

    /// Seconds covered by one tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

impl<D: Clone + Default> UpdateContext<'_, D> {
    /// The peer's device state, or the neutral state if it sent nothing yet.
    pub fn device_or_default(&self, peer: PeerId) -> D {
        self.input(peer).map(|input| input.device.clone()).unwrap_or_default()
    }
}

/// Everything `Simulation::render` may read.
#[derive(Debug)]
pub struct RenderContext<'a, S> {
    pub previous: &'a S,
    pub current:  &'a S,
    /// The peer the view is rendered for.
    pub peer:     PeerId,
    /// Interpolation factor from `previous` to `current`, in `[0, 1]`.
    pub alpha:    Alpha,
    pub debug:    bool,
}
