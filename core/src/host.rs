//! Host loop glue: per-frame input capture and interpolation pairs.
//!
//! Each frame the host asks the clock where "now" falls. When a new tick
//! has started it captures one local input sample; it then reads the
//! current and previous ticks from the engine so rendering can blend them.

use crate::{
    engine::History,
    input::Input,
    simulation::{RenderContext, Simulation},
    types::{Alpha, PeerId, Tick, WallClockTime},
};

/// Supplies local control samples, e.g. by polling devices.
pub trait InputSource<D> {
    fn capture(&mut self, now: WallClockTime) -> Input<D>;
}

impl<D, F> InputSource<D> for F
where
    F: FnMut(WallClockTime) -> D,
{
    fn capture(&mut self, now: WallClockTime) -> Input<D> {
        Input::new(now, self(now))
    }
}

/// Two adjacent snapshots ready to render.
#[derive(Debug, Clone)]
pub struct Frame<S> {
    pub tick:     Tick,
    /// 1.0 when `previous` was unavailable and mirrors `current`.
    pub alpha:    Alpha,
    pub previous: S,
    pub current:  S,
    /// Whether this frame submitted a new local input.
    pub captured: bool,
}

impl<S: Simulation> Frame<S> {
    pub fn render(&self, peer: PeerId, debug: bool) -> S::View {
        S::render(&RenderContext {
            previous: &self.previous,
            current:  &self.current,
            peer,
            alpha:    self.alpha,
            debug,
        })
    }
}

pub struct FrameDriver {
    peer:      PeerId,
    last_tick: Option<Tick>,
}

impl FrameDriver {
    pub fn new(peer: PeerId) -> Self {
        Self { peer, last_tick: None }
    }

    pub fn peer(&self) -> PeerId            { self.peer }
    pub fn last_tick(&self) -> Option<Tick> { self.last_tick }

    /// Run one host frame at wall-clock time `now`.
    ///
    /// Returns `None` only when the current tick itself cannot be
    /// reconstructed, which means `now` is far behind the retained window.
    pub fn frame<S, I>(&mut self, history: &mut History<S>, source: &mut I, now: WallClockTime) -> Option<Frame<S>>
    where
        S: Simulation,
        I: InputSource<S::Device>,
    {
        let (tick, alpha) = history.time_to_tick(now);

        let captured = self.last_tick != Some(tick);
        if captured {
            history.add_input(self.peer, source.capture(now));
            self.last_tick = Some(tick);
        }

        let current = history.get_state(tick)?;
        let frame = match history.get_state(tick.saturating_sub(1)) {
            Some(previous) => Frame { tick, alpha, previous, current, captured },
            None => Frame { tick, alpha: 1.0, previous: current.clone(), current, captured },
        };
        Some(frame)
    }
}
