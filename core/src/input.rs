//! Peer input — timestamped control samples and the per-peer log.
//!
//! RULE: A peer's log is append-only. Entries are never reordered or
//! removed once recorded; the engine relies on that to replay any tick.

use crate::{
    clock::TickClock,
    types::{Tick, WallClockTime},
};
use serde::{Deserialize, Serialize};

/// One control sample from one peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input<D> {
    pub timestamp: WallClockTime,
    pub device:    D,
}

impl<D> Input<D> {
    pub fn new(timestamp: WallClockTime, device: D) -> Self {
        Self { timestamp, device }
    }
}

/// Reference device payload: pointer plus the movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub mouse:    MouseState,
    pub keyboard: KeyboardState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseState {
    pub x:     f32,
    pub y:     f32,
    pub left:  bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardState {
    pub a: bool,
    pub s: bool,
    pub d: bool,
    pub w: bool,
}

impl KeyboardState {
    /// Movement direction as (x, y); D/S are positive.
    pub fn axis(&self) -> (f32, f32) {
        let x = f32::from(u8::from(self.d)) - f32::from(u8::from(self.a));
        let y = f32::from(u8::from(self.s)) - f32::from(u8::from(self.w));
        (x, y)
    }
}

/// Everything one peer has ever sent, in arrival order.
#[derive(Debug, Clone)]
pub struct PeerInputLog<D> {
    entries: Vec<Input<D>>,
}

impl<D> Default for PeerInputLog<D> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<D> PeerInputLog<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Returns true if it is older than the previous one.
    pub fn push(&mut self, input: Input<D>) -> bool {
        let regressed = self
            .entries
            .last()
            .is_some_and(|last| input.timestamp < last.timestamp);
        self.entries.push(input);
        regressed
    }

    /// The most recently added sample whose tick is strictly before `tick`.
    ///
    /// Scans backward from the newest entry, so with a time-ordered log this
    /// is the latest sample preceding `tick`.
    pub fn latest_before(&self, clock: &TickClock, tick: Tick) -> Option<&Input<D>> {
        self.entries
            .iter()
            .rev()
            .find(|input| clock.time_to_tick(input.timestamp).0 < tick)
    }

    pub fn last(&self) -> Option<&Input<D>> { self.entries.last() }
    pub fn len(&self) -> usize              { self.entries.len() }
    pub fn is_empty(&self) -> bool          { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Input<D>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn clock() -> TickClock {
        TickClock::new(Utc.timestamp_opt(0, 0).unwrap(), 10).unwrap()
    }

    fn at(clock: &TickClock, tick: Tick, keys: KeyboardState) -> Input<DeviceState> {
        Input::new(clock.tick_start(tick), DeviceState { keyboard: keys, ..Default::default() })
    }

    #[test]
    fn latest_before_skips_inputs_at_or_after_tick() {
        let clock = clock();
        let mut log = PeerInputLog::new();
        log.push(at(&clock, 1, KeyboardState { a: true, ..Default::default() }));
        log.push(at(&clock, 5, KeyboardState { d: true, ..Default::default() }));

        assert!(log.latest_before(&clock, 1).is_none());
        assert!(log.latest_before(&clock, 5).unwrap().device.keyboard.a);
        assert!(log.latest_before(&clock, 6).unwrap().device.keyboard.d);
    }

    #[test]
    fn push_reports_time_regression_but_keeps_entry() {
        let clock = clock();
        let mut log = PeerInputLog::new();
        assert!(!log.push(at(&clock, 3, KeyboardState::default())));
        assert!(log.push(Input::new(
            clock.tick_start(3) - Duration::milliseconds(1),
            DeviceState::default(),
        )));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn keyboard_axis_cancels_opposing_keys() {
        let keys = KeyboardState { a: true, d: true, w: true, s: false };
        assert_eq!(keys.axis(), (0.0, -1.0));
    }
}
