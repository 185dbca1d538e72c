//! Rollback engine tests.
//!
//! A counter simulation: every peer holding A subtracts one per tick,
//! every peer holding D adds one. Tick rate is 1, so `t=Ns` is tick N.

use chrono::{Duration, TimeZone, Utc};
use rollback_core::{
    DeviceState, History, HistoryError, Input, KeyboardState, PeerId, RenderContext, SessionConfig,
    Simulation, TickClock, UpdateContext, WallClockTime,
};

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    value: i64,
}

impl Simulation for Counter {
    type Device = DeviceState;
    type View = i64;

    fn update(&mut self, ctx: &UpdateContext<'_, DeviceState>) {
        for input in ctx.inputs.values() {
            if input.device.keyboard.a {
                self.value -= 1;
            }
            if input.device.keyboard.d {
                self.value += 1;
            }
        }
    }

    fn render(ctx: &RenderContext<'_, Self>) -> i64 {
        ctx.current.value
    }
}

const PEER_A: PeerId = PeerId::from_u128(1);
const PEER_B: PeerId = PeerId::from_u128(2);

fn t(seconds: i64) -> WallClockTime {
    Utc.timestamp_opt(0, 0).unwrap() + Duration::seconds(seconds)
}

fn build(window: usize) -> History<Counter> {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = TickClock::new(t(0), 1).expect("clock");
    History::new(clock, window, Counter { value: 0 }).expect("history")
}

fn keys(a: bool, d: bool) -> DeviceState {
    DeviceState { keyboard: KeyboardState { a, d, ..Default::default() }, ..Default::default() }
}

fn value(history: &mut History<Counter>, tick: i64) -> i64 {
    history.get_state(tick).expect("tick available").value
}

#[test]
fn replays_forward_from_seed() {
    let mut history = build(60);

    history.add_input(PEER_A, Input::new(t(0), keys(true, false)));
    assert_eq!(value(&mut history, 4), -4);
    assert_eq!(history.window().ticks(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn corrective_input_truncates_and_recomputes() {
    let mut history = build(60);
    history.add_input(PEER_A, Input::new(t(0), keys(true, false)));
    assert_eq!(value(&mut history, 4), -4);

    history.add_input(PEER_A, Input::new(t(1), keys(false, false)));
    assert_eq!(history.window().ticks(), vec![0, 1]);
    assert_eq!(value(&mut history, 1), -1);
    assert_eq!(value(&mut history, 2), -1);

    let stats = history.stats();
    assert_eq!(stats.rollbacks, 1);
    assert_eq!(stats.checkpoints_discarded, 3);
}

#[test]
fn peers_merge_independently_per_tick() {
    let mut history = build(60);
    history.add_input(PEER_A, Input::new(t(0), keys(true, false)));
    assert_eq!(value(&mut history, 4), -4);
    history.add_input(PEER_A, Input::new(t(1), keys(false, false)));
    assert_eq!(value(&mut history, 1), -1);
    assert_eq!(value(&mut history, 2), -1);

    history.add_input(PEER_B, Input::new(t(2), keys(false, true)));
    assert_eq!(value(&mut history, 3), 0);
    assert_eq!(value(&mut history, 4), 1);
    assert_eq!(history.peers().collect::<Vec<_>>(), vec![PEER_A, PEER_B]);
}

#[test]
fn window_never_exceeds_capacity() {
    let mut history = build(8);
    history.add_input(PEER_A, Input::new(t(0), keys(false, true)));

    for tick in 0..50 {
        assert_eq!(value(&mut history, tick), tick);
        let ticks = history.window().ticks();
        assert!(ticks.len() <= 8, "window grew to {}", ticks.len());
        assert!(ticks.windows(2).all(|w| w[1] == w[0] + 1), "not contiguous: {ticks:?}");
    }
    assert_eq!(history.oldest_tick(), 42);
    assert_eq!(history.newest_tick(), 49);
}

#[test]
fn ticks_older_than_window_are_unavailable() {
    let mut history = build(10);
    assert_eq!(value(&mut history, 30), 0);

    assert!(history.get_state(20).is_none());
    assert!(history.get_state(0).is_none());
    assert!(history.get_state(-1).is_none());
    assert_eq!(history.stats().unavailable_reads, 3);

    match history.try_state(5) {
        Err(HistoryError::TickUnavailable { tick, oldest }) => {
            assert_eq!(tick, 5);
            assert_eq!(oldest, 21);
        }
        other => panic!("expected TickUnavailable, got {other:?}"),
    }
    assert_eq!(value(&mut history, 21), 0);
}

#[test]
fn negative_tick_before_seed_is_unavailable() {
    let mut history = build(60);
    assert!(history.get_state(-1).is_none());
    assert_eq!(history.window().ticks(), vec![0]);
}

#[test]
fn reading_older_tick_does_not_discard_newer_checkpoints() {
    let mut history = build(60);
    history.add_input(PEER_A, Input::new(t(0), keys(true, false)));
    assert_eq!(value(&mut history, 6), -6);

    assert_eq!(value(&mut history, 2), -2);
    assert_eq!(history.window().len(), 7);
}

#[test]
fn repeated_reads_are_cache_hits() {
    let mut history = build(60);
    history.add_input(PEER_A, Input::new(t(0), keys(false, true)));

    let first = history.get_state(5);
    let simulated = history.stats().ticks_simulated;
    let second = history.get_state(5);

    assert_eq!(first, second);
    assert_eq!(history.stats().ticks_simulated, simulated);
    assert_eq!(simulated, 5);
}

#[test]
fn input_outside_window_does_not_invalidate() {
    let mut history = build(5);
    history.add_input(PEER_A, Input::new(t(0), keys(false, true)));
    assert_eq!(value(&mut history, 10), 10);
    let before = history.window().ticks();

    // Tick 2 has already scrolled out of the window.
    history.add_input(PEER_A, Input::new(t(2), keys(true, false)));
    assert_eq!(history.window().ticks(), before);
    assert_eq!(value(&mut history, 10), 10);
    assert_eq!(history.stats().rollbacks, 0);
}

#[test]
fn input_ahead_of_newest_checkpoint_is_kept_for_later() {
    let mut history = build(60);
    history.add_input(PEER_A, Input::new(t(3), keys(false, true)));
    assert_eq!(history.window().ticks(), vec![0]);

    assert_eq!(value(&mut history, 3), 0);
    assert_eq!(value(&mut history, 4), 1);
    assert_eq!(value(&mut history, 6), 3);
}

#[test]
fn returned_snapshots_are_independent() {
    let mut history = build(60);
    let mut snapshot = history.get_state(0).unwrap();
    snapshot.value = 1_000;
    assert_eq!(value(&mut history, 0), 0);
}

#[test]
fn inputs_are_never_dropped() {
    let mut history = build(3);
    for second in 0..20 {
        history.add_input(PEER_A, Input::new(t(second), keys(second % 2 == 0, false)));
        history.get_state(second);
    }
    let log = history.inputs_for(PEER_A).unwrap();
    assert_eq!(log.len(), 20);
    assert_eq!(log.last().unwrap().timestamp, t(19));
    assert!(history.inputs_for(PEER_B).is_none());
}

#[test]
fn builds_from_session_config() {
    let config = SessionConfig::default_test();
    let mut history = History::from_config(&config, t(0), Counter { value: 0 }).expect("history");
    assert_eq!(history.clock().tick_rate(), 1);
    assert_eq!(history.window().capacity(), 60);

    history.add_input(PEER_A, Input::new(t(0), keys(false, true)));
    assert_eq!(value(&mut history, 3), 3);

    let zero_window = SessionConfig { window: 0, ..config };
    assert!(matches!(
        History::from_config(&zero_window, t(0), Counter { value: 0 }),
        Err(HistoryError::InvalidWindow)
    ));
}
