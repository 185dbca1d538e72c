//! Tick clock — maps wall-clock time onto the fixed tick grid.

use crate::{
    error::{HistoryError, HistoryResult},
    types::{Alpha, Tick, TickRate, WallClockTime},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Largest f32 strictly below 1.0.
const ALPHA_MAX: Alpha = 1.0 - f32::EPSILON / 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickClock {
    origin:    WallClockTime,
    tick_rate: TickRate,
}

impl TickClock {
    pub fn new(origin: WallClockTime, tick_rate: TickRate) -> HistoryResult<Self> {
        if tick_rate == 0 {
            return Err(HistoryError::InvalidTickRate);
        }
        Ok(Self { origin, tick_rate })
    }

    pub fn origin(&self) -> WallClockTime    { self.origin }
    pub fn tick_rate(&self) -> TickRate      { self.tick_rate }

    /// Tick containing `t`, plus how far into that tick `t` lies.
    ///
    /// Floors toward negative infinity, so times before the origin land on
    /// negative ticks with a non-negative alpha.
    pub fn time_to_tick(&self, t: WallClockTime) -> (Tick, Alpha) {
        let scaled = elapsed_nanos(t, self.origin) * i128::from(self.tick_rate);
        let tick = scaled.div_euclid(NANOS_PER_SECOND);
        let rem = scaled.rem_euclid(NANOS_PER_SECOND);

        let alpha = (rem as f64 / NANOS_PER_SECOND as f64) as Alpha;
        (saturate_tick(tick), alpha.min(ALPHA_MAX))
    }

    /// Earliest wall-clock time that falls inside `tick`.
    pub fn tick_start(&self, tick: Tick) -> WallClockTime {
        let scaled = i128::from(tick) * NANOS_PER_SECOND;
        let rate = i128::from(self.tick_rate);
        let mut nanos = scaled.div_euclid(rate);
        if scaled.rem_euclid(rate) != 0 {
            nanos += 1;
        }

        let nanos = i64::try_from(nanos).unwrap_or(if nanos < 0 { i64::MIN } else { i64::MAX });
        self.origin
            .checked_add_signed(Duration::nanoseconds(nanos))
            .unwrap_or(if nanos < 0 { DateTime::<Utc>::MIN_UTC } else { DateTime::<Utc>::MAX_UTC })
    }

    /// Length of one tick, truncated to whole nanoseconds.
    pub fn tick_duration(&self) -> Duration {
        Duration::nanoseconds(1_000_000_000 / i64::from(self.tick_rate))
    }
}

fn elapsed_nanos(t: WallClockTime, origin: WallClockTime) -> i128 {
    let elapsed = t.signed_duration_since(origin);
    elapsed
        .num_nanoseconds()
        .map(i128::from)
        .unwrap_or_else(|| i128::from(elapsed.num_milliseconds()) * 1_000_000)
}

fn saturate_tick(tick: i128) -> Tick {
    Tick::try_from(tick).unwrap_or(if tick < 0 { Tick::MIN } else { Tick::MAX })
}
