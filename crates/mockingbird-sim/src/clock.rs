//! Fixed-step simulation clock.
//!
//! A requested duration is broken into whole ticks of the fixed step. The
//! overshoot of the last tick is carried as leftover time and subtracted from
//! the next request, so chunked advances run the same ticks as a single one.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{Result, SimError};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Clock state: current time, tick counter and carried leftover.
///
/// Durations are tracked in integer nanoseconds so leftover accounting never
/// accumulates rounding error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickClock {
    current_time: NaiveDateTime,
    tick_count: u64,
    step_ns: i64,
    leftover_ns: i64,
}

impl TickClock {
    /// Create a clock starting at `start_time` with a fixed `step`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the step is not strictly positive.
    pub fn new(start_time: NaiveDateTime, step: TimeDelta) -> Result<Self> {
        let step_ns = step
            .num_nanoseconds()
            .filter(|ns| *ns > 0)
            .ok_or_else(|| {
                SimError::InvalidArgument(format!("time step must be positive, got {step}"))
            })?;

        Ok(Self {
            current_time: start_time,
            tick_count: 0,
            step_ns,
            leftover_ns: 0,
        })
    }

    /// Work out how many ticks cover `requested` after subtracting the
    /// carried leftover, and store the new leftover.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `requested` is zero, negative or too large to
    /// express in nanoseconds.
    pub fn schedule(&mut self, requested: TimeDelta) -> Result<u64> {
        if requested <= TimeDelta::zero() {
            return Err(SimError::InvalidArgument(format!(
                "advance duration must be positive, got {requested}"
            )));
        }
        let requested_ns = requested.num_nanoseconds().ok_or_else(|| {
            SimError::InvalidArgument(format!("advance duration {requested} is too large"))
        })?;

        let step = i128::from(self.step_ns);
        let effective = i128::from(requested_ns) - i128::from(self.leftover_ns);
        let steps = if effective <= 0 {
            0
        } else {
            effective / step + i128::from(effective % step != 0)
        };

        // 0 <= leftover < step by construction
        self.leftover_ns = i64::try_from(steps * step - effective).map_err(|_| {
            SimError::InvalidArgument(format!("advance duration {requested} is too large"))
        })?;

        u64::try_from(steps).map_err(|_| {
            SimError::InvalidArgument(format!("advance duration {requested} is too large"))
        })
    }

    /// Half-open time window `[start, end)` of the tick about to run.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.current_time, self.current_time + self.step())
    }

    /// Move the clock forward by exactly one step.
    pub fn tick(&mut self) {
        self.current_time += self.step();
        self.tick_count += 1;
    }

    pub const fn current_time(&self) -> NaiveDateTime {
        self.current_time
    }

    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn step(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.step_ns)
    }

    pub fn leftover(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.leftover_ns)
    }

    /// Step length in seconds, the `dt` of every tick.
    #[allow(clippy::cast_precision_loss)]
    pub fn step_seconds(&self) -> f64 {
        self.step_ns as f64 / NANOS_PER_SECOND
    }
}
