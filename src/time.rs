//! Receiver clock and GNSS time of week conversions
use hifitime::Unit;

use crate::{
    constants::{NANOS_PER_WEEK, SECONDS_PER_WEEK},
    error::Error,
    prelude::{Epoch, TimeScale},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const MILLIS_PER_WEEK: i64 = 604_800_000;

/// Receiver clock block, as reported along each measurement event.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverClock {
    /// Receiver hardware clock counter (ns), since an arbitrary device epoch
    pub time_nanos: i64,
    /// Difference between the hardware clock and true GPS time since 1980-01-06 (ns).
    /// Only present once the receiver has estimated GPS time.
    pub full_bias_nanos: Option<i64>,
    /// Sub-nanosecond part of the bias (ns)
    pub bias_nanos: f64,
}

/// [ClockLatch] holds the full bias of the first valid clock sample.
/// It is latched once per processor and reused for every following epoch, so the
/// receiver time does not jitter with bias re-estimations. Receiver clock
/// discontinuities are not detected: call [ClockLatch::reset] to re-latch.
#[derive(Debug, Copy, Clone, Default)]
pub struct ClockLatch {
    full_bias_nanos: Option<i64>,
}

impl ClockLatch {
    /// Latches the full bias from this [ReceiverClock], on first valid sample only.
    /// Returns the latched value.
    pub fn latch(&mut self, clock: &ReceiverClock) -> Option<i64> {
        if self.full_bias_nanos.is_none() {
            self.full_bias_nanos = clock.full_bias_nanos;
        }
        self.full_bias_nanos
    }
    /// Returns latched full bias (ns)
    pub fn full_bias_nanos(&self) -> Option<i64> {
        self.full_bias_nanos
    }
    /// Forget the latched value. Next valid sample will be latched.
    pub fn reset(&mut self) {
        self.full_bias_nanos = None;
    }
}

/// Measurement reception time, expressed in GPS week and time of week.
/// Integer nanoseconds are carried apart from the fractional part so we do not
/// lose precision on the ~1E18 ns counters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReceptionTime {
    /// GPS week number
    pub week: u32,
    /// Integer nanoseconds within the week
    pub(crate) tow_nanos: i64,
    /// Fractional nanoseconds (bias and time offset)
    pub(crate) fract_nanos: f64,
}

impl ReceptionTime {
    /// Builds [ReceptionTime] from the [ReceiverClock], the latched full bias
    /// and the per measurement time offset.
    ///  t_rx = TimeNanos + TimeOffsetNanos - (FullBiasNanos + BiasNanos)
    ///  week = floor(-FullBiasNanos / NanosPerWeek)
    pub fn new(
        clock: &ReceiverClock,
        full_bias_nanos: i64,
        time_offset_nanos: f64,
    ) -> Result<Self, Error> {
        let gps_nanos = clock.time_nanos - full_bias_nanos;
        let week = (-full_bias_nanos).div_euclid(NANOS_PER_WEEK);
        let tow_nanos = gps_nanos - week * NANOS_PER_WEEK;
        if week < 0 || tow_nanos < 0 {
            return Err(Error::PhysicalNonSenseRxPriorTx);
        }
        let week = u32::try_from(week).map_err(|_| Error::PhysicalNonSenseRxTooLate)?;
        Ok(Self {
            week,
            tow_nanos,
            fract_nanos: time_offset_nanos - clock.bias_nanos,
        })
    }
    /// Returns time of week in nanoseconds
    pub fn tow_nanos(&self) -> f64 {
        self.tow_nanos as f64 + self.fract_nanos
    }
    /// Returns time of week in seconds
    pub fn tow_seconds(&self) -> f64 {
        self.tow_nanos() * 1.0E-9
    }
    /// Total nanoseconds since GPS origin, integer part.
    pub(crate) fn gps_nanos(&self) -> i64 {
        self.week as i64 * NANOS_PER_WEEK + self.tow_nanos
    }
    /// Returns reception [Epoch], expressed in [TimeScale::GPST]
    pub fn epoch(&self) -> Epoch {
        Epoch::from_time_of_week(self.week, self.tow_nanos as u64, TimeScale::GPST)
            + self.fract_nanos * Unit::Nanosecond
    }
}

/// Builds an [Epoch] from week counter and seconds of week, in desired [TimeScale].
pub fn epoch_from_time_of_week(week: u32, seconds_of_week: f64, ts: TimeScale) -> Epoch {
    Epoch::from_time_of_week(week, 0, ts) + seconds_of_week * Unit::Second
}

/// Returns (week, seconds of week) of this [Epoch], in desired [TimeScale].
pub fn time_of_week(t: Epoch, ts: TimeScale) -> (u32, f64) {
    let (week, nanos) = t.to_time_scale(ts).to_time_of_week();
    (week, nanos as f64 * 1.0E-9)
}

/// Converts (week, seconds of week) to milliseconds elapsed since the time scale origin.
pub fn time_of_week_to_milliseconds(week: u32, seconds_of_week: f64) -> i64 {
    week as i64 * MILLIS_PER_WEEK + (seconds_of_week * 1.0E3).round() as i64
}

/// Converts milliseconds elapsed since the time scale origin to (week, seconds of week).
pub fn milliseconds_to_time_of_week(millis: i64) -> (u32, f64) {
    let week = millis.div_euclid(MILLIS_PER_WEEK);
    let ms = millis.rem_euclid(MILLIS_PER_WEEK);
    (week.max(0) as u32, ms as f64 * 1.0E-3)
}

/// Wraps a time difference (in seconds) to [-half week, +half week],
/// to account for week rollovers.
pub(crate) fn wrap_half_week(dt_s: f64) -> f64 {
    const HALF_WEEK: f64 = SECONDS_PER_WEEK / 2.0;
    if dt_s > HALF_WEEK {
        dt_s - 2.0 * HALF_WEEK
    } else if dt_s < -HALF_WEEK {
        dt_s + 2.0 * HALF_WEEK
    } else {
        dt_s
    }
}
