use jiff::{
    RoundMode, SignedDuration, Unit, Zoned,
    civil::{DateTime, DateTimeRound},
};
use serde::Serialize;

/// Fixed spacing between two grid slots
pub const STEP: SignedDuration = SignedDuration::from_mins(15);
const STEP_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime,
    pub value: f64,
}

impl Sample {
    /// Widen a raw reading and round it to two decimals (ties to even).
    pub fn new(timestamp: DateTime, raw: f32) -> Self {
        Self {
            timestamp,
            value: round2(raw),
        }
    }
}

pub fn round2(raw: f32) -> f64 {
    (f64::from(raw) * 100.0).round_ties_even() / 100.0
}

/// One sample per 15 minute slot, sorted, gapless, starting at `start`.
///
/// Built only by the decoder, so every index maps to `start + index * STEP`
/// and lookups are plain arithmetic.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    start: DateTime,
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub(crate) fn from_grid(start: DateTime, samples: Vec<Sample>) -> Self {
        debug_assert!(samples.first().is_none_or(|s| s.timestamp == start));
        Self { start, samples }
    }

    pub fn all(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> DateTime {
        self.start
    }

    pub fn end(&self) -> Option<DateTime> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Slot index of `timestamp`, `None` when it is off-grid or outside the series.
    pub fn index_of(&self, timestamp: DateTime) -> Option<usize> {
        let offset = timestamp.duration_since(self.start);
        if offset.is_negative() {
            return None;
        }

        let step = STEP.as_nanos();
        let offset = offset.as_nanos();
        if offset % step != 0 {
            return None;
        }

        let index = usize::try_from(offset / step).ok()?;
        (index < self.samples.len()).then_some(index)
    }

    pub fn sample_at(&self, timestamp: DateTime) -> Option<&Sample> {
        self.index_of(timestamp).map(|i| &self.samples[i])
    }

    /// Samples from `from` through `to`, both inclusive. No clamping: a bound
    /// that is not on the grid gives `None`.
    pub fn range(&self, from: DateTime, to: DateTime) -> Option<&[Sample]> {
        let (first, last) = (self.index_of(from)?, self.index_of(to)?);
        (first <= last).then(|| &self.samples[first..=last])
    }

    /// The last completed slot according to the local wall clock.
    pub fn current(&self) -> Option<&Sample> {
        self.current_at(Zoned::now().datetime())
    }

    pub fn current_at(&self, now: DateTime) -> Option<&Sample> {
        self.sample_at(last_completed_slot(now)?)
    }
}

/// Step back one slot from `now`, then truncate to the 15 minute boundary
/// (seconds and below zeroed).
pub fn last_completed_slot(now: DateTime) -> Option<DateTime> {
    let round = DateTimeRound::new()
        .smallest(Unit::Minute)
        .increment(STEP_MINUTES)
        .mode(RoundMode::Trunc);

    now.checked_sub(STEP).ok()?.round(round).ok()
}
