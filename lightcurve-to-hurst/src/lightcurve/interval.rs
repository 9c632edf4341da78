use super::Timestamp;
use crate::error::{AnalysisError, AnalysisResult};
use chrono::TimeDelta;
use proba2gi_common::TIMESTAMP_FORMAT;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A closed span `[start, end]` of time. Ordering is by start, then end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: Timestamp,
    end: Timestamp,
}

#[derive(Deserialize)]
struct RawInterval {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = AnalysisError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    pub fn new(start: Timestamp, end: Timestamp) -> AnalysisResult<Self> {
        if start > end {
            return Err(AnalysisError::invalid_parameter(format!(
                "interval start {} is after its end {}",
                start.format(TIMESTAMP_FORMAT),
                end.format(TIMESTAMP_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds the interval spanning both instants, whatever their order.
    pub(crate) fn from_ordered(a: Timestamp, b: Timestamp) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time <= self.end
    }

    /// True if the intervals share at least one instant, touching counts.
    pub fn intersects(&self, other: &TimeInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Widens the interval by `margin` on each side.
    pub fn expand(&self, margin: TimeDelta) -> TimeInterval {
        TimeInterval {
            start: self.start - margin,
            end: self.end + margin,
        }
    }

    /// Restricts the interval to `bounds`, or `None` if they do not intersect.
    pub fn clip(&self, bounds: &TimeInterval) -> Option<TimeInterval> {
        self.intersects(bounds).then(|| TimeInterval {
            start: self.start.max(bounds.start),
            end: self.end.min(bounds.end),
        })
    }

    /// The smallest interval containing both.
    pub fn hull(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}]",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Sorts a copy of `intervals` and unions every pair that overlaps or touches.
/// The result is ascending and pairwise disjoint.
pub fn merge_intervals(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort();

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if last.intersects(&interval) => *last = last.hull(&interval),
            _ => merged.push(interval),
        }
    }
    merged
}
