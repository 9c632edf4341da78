use super::{Real, TimeInterval, Timestamp};
use crate::error::{AnalysisError, AnalysisResult};
use itertools::Itertools;
use std::ops::Range;

/// An ordered sequence of samples with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    times: Vec<Timestamp>,
    values: Vec<Real>,
}

impl TimeSeries {
    pub fn new(times: Vec<Timestamp>, values: Vec<Real>) -> AnalysisResult<Self> {
        if times.len() != values.len() {
            return Err(AnalysisError::invalid_parameter(format!(
                "{} timestamps given for {} values",
                times.len(),
                values.len()
            )));
        }
        if let Some((index, _)) = times
            .iter()
            .tuple_windows()
            .find_position(|(earlier, later)| earlier >= later)
        {
            return Err(AnalysisError::invalid_parameter(format!(
                "timestamps are not strictly increasing at sample {}",
                index + 1
            )));
        }
        Ok(Self { times, values })
    }

    pub fn from_samples<I>(samples: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = (Timestamp, Real)>,
    {
        let (times, values) = samples.into_iter().unzip();
        Self::new(times, values)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn first(&self) -> Option<Timestamp> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.times.last().copied()
    }

    /// `[first, last]`, or `None` for an empty series.
    pub fn range(&self) -> Option<TimeInterval> {
        Some(TimeInterval::from_ordered(self.first()?, self.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Real)> + Clone + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Copies the samples lying inside the closed `interval`.
    pub fn truncate(&self, interval: &TimeInterval) -> TimeSeries {
        self.slice(self.index_at_or_after(interval.start())..self.index_after(interval.end()))
    }

    /// Index of the first sample with a time `>= time`.
    pub(crate) fn index_at_or_after(&self, time: Timestamp) -> usize {
        self.times.partition_point(|t| *t < time)
    }

    /// Index of the first sample with a time `> time`.
    pub(crate) fn index_after(&self, time: Timestamp) -> usize {
        self.times.partition_point(|t| *t <= time)
    }

    pub(crate) fn slice(&self, range: Range<usize>) -> TimeSeries {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        TimeSeries {
            times: self.times.get(start..end).unwrap_or_default().to_vec(),
            values: self.values.get(start..end).unwrap_or_default().to_vec(),
        }
    }
}
