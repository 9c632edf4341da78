//! Locates transient excursions ("spikes") in a light curve.
//!
//! The series is averaged into fixed width bins, a centred rolling median
//! gives a slowly varying baseline, and the residual from that baseline is
//! standardised. Runs of bins whose standardised residual exceeds the
//! threshold factor become spikes:
//! ```ignore
//! let spikes = resample_mean(&series, bin_size)?
//!     .into_iter()
//!     .window(RollingMedian::new(ROLLING_MEDIAN_WIDTH))   // (time, value, median)
//!     .map(|(time, stats)| (time, stats.residual()))
//!     .map(standardise)                                   // |r - mean| / std dev
//!     .events(ThresholdDetector::new(threshold_factor));  // runs of flagged bins
//! ```
//! Each run is then widened by the exclusion margin and clipped to the series.
//!
//! Bins further apart than one bin width mark a data gap. The baseline and
//! the runs restart after every gap, so no spike spans missing data. The
//! residual statistics are still taken over the whole series.

pub(crate) mod detectors;
pub(crate) mod events;
pub(crate) mod resample;
pub(crate) mod window;

use crate::{
    error::{AnalysisError, AnalysisResult},
    lightcurve::{Real, TimeInterval, TimeSeries, merge_intervals},
    statistics::{mean, sample_std_dev},
};
use chrono::TimeDelta;
use detectors::threshold_detector::ThresholdDetector;
use events::EventFilter;
use resample::resample_mean;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use window::{RollingMedian, WindowFilter};

/// Number of bins in the rolling median baseline.
pub const ROLLING_MEDIAN_WIDTH: usize = 10;

/// Fewer samples than this leave the dispersion undefined.
pub const MIN_SAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeDetectorParameters {
    /// Width of the bins the series is averaged into.
    pub bin_size: TimeDelta,
    /// Multiple of the residual standard deviation above which a bin is flagged.
    pub threshold_factor: Real,
    /// Added to both sides of every flagged run.
    pub exclusion_margin: TimeDelta,
}

impl Default for SpikeDetectorParameters {
    fn default() -> Self {
        Self {
            bin_size: TimeDelta::seconds(12),
            threshold_factor: 2.0,
            exclusion_margin: TimeDelta::minutes(1),
        }
    }
}

impl SpikeDetectorParameters {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.bin_size.num_microseconds().is_none_or(|micros| micros < 1) {
            return Err(AnalysisError::invalid_parameter(format!(
                "bin size must be at least one microsecond, got {}",
                self.bin_size
            )));
        }
        if self.exclusion_margin <= TimeDelta::zero() {
            return Err(AnalysisError::invalid_parameter(format!(
                "exclusion margin must be positive, got {}",
                self.exclusion_margin
            )));
        }
        if !(self.threshold_factor > 0.0 && self.threshold_factor.is_finite()) {
            return Err(AnalysisError::invalid_parameter(format!(
                "threshold factor must be positive, got {}",
                self.threshold_factor
            )));
        }
        Ok(())
    }
}

/// Ascending, pairwise disjoint spike intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpikeSet(Vec<TimeInterval>);

impl SpikeSet {
    /// Builds a spike set from intervals in any order, merging overlaps.
    pub fn from_intervals(intervals: &[TimeInterval]) -> Self {
        Self(merge_intervals(intervals))
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_duration(&self) -> TimeDelta {
        self.0
            .iter()
            .map(TimeInterval::duration)
            .fold(TimeDelta::zero(), |total, duration| total + duration)
    }
}

impl IntoIterator for SpikeSet {
    type Item = TimeInterval;
    type IntoIter = std::vec::IntoIter<TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SpikeSet {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Finds the spikes in `series`.
///
/// # Errors
/// - [AnalysisError::InvalidParameter] if any parameter is out of range.
/// - [AnalysisError::InsufficientData] if the series has fewer than [MIN_SAMPLES] samples.
///
/// A series too short to fill one rolling median window, or whose residual
/// has zero dispersion, has no spikes.
#[tracing::instrument(skip_all, fields(num_samples = series.len(), num_bins, num_spikes))]
pub fn detect_spikes(
    series: &TimeSeries,
    parameters: &SpikeDetectorParameters,
) -> AnalysisResult<SpikeSet> {
    parameters.validate()?;

    let bounds = match series.range() {
        Some(bounds) if series.len() >= MIN_SAMPLES => bounds,
        _ => {
            return Err(AnalysisError::InsufficientData {
                needed: MIN_SAMPLES,
                got: series.len(),
            });
        }
    };

    let bins = resample_mean(series, parameters.bin_size)?;
    tracing::Span::current().record("num_bins", bins.len());

    let bin_size = parameters.bin_size;
    let stretches = bins
        .chunk_by(|(previous, _), (next, _)| *next - *previous <= bin_size)
        .map(|stretch| {
            stretch
                .iter()
                .copied()
                .window(RollingMedian::new(ROLLING_MEDIAN_WIDTH))
                .map(|(time, stats)| (time, stats.residual()))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    debug!("{} contiguous stretches", stretches.len());

    let values = stretches
        .iter()
        .flatten()
        .map(|(_, r)| *r)
        .collect::<Vec<_>>();
    let (Some(mean), Some(std_dev)) = (mean(&values), sample_std_dev(&values)) else {
        debug!("Too few bins for a baseline, no spikes possible");
        return Ok(SpikeSet::default());
    };
    if std_dev == 0.0 || !std_dev.is_finite() {
        debug!("Residual has no dispersion, no spikes possible");
        return Ok(SpikeSet::default());
    }
    trace!(mean, std_dev, "Residual statistics");

    let margin = parameters.exclusion_margin;
    let runs = stretches
        .into_iter()
        .flat_map(|residuals| {
            residuals
                .into_iter()
                .map(move |(time, residual)| (time, ((residual - mean) / std_dev).abs()))
                .events(ThresholdDetector::new(parameters.threshold_factor))
        })
        .filter_map(|run| {
            trace!(length = run.length, peak = run.peak, "Flagged run");
            TimeInterval::from_ordered(run.first, run.last + bin_size)
                .expand(margin)
                .clip(&bounds)
        })
        .collect::<Vec<_>>();

    let spikes = SpikeSet::from_intervals(&runs);
    tracing::Span::current().record("num_spikes", spikes.len());
    Ok(spikes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lightcurve::Timestamp;
    use chrono::{TimeZone, Utc};

    fn origin() -> Timestamp {
        Utc.with_ymd_and_hms(2011, 2, 15, 0, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> Timestamp {
        origin() + TimeDelta::seconds(seconds)
    }

    fn per_second(values: &[Real]) -> TimeSeries {
        TimeSeries::from_samples(values.iter().enumerate().map(|(i, v)| (at(i as i64), *v)))
            .unwrap()
    }

    fn spike_at(len: usize, index: usize, height: Real) -> TimeSeries {
        let mut values = vec![1.0; len];
        values[index] = height;
        per_second(&values)
    }

    #[test]
    fn single_spike() {
        let series = spike_at(3600, 1800, 100.0);
        let spikes = detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap();

        assert_eq!(spikes.len(), 1);
        let spike = spikes.intervals()[0];
        // bin [1800, 1812) widened by a minute each side
        assert_eq!(spike, TimeInterval::new(at(1740), at(1872)).unwrap());
        assert!(spike.duration() >= TimeDelta::seconds(120));
        assert!(spike.contains(at(1800)));
    }

    #[test]
    fn constant_series_has_no_spikes() {
        let series = per_second(&[5.0; 600]);
        let spikes = detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap();
        assert!(spikes.is_empty());
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = per_second(&[1.0, 2.0]);
        assert!(matches!(
            detect_spikes(&series, &SpikeDetectorParameters::default()),
            Err(AnalysisError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn series_shorter_than_baseline_has_no_spikes() {
        let series = per_second(&[1.0, 50.0, 1.0, 1.0]);
        let spikes = detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap();
        assert!(spikes.is_empty());
    }

    #[test]
    fn spike_near_start_is_clipped() {
        let series = spike_at(1200, 60, 100.0);
        let spikes = detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap();
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes.intervals()[0].start(), at(0));
        assert_eq!(spikes.intervals()[0].end(), at(132));
    }

    #[test]
    fn nearby_spikes_merge() {
        let mut values = vec![1.0; 3600];
        values[1800] = 100.0;
        values[1836] = 100.0;
        let spikes =
            detect_spikes(&per_second(&values), &SpikeDetectorParameters::default()).unwrap();
        assert_eq!(spikes.len(), 1);
        assert_eq!(
            spikes.intervals()[0],
            TimeInterval::new(at(1740), at(1908)).unwrap()
        );
    }

    #[test]
    fn runs_do_not_bridge_data_gaps() {
        // Raised bins either side of an hour-long hole, and one more well
        // inside the data before it.
        let series = TimeSeries::from_samples(
            (0..3600)
                .filter(|second| !(1812..2412).contains(second))
                .map(|second| {
                    let raised = [900..912, 1800..1812, 2412..2424]
                        .iter()
                        .any(|range| range.contains(&second));
                    (at(second), if raised { 100.0 } else { 1.0 })
                }),
        )
        .unwrap();
        let spikes = detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap();

        // The bins at the edges of the hole have no full baseline window.
        assert_eq!(
            spikes.intervals(),
            &[TimeInterval::new(at(840), at(972)).unwrap()]
        );
        assert_eq!(
            crate::segmentation::segment(&series, spikes.intervals()).len(),
            2
        );
    }

    #[test]
    fn invalid_parameters() {
        let series = spike_at(600, 300, 100.0);
        let cases = [
            SpikeDetectorParameters {
                bin_size: TimeDelta::zero(),
                ..Default::default()
            },
            SpikeDetectorParameters {
                exclusion_margin: TimeDelta::seconds(-1),
                ..Default::default()
            },
            SpikeDetectorParameters {
                threshold_factor: 0.0,
                ..Default::default()
            },
            SpikeDetectorParameters {
                threshold_factor: Real::NAN,
                ..Default::default()
            },
        ];
        for parameters in cases {
            assert!(matches!(
                detect_spikes(&series, &parameters),
                Err(AnalysisError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn spike_set_total_duration() {
        let spikes = SpikeSet::from_intervals(&[
            TimeInterval::new(at(100), at(160)).unwrap(),
            TimeInterval::new(at(0), at(30)).unwrap(),
        ]);
        assert_eq!(spikes.intervals()[0].start(), at(0));
        assert_eq!(spikes.total_duration(), TimeDelta::seconds(90));
    }
}
