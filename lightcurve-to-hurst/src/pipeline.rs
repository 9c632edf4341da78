//! Runs detection, segmentation, classification and estimation over the
//! no-event windows of one observation.

use crate::{
    catalog::validate_windows,
    classification::{Label, Segment, classify},
    error::{AnalysisError, AnalysisResult},
    estimator::{
        ABSOLUTE_VALUE, AGGREGATED_VARIANCE, DIFFERENCED_VARIANCE, EstimatorRegistry,
        RESCALED_RANGE,
    },
    lightcurve::{LightCurve, TimeInterval, TimeSeries},
    report::{AnalysisReport, SegmentResult, SkippedWindow, WindowSummary},
    segmentation::segment,
    spike_detection::{SpikeDetectorParameters, detect_spikes},
};
use metrics::counter;
use proba2gi_common::metrics::{
    failures::{self, FailureKind},
    names::{FAILURES, SEGMENTS_CLASSIFIED, SPIKES_DETECTED, WINDOWS_PROCESSED},
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Supplies one channel of instrument data restricted to a time interval.
pub trait InstrumentSource {
    fn series(&self, channel: &str, interval: &TimeInterval) -> AnalysisResult<TimeSeries>;
}

impl InstrumentSource for LightCurve {
    fn series(&self, channel: &str, interval: &TimeInterval) -> AnalysisResult<TimeSeries> {
        self.channel(channel)
            .map(|series| series.truncate(interval))
            .ok_or_else(|| AnalysisError::MissingChannel(channel.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Name of the light curve channel analysed.
    pub channel: String,
    pub spikes: SpikeDetectorParameters,
    /// Identifiers of the estimators run on every segment, in report order.
    pub estimators: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channel: "CHANNEL4".to_owned(),
            spikes: SpikeDetectorParameters::default(),
            estimators: [
                AGGREGATED_VARIANCE,
                DIFFERENCED_VARIANCE,
                ABSOLUTE_VALUE,
                RESCALED_RANGE,
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

pub struct Pipeline {
    config: AnalysisConfig,
    registry: EstimatorRegistry,
}

impl Pipeline {
    /// # Errors
    /// [AnalysisError::InvalidParameter] if the detector parameters are out of
    /// range, no estimator is configured, or an estimator is not in `registry`.
    pub fn new(config: AnalysisConfig, registry: EstimatorRegistry) -> AnalysisResult<Self> {
        config.spikes.validate()?;
        if config.estimators.is_empty() {
            return Err(AnalysisError::invalid_parameter("no estimators configured"));
        }
        registry.resolve(&config.estimators)?;
        Ok(Self { config, registry })
    }

    pub fn run<S>(&self, source: &S, windows: &[TimeInterval]) -> AnalysisResult<AnalysisReport>
    where
        S: InstrumentSource + ?Sized,
    {
        self.run_with(source, windows, |_, _| {})
    }

    /// As [Pipeline::run], also passing every labelled segment to `inspect`.
    ///
    /// Windows are numbered in the order given and window 0 is the first
    /// parent, so its segments are never labelled. A window whose data
    /// cannot be loaded or analysed is recorded as skipped and the run
    /// carries on with the next one.
    ///
    /// # Errors
    /// [AnalysisError::InvalidParameter] if `windows` is empty, unordered or overlapping.
    #[tracing::instrument(skip_all, fields(num_windows = windows.len()))]
    pub fn run_with<S, F>(
        &self,
        source: &S,
        windows: &[TimeInterval],
        mut inspect: F,
    ) -> AnalysisResult<AnalysisReport>
    where
        S: InstrumentSource + ?Sized,
        F: FnMut(&Segment, Label),
    {
        validate_windows(windows)?;

        let mut report = AnalysisReport::default();
        for (parent_index, window) in windows.iter().enumerate() {
            match self.analyse_window(source, parent_index, window, &mut inspect) {
                Ok(summary) => {
                    counter!(WINDOWS_PROCESSED).increment(1);
                    report.push_window(summary);
                }
                Err(e) => {
                    warn!("Skipping window {parent_index} ({window}): {e}");
                    counter!(
                        FAILURES,
                        &[failures::get_label(FailureKind::WindowSkipped)]
                    )
                    .increment(1);
                    report.push_skipped(SkippedWindow {
                        parent_index,
                        window: *window,
                        reason: e.to_string(),
                    });
                }
            }
        }
        info!(
            "Analysed {} windows, skipped {}, labelled {} segments",
            report.windows.len(),
            report.skipped.len(),
            report.num_segments()
        );
        Ok(report)
    }

    #[tracing::instrument(skip_all, fields(parent_index = parent_index, window = %window, num_spikes, num_segments))]
    fn analyse_window<S, F>(
        &self,
        source: &S,
        parent_index: usize,
        window: &TimeInterval,
        inspect: &mut F,
    ) -> AnalysisResult<WindowSummary>
    where
        S: InstrumentSource + ?Sized,
        F: FnMut(&Segment, Label),
    {
        let series = source.series(&self.config.channel, window)?;
        let spikes = detect_spikes(&series, &self.config.spikes)?;
        tracing::Span::current().record("num_spikes", spikes.len());
        counter!(SPIKES_DETECTED).increment(spikes.len() as u64);

        let pieces = segment(&series, spikes.intervals());
        let segments = classify(parent_index, parent_index == 0, pieces)?
            .into_iter()
            .map(|(segment, label)| {
                inspect(&segment, label);
                self.estimate(&segment, label)
            })
            .collect::<Vec<_>>();
        tracing::Span::current().record("num_segments", segments.len());
        counter!(SEGMENTS_CLASSIFIED).increment(segments.len() as u64);

        Ok(WindowSummary {
            parent_index,
            window: *window,
            spikes,
            segments,
        })
    }

    /// Runs every configured estimator on the segment. A failing estimator
    /// leaves `None` in its place.
    fn estimate(&self, segment: &Segment, label: Label) -> SegmentResult {
        let values = segment.series.values();
        let exponents = self
            .config
            .estimators
            .iter()
            .map(|identifier| {
                let exponent = match self.registry.estimate(identifier, values) {
                    Ok(exponent) => Some(exponent),
                    Err(e) => {
                        debug!(position = segment.position_index, "{e}");
                        counter!(
                            FAILURES,
                            &[failures::get_label(FailureKind::EstimatorFailed)]
                        )
                        .increment(1);
                        None
                    }
                };
                (identifier.clone(), exponent)
            })
            .collect::<BTreeMap<_, _>>();

        SegmentResult {
            position_index: segment.position_index,
            total_segments: segment.total_segments,
            label,
            range: segment.series.range(),
            num_samples: segment.series.len(),
            exponents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        estimator::EstimatorError,
        lightcurve::{Real, Timestamp},
    };
    use chrono::{TimeDelta, TimeZone, Utc};

    fn at(seconds: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2011, 2, 15, 0, 0, 0).unwrap() + TimeDelta::seconds(seconds)
    }

    fn interval(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(at(start), at(end)).unwrap()
    }

    /// One sample per second over `[0, len)` on `CHANNEL4`, with a spike of
    /// 100 at each second in `spikes` and 1.0 elsewhere.
    fn light_curve(len: i64, spikes: &[i64]) -> LightCurve {
        let series = TimeSeries::from_samples((0..len).map(|second| {
            let value = if spikes.contains(&second) { 100.0 } else { 1.0 };
            (at(second), value)
        }))
        .unwrap();
        let mut curve = LightCurve::new();
        curve.insert("CHANNEL4", series);
        curve
    }

    fn length_estimator() -> EstimatorRegistry {
        let mut registry = EstimatorRegistry::new();
        registry.register("length", |values: &[Real]| {
            Ok::<_, EstimatorError>(values.len() as Real)
        });
        registry.register("failing", |_: &[Real]| {
            Err::<Real, _>(EstimatorError::DegenerateFit)
        });
        registry
    }

    fn config(estimators: &[&str]) -> AnalysisConfig {
        AnalysisConfig {
            estimators: estimators.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_estimators_are_rejected_up_front() {
        assert!(matches!(
            Pipeline::new(config(&["whittleFit"]), EstimatorRegistry::with_defaults()),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(matches!(
            Pipeline::new(config(&[]), EstimatorRegistry::with_defaults()),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(Pipeline::new(AnalysisConfig::default(), EstimatorRegistry::with_defaults()).is_ok());
    }

    #[test]
    fn first_window_is_never_labelled() {
        let curve = light_curve(7200, &[]);
        let pipeline = Pipeline::new(config(&["length"]), length_estimator()).unwrap();
        let report = pipeline
            .run(&curve, &[interval(0, 1800), interval(3600, 7199)])
            .unwrap();

        assert_eq!(report.windows.len(), 2);
        assert!(report.windows[0].segments.is_empty());
        let segments = &report.windows[1].segments;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, Label::NoSpike);
        assert_eq!(segments[0].num_samples, 3600);
        assert_eq!(report.exponents(Label::NoSpike, "length"), &[3600.0]);
    }

    #[test]
    fn spike_splits_window() {
        let curve = light_curve(7200, &[5400]);
        let pipeline = Pipeline::new(config(&["length"]), length_estimator()).unwrap();
        let mut inspected = Vec::new();
        let report = pipeline
            .run_with(
                &curve,
                &[interval(0, 3599), interval(3600, 7199)],
                |segment, label| inspected.push((segment.parent_index, label)),
            )
            .unwrap();

        assert_eq!(
            inspected,
            vec![(1, Label::AfterFlare), (1, Label::BeforeFlare)]
        );
        let window = &report.windows[1];
        assert_eq!(window.spikes.len(), 1);
        assert_eq!(window.spikes.intervals()[0], interval(5340, 5472));
        assert_eq!(window.segments[0].range, Some(interval(3600, 5339)));
        assert_eq!(window.segments[1].range, Some(interval(5473, 7199)));
    }

    #[test]
    fn estimator_failures_are_recorded_and_skipped() {
        let curve = light_curve(7200, &[]);
        let pipeline = Pipeline::new(config(&["length", "failing"]), length_estimator()).unwrap();
        let report = pipeline
            .run(&curve, &[interval(0, 1800), interval(3600, 7199)])
            .unwrap();

        let exponents = &report.windows[1].segments[0].exponents;
        assert_eq!(exponents["length"], Some(3600.0));
        assert_eq!(exponents["failing"], None);
        assert!(report.exponents(Label::NoSpike, "failing").is_empty());
    }

    #[test]
    fn unusable_windows_are_skipped() {
        let curve = light_curve(7200, &[]);
        let pipeline = Pipeline::new(config(&["length"]), length_estimator()).unwrap();
        let report = pipeline
            .run(
                &curve,
                &[interval(0, 1800), interval(8000, 9000), interval(3600, 7199)],
            );
        // Out of order windows are rejected as a whole.
        assert!(report.is_err());

        let report = pipeline
            .run(
                &curve,
                &[interval(0, 1800), interval(3600, 7199), interval(8000, 9000)],
            )
            .unwrap();
        assert_eq!(report.windows.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].parent_index, 2);
    }

    #[test]
    fn missing_channel_skips_every_window() {
        let curve = light_curve(7200, &[]);
        let pipeline = Pipeline::new(
            AnalysisConfig {
                channel: "CHANNEL2".to_owned(),
                ..config(&["length"])
            },
            length_estimator(),
        )
        .unwrap();
        let report = pipeline.run(&curve, &[interval(0, 1800)]).unwrap();
        assert!(report.windows.is_empty());
        assert!(report.skipped[0].reason.contains("CHANNEL2"));
    }
}
