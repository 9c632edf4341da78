use chrono::{TimeDelta, TimeZone, Utc};
use lightcurve_to_hurst::{
    Label, SpikeDetectorParameters, TimeInterval, TimeSeries, classify, detect_spikes,
    lightcurve::{Real, Timestamp, merge_intervals},
    segment,
};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn at(seconds: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2011, 2, 15, 0, 0, 0).unwrap() + TimeDelta::seconds(seconds)
}

fn per_second(values: &[Real]) -> TimeSeries {
    TimeSeries::from_samples(
        values
            .iter()
            .enumerate()
            .map(|(second, value)| (at(second as i64), *value)),
    )
    .unwrap()
}

fn exclusion_strategy() -> impl Strategy<Value = TimeInterval> {
    (-20_i64..220, 0_i64..40)
        .prop_map(|(start, length)| TimeInterval::new(at(start), at(start + length)).unwrap())
}

/// A noisy baseline with a few large excursions.
fn spiky_values() -> impl Strategy<Value = Vec<Real>> {
    (
        prop::collection::vec(0.0..1.0_f64, 120..900),
        prop::collection::vec((0.0..1.0_f64, 5.0..100.0_f64), 0..6),
    )
        .prop_map(|(mut values, spikes)| {
            let len = values.len();
            for (position, height) in spikes {
                let index = ((position * len as Real) as usize).min(len - 1);
                values[index] += height;
            }
            values
        })
}

fn covered_by(inner: &TimeInterval, cover: &[TimeInterval]) -> bool {
    cover
        .iter()
        .any(|outer| outer.start() <= inner.start() && inner.end() <= outer.end())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn segments_partition_the_series(
        values in prop::collection::vec(-5.0..5.0_f64, 0..200),
        exclusions in prop::collection::vec(exclusion_strategy(), 0..8),
    ) {
        let series = per_second(&values);
        let segments = segment(&series, &exclusions);

        let kept = series
            .iter()
            .filter(|(time, _)| !exclusions.iter().any(|exclusion| exclusion.contains(*time)))
            .collect::<Vec<_>>();
        let rejoined = segments.iter().flat_map(TimeSeries::iter).collect::<Vec<_>>();
        prop_assert_eq!(rejoined, kept);

        let non_empty = segments.iter().filter_map(TimeSeries::range).collect::<Vec<_>>();
        for pair in non_empty.windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
        }

        let expected = match series.range() {
            Some(range) => merge_intervals(&exclusions)
                .iter()
                .filter(|exclusion| exclusion.intersects(&range))
                .count() + 1,
            None => 1,
        };
        prop_assert_eq!(segments.len(), expected);
    }

    #[test]
    fn no_exclusions_is_identity(values in prop::collection::vec(-5.0..5.0_f64, 0..200)) {
        let series = per_second(&values);
        prop_assert_eq!(segment(&series, &[]), vec![series]);
    }

    #[test]
    fn raising_the_threshold_never_adds_spikes(
        values in spiky_values(),
        threshold in 0.5..4.0_f64,
        increase in 0.0..4.0_f64,
    ) {
        let series = per_second(&values);
        let low = detect_spikes(&series, &SpikeDetectorParameters {
            threshold_factor: threshold,
            ..Default::default()
        }).unwrap();
        let high = detect_spikes(&series, &SpikeDetectorParameters {
            threshold_factor: threshold + increase,
            ..Default::default()
        }).unwrap();

        // The number of spikes is not monotone: a run merged at the lower
        // threshold can split in two at the higher one. Only the covered time
        // shrinks, and every spike stays inside one found at the lower threshold.
        prop_assert!(high.total_duration() <= low.total_duration());
        for spike in &high {
            prop_assert!(covered_by(spike, low.intervals()));
        }
        let range = series.range().unwrap();
        for spike in &low {
            prop_assert!(range.start() <= spike.start() && spike.end() <= range.end());
        }
        for pair in low.intervals().windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
        }
    }

    #[test]
    fn constant_series_has_no_spikes(value in -1e6..1e6_f64, len in 3_usize..600) {
        let series = per_second(&vec![value; len]);
        prop_assert!(detect_spikes(&series, &SpikeDetectorParameters::default()).unwrap().is_empty());
    }

    #[test]
    fn labels_follow_position(lengths in prop::collection::vec(0_usize..5, 1..12), parent in 1_usize..100) {
        let segments = lengths
            .iter()
            .map(|len| per_second(&vec![1.0; *len]))
            .collect::<Vec<_>>();
        let total = segments.len();
        let labelled = classify(parent, false, segments.clone()).unwrap();
        prop_assert_eq!(labelled.len(), total);

        let count = |wanted: Label| labelled.iter().filter(|(_, label)| *label == wanted).count();
        if total == 1 {
            prop_assert_eq!(count(Label::NoSpike), 1);
        } else {
            prop_assert_eq!(count(Label::AfterFlare), 1);
            prop_assert_eq!(count(Label::BeforeFlare), 1);
            prop_assert_eq!(count(Label::BetweenSpikes), total - 2);
            prop_assert_eq!(labelled[0].1, Label::AfterFlare);
            prop_assert_eq!(labelled[total - 1].1, Label::BeforeFlare);
        }
        for (position, ((segment, _), series)) in labelled.iter().zip(&segments).enumerate() {
            prop_assert_eq!(segment.parent_index, parent);
            prop_assert_eq!(segment.position_index, position);
            prop_assert_eq!(segment.total_segments, total);
            prop_assert_eq!(&segment.series, series);
        }
    }

    #[test]
    fn first_window_is_always_dropped(lengths in prop::collection::vec(0_usize..5, 0..12)) {
        let segments = lengths
            .iter()
            .map(|len| per_second(&vec![1.0; *len]))
            .collect::<Vec<_>>();
        prop_assert!(classify(0, true, segments).unwrap().is_empty());
    }
}
