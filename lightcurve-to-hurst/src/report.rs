//! Results of a run: what was found in each no-event window, which
//! windows were skipped and the exponent estimates per segment label.

use crate::{
    classification::Label,
    lightcurve::{Real, TimeInterval},
    spike_detection::SpikeSet,
    statistics::{KsTest, ks_two_sample},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Exponent estimates grouped by label, then by estimator identifier.
pub type ExponentSamples = BTreeMap<Label, BTreeMap<String, Vec<Real>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub position_index: usize,
    pub total_segments: usize,
    pub label: Label,
    /// Time covered by the segment's samples, `None` for an empty segment.
    pub range: Option<TimeInterval>,
    pub num_samples: usize,
    /// One entry per configured estimator, `None` where it failed.
    pub exponents: BTreeMap<String, Option<Real>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub parent_index: usize,
    pub window: TimeInterval,
    pub spikes: SpikeSet,
    pub segments: Vec<SegmentResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedWindow {
    pub parent_index: usize,
    pub window: TimeInterval,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub windows: Vec<WindowSummary>,
    pub skipped: Vec<SkippedWindow>,
    pub samples: ExponentSamples,
}

impl AnalysisReport {
    pub(crate) fn push_window(&mut self, summary: WindowSummary) {
        for segment in &summary.segments {
            for (estimator, exponent) in &segment.exponents {
                if let Some(exponent) = exponent {
                    self.samples
                        .entry(segment.label)
                        .or_default()
                        .entry(estimator.clone())
                        .or_default()
                        .push(*exponent);
                }
            }
        }
        self.windows.push(summary);
    }

    pub(crate) fn push_skipped(&mut self, skipped: SkippedWindow) {
        self.skipped.push(skipped);
    }

    /// Appends the results of `other`, typically another day's run.
    pub fn merge(&mut self, other: AnalysisReport) {
        for (label, by_estimator) in other.samples {
            let entry = self.samples.entry(label).or_default();
            for (estimator, exponents) in by_estimator {
                entry.entry(estimator).or_default().extend(exponents);
            }
        }
        self.windows.extend(other.windows);
        self.skipped.extend(other.skipped);
    }

    pub fn exponents(&self, label: Label, estimator: &str) -> &[Real] {
        self.samples
            .get(&label)
            .and_then(|by_estimator| by_estimator.get(estimator))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn num_segments(&self) -> usize {
        self.windows.iter().map(|window| window.segments.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelComparison {
    pub first: Label,
    pub second: Label,
    pub first_count: usize,
    pub second_count: usize,
    pub test: KsTest,
}

/// Runs a two-sample KS test between the exponents of every pair of labels,
/// keeping only exponents strictly below `ceiling`. Pairs where either side
/// has no exponents are left out.
pub fn compare_labels(
    report: &AnalysisReport,
    estimator: &str,
    ceiling: Real,
) -> Vec<LabelComparison> {
    let below_ceiling = |label| {
        report
            .exponents(label, estimator)
            .iter()
            .copied()
            .filter(|&exponent| exponent < ceiling)
            .collect::<Vec<_>>()
    };
    Label::iter()
        .tuple_combinations()
        .filter_map(|(first, second)| {
            let first_sample = below_ceiling(first);
            let second_sample = below_ceiling(second);
            let test = ks_two_sample(&first_sample, &second_sample)?;
            Some(LabelComparison {
                first,
                second,
                first_count: first_sample.len(),
                second_count: second_sample.len(),
                test,
            })
        })
        .collect()
}
