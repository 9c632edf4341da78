use anyhow::{Error, anyhow, ensure};
use chrono::TimeDelta;
use clap::{Args, Subcommand};
use lightcurve_to_hurst::{
    lightcurve::Real,
    pipeline::AnalysisConfig,
    spike_detection::SpikeDetectorParameters,
};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// A duration written as a number followed by a unit, e.g. `12s`, `1.5m`,
/// `250ms` or `2h`.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct DurationWrapper(pub(crate) TimeDelta);

impl FromStr for DurationWrapper {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| anyhow!("Duration '{s}' has no unit, expected one of ms, s, m, h"))?;
        let (number, unit) = s.split_at(split);
        let number = Real::from_str(number.trim())?;
        ensure!(
            number.is_finite() && number >= 0.0,
            "Duration '{s}' must be finite and non-negative"
        );
        let microseconds_per_unit = match unit {
            "ms" => 1e3,
            "s" => 1e6,
            "m" => 60e6,
            "h" => 3600e6,
            _ => return Err(anyhow!("Unknown unit '{unit}' in duration '{s}'")),
        };
        let microseconds = (number * microseconds_per_unit).round();
        ensure!(
            microseconds < i64::MAX as Real,
            "Duration '{s}' is too long"
        );
        Ok(DurationWrapper(TimeDelta::microseconds(microseconds as i64)))
    }
}

/// Comma separated estimator identifiers, e.g. `aggvarFit,rsFit`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct EstimatorList(pub(crate) Vec<String>);

impl FromStr for EstimatorList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let identifiers = s
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        ensure!(!identifiers.is_empty(), "No estimators given in '{s}'");
        Ok(EstimatorList(identifiers))
    }
}

/// Light curve and event catalog files, one pair per day.
#[derive(Debug, Clone, Args)]
pub struct DayFiles {
    /// Light curve CSV file, repeat for each day.
    #[clap(long, required = true)]
    lightcurve: Vec<PathBuf>,

    /// Event catalog JSON file, one per light curve and in the same order.
    #[clap(long, required = true)]
    events: Vec<PathBuf>,
}

impl DayFiles {
    pub fn days(&self) -> anyhow::Result<impl Iterator<Item = (&Path, &Path)>> {
        ensure!(
            self.lightcurve.len() == self.events.len(),
            "{} light curves given with {} event catalogs",
            self.lightcurve.len(),
            self.events.len()
        );
        Ok(self
            .lightcurve
            .iter()
            .map(PathBuf::as_path)
            .zip(self.events.iter().map(PathBuf::as_path)))
    }
}

#[derive(Debug, Clone, Args)]
pub struct DetectorOptions {
    /// Light curve channel to analyse.
    #[clap(long, default_value = "CHANNEL4")]
    pub channel: String,

    /// Width of the bins the light curve is averaged into.
    #[clap(long, default_value = "12s")]
    bin_size: DurationWrapper,

    /// Standardised residual above which a bin is part of a spike.
    #[clap(long, default_value = "2.0")]
    threshold_factor: Real,

    /// Removed from the light curve either side of each spike.
    #[clap(long, default_value = "1m")]
    exclusion_margin: DurationWrapper,
}

impl DetectorOptions {
    pub fn spike_parameters(&self) -> SpikeDetectorParameters {
        SpikeDetectorParameters {
            bin_size: self.bin_size.0,
            threshold_factor: self.threshold_factor,
            exclusion_margin: self.exclusion_margin.0,
        }
    }
}

const DEFAULT_ESTIMATORS: &str = "aggvarFit,diffvarFit,absvalFit,rsFit";

#[derive(Debug, Clone, Args)]
pub struct AnalyseParameters {
    #[clap(flatten)]
    pub days: DayFiles,

    #[clap(flatten)]
    pub detector: DetectorOptions,

    /// Estimators run on every segment.
    #[clap(long, default_value = DEFAULT_ESTIMATORS)]
    estimators: EstimatorList,

    /// If set, each labelled segment is written to a CSV file in this directory.
    #[clap(long)]
    pub save_path: Option<PathBuf>,

    /// Where the JSON report is written, stdout if absent.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

impl AnalyseParameters {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            channel: self.detector.channel.clone(),
            spikes: self.detector.spike_parameters(),
            estimators: self.estimators.0.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SpikesParameters {
    #[clap(flatten)]
    pub days: DayFiles,

    #[clap(flatten)]
    pub detector: DetectorOptions,
}

#[derive(Debug, Clone, Args)]
pub struct CompareParameters {
    /// JSON report written by the analyse command.
    #[clap(long)]
    pub report: PathBuf,

    /// Exponents at or above this are left out of the comparison.
    #[clap(long, default_value = "1.0")]
    pub exponent_ceiling: Real,

    /// Compare only this estimator's exponents, all estimators in the report if absent.
    #[clap(long)]
    pub estimator: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    #[clap(
        about = "Finds spikes in the no-event windows of each day, labels the segments between them and estimates their Hurst exponents."
    )]
    Analyse(AnalyseParameters),
    #[clap(about = "Lists the spikes found in the no-event windows of each day.")]
    Spikes(SpikesParameters),
    #[clap(
        about = "Compares the exponent distributions of each pair of labels in a report with a two-sample KS test."
    )]
    Compare(CompareParameters),
}
