mod parameters;

use anyhow::Result;
use clap::Parser;
use lightcurve_to_hurst::{
    AnalysisReport, EstimatorRegistry, InstrumentSource, Pipeline, compare_labels,
    detect_spikes,
    loader::{load_event_catalog, load_light_curve},
    save_to_file::save_segment,
};
use metrics::counter;
use parameters::{AnalyseParameters, CompareParameters, Mode, SpikesParameters};
use proba2gi_common::{
    metrics::{
        component_info_metric, describe_analysis_metrics,
        failures::{self, FailureKind},
        names::FAILURES,
    },
    tracer::{TracerEngine, TracerOptions},
};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{error, info, level_filters::LevelFilter, warn};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    pub(crate) mode: Mode,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let _tracer = TracerEngine::new(TracerOptions {
        default_level: args.log_level,
        use_stderr: true,
    })?;

    component_info_metric("lightcurve-to-hurst");
    describe_analysis_metrics();

    match args.mode {
        Mode::Analyse(parameters) => analyse(&parameters),
        Mode::Spikes(parameters) => spikes(&parameters),
        Mode::Compare(parameters) => compare(&parameters),
    }
}

fn day_failed(path: &Path, e: &anyhow::Error) {
    error!("Skipping {}: {e:#}", path.display());
    counter!(FAILURES, &[failures::get_label(FailureKind::DayFailed)]).increment(1);
}

fn analyse(parameters: &AnalyseParameters) -> Result<()> {
    let pipeline = Pipeline::new(
        parameters.analysis_config(),
        EstimatorRegistry::with_defaults(),
    )?;
    if let Some(save_path) = &parameters.save_path {
        fs::create_dir_all(save_path)?;
    }

    let mut report = AnalysisReport::default();
    for (lightcurve, events) in parameters.days.days()? {
        match analyse_day(&pipeline, lightcurve, events, parameters.save_path.as_deref()) {
            Ok(day) => report.merge(day),
            Err(e) => day_failed(lightcurve, &e),
        }
    }

    match &parameters.output {
        Some(output) => {
            let file = BufWriter::new(File::create(output)?);
            serde_json::to_writer_pretty(file, &report)?;
            info!("Report written to {}", output.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[tracing::instrument(skip(pipeline, save_path))]
fn analyse_day(
    pipeline: &Pipeline,
    lightcurve: &Path,
    events: &Path,
    save_path: Option<&Path>,
) -> Result<AnalysisReport> {
    let curve = load_light_curve(lightcurve)?;
    let windows = load_event_catalog(events)?.no_event_windows();
    let report = pipeline.run_with(&curve, &windows, |segment, label| {
        let Some(directory) = save_path else {
            return;
        };
        if let Err(e) = save_segment(directory, segment, label) {
            warn!("Failed to save segment: {e}");
            counter!(
                FAILURES,
                &[failures::get_label(FailureKind::FileWriteFailed)]
            )
            .increment(1);
        }
    })?;
    Ok(report)
}

fn spikes(parameters: &SpikesParameters) -> Result<()> {
    let detector = parameters.detector.spike_parameters();
    detector.validate()?;

    for (lightcurve, events) in parameters.days.days()? {
        let day = load_light_curve(lightcurve)
            .and_then(|curve| Ok((curve, load_event_catalog(events)?)));
        let (curve, catalog) = match day {
            Ok(day) => day,
            Err(e) => {
                day_failed(lightcurve, &e.into());
                continue;
            }
        };
        for window in catalog.no_event_windows() {
            let found = curve
                .series(&parameters.detector.channel, &window)
                .and_then(|series| detect_spikes(&series, &detector));
            match found {
                Ok(spikes) => {
                    for spike in &spikes {
                        println!("{window}\t{spike}");
                    }
                }
                Err(e) => warn!("Window {window}: {e}"),
            }
        }
    }
    Ok(())
}

fn compare(parameters: &CompareParameters) -> Result<()> {
    let report: AnalysisReport =
        serde_json::from_reader(BufReader::new(File::open(&parameters.report)?))?;

    let estimators = match &parameters.estimator {
        Some(estimator) => vec![estimator.clone()],
        None => report
            .samples
            .values()
            .flat_map(|by_estimator| by_estimator.keys().cloned())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect(),
    };

    for estimator in estimators {
        for comparison in compare_labels(&report, &estimator, parameters.exponent_ceiling) {
            println!(
                "{estimator}\t{} ({}) vs {} ({})\tD = {:.4}\tp = {:.4}",
                comparison.first,
                comparison.first_count,
                comparison.second,
                comparison.second_count,
                comparison.test.statistic,
                comparison.test.p_value
            );
        }
    }
    Ok(())
}
