use metrics::{describe_counter, describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    static NAME: &str = "proba2gi_component_info";

    describe_gauge!(NAME, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(NAME, "component" => name, "git_version" => git_rev).set(1);
}

/// Registers descriptions for every counter the analysis emits.
pub fn describe_analysis_metrics() {
    describe_counter!(
        names::WINDOWS_PROCESSED,
        metrics::Unit::Count,
        "Number of no-event windows analysed"
    );
    describe_counter!(
        names::SEGMENTS_CLASSIFIED,
        metrics::Unit::Count,
        "Number of segments given a label"
    );
    describe_counter!(
        names::SPIKES_DETECTED,
        metrics::Unit::Count,
        "Number of spikes found in no-event windows"
    );
    describe_counter!(
        names::FAILURES,
        metrics::Unit::Count,
        "Number of failures encountered"
    );
}

pub mod names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "proba2gi_";

    pub const FAILURES: &str = concatcp!(METRIC_NAME_PREFIX, "failures");
    pub const WINDOWS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "windows_processed");
    pub const SEGMENTS_CLASSIFIED: &str = concatcp!(METRIC_NAME_PREFIX, "segments_classified");
    pub const SPIKES_DETECTED: &str = concatcp!(METRIC_NAME_PREFIX, "spikes_detected");
}

pub mod failures {
    #[derive(Debug, Clone, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        DayFailed,
        EstimatorFailed,
        FileWriteFailed,
        WindowSkipped,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::DayFailed => "day_failed",
                FailureKind::EstimatorFailed => "estimator_failed",
                FailureKind::FileWriteFailed => "file_write_failed",
                FailureKind::WindowSkipped => "window_skipped",
            },
        )
    }
}
