use crate::estimator::EstimatorError;
use chrono::TimeDelta;
use std::{num::ParseFloatError, path::PathBuf};
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid Parameter: {0}")]
    InvalidParameter(String),
    #[error("Insufficient Data: {needed} samples needed, {got} given")]
    InsufficientData { needed: usize, got: usize },
    #[error("Estimator {estimator} Failed: {source}")]
    EstimatorFailure {
        estimator: String,
        #[source]
        source: EstimatorError,
    },
    #[error("Channel {0} not present in light curve")]
    MissingChannel(String),
    #[error("Duration {0} cannot be expressed in microseconds")]
    DurationOutOfRange(TimeDelta),
}

impl AnalysisError {
    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO Error reading {path}: {source}")]
    IO {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid Timestamp {text:?} on line {line}: {source}")]
    Timestamp {
        text: String,
        line: usize,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Invalid Float {text:?} on line {line}: {source}")]
    Float {
        text: String,
        line: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error("Expected {expected} columns on line {line}, got {got}")]
    ColumnCount {
        expected: usize,
        got: usize,
        line: usize,
    },
    #[error("Light curve file is missing its header")]
    MissingHeader,
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}
