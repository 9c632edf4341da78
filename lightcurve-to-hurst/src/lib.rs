//! Searches the quiet stretches of a solar light curve for spikes, splits
//! those stretches around the spikes and estimates the Hurst exponent of
//! each piece, grouped by where the piece sits relative to the flares.

pub mod catalog;
pub mod classification;
pub mod error;
pub mod estimator;
pub mod lightcurve;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod save_to_file;
pub mod segmentation;
pub mod spike_detection;
pub mod statistics;

pub use classification::{Label, Segment, classify};
pub use error::{AnalysisError, AnalysisResult, LoadError};
pub use estimator::{EstimatorRegistry, LongMemoryEstimator};
pub use lightcurve::{LightCurve, TimeInterval, TimeSeries};
pub use pipeline::{AnalysisConfig, InstrumentSource, Pipeline};
pub use report::{AnalysisReport, compare_labels};
pub use segmentation::segment;
pub use spike_detection::{SpikeDetectorParameters, SpikeSet, detect_spikes};
