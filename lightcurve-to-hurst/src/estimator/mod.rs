//! Long-memory (Hurst exponent) estimators, looked up by identifier.
//!
//! The registry maps an identifier such as `aggvarFit` to anything
//! implementing [LongMemoryEstimator], so further estimators (including
//! bridges to external statistics packages) can be added without touching
//! the rest of the analysis.

mod absolute_value;
mod aggregated_variance;
mod aggregation;
mod differenced_variance;
mod rescaled_range;

use crate::{
    error::{AnalysisError, AnalysisResult},
    lightcurve::Real,
};
pub use absolute_value::AbsoluteValue;
pub use aggregated_variance::AggregatedVariance;
pub use aggregation::AggregationConfig;
pub use differenced_variance::DifferencedVariance;
pub use rescaled_range::RescaledRange;
use std::collections::BTreeMap;
use thiserror::Error;

pub const AGGREGATED_VARIANCE: &str = "aggvarFit";
pub const DIFFERENCED_VARIANCE: &str = "diffvarFit";
pub const ABSOLUTE_VALUE: &str = "absvalFit";
pub const RESCALED_RANGE: &str = "rsFit";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("Series too short: {needed} samples needed, {got} given")]
    TooShort { needed: usize, got: usize },
    #[error("Series contains non-finite values")]
    NonFinite,
    #[error("Only {usable} usable aggregation scales, at least {needed} needed")]
    TooFewScales { usable: usize, needed: usize },
    #[error("Regression over the aggregation scales is degenerate")]
    DegenerateFit,
}

pub trait LongMemoryEstimator: Send + Sync {
    /// Estimates the Hurst exponent of `values`, which are assumed evenly sampled.
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError>;
}

impl<F> LongMemoryEstimator for F
where
    F: Fn(&[Real]) -> Result<Real, EstimatorError> + Send + Sync,
{
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError> {
        self(values)
    }
}

#[derive(Default)]
pub struct EstimatorRegistry {
    estimators: BTreeMap<String, Box<dyn LongMemoryEstimator>>,
}

impl EstimatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in estimators with their usual settings.
    pub fn with_defaults() -> Self {
        let config = AggregationConfig::default();
        let mut registry = Self::new();
        registry.register(AGGREGATED_VARIANCE, AggregatedVariance::new(config.clone()));
        registry.register(
            DIFFERENCED_VARIANCE,
            DifferencedVariance::new(config.clone()),
        );
        registry.register(ABSOLUTE_VALUE, AbsoluteValue::new(config.clone()));
        registry.register(RESCALED_RANGE, RescaledRange::new(config));
        registry
    }

    /// Adds an estimator, returning any estimator previously held under `identifier`.
    pub fn register<E>(
        &mut self,
        identifier: impl Into<String>,
        estimator: E,
    ) -> Option<Box<dyn LongMemoryEstimator>>
    where
        E: LongMemoryEstimator + 'static,
    {
        self.estimators
            .insert(identifier.into(), Box::new(estimator))
    }

    pub fn get(&self, identifier: &str) -> Option<&dyn LongMemoryEstimator> {
        self.estimators.get(identifier).map(Box::as_ref)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.estimators.keys().map(String::as_str)
    }

    /// Checks every identifier in `identifiers` is registered.
    pub fn resolve(&self, identifiers: &[String]) -> AnalysisResult<()> {
        match identifiers.iter().find(|id| self.get(id).is_none()) {
            Some(unknown) => Err(AnalysisError::invalid_parameter(format!(
                "unknown estimator {unknown}, expected one of {}",
                self.identifiers().collect::<Vec<_>>().join(", ")
            ))),
            None => Ok(()),
        }
    }

    pub fn estimate(&self, identifier: &str, values: &[Real]) -> AnalysisResult<Real> {
        let estimator = self.get(identifier).ok_or_else(|| {
            AnalysisError::invalid_parameter(format!("unknown estimator {identifier}"))
        })?;
        estimator
            .estimate(values)
            .map_err(|source| AnalysisError::EstimatorFailure {
                estimator: identifier.to_owned(),
                source,
            })
    }
}
