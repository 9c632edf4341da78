use super::{
    EstimatorError, LongMemoryEstimator,
    aggregation::{AggregationConfig, block_means},
};
use crate::{lightcurve::Real, statistics::mean};

/// Absolute moment method: the mean absolute deviation of block means
/// from the series mean scales as `m^(H - 1)`.
#[derive(Debug, Clone, Default)]
pub struct AbsoluteValue {
    config: AggregationConfig,
}

impl AbsoluteValue {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }
}

impl LongMemoryEstimator for AbsoluteValue {
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError> {
        self.config.check(values)?;
        let overall = mean(values).ok_or(EstimatorError::TooShort {
            needed: 1,
            got: 0,
        })?;
        let scales = self
            .config
            .block_sizes(values.len())
            .into_iter()
            .filter_map(|size| {
                let deviations = block_means(values, size)
                    .into_iter()
                    .map(|block| (block - overall).abs())
                    .collect::<Vec<_>>();
                Some((size, mean(&deviations)?))
            });
        let slope = self.config.fit_slope(scales)?;
        Ok(1.0 + slope)
    }
}
