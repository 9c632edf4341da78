use super::{
    EstimatorError, LongMemoryEstimator,
    aggregation::{AggregationConfig, block_means},
};
use crate::{lightcurve::Real, statistics::sample_std_dev};

/// Aggregated variance method: the variance of block means of a series
/// with Hurst exponent `H` scales as `m^(2H - 2)` with block size `m`.
#[derive(Debug, Clone, Default)]
pub struct AggregatedVariance {
    config: AggregationConfig,
}

impl AggregatedVariance {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }
}

impl LongMemoryEstimator for AggregatedVariance {
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError> {
        self.config.check(values)?;
        let scales = self
            .config
            .block_sizes(values.len())
            .into_iter()
            .filter_map(|size| {
                let variance = sample_std_dev(&block_means(values, size))?.powi(2);
                Some((size, variance))
            });
        let slope = self.config.fit_slope(scales)?;
        Ok(1.0 + slope / 2.0)
    }
}
