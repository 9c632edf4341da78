use super::{
    EstimatorError, LongMemoryEstimator,
    aggregation::{AggregationConfig, block_means},
};
use crate::{lightcurve::Real, statistics::sample_std_dev};
use itertools::Itertools;

/// Differenced variance method: the aggregated variance at each block size
/// minus the one at the next larger size. Differencing cancels slow trends
/// and level shifts that bias [super::AggregatedVariance], while keeping the
/// `m^(2H - 2)` scaling.
#[derive(Debug, Clone, Default)]
pub struct DifferencedVariance {
    config: AggregationConfig,
}

impl DifferencedVariance {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }
}

/// Pairs each block size with the drop in variance to the next block size.
/// The largest block size has no successor and is left out.
fn differences(variances: &[(usize, Real)]) -> impl Iterator<Item = (usize, Real)> + '_ {
    variances
        .iter()
        .tuple_windows()
        .map(|(&(size, variance), &(_, next))| (size, variance - next))
}

impl LongMemoryEstimator for DifferencedVariance {
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError> {
        self.config.check(values)?;
        let variances = self
            .config
            .block_sizes(values.len())
            .into_iter()
            .filter_map(|size| {
                let variance = sample_std_dev(&block_means(values, size))?.powi(2);
                Some((size, variance))
            })
            .collect::<Vec<_>>();
        // Negative differences are dropped by the fit.
        let slope = self.config.fit_slope(differences(&variances))?;
        Ok(1.0 + slope / 2.0)
    }
}
