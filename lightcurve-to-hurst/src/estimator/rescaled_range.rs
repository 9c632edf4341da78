use super::{EstimatorError, LongMemoryEstimator, aggregation::AggregationConfig};
use crate::{lightcurve::Real, statistics::mean};
use itertools::{Itertools, MinMaxResult};

/// Rescaled range (R/S) analysis: the range of cumulative deviations within
/// a block, divided by the block's standard deviation, grows as `m^H`.
#[derive(Debug, Clone, Default)]
pub struct RescaledRange {
    config: AggregationConfig,
}

impl RescaledRange {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }
}

/// R/S of a single block, `None` when the block is flat.
fn rescaled_range(block: &[Real]) -> Option<Real> {
    let centre = mean(block)?;
    let deviation = (block.iter().map(|value| (value - centre).powi(2)).sum::<Real>()
        / block.len() as Real)
        .sqrt();
    if deviation <= 0.0 {
        return None;
    }
    let cumulative = block.iter().scan(0.0, |total, value| {
        *total += value - centre;
        Some(*total)
    });
    let range = match cumulative.minmax_by(Real::total_cmp) {
        MinMaxResult::MinMax(min, max) => max - min,
        _ => return None,
    };
    Some(range / deviation)
}

impl LongMemoryEstimator for RescaledRange {
    fn estimate(&self, values: &[Real]) -> Result<Real, EstimatorError> {
        self.config.check(values)?;
        let scales = self
            .config
            .block_sizes(values.len())
            .into_iter()
            .filter_map(|size| {
                let ratios = values
                    .chunks_exact(size)
                    .filter_map(rescaled_range)
                    .collect::<Vec<_>>();
                Some((size, mean(&ratios)?))
            });
        self.config.fit_slope(scales)
    }
}
