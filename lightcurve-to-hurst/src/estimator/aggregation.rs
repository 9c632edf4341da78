use super::EstimatorError;
use crate::{lightcurve::Real, statistics::linear_fit};
use itertools::Itertools;

const MIN_SCALES: usize = 2;

/// Settings shared by the estimators that aggregate a series into blocks
/// of increasing size and regress a statistic against block size on a
/// log-log scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationConfig {
    /// Number of logarithmically spaced block sizes tried.
    pub levels: usize,
    /// Fewest blocks that a block size must yield.
    pub min_points: usize,
    /// Block sizes outside this closed range are left out of the regression.
    pub fit_range: (Real, Real),
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            levels: 10,
            min_points: 3,
            fit_range: (10.0_f64.powf(0.7), 10.0_f64.powf(2.5)),
        }
    }
}

impl AggregationConfig {
    pub(super) fn check(&self, values: &[Real]) -> Result<(), EstimatorError> {
        let needed = 2 * self.min_points;
        if values.len() < needed {
            return Err(EstimatorError::TooShort {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(EstimatorError::NonFinite);
        }
        Ok(())
    }

    /// Block sizes `floor(10^(k * log10(n / min_points) / levels))` for
    /// `k = 1..=levels`, deduplicated and restricted to the fit range.
    pub(super) fn block_sizes(&self, len: usize) -> Vec<usize> {
        if len < self.min_points || self.levels == 0 {
            return Vec::new();
        }
        let increment = (len as Real / self.min_points as Real).log10() / self.levels as Real;
        (1..=self.levels)
            .map(|k| 10.0_f64.powf(k as Real * increment).floor() as usize)
            .dedup()
            .filter(|&size| {
                let size_real = size as Real;
                size > 0
                    && len / size >= 2
                    && self.fit_range.0 <= size_real
                    && size_real <= self.fit_range.1
            })
            .collect()
    }

    /// Regresses `log10(statistic)` on `log10(block size)` and returns the slope.
    /// Scales whose statistic is not strictly positive are dropped first.
    pub(super) fn fit_slope(
        &self,
        scales: impl IntoIterator<Item = (usize, Real)>,
    ) -> Result<Real, EstimatorError> {
        let (x, y): (Vec<Real>, Vec<Real>) = scales
            .into_iter()
            .filter(|&(_, statistic)| statistic.is_finite() && statistic > 0.0)
            .map(|(size, statistic)| ((size as Real).log10(), statistic.log10()))
            .unzip();
        if x.len() < MIN_SCALES {
            return Err(EstimatorError::TooFewScales {
                usable: x.len(),
                needed: MIN_SCALES,
            });
        }
        linear_fit(&x, &y)
            .map(|(slope, _)| slope)
            .filter(|slope| slope.is_finite())
            .ok_or(EstimatorError::DegenerateFit)
    }
}

/// Means of consecutive non-overlapping blocks of `size` samples. A trailing
/// partial block is discarded.
pub(super) fn block_means(values: &[Real], size: usize) -> Vec<Real> {
    values
        .chunks_exact(size)
        .map(|block| block.iter().sum::<Real>() / size as Real)
        .collect()
}
