//! Small descriptive statistics used by the detector, the estimators
//! and the comparison of exponent distributions.

use crate::lightcurve::Real;
use serde::{Deserialize, Serialize};

pub fn mean(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<Real>() / values.len() as Real)
}

/// Standard deviation with `n - 1` degrees of freedom.
pub fn sample_std_dev(values: &[Real]) -> Option<Real> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<Real>();
    Some((sum_sq / (values.len() - 1) as Real).sqrt())
}

pub fn median(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted.get(mid).copied()
    } else {
        Some((sorted.get(mid - 1)? + sorted.get(mid)?) * 0.5)
    }
}

/// Least squares fit of `y = slope * x + intercept`.
/// Returns `(slope, intercept)`, or `None` if fewer than two points are
/// given or every `x` is equal.
pub fn linear_fit(x: &[Real], y: &[Real]) -> Option<(Real, Real)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;
    let (sxx, sxy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - mean_x;
            (sxx + dx * dx, sxy + dx * (yi - mean_y))
        });
    if sxx == 0.0 || !sxx.is_finite() {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Outcome of a two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsTest {
    /// Largest distance between the two empirical distribution functions.
    pub statistic: Real,
    /// Two-sided asymptotic p-value.
    pub p_value: Real,
}

/// Two-sided two-sample Kolmogorov-Smirnov test. Returns `None` if either
/// sample is empty or holds a non-finite value.
pub fn ks_two_sample(a: &[Real], b: &[Real]) -> Option<KsTest> {
    if a.is_empty() || b.is_empty() || a.iter().chain(b).any(|v| !v.is_finite()) {
        return None;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (n1, n2) = (a.len() as Real, b.len() as Real);
    let statistic = a
        .iter()
        .chain(b.iter())
        .map(|x| {
            let cdf_a = a.partition_point(|v| v <= x) as Real / n1;
            let cdf_b = b.partition_point(|v| v <= x) as Real / n2;
            (cdf_a - cdf_b).abs()
        })
        .fold(0.0, Real::max);

    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let p_value = kolmogorov_survival((en + 0.12 + 0.11 / en) * statistic);
    Some(KsTest { statistic, p_value })
}

/// Survival function of the limiting Kolmogorov distribution,
/// `Q(x) = 2 sum_{k>=1} (-1)^(k-1) exp(-2 k^2 x^2)`.
fn kolmogorov_survival(x: Real) -> Real {
    const MAX_TERMS: i32 = 100;

    let a2 = -2.0 * x * x;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous_term: Real = 0.0;
    for k in 1..=MAX_TERMS {
        let term = sign * (a2 * Real::from(k * k)).exp();
        sum += term;
        if term.abs() <= 1e-3 * previous_term || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous_term = term.abs();
    }
    // The series only fails to converge as x approaches zero.
    1.0
}
