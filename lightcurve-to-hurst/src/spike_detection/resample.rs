use crate::{
    error::{AnalysisError, AnalysisResult},
    lightcurve::{Real, TimeSeries, Timestamp},
};
use chrono::TimeDelta;
use itertools::Itertools;

/// Averages `series` into bins of width `bin_size` anchored at its first sample.
/// Each output point is `(bin start, mean of the samples in the bin)`;
/// bins which hold no samples are omitted.
pub(crate) fn resample_mean(
    series: &TimeSeries,
    bin_size: TimeDelta,
) -> AnalysisResult<Vec<(Timestamp, Real)>> {
    let Some(origin) = series.first() else {
        return Ok(Vec::new());
    };
    let width = bin_size
        .num_microseconds()
        .filter(|width| *width > 0)
        .ok_or(AnalysisError::DurationOutOfRange(bin_size))?;

    let bin_indices = series
        .times()
        .iter()
        .map(|time| {
            let offset = *time - origin;
            offset
                .num_microseconds()
                .map(|micros| micros / width)
                .ok_or(AnalysisError::DurationOutOfRange(offset))
        })
        .collect::<AnalysisResult<Vec<i64>>>()?;

    let bins = bin_indices
        .iter()
        .zip(series.values())
        .chunk_by(|(index, _)| **index);

    let mut resampled = Vec::new();
    for (index, bin) in &bins {
        let (count, sum) = bin.fold((0usize, Real::default()), |(count, sum), (_, value)| {
            (count + 1, sum + *value)
        });
        resampled.push((
            origin + TimeDelta::microseconds(index * width),
            sum / count as Real,
        ));
    }
    Ok(resampled)
}
