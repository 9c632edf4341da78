//! Splits a series into the maximal pieces that avoid a set of exclusions.
//!
//! Exclusions are treated as closed intervals and are first merged into
//! their minimal ascending, disjoint cover. Exclusions that miss the
//! series' range contribute no split. Each remaining exclusion splits the
//! series exactly once, so the number of pieces is always one more than
//! the number of intersecting exclusions; a piece may therefore be empty,
//! for example when a spike touches the start of the series.

use crate::lightcurve::{TimeInterval, TimeSeries, merge_intervals};
use tracing::trace;

#[tracing::instrument(skip_all, fields(num_samples = series.len(), num_exclusions = exclusions.len(), num_segments))]
pub fn segment(series: &TimeSeries, exclusions: &[TimeInterval]) -> Vec<TimeSeries> {
    let Some(range) = series.range() else {
        return vec![series.clone()];
    };

    let cover = merge_intervals(exclusions)
        .into_iter()
        .filter(|exclusion| exclusion.intersects(&range))
        .collect::<Vec<_>>();

    let mut segments = Vec::with_capacity(cover.len() + 1);
    let mut cursor = 0;
    for exclusion in &cover {
        let start = series.index_at_or_after(exclusion.start()).max(cursor);
        segments.push(series.slice(cursor..start));
        cursor = series.index_after(exclusion.end()).max(start);
        trace!(%exclusion, removed = cursor - start, "Excluded samples");
    }
    segments.push(series.slice(cursor..series.len()));

    tracing::Span::current().record("num_segments", segments.len());
    segments
}
