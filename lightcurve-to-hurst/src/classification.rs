//! Labels the segments of each no-event window by their position
//! relative to the flares bounding the window.

use crate::{
    error::{AnalysisError, AnalysisResult},
    lightcurve::TimeSeries,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Label {
    /// The window held no spike, the segment runs from one flare to the next.
    NoSpike,
    /// The segment starts at the end of a flare and ends at a spike.
    AfterFlare,
    /// The segment lies between two spikes.
    BetweenSpikes,
    /// The segment starts at a spike and ends at the start of a flare.
    BeforeFlare,
}

impl Label {
    /// Label of the segment at `position` out of `total` from one window.
    pub fn for_position(position: usize, total: usize) -> Label {
        match total {
            0 | 1 => Label::NoSpike,
            _ if position == 0 => Label::AfterFlare,
            _ if position + 1 >= total => Label::BeforeFlare,
            _ => Label::BetweenSpikes,
        }
    }
}

/// A piece of a no-event window together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Index of the no-event window the segment came from.
    pub parent_index: usize,
    /// Position among the segments of the same window, in time order.
    pub position_index: usize,
    /// Number of segments the window was split into.
    pub total_segments: usize,
    pub series: TimeSeries,
}

/// Pairs each segment of one window with its label, preserving order.
///
/// The first window of a run is always dropped: whether it follows a flare
/// is unknown, so an empty list is returned whatever `segments` holds.
///
/// # Errors
/// [AnalysisError::InvalidParameter] if `segments` is empty for any other window.
pub fn classify(
    parent_index: usize,
    is_first_parent: bool,
    segments: Vec<TimeSeries>,
) -> AnalysisResult<Vec<(Segment, Label)>> {
    if is_first_parent {
        return Ok(Vec::new());
    }
    if segments.is_empty() {
        return Err(AnalysisError::invalid_parameter(format!(
            "window {parent_index} produced no segments"
        )));
    }

    let total_segments = segments.len();
    Ok(segments
        .into_iter()
        .enumerate()
        .map(|(position_index, series)| {
            (
                Segment {
                    parent_index,
                    position_index,
                    total_segments,
                    series,
                },
                Label::for_position(position_index, total_segments),
            )
        })
        .collect())
}
