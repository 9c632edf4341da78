//! Value types shared by every stage of the analysis.
//!
//! A [TimeSeries] is one instrument channel over one observation window,
//! a [TimeInterval] is a closed span of time (a spike, an event or a
//! no-event window). Stages never mutate a series in place, they return
//! freshly sliced copies.

mod interval;
mod series;

pub use interval::{TimeInterval, merge_intervals};
pub use proba2gi_common::{Real, Timestamp};
pub use series::TimeSeries;

/// A light curve holds several named channels over one time axis,
/// for instance LYRA's four irradiance channels.
#[derive(Debug, Clone, Default)]
pub struct LightCurve {
    channels: std::collections::BTreeMap<String, TimeSeries>,
}

impl LightCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, series: TimeSeries) {
        self.channels.insert(name.into(), series);
    }

    pub fn channel(&self, name: &str) -> Option<&TimeSeries> {
        self.channels.get(name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
}
