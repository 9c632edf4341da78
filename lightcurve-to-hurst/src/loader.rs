//! Reads light curves and event catalogs from disk.
//!
//! A light curve file is comma separated text with a header naming the
//! time column and each channel, e.g. `time,CHANNEL1,CHANNEL4`, followed by
//! one row per sample with an RFC 3339 timestamp. An event catalog is JSON:
//! ```json
//! {
//!   "observation": { "start": "2011-02-15T00:00:00Z", "end": "2011-02-16T00:00:00Z" },
//!   "events": [{ "start": "2011-02-15T01:44:00Z", "end": "2011-02-15T02:06:00Z" }]
//! }
//! ```

use crate::{
    catalog::no_event_windows,
    error::LoadError,
    lightcurve::{LightCurve, Real, TimeInterval, TimeSeries, Timestamp},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
};
use tracing::info;

/// Flares recorded during one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    pub observation: TimeInterval,
    #[serde(default)]
    pub events: Vec<TimeInterval>,
}

impl EventCatalog {
    pub fn no_event_windows(&self) -> Vec<TimeInterval> {
        no_event_windows(&self.observation, &self.events)
    }
}

pub fn load_event_catalog(path: &Path) -> Result<EventCatalog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::IO {
        path: path.to_owned(),
        source,
    })?;
    let catalog: EventCatalog = serde_json::from_reader(BufReader::new(file))?;
    info!(
        "Loaded {} events from {}",
        catalog.events.len(),
        path.display()
    );
    Ok(catalog)
}

pub fn load_light_curve(path: &Path) -> Result<LightCurve, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::IO {
        path: path.to_owned(),
        source,
    })?;
    let curve = parse_light_curve(&text)?;
    info!(
        "Loaded channels [{}] from {}",
        curve.channel_names().collect::<Vec<_>>().join(", "),
        path.display()
    );
    Ok(curve)
}

fn parse_timestamp(text: &str, line: usize) -> Result<Timestamp, LoadError> {
    DateTime::parse_from_rfc3339(text)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|source| LoadError::Timestamp {
            text: text.to_owned(),
            line,
            source,
        })
}

/// Parses light curve text. Blank lines are ignored, line numbers in errors
/// count from one.
pub fn parse_light_curve(text: &str) -> Result<LightCurve, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next().ok_or(LoadError::MissingHeader)?;
    let names = header
        .split(',')
        .skip(1)
        .map(|name| name.trim().to_owned())
        .collect::<Vec<_>>();
    if names.is_empty() {
        return Err(LoadError::MissingHeader);
    }

    let mut times = Vec::new();
    let mut columns = vec![Vec::<Real>::new(); names.len()];
    for (line, row) in lines {
        let mut fields = row.split(',').map(str::trim);
        let got = row.split(',').count();
        if got != names.len() + 1 {
            return Err(LoadError::ColumnCount {
                expected: names.len() + 1,
                got,
                line,
            });
        }
        if let Some(time) = fields.next() {
            times.push(parse_timestamp(time, line)?);
        }
        for (column, field) in columns.iter_mut().zip(fields) {
            let value = field.parse().map_err(|source| LoadError::Float {
                text: field.to_owned(),
                line,
                source,
            })?;
            column.push(value);
        }
    }

    let mut curve = LightCurve::new();
    for (name, values) in names.into_iter().zip(columns) {
        curve.insert(name, TimeSeries::new(times.clone(), values)?);
    }
    Ok(curve)
}
