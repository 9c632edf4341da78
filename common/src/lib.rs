pub mod metrics;
pub mod tracer;

use chrono::{DateTime, Utc};

pub type Real = f64;
pub type Timestamp = DateTime<Utc>;

/// Used when timestamps are written to logs, file names and saved segments.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Compact form of [TIMESTAMP_FORMAT] which is safe to use in file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
