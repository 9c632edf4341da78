pub(crate) mod threshold_detector;

use crate::lightcurve::{Real, Timestamp};

/// Consumes a stream of scored points and emits an event whenever
/// a pattern completes. `finish` flushes any event still open when
/// the stream ends.
pub(crate) trait Detector: Clone {
    type EventType;

    fn signal(&mut self, time: Timestamp, value: Real) -> Option<Self::EventType>;

    fn finish(&mut self) -> Option<Self::EventType>;
}
