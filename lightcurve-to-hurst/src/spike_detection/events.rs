use super::detectors::Detector;
use crate::lightcurve::{Real, Timestamp};

#[derive(Clone)]
pub(crate) struct EventIter<I, D>
where
    I: Iterator<Item = (Timestamp, Real)>,
    D: Detector,
{
    source: I,
    detector: D,
    finished: bool,
}

impl<I, D> Iterator for EventIter<I, D>
where
    I: Iterator<Item = (Timestamp, Real)>,
    D: Detector,
{
    type Item = D::EventType;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.source.next() {
                Some((time, value)) => {
                    if let Some(event) = self.detector.signal(time, value) {
                        return Some(event);
                    }
                }
                None if self.finished => return None,
                None => {
                    self.finished = true;
                    return self.detector.finish();
                }
            }
        }
    }
}

pub(crate) trait EventFilter<I, D>
where
    I: Iterator<Item = (Timestamp, Real)>,
    D: Detector,
{
    fn events(self, detector: D) -> EventIter<I, D>;
}

impl<I, D> EventFilter<I, D> for I
where
    I: Iterator<Item = (Timestamp, Real)>,
    D: Detector,
{
    fn events(self, detector: D) -> EventIter<I, D> {
        EventIter {
            source: self,
            detector,
            finished: false,
        }
    }
}
