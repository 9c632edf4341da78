use super::Detector;
use crate::lightcurve::{Real, Timestamp};

/// A maximal stretch of consecutive points above the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlaggedRun {
    /// Time of the first flagged point.
    pub(crate) first: Timestamp,
    /// Time of the last flagged point.
    pub(crate) last: Timestamp,
    pub(crate) length: usize,
    pub(crate) peak: Real,
}

#[derive(Clone)]
pub(crate) struct ThresholdDetector {
    threshold: Real,
    run: Option<FlaggedRun>, // If this is some, then the detector is triggered
}

impl ThresholdDetector {
    pub(crate) fn new(threshold: Real) -> Self {
        Self {
            threshold,
            run: None,
        }
    }
}

impl Detector for ThresholdDetector {
    type EventType = FlaggedRun;

    fn signal(&mut self, time: Timestamp, value: Real) -> Option<FlaggedRun> {
        if value > self.threshold {
            match &mut self.run {
                Some(run) => {
                    run.last = time;
                    run.length += 1;
                    run.peak = run.peak.max(value);
                }
                None => {
                    self.run = Some(FlaggedRun {
                        first: time,
                        last: time,
                        length: 1,
                        peak: value,
                    })
                }
            }
            None
        } else {
            self.run.take()
        }
    }

    fn finish(&mut self) -> Option<FlaggedRun> {
        self.run.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spike_detection::events::EventFilter;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn at(i: usize) -> Timestamp {
        Utc.with_ymd_and_hms(2011, 2, 15, 0, 0, 0).unwrap() + TimeDelta::seconds(i as i64)
    }

    fn scored(data: &[Real]) -> impl Iterator<Item = (Timestamp, Real)> + '_ {
        data.iter().enumerate().map(|(i, v)| (at(i), *v))
    }

    #[test]
    fn zero_data() {
        let data: [Real; 0] = [];
        let mut iter = scored(&data).events(ThresholdDetector::new(2.0));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn runs_are_reported_when_they_end() {
        let data = [4.0, 3.0, 2.0, 5.0, 6.0, 1.0, 5.0, 7.0, 2.0, 4.0];
        let runs: Vec<_> = scored(&data)
            .events(ThresholdDetector::new(2.0))
            .map(|run| (run.first, run.last, run.length))
            .collect();
        assert_eq!(
            runs,
            vec![
                (at(0), at(1), 2),
                (at(3), at(4), 2),
                (at(6), at(7), 2),
                (at(9), at(9), 1)
            ]
        );
    }

    #[test]
    fn threshold_is_strict() {
        let data = [2.0, 2.0, 2.0];
        let mut iter = scored(&data).events(ThresholdDetector::new(2.0));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn peak_is_tracked() {
        let data = [0.0, 3.0, 8.0, 4.0, 0.0];
        let run = scored(&data)
            .events(ThresholdDetector::new(2.0))
            .next()
            .unwrap();
        assert_eq!(run.peak, 8.0);
        assert_eq!(run.length, 3);
    }

    #[test]
    fn run_open_at_end_is_flushed() {
        let data = [0.0, 0.0, 3.0, 3.0];
        let mut iter = scored(&data).events(ThresholdDetector::new(2.0));
        assert_eq!(iter.next().map(|run| run.first), Some(at(2)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }
}
