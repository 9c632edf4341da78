//! Helpers for turning an event catalog (flare start/end times for one
//! observation) into the no-event windows the analysis runs over.

use crate::{
    error::{AnalysisError, AnalysisResult},
    lightcurve::{TimeInterval, merge_intervals},
};
use chrono::TimeDelta;
use itertools::Itertools;
use tracing::debug;

/// Returns the parts of `observation` not covered by any event, in ascending
/// order. Events are clipped to the observation and merged first. An event of
/// zero duration covers nothing and does not split a window, so consecutive
/// windows are always separated by a gap and pass [validate_windows].
#[tracing::instrument(skip_all, fields(num_events = events.len()))]
pub fn no_event_windows(observation: &TimeInterval, events: &[TimeInterval]) -> Vec<TimeInterval> {
    let covered = merge_intervals(
        &events
            .iter()
            .filter_map(|event| event.clip(observation))
            .filter(|event| event.duration() > TimeDelta::zero())
            .collect::<Vec<_>>(),
    );

    let mut cursor = observation.start();
    let mut windows = Vec::with_capacity(covered.len() + 1);
    for event in &covered {
        if cursor < event.start() {
            windows.push(TimeInterval::from_ordered(cursor, event.start()));
        }
        cursor = cursor.max(event.end());
    }
    if cursor < observation.end() {
        windows.push(TimeInterval::from_ordered(cursor, observation.end()));
    }
    debug!("{} no-event windows", windows.len());
    windows
}

/// Checks that `windows` is non-empty, ascending and pairwise disjoint.
pub fn validate_windows(windows: &[TimeInterval]) -> AnalysisResult<()> {
    if windows.is_empty() {
        return Err(AnalysisError::invalid_parameter("no observation windows"));
    }
    if let Some((previous, next)) = windows
        .iter()
        .tuple_windows()
        .find(|(previous, next)| previous.end() >= next.start())
    {
        return Err(AnalysisError::invalid_parameter(format!(
            "windows {previous} and {next} overlap or are out of order"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(seconds: i64) -> crate::lightcurve::Timestamp {
        DateTime::UNIX_EPOCH + TimeDelta::seconds(seconds)
    }

    fn interval(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(at(start), at(end)).unwrap()
    }

    #[test]
    fn no_events_gives_whole_observation() {
        let observation = interval(0, 100);
        assert_eq!(no_event_windows(&observation, &[]), vec![observation]);
    }

    #[test]
    fn events_are_cut_out() {
        let windows = no_event_windows(
            &interval(0, 100),
            &[interval(60, 70), interval(10, 20), interval(15, 30)],
        );
        assert_eq!(
            windows,
            vec![interval(0, 10), interval(30, 60), interval(70, 100)]
        );
    }

    #[test]
    fn events_at_the_edges_leave_no_empty_windows() {
        let windows = no_event_windows(
            &interval(0, 100),
            &[interval(-10, 0), interval(90, 120), interval(150, 200)],
        );
        assert_eq!(windows, vec![interval(0, 90)]);
    }

    #[test]
    fn observation_fully_covered() {
        assert!(no_event_windows(&interval(0, 100), &[interval(-1, 101)]).is_empty());
    }

    #[test]
    fn instantaneous_events_do_not_split_the_observation() {
        let observation = interval(0, 7199);
        let windows = no_event_windows(&observation, &[interval(3600, 3600)]);
        assert_eq!(windows, vec![observation]);
        assert!(validate_windows(&windows).is_ok());

        let windows = no_event_windows(
            &observation,
            &[interval(1000, 1000), interval(3600, 4000), interval(4000, 4000)],
        );
        assert_eq!(windows, vec![interval(0, 3600), interval(4000, 7199)]);
        assert!(validate_windows(&windows).is_ok());
    }

    #[test]
    fn windows_must_be_disjoint_and_ascending() {
        assert!(validate_windows(&[interval(0, 10), interval(20, 30)]).is_ok());
        assert!(validate_windows(&[]).is_err());
        assert!(validate_windows(&[interval(0, 10), interval(10, 30)]).is_err());
        assert!(validate_windows(&[interval(20, 30), interval(0, 10)]).is_err());
    }
}
