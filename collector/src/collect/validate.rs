//! Integrity checks over stored candle series

use crate::model::Timeframe;
use chrono::{DateTime, TimeDelta, Utc};

/// One hole in an otherwise contiguous candle series: the step from `prev`
/// to `next` is not one timeframe width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub prev: DateTime<Utc>,
    pub next: DateTime<Utc>,
    pub delta: TimeDelta,
}

/// Outcome of checking one (instrument, timeframe) series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesCheck {
    pub candles: u64,
    pub gaps: Vec<Gap>,
    pub duplicates: u64,
}

impl SeriesCheck {
    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty() && self.duplicates == 0
    }
}

/// Walk a sorted sequence of candle open times and flag every step that is
/// not exactly one timeframe width.
///
/// A zero step (the same open time twice) counts as a duplicate rather than
/// a gap; any other deviation, in either direction, is a gap. Empty and
/// single-candle series are trivially clean.
pub fn check_series(timestamps: &[DateTime<Utc>], timeframe: Timeframe) -> SeriesCheck {
    let expected = timeframe.duration();
    let mut check = SeriesCheck {
        candles: timestamps.len() as u64,
        ..SeriesCheck::default()
    };

    for pair in timestamps.windows(2) {
        let delta = pair[1] - pair[0];
        if delta == expected {
            continue;
        }
        if delta == TimeDelta::zero() {
            check.duplicates += 1;
        } else {
            check.gaps.push(Gap {
                prev: pair[0],
                next: pair[1],
                delta,
            });
        }
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn hourly(starts: &[&str]) -> Vec<DateTime<Utc>> {
        starts.iter().map(|s| ts(s)).collect()
    }

    #[test]
    fn contiguous_series_is_clean() {
        let series = hourly(&[
            "2024-01-01T00:00:00Z",
            "2024-01-01T01:00:00Z",
            "2024-01-01T02:00:00Z",
        ]);
        let check = check_series(&series, Timeframe::H1);
        assert!(check.is_clean());
        assert_eq!(check.candles, 3);
    }

    #[test]
    fn empty_and_single_series_are_clean() {
        assert!(check_series(&[], Timeframe::H1).is_clean());
        assert!(check_series(&[ts("2024-01-01T00:00:00Z")], Timeframe::D1).is_clean());
    }

    #[test]
    fn missing_candle_is_reported_as_a_gap() {
        let series = hourly(&[
            "2024-01-01T00:00:00Z",
            "2024-01-01T01:00:00Z",
            // 02:00 missing
            "2024-01-01T03:00:00Z",
        ]);
        let check = check_series(&series, Timeframe::H1);
        assert_eq!(check.gaps.len(), 1);
        assert_eq!(check.gaps[0].prev, ts("2024-01-01T01:00:00Z"));
        assert_eq!(check.gaps[0].next, ts("2024-01-01T03:00:00Z"));
        assert_eq!(check.gaps[0].delta, TimeDelta::hours(2));
        assert_eq!(check.duplicates, 0);
    }

    #[test]
    fn repeated_open_time_counts_as_duplicate_not_gap() {
        let series = hourly(&[
            "2024-01-01T00:00:00Z",
            "2024-01-01T01:00:00Z",
            "2024-01-01T01:00:00Z",
            "2024-01-01T02:00:00Z",
        ]);
        let check = check_series(&series, Timeframe::H1);
        assert_eq!(check.duplicates, 1);
        assert!(check.gaps.is_empty());
    }

    #[test]
    fn step_width_follows_the_timeframe() {
        // an hourly step inside a 4h series is a gap, not a match
        let series = hourly(&["2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"]);
        let check = check_series(&series, Timeframe::H4);
        assert_eq!(check.gaps.len(), 1);
        assert_eq!(check.gaps[0].delta, TimeDelta::hours(1));
    }
}
