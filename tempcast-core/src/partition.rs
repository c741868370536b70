use chrono::NaiveDateTime;

use crate::error::{PipelineError, Result};
use crate::model::{Partition, TimeSeries};

/// Split a series into a training segment (strictly before `low`) and an
/// evaluation segment (`[low, high)`).
///
/// Pure function over an immutable input; the cutoffs are calendar-day
/// boundaries supplied by the caller.
pub fn split(series: &TimeSeries, low: NaiveDateTime, high: NaiveDateTime) -> Result<Partition> {
    if high <= low {
        return Err(PipelineError::InvalidRange { low, high });
    }

    let train = match series.first() {
        Some(first) => series.between(first.timestamp, low),
        None => TimeSeries::default(),
    };
    let test = series.between(low, high);

    tracing::debug!(
        train_len = train.len(),
        test_len = test.len(),
        %low,
        %high,
        "partitioned series"
    );

    Ok(Partition { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn hourly_series(start: NaiveDateTime, hours: i64) -> TimeSeries {
        TimeSeries::from_unsorted(
            (0..hours)
                .map(|h| Observation {
                    timestamp: start + chrono::Duration::hours(h),
                    value: h as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn split_respects_cutoffs() {
        // Two days of hourly data, cut at the day boundary.
        let series = hourly_series(day(2023, 1, 1), 48);
        let partition = split(&series, day(2023, 1, 2), day(2023, 1, 3)).unwrap();

        assert_eq!(partition.train.len(), 24);
        assert_eq!(partition.test.len(), 24);
        assert!(partition.train.last().unwrap().timestamp < day(2023, 1, 2));
        assert!(partition.test.first().unwrap().timestamp >= day(2023, 1, 2));
    }

    #[test]
    fn split_is_disjoint_and_complete() {
        let series = hourly_series(day(2023, 1, 1), 72);
        let partition = split(&series, day(2023, 1, 2), day(2023, 1, 3)).unwrap();

        for o in partition.train.observations() {
            assert!(series.observations().contains(o));
            assert!(!partition.test.observations().contains(o));
        }
        for o in partition.test.observations() {
            assert!(series.observations().contains(o));
        }
    }

    #[test]
    fn split_rejects_inverted_cutoffs() {
        let series = hourly_series(day(2023, 1, 1), 24);

        let err = split(&series, day(2023, 1, 1), day(2022, 1, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRange { .. }));
    }

    #[test]
    fn split_rejects_equal_cutoffs() {
        let series = hourly_series(day(2023, 1, 1), 24);

        let err = split(&series, day(2023, 1, 1), day(2023, 1, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRange { .. }));
    }

    #[test]
    fn split_allows_gap_between_train_and_test() {
        let series = hourly_series(day(2023, 1, 1), 96);
        let partition = split(&series, day(2023, 1, 3), day(2023, 1, 4)).unwrap();

        // Train stops before the low cutoff even though data continues.
        assert_eq!(partition.train.len(), 48);
        assert_eq!(partition.test.len(), 24);
    }
}
