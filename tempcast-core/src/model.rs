use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One measured (or held-out) temperature reading at hour resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Ordered sequence of observations, sorted ascending by timestamp with no
/// duplicates. Produced once by data acquisition and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations in arbitrary order. When several
    /// observations share a timestamp, the first one given wins.
    pub fn from_unsorted(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.timestamp);
        observations.dedup_by_key(|o| o.timestamp);
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Observations with `start <= timestamp < end`, as a new series.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> TimeSeries {
        let observations = self
            .observations
            .iter()
            .filter(|o| o.timestamp >= start && o.timestamp < end)
            .copied()
            .collect();
        Self { observations }
    }

    /// Number of distinct timestamps. Equals `len()` when the sorting
    /// invariant holds, but counted explicitly so training validation does
    /// not depend on it.
    pub fn distinct_timestamps(&self) -> usize {
        let mut count = 0;
        let mut previous: Option<NaiveDateTime> = None;
        for o in &self.observations {
            if previous != Some(o.timestamp) {
                count += 1;
            }
            previous = Some(o.timestamp);
        }
        count
    }
}

/// Train/test pair derived from one series by two calendar cutoffs.
/// `train` holds everything strictly before the low cutoff, `test` holds
/// `[low, high)`. Non-overlapping by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train: TimeSeries,
    pub test: TimeSeries,
}

/// One forecast entry: point estimate bracketed by an uncertainty interval.
/// `lower <= predicted <= upper` is guaranteed by the forecast engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Ordered sequence of forecast points, one per requested horizon timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn from_points(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with `start <= timestamp < end`, as a new forecast.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Forecast {
        let points = self
            .points
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp < end)
            .copied()
            .collect();
        Self { points }
    }
}

/// Aggregate forecast accuracy over the timestamps shared by a forecast and
/// its ground truth. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Number of timestamp-aligned pairs the metrics were computed over.
    pub matched: usize,
}

/// A forecast restricted to one 24-hour calendar span, plus whatever ground
/// truth exists for that span. `actuals` is empty for genuinely future days,
/// which is the primary use case rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub forecast: Forecast,
    pub actuals: TimeSeries,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn from_unsorted_sorts_by_timestamp() {
        let series = TimeSeries::from_unsorted(vec![
            Observation { timestamp: hour(2, 0), value: 2.0 },
            Observation { timestamp: hour(1, 0), value: 1.0 },
            Observation { timestamp: hour(1, 12), value: 1.5 },
        ]);

        let timestamps: Vec<_> = series.observations().iter().map(|o| o.timestamp).collect();
        assert_eq!(timestamps, vec![hour(1, 0), hour(1, 12), hour(2, 0)]);
        for pair in series.observations().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn between_is_half_open() {
        let series = TimeSeries::from_unsorted(
            (0..4)
                .map(|h| Observation { timestamp: hour(1, h), value: f64::from(h) })
                .collect(),
        );

        let slice = series.between(hour(1, 1), hour(1, 3));
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.first().unwrap().timestamp, hour(1, 1));
        assert_eq!(slice.last().unwrap().timestamp, hour(1, 2));
    }

    #[test]
    fn from_unsorted_drops_duplicate_timestamps() {
        let series = TimeSeries::from_unsorted(vec![
            Observation { timestamp: hour(1, 0), value: 1.0 },
            Observation { timestamp: hour(1, 0), value: 2.0 },
            Observation { timestamp: hour(1, 1), value: 3.0 },
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.distinct_timestamps(), 2);
        // The first observation given for a timestamp wins.
        assert_eq!(series.first().unwrap().value, 1.0);
    }
}
