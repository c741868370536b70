use chrono::{Duration, NaiveDateTime};
use std::fmt::Debug;

use crate::error::{PipelineError, Result};
use crate::model::{Forecast, TimeSeries};

pub mod harmonic;

/// Minimum number of distinct training timestamps any model requires.
/// Enforced at this seam so a too-small series fails fast instead of as an
/// opaque failure inside the model fit.
pub const MIN_TRAINING_POINTS: usize = 2;

/// Seam at which the seasonal forecasting capability is substituted. Any
/// model that learns temporal patterns and produces point plus interval
/// forecasts can stand behind it.
pub trait SeasonalModel: Debug {
    /// Fit on the training series, producing an immutable fitted model.
    /// Fitting is the expensive step and happens exactly once per run; the
    /// returned model serves any number of horizon requests.
    fn fit(&self, train: &TimeSeries) -> Result<Box<dyn FittedModel>>;
}

/// A fitted model, exclusively owned by the pipeline run that produced it.
pub trait FittedModel: Debug {
    /// One forecast point per requested timestamp, in request order, with
    /// `lower <= predicted <= upper` on every point. Must not fail for any
    /// horizon length.
    fn predict(&self, horizon: &[NaiveDateTime]) -> Result<Forecast>;
}

/// Guard shared by model implementations: reject series too small to
/// estimate any temporal structure.
pub fn ensure_trainable(train: &TimeSeries) -> Result<()> {
    let got = train.distinct_timestamps();
    if got < MIN_TRAINING_POINTS {
        return Err(PipelineError::InsufficientData {
            needed: MIN_TRAINING_POINTS,
            got,
        });
    }
    Ok(())
}

/// Contiguous hourly timestamps `start, start + 1h, ...`, `hours` entries.
pub fn hourly_range(start: NaiveDateTime, hours: usize) -> Vec<NaiveDateTime> {
    (0..hours as i64).map(|h| start + Duration::hours(h)).collect()
}

/// Contiguous hourly timestamps covering `[start, end)`.
pub fn hourly_span(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut horizon = Vec::new();
    let mut cursor = start;
    while cursor < end {
        horizon.push(cursor);
        cursor = cursor + Duration::hours(1);
    }
    horizon
}
