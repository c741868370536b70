use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::{PipelineError, Result};
use crate::evaluate::evaluate;
use crate::forecast::{MIN_TRAINING_POINTS, SeasonalModel, hourly_range, hourly_span};
use crate::model::{DayWindow, EvaluationResult};
use crate::partition::split;
use crate::provider::{HistoryProvider, HistoryRequest, fetch_with_retry};
use crate::window::extract_day;

/// Fetch attempts for the idempotent history query.
const FETCH_ATTEMPTS: usize = 3;

/// Caller-facing configuration; each field governs exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Inclusive calendar range of history to fetch.
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    /// Train/test boundary: training data is strictly before this day.
    pub train_cutoff: NaiveDate,
    /// End (exclusive) of the evaluation segment.
    pub test_cutoff: NaiveDate,
    /// Length of the long forward forecast, in hours from the end of the
    /// training data.
    pub future_horizon_hours: usize,
    /// The future day to extract from the long forecast.
    pub target_day: NaiveDate,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// `None` when the forecast and the held-out segment shared no
    /// timestamps; that failure is fatal for the evaluation only and does
    /// not abort future-window forecasting.
    pub evaluation: Option<EvaluationResult>,
    pub target: DayWindow,
}

/// Run the pipeline end-to-end: fetch, partition, fit once, score against
/// the held-out segment, then extract the target day from a long forward
/// forecast. Strictly sequential; aborts at the first fatal error.
pub async fn run(
    config: &PipelineConfig,
    provider: &dyn HistoryProvider,
    model: &dyn SeasonalModel,
) -> Result<PipelineReport> {
    let request = HistoryRequest {
        latitude: config.latitude,
        longitude: config.longitude,
        start: config.history_start,
        end: config.history_end,
    };
    let series = fetch_with_retry(provider, &request, FETCH_ATTEMPTS).await?;
    tracing::info!(observations = series.len(), "acquired hourly history");

    let low = config.train_cutoff.and_time(NaiveTime::MIN);
    let high = config.test_cutoff.and_time(NaiveTime::MIN);
    let partition = split(&series, low, high)?;

    let fitted = model.fit(&partition.train)?;
    tracing::info!(train = partition.train.len(), "fitted seasonal model");

    // The one fitted model serves both horizons; refitting is the expensive
    // step and happens exactly once per run.
    let evaluation_horizon = hourly_span(low, high);
    let evaluation_forecast = fitted.predict(&evaluation_horizon)?;
    let evaluation = match evaluate(&evaluation_forecast, &partition.test) {
        Ok(result) => {
            tracing::info!(
                mae = result.mae,
                rmse = result.rmse,
                matched = result.matched,
                "scored forecast against held-out segment"
            );
            Some(result)
        }
        // Fatal for the evaluation only: future-window forecasting still runs.
        Err(PipelineError::NoOverlap) => {
            tracing::warn!("no ground truth aligns with the evaluation horizon, skipping scoring");
            None
        }
        Err(err) => return Err(err),
    };

    let train_end = partition
        .train
        .last()
        .map(|o| o.timestamp)
        .ok_or(PipelineError::InsufficientData { needed: MIN_TRAINING_POINTS, got: 0 })?;
    let future_horizon = hourly_range(train_end + Duration::hours(1), config.future_horizon_hours);
    let future_forecast = fitted.predict(&future_horizon)?;

    let target = extract_day(&future_forecast, config.target_day, Some(&partition.test))?;
    tracing::info!(target_day = %config.target_day, entries = target.forecast.len(), "extracted target day");

    Ok(PipelineReport { evaluation, target })
}
