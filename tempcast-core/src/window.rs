use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::{PipelineError, Result};
use crate::model::{DayWindow, Forecast, TimeSeries};

/// Restrict a forecast to one 24-hour calendar span, `[target, target + 1d)`.
///
/// Missing ground truth for that span yields an empty `actuals` series; that
/// is the normal case when forecasting a genuinely future day. An empty
/// forecast slice, on the other hand, means the caller requested a day the
/// horizon never covered, and is an `EmptyWindow` error.
pub fn extract_day(
    forecast: &Forecast,
    target: NaiveDate,
    ground_truth: Option<&TimeSeries>,
) -> Result<DayWindow> {
    let start = target.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);

    let day_forecast = forecast.between(start, end);
    if day_forecast.is_empty() {
        return Err(PipelineError::EmptyWindow(target));
    }

    let actuals = ground_truth
        .map(|series| series.between(start, end))
        .unwrap_or_default();

    tracing::debug!(
        %target,
        forecast_entries = day_forecast.len(),
        actual_entries = actuals.len(),
        "extracted day window"
    );

    Ok(DayWindow { date: target, forecast: day_forecast, actuals })
}
