use crate::error::{PipelineError, Result};
use crate::model::{EvaluationResult, Forecast, TimeSeries};

/// Score a forecast against ground truth.
///
/// Entries are aligned by exact timestamp equality; rows present on only one
/// side are dropped silently, since forecast horizons may exceed the
/// available ground truth. An empty join is `NoOverlap` rather than MAE = 0.
pub fn evaluate(forecast: &Forecast, ground_truth: &TimeSeries) -> Result<EvaluationResult> {
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut matched = 0usize;

    // Both inputs are sorted by timestamp, so the inner join is a merge.
    let points = forecast.points();
    let actuals = ground_truth.observations();
    let (mut i, mut j) = (0, 0);

    while i < points.len() && j < actuals.len() {
        match points[i].timestamp.cmp(&actuals[j].timestamp) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                let error = actuals[j].value - points[i].predicted;
                abs_sum += error.abs();
                sq_sum += error * error;
                matched += 1;
                i += 1;
                j += 1;
            }
        }
    }

    if matched == 0 {
        return Err(PipelineError::NoOverlap);
    }

    let n = matched as f64;
    let result = EvaluationResult {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        matched,
    };

    tracing::debug!(mae = result.mae, rmse = result.rmse, matched, "evaluated forecast");

    Ok(result)
}
