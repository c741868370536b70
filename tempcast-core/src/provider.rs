use crate::error::{PipelineError, Result};
use crate::model::TimeSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use std::time::Duration;

pub mod nasa_power;

/// Parameters for one historical query: a fixed point and an inclusive
/// calendar date range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Source of hourly temperature history.
///
/// Implementations normalize the raw payload into a sorted, non-empty
/// `TimeSeries` or fail with `PipelineError::DataSource`.
#[async_trait]
pub trait HistoryProvider: Send + Sync + Debug {
    async fn fetch(&self, request: &HistoryRequest) -> Result<TimeSeries>;
}

/// Bounded retry around `fetch`. Refetching the same range is idempotent
/// since the provider is read-only, so transient failures are simply
/// retried a fixed number of times with a short linear backoff.
pub async fn fetch_with_retry(
    provider: &dyn HistoryProvider,
    request: &HistoryRequest,
    attempts: usize,
) -> Result<TimeSeries> {
    let attempts = attempts.max(1);
    let mut last_err = PipelineError::DataSource("no fetch attempt was made".to_string());

    for attempt in 1..=attempts {
        match provider.fetch(request).await {
            Ok(series) => return Ok(series),
            Err(err @ PipelineError::DataSource(_)) => {
                tracing::warn!(attempt, attempts, error = %err, "history fetch failed");
                last_err = err;
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                }
            }
            // Only data-source failures are worth retrying.
            Err(err) => return Err(err),
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FlakyProvider {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait]
    impl HistoryProvider for FlakyProvider {
        async fn fetch(&self, _request: &HistoryRequest) -> Result<TimeSeries> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(PipelineError::DataSource("transient".to_string()));
            }
            let timestamp = NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            Ok(TimeSeries::from_unsorted(vec![Observation {
                timestamp,
                value: 20.0,
            }]))
        }
    }

    fn request() -> HistoryRequest {
        HistoryRequest {
            latitude: 21.03,
            longitude: 105.85,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failure() {
        let provider = FlakyProvider { calls: AtomicUsize::new(0), fail_first: 2 };

        let series = fetch_with_retry(&provider, &request(), 3).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_bounded_attempts() {
        let provider = FlakyProvider { calls: AtomicUsize::new(0), fail_first: 10 };

        let err = fetch_with_retry(&provider, &request(), 3).await.unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}
