use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur during a pipeline run.
///
/// Every stage validates its own inputs and fails fast with a specific
/// kind; the run aborts at the first fatal error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The climate data provider was unreachable, answered with a non-2xx
    /// status, or returned a payload that could not be normalized.
    #[error("data source error: {0}")]
    DataSource(String),

    /// Caller-supplied cutoffs are malformed.
    #[error("invalid cutoff range: high cutoff {high} is not after low cutoff {low}")]
    InvalidRange {
        low: NaiveDateTime,
        high: NaiveDateTime,
    },

    /// Training series too small to estimate seasonal cycles.
    #[error("insufficient training data: need at least {needed} distinct timestamps, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Forecast and ground truth share no timestamps; a zero-sample metric
    /// is meaningless and must not be reported as MAE = 0.
    #[error("no overlapping timestamps between forecast and ground truth")]
    NoOverlap,

    /// The forecast contains no entries in the requested day. The caller
    /// asked for a horizon that was never forecast.
    #[error("forecast contains no entries for {0}")]
    EmptyWindow(NaiveDate),
}
