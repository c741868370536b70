//! Core library for the `tempcast` CLI.
//!
//! This crate implements the forecasting pipeline end-to-end:
//! - Data acquisition from the NASA POWER hourly temperature API
//! - Train/test partitioning by calendar cutoffs
//! - Seasonal model fitting and multi-horizon prediction
//! - Accuracy scoring against held-out ground truth
//! - Future day-window extraction
//!
//! It is used by `tempcast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod evaluate;
pub mod forecast;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod provider;
pub mod window;

pub use config::{Config, Location};
pub use error::{PipelineError, Result};
pub use evaluate::evaluate;
pub use forecast::{FittedModel, SeasonalModel, harmonic::HarmonicRegression};
pub use model::{
    DayWindow, EvaluationResult, Forecast, ForecastPoint, Observation, Partition, TimeSeries,
};
pub use partition::split;
pub use pipeline::{PipelineConfig, PipelineReport};
pub use provider::{HistoryProvider, HistoryRequest, nasa_power::NasaPowerProvider};
pub use window::extract_day;
