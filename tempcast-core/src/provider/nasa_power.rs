use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::model::{Observation, TimeSeries};

use super::{HistoryProvider, HistoryRequest};

const DEFAULT_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/hourly/point";

/// Hourly air temperature at 2 meters, the one parameter this pipeline uses.
const PARAMETER: &str = "T2M";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the NASA POWER hourly point API.
#[derive(Debug, Clone)]
pub struct NasaPowerProvider {
    http: Client,
    base_url: String,
}

impl NasaPowerProvider {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PipelineError::DataSource(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_history(&self, request: &HistoryRequest) -> Result<TimeSeries> {
        let start = request.start.format("%Y%m%d").to_string();
        let end = request.end.format("%Y%m%d").to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("parameters", PARAMETER),
                ("community", "RE"),
                ("longitude", &request.longitude.to_string()),
                ("latitude", &request.latitude.to_string()),
                ("start", &start),
                ("end", &end),
                ("format", "JSON"),
            ])
            .send()
            .await
            .map_err(|e| {
                PipelineError::DataSource(format!("failed to send request to NASA POWER: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            PipelineError::DataSource(format!("failed to read NASA POWER response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(PipelineError::DataSource(format!(
                "NASA POWER request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: PowerResponse = serde_json::from_str(&body).map_err(|e| {
            PipelineError::DataSource(format!("failed to parse NASA POWER JSON: {e}"))
        })?;

        normalize(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: BTreeMap<String, BTreeMap<String, f64>>,
}

#[async_trait]
impl HistoryProvider for NasaPowerProvider {
    async fn fetch(&self, request: &HistoryRequest) -> Result<TimeSeries> {
        tracing::debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            start = %request.start,
            end = %request.end,
            "fetching hourly history from NASA POWER"
        );
        self.fetch_history(request).await
    }
}

/// Turn the raw `properties.parameter.T2M` map into a sorted series.
///
/// A missing parameter key, an empty map, or a malformed record key is a
/// `DataSource` error. Malformed records are never skipped silently, since
/// silent gaps corrupt the seasonal model.
fn normalize(response: PowerResponse) -> Result<TimeSeries> {
    let records = response.properties.parameter.get(PARAMETER).ok_or_else(|| {
        PipelineError::DataSource(format!(
            "NASA POWER response is missing the '{PARAMETER}' parameter"
        ))
    })?;

    if records.is_empty() {
        return Err(PipelineError::DataSource(format!(
            "NASA POWER returned no '{PARAMETER}' records for the requested range"
        )));
    }

    let mut observations = Vec::with_capacity(records.len());
    for (key, value) in records {
        let timestamp = parse_hour_key(key)?;
        observations.push(Observation { timestamp, value: *value });
    }

    Ok(TimeSeries::from_unsorted(observations))
}

/// Parse a fixed-width `YYYYMMDDHH` record key into an hour-resolution
/// timestamp.
fn parse_hour_key(key: &str) -> Result<NaiveDateTime> {
    let malformed =
        || PipelineError::DataSource(format!("malformed record timestamp '{key}' in response"));

    if key.len() != 10 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let date = NaiveDate::parse_from_str(&key[..8], "%Y%m%d").map_err(|_| malformed())?;
    let hour: u32 = key[8..].parse().map_err(|_| malformed())?;

    date.and_hms_opt(hour, 0, 0).ok_or_else(malformed)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
