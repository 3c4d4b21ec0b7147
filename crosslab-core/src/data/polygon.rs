//! Polygon.io aggregates provider.
//!
//! Fetches `range/1/{timespan}` aggregate bars, ascending and split-adjusted,
//! and keeps only the bar start time (`t`, epoch milliseconds) and the
//! close (`c`). Retries rate limits, server errors and transport failures
//! with exponential backoff.

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult};
use crate::domain::{Bar, PriceSeries};

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const DEFAULT_LIMIT: u32 = 50_000;

/// Aggregates endpoint response.
#[derive(Debug, Deserialize)]
struct AggsResponse {
    status: Option<String>,
    results: Option<Vec<AggBar>>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// Window start, Unix milliseconds.
    t: i64,
    /// Close price.
    c: f64,
}

pub struct PolygonProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    limit: u32,
    max_retries: u32,
    base_delay: Duration,
}

impl PolygonProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the provider at another host (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Maximum number of base aggregates per request.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Build the aggregates URL (without query parameters).
    fn aggs_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/v2/aggs/ticker/{}/range/1/{}/{}/{}",
            self.base_url,
            request.symbol,
            request.timespan,
            request.start.format("%Y-%m-%d"),
            request.end.format("%Y-%m-%d"),
        )
    }

    /// Parse an aggregates response body into bars.
    ///
    /// A response without `results` is an empty range, not an error.
    fn parse_response(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
        let resp: AggsResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        if resp.status.as_deref() == Some("ERROR") {
            let reason = resp
                .error
                .or(resp.message)
                .unwrap_or_else(|| "unspecified error".into());
            return Err(DataError::Provider(format!("{symbol}: {reason}")));
        }

        resp.results
            .unwrap_or_default()
            .into_iter()
            .map(|agg| {
                let timestamp = DateTime::from_timestamp_millis(agg.t).ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {}", agg.t))
                })?;
                Ok(Bar::new(timestamp, agg.c))
            })
            .collect()
    }

    /// Execute the request with retry logic.
    fn fetch_with_retry(&self, request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
        let url = self.aggs_url(request);
        let limit = self.limit.to_string();
        let symbol = request.symbol.as_str();
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying aggregates request");
                std::thread::sleep(delay);
            }

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("adjusted", "true"),
                    ("sort", "asc"),
                    ("limit", limit.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ])
                .send();

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(DataError::AuthenticationRequired(format!(
                            "HTTP {status} from Polygon for {symbol}"
                        )));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!(symbol, retry_after, "rate limited by Polygon");
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status.is_server_error() {
                        last_error =
                            Some(DataError::Provider(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let body = resp.text().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to read response for {symbol}: {e}"
                        ))
                    })?;

                    if !status.is_success() {
                        // Client errors usually carry a JSON body with the reason.
                        return Err(match Self::parse_response(symbol, &body) {
                            Err(DataError::Provider(reason)) => {
                                DataError::Provider(format!("HTTP {status}: {reason}"))
                            }
                            _ => DataError::Provider(format!("HTTP {status} for {symbol}")),
                        });
                    }

                    return Self::parse_response(symbol, &body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Provider("max retries exceeded".into())))
    }
}

impl DataProvider for PolygonProvider {
    fn name(&self) -> &str {
        "polygon"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(request)?;
        debug!(symbol = %request.symbol, bars = bars.len(), "fetched aggregates");
        Ok(FetchResult {
            series: PriceSeries::new(request.symbol.clone(), bars),
            source: DataSource::Polygon,
        })
    }
}
