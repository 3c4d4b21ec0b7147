//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Polygon aggregates,
//! CSV import) so we can swap implementations and mock for tests.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

/// Structured error types for data operations.
///
/// "No data" is never an error: providers return an empty series instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("csv error in {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bar granularity requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    #[default]
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timespan {
    pub fn as_str(self) -> &'static str {
        match self {
            Timespan::Minute => "minute",
            Timespan::Hour => "hour",
            Timespan::Day => "day",
            Timespan::Week => "week",
            Timespan::Month => "month",
            Timespan::Quarter => "quarter",
            Timespan::Year => "year",
        }
    }

    /// Approximate bar spacing in seconds, used for synthetic series.
    pub fn approx_seconds(self) -> i64 {
        match self {
            Timespan::Minute => 60,
            Timespan::Hour => 3_600,
            Timespan::Day => 86_400,
            Timespan::Week => 7 * 86_400,
            Timespan::Month => 30 * 86_400,
            Timespan::Quarter => 91 * 86_400,
            Timespan::Year => 365 * 86_400,
        }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timespan {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minute" => Ok(Timespan::Minute),
            "hour" => Ok(Timespan::Hour),
            "day" => Ok(Timespan::Day),
            "week" => Ok(Timespan::Week),
            "month" => Ok(Timespan::Month),
            "quarter" => Ok(Timespan::Quarter),
            "year" => Ok(Timespan::Year),
            _ => Err(DataError::InvalidInput {
                field: "timespan",
                value: s.to_string(),
            }),
        }
    }
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timespan: Timespan,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Polygon,
    CsvImport,
    Synthetic,
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub source: DataSource,
}

/// Trait for data providers.
///
/// Implementations return bars sorted ascending by timestamp and an empty
/// series when the range holds no data.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch close prices for a symbol over an inclusive date range.
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError>;
}
