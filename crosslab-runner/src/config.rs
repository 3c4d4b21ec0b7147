//! Serializable backtest configuration (TOML).
//!
//! ```toml
//! [data]
//! symbol = "AAPL"
//! start = "2024-01-02"
//! end = "2024-01-05"
//! timespan = "minute"
//!
//! [strategy]
//! type = "sma_crossover"
//! short = 9
//! long = 20
//!
//! [provider]
//! api_key = "..."   # POLYGON_API_KEY overrides this
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::data::polygon::DEFAULT_LIMIT;
use crosslab_core::data::{FetchRequest, Timespan};
use crosslab_core::StrategyConfig;

/// Environment variable holding the Polygon API key.
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default, skip_serializing)]
    pub provider: ProviderConfig,
}

/// Which series to load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    pub symbol: String,
    /// Inclusive start date.
    pub start: NaiveDate,
    /// Inclusive end date.
    pub end: NaiveDate,
    #[serde(default)]
    pub timespan: Timespan,
    /// Maximum aggregates per provider request.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Read `<csv_dir>/<symbol>.csv` instead of calling the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_dir: Option<PathBuf>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Provider credentials. Never serialized into results or run ids.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl BacktestConfig {
    /// Config with default strategy windows for a symbol and date range.
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            data: DataConfig {
                symbol: symbol.into(),
                start,
                end,
                timespan: Timespan::default(),
                limit: DEFAULT_LIMIT,
                csv_dir: None,
            },
            strategy: StrategyConfig::default(),
            provider: ProviderConfig::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs no run could satisfy. Window sizes are not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("data.symbol must not be empty".into()));
        }
        if self.data.start > self.data.end {
            return Err(ConfigError::Invalid(format!(
                "data.start ({}) is after data.end ({})",
                self.data.start, self.data.end
            )));
        }
        Ok(())
    }

    /// Provider request described by this config.
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            symbol: self.data.symbol.clone(),
            start: self.data.start,
            end: self.data.end,
            timespan: self.data.timespan,
        }
    }

    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.provider.api_key.as_deref())
    }

    /// Deterministic hash of the data and strategy sections.
    ///
    /// Two runs with identical configs share a RunId. Credentials are excluded.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

fn resolve_api_key(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| file.map(str::to_string))
        .filter(|k| !k.trim().is_empty())
}
