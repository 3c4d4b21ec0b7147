//! Series loading and data resolution for the runner.
//!
//! Fallback policy:
//! 1. If the config names a CSV directory → read `<dir>/<symbol>.csv`
//! 2. Else if online and a provider is available → fetch
//! 3. If the fetch fails (or we are offline) and `synthetic` is set → seeded random walk
//! 4. Otherwise → fail, distinguishing "offline" from "no provider given"
//!
//! Provider failures are never swallowed silently: without the synthetic
//! opt-in they are returned to the caller as-is.

use thiserror::Error;
use tracing::{info, warn};

use crosslab_core::data::{
    CsvProvider, DataError, DataProvider, DataSource, FetchRequest, FetchResult, PolygonProvider,
    SyntheticProvider,
};
use crosslab_core::PriceSeries;

use crate::config::BacktestConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source for '{symbol}' while offline (use --synthetic or --csv-dir)")]
    NoSourceOffline { symbol: String },

    #[error("no data provider for '{symbol}' (configure a provider, --csv-dir or --synthetic)")]
    NoProvider { symbol: String },

    #[error("no Polygon API key: set POLYGON_API_KEY or provider.api_key")]
    MissingApiKey,

    #[error("fetching '{symbol}' from {provider} failed: {source}")]
    Fetch {
        symbol: String,
        provider: String,
        #[source]
        source: DataError,
    },
}

/// Options controlling how the series is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// If true, never make network requests.
    pub offline: bool,
    /// If true, generate a synthetic series when real data is unavailable.
    pub synthetic: bool,
}

/// A loaded series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    pub source: DataSource,
    pub warnings: Vec<String>,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Build the Polygon provider described by the config.
pub fn polygon_provider(config: &BacktestConfig) -> Result<PolygonProvider, LoadError> {
    let api_key = config.api_key().ok_or(LoadError::MissingApiKey)?;
    let mut provider = PolygonProvider::new(api_key)
        .map_err(|source| LoadError::Fetch {
            symbol: config.data.symbol.clone(),
            provider: "polygon".into(),
            source,
        })?
        .with_limit(config.data.limit);
    if let Some(base_url) = &config.provider.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}

/// Load the configured series, applying the fallback policy.
pub fn load_series(
    config: &BacktestConfig,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedSeries, LoadError> {
    let request = config.fetch_request();
    let symbol = request.symbol.clone();

    let fetched = if let Some(dir) = &config.data.csv_dir {
        Some(fetch_from(&CsvProvider::new(dir), &request))
    } else if opts.offline {
        None
    } else {
        provider.map(|p| fetch_from(p, &request))
    };

    let (series, source) = match fetched {
        Some(Ok(result)) => (result.series, result.source),
        Some(Err(e)) if opts.synthetic => {
            warn!(symbol = %symbol, error = %e, "data fetch failed; using synthetic series");
            synthetic(&request)
        }
        Some(Err(e)) => return Err(e),
        None if opts.synthetic => {
            warn!(symbol = %symbol, "no data source; generating synthetic series");
            synthetic(&request)
        }
        None if opts.offline => return Err(LoadError::NoSourceOffline { symbol }),
        None => return Err(LoadError::NoProvider { symbol }),
    };

    if series.is_empty() {
        warn!(symbol = %symbol, "provider returned no bars for the requested range");
    }

    let mut warnings = series.quality_warnings();
    if source == DataSource::Synthetic {
        warnings.push(format!("{symbol}: synthetic data, results are not market results"));
    }
    for w in &warnings {
        warn!("{w}");
    }

    info!(symbol = %symbol, bars = series.len(), ?source, "series loaded");
    Ok(LoadedSeries {
        series,
        source,
        warnings,
    })
}

fn fetch_from(
    provider: &dyn DataProvider,
    request: &FetchRequest,
) -> Result<FetchResult, LoadError> {
    provider.fetch(request).map_err(|source| LoadError::Fetch {
        symbol: request.symbol.clone(),
        provider: provider.name().to_string(),
        source,
    })
}

fn synthetic(request: &FetchRequest) -> (PriceSeries, DataSource) {
    (SyntheticProvider::default().generate(request), DataSource::Synthetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_ENV;
    use chrono::NaiveDate;
    use crosslab_core::data::Timespan;

    struct FailingProvider;

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _request: &FetchRequest) -> Result<FetchResult, DataError> {
            Err(DataError::NetworkUnreachable("connection refused".into()))
        }
    }

    struct EmptyProvider;

    impl DataProvider for EmptyProvider {
        fn name(&self) -> &str {
            "empty"
        }

        fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
            Ok(FetchResult {
                series: PriceSeries::empty(request.symbol.clone()),
                source: DataSource::Polygon,
            })
        }
    }

    fn config() -> BacktestConfig {
        let mut cfg = BacktestConfig::new(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        cfg.data.timespan = Timespan::Day;
        cfg
    }

    #[test]
    fn provider_error_propagates_without_synthetic() {
        let err = load_series(&config(), Some(&FailingProvider), &LoadOptions::default())
            .unwrap_err();
        match err {
            LoadError::Fetch { provider, source, .. } => {
                assert_eq!(provider, "failing");
                assert!(matches!(source, DataError::NetworkUnreachable(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn provider_error_falls_back_to_synthetic_when_enabled() {
        let opts = LoadOptions {
            offline: false,
            synthetic: true,
        };
        let loaded = load_series(&config(), Some(&FailingProvider), &opts).unwrap();
        assert!(loaded.is_synthetic());
        assert!(!loaded.series.is_empty());
        assert!(loaded.warnings.iter().any(|w| w.contains("synthetic")));
    }

    #[test]
    fn offline_without_fallback_fails() {
        let opts = LoadOptions {
            offline: true,
            synthetic: false,
        };
        let err = load_series(&config(), Some(&EmptyProvider), &opts).unwrap_err();
        assert!(matches!(err, LoadError::NoSourceOffline { .. }));
    }

    #[test]
    fn online_without_provider_reports_missing_provider() {
        let err = load_series(&config(), None, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoProvider { ref symbol } if symbol == "SPY"));
        assert!(!err.to_string().contains("offline"));
    }

    #[test]
    fn empty_range_is_not_an_error() {
        let loaded = load_series(&config(), Some(&EmptyProvider), &LoadOptions::default()).unwrap();
        assert!(loaded.series.is_empty());
        assert_eq!(loaded.source, DataSource::Polygon);
    }

    #[test]
    fn csv_dir_takes_precedence_over_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("SPY.csv"),
            "timestamp,close\n2024-01-02,100.0\n2024-01-03,101.0\n",
        )
        .unwrap();

        let mut cfg = config();
        cfg.data.csv_dir = Some(dir.path().to_path_buf());
        let loaded = load_series(&cfg, Some(&FailingProvider), &LoadOptions::default()).unwrap();
        assert_eq!(loaded.source, DataSource::CsvImport);
        assert_eq!(loaded.series.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let mut cfg = config();
        cfg.provider.api_key = None;
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(polygon_provider(&cfg), Err(LoadError::MissingApiKey)));
        }
    }
}
