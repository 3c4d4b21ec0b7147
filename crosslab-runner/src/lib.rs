//! CrossLab Runner: backtest orchestration, metrics, and artifacts.
//!
//! This crate builds on `crosslab-core` to provide:
//! - TOML backtest configuration with an environment override for the API key
//! - Series loading with CSV/provider/synthetic fallback
//! - Single-backtest runner with crossover counts and metrics
//! - JSON/CSV/Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, DataConfig, ProviderConfig, RunId};
pub use data_loader::{load_series, polygon_provider, LoadError, LoadOptions, LoadedSeries};
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest, run_single_backtest, BacktestResult, RunError, SCHEMA_VERSION};
