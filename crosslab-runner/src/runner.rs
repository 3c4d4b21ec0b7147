//! Backtest runner: wires together series loading, the strategy, and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads the series, then runs. Used by the CLI.
//! - `run_backtest()`: takes a pre-loaded series. No I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crosslab_core::data::DataProvider;
use crosslab_core::{SignaledSeries, StrategyConfig, Trade};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub strategy: StrategyConfig,
    pub params: Vec<(String, String)>,
    pub bar_count: usize,
    pub golden_crosses: usize,
    pub death_crosses: usize,
    pub trades: Vec<Trade>,
    /// `None` when the run produced no trades.
    pub metrics: Option<PerformanceMetrics>,
    pub data_quality_warnings: Vec<String>,
    pub synthetic: bool,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }
}

/// Load the configured series and run the backtest over it.
pub fn run_single_backtest(
    config: &BacktestConfig,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<(BacktestResult, SignaledSeries), RunError> {
    config.validate()?;
    let loaded = load_series(config, provider, opts)?;
    Ok(run_backtest(config, &loaded))
}

/// Run a backtest over a pre-loaded series.
///
/// Returns the result together with the signaled series it was derived from.
pub fn run_backtest(
    config: &BacktestConfig,
    loaded: &LoadedSeries,
) -> (BacktestResult, SignaledSeries) {
    let StrategyConfig::SmaCrossover { short, long } = config.strategy;
    if short >= long {
        warn!(short, long, "short window is not shorter than long window");
    }

    let strategy = config.strategy.build(&loaded.series);
    info!(
        symbol = loaded.series.symbol(),
        strategy = strategy.name(),
        bars = loaded.series.len(),
        "running backtest"
    );

    let (signals, trades) = strategy.run();
    let (golden_crosses, death_crosses) = signals.crossover_counts();
    let metrics = PerformanceMetrics::evaluate(&trades);

    match &metrics {
        Some(m) => info!(
            trades = m.trade_count,
            total_pnl = m.total_pnl,
            win_rate = m.win_rate,
            "backtest complete"
        ),
        None => info!("backtest complete: no trades"),
    }

    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        symbol: loaded.series.symbol().to_string(),
        strategy: config.strategy.clone(),
        params: strategy.params(),
        bar_count: loaded.series.len(),
        golden_crosses,
        death_crosses,
        trades,
        metrics,
        data_quality_warnings: loaded.warnings.clone(),
        synthetic: loaded.is_synthetic(),
    };
    (result, signals)
}
