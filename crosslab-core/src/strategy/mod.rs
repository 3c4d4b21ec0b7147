//! Strategy interface and configuration.
//!
//! A strategy owns its price series (taken at construction) and exposes two
//! steps: derive the signaled series, then simulate trades from it. Variants
//! are selected through the serializable [`StrategyConfig`].

pub mod sma_crossover;

pub use sma_crossover::SmaCrossover;

use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, Trade};
use crate::signals::SignaledSeries;

pub trait Strategy: Send + Sync {
    /// Strategy name for reports and logging.
    fn name(&self) -> &str;

    /// Parameter names and values, in a stable order.
    fn params(&self) -> Vec<(String, String)>;

    /// The series this strategy was built over.
    fn series(&self) -> &PriceSeries;

    /// Derive the signaled series. Calling this repeatedly yields identical output.
    fn generate_signals(&self) -> SignaledSeries;

    /// Simulate trades over a signaled series.
    fn backtest(&self, signals: &SignaledSeries) -> Vec<Trade>;

    /// Both steps in sequence.
    fn run(&self) -> (SignaledSeries, Vec<Trade>) {
        let signals = self.generate_signals();
        let trades = self.backtest(&signals);
        (signals, trades)
    }
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Short SMA crossing the long SMA.
    SmaCrossover {
        #[serde(default = "default_short")]
        short: usize,
        #[serde(default = "default_long")]
        long: usize,
    },
}

fn default_short() -> usize {
    sma_crossover::DEFAULT_SHORT
}

fn default_long() -> usize {
    sma_crossover::DEFAULT_LONG
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::SmaCrossover {
            short: sma_crossover::DEFAULT_SHORT,
            long: sma_crossover::DEFAULT_LONG,
        }
    }
}

impl StrategyConfig {
    /// Build the strategy over its own copy of `series`.
    pub fn build(&self, series: &PriceSeries) -> Box<dyn Strategy> {
        match *self {
            StrategyConfig::SmaCrossover { short, long } => {
                Box::new(SmaCrossover::new(series.clone(), short, long))
            }
        }
    }

    /// Machine name of the selected variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyConfig::SmaCrossover { .. } => "sma_crossover",
        }
    }

    /// BLAKE3 hash over the canonical JSON encoding.
    pub fn fingerprint(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => blake3::hash(json.as_bytes()).to_hex().to_string(),
            Err(_) => blake3::hash(format!("{self:?}").as_bytes()).to_hex().to_string(),
        }
    }
}
