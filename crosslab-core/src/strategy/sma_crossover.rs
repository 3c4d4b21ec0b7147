//! Simple moving-average crossover strategy.
//!
//! Long from a golden cross (short SMA rises above long SMA) until the next
//! death cross (short SMA falls to or below long SMA).

use crate::domain::{PriceSeries, Trade};
use crate::signals::{SignalGenerator, SignaledSeries};
use crate::simulator::TradeSimulator;

use super::Strategy;

pub const DEFAULT_SHORT: usize = 9;
pub const DEFAULT_LONG: usize = 20;

/// SMA crossover over an owned price series.
///
/// # Parameters
/// - `short`: short SMA window (default 9)
/// - `long`: long SMA window (default 20)
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    series: PriceSeries,
    generator: SignalGenerator,
}

impl SmaCrossover {
    pub fn new(series: PriceSeries, short: usize, long: usize) -> Self {
        Self {
            series,
            generator: SignalGenerator::new(short, long),
        }
    }

    pub fn with_defaults(series: PriceSeries) -> Self {
        Self::new(series, DEFAULT_SHORT, DEFAULT_LONG)
    }

    pub fn short(&self) -> usize {
        self.generator.short_period()
    }

    pub fn long(&self) -> usize {
        self.generator.long_period()
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("short".to_string(), self.short().to_string()),
            ("long".to_string(), self.long().to_string()),
        ]
    }

    fn series(&self) -> &PriceSeries {
        &self.series
    }

    fn generate_signals(&self) -> SignaledSeries {
        self.generator.generate(self.series.bars())
    }

    fn backtest(&self, signals: &SignaledSeries) -> Vec<Trade> {
        TradeSimulator::simulate(signals.bars())
    }
}
