//! Signal generation: SMA crossover over a price series.
//!
//! Signals depend only on market data (closes up to and including the current
//! bar). They never see simulation state.

pub mod generator;
pub mod intent;

pub use generator::SignalGenerator;
pub use intent::{Crossover, Exposure};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bar augmented with both averages, the exposure and the transition signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignaledBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// `None` during the short window's warmup.
    pub sma_short: Option<f64>,
    /// `None` during the long window's warmup.
    pub sma_long: Option<f64>,
    pub position: Exposure,
    /// `None` on the first bar, which has no predecessor to diff against.
    pub signal: Option<Crossover>,
}

/// Output of one signal pass: same length and order as the input series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignaledSeries {
    bars: Vec<SignaledBar>,
}

impl SignaledSeries {
    pub fn new(bars: Vec<SignaledBar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[SignaledBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Number of golden and death crosses in the series.
    pub fn crossover_counts(&self) -> (usize, usize) {
        self.bars.iter().fold((0, 0), |(golden, death), b| match b.signal {
            Some(Crossover::Golden) => (golden + 1, death),
            Some(Crossover::Death) => (golden, death + 1),
            _ => (golden, death),
        })
    }
}

impl From<Vec<SignaledBar>> for SignaledSeries {
    fn from(bars: Vec<SignaledBar>) -> Self {
        Self::new(bars)
    }
}
