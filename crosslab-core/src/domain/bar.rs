//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped close price.
///
/// Timestamps are expected to be unique and strictly increasing within a
/// series, and closes positive. Neither is enforced here; see
/// [`PriceSeries::quality_warnings`](super::PriceSeries::quality_warnings).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// Returns true if the close is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !self.close.is_finite()
    }

    /// A usable bar has a finite, strictly positive close.
    pub fn is_sane(&self) -> bool {
        !self.is_void() && self.close > 0.0
    }
}
