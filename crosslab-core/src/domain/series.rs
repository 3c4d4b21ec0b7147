//! PriceSeries: an immutable, cheaply cloneable sequence of bars.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Bar;

/// Ordered close prices for a single symbol.
///
/// The bars live behind an `Arc<[Bar]>`, so clones share storage and nothing
/// can mutate a series once it is built. Strategies take their own clone at
/// construction and the caller's series stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Arc<[Bar]>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: bars.into(),
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Describe ordering and price problems without rejecting the series.
    ///
    /// The signal pass accepts malformed input and produces malformed but
    /// well-defined output, so these are surfaced as warnings only.
    pub fn quality_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let insane = self.bars.iter().filter(|b| !b.is_sane()).count();
        if insane > 0 {
            warnings.push(format!(
                "{}: {insane} bar(s) with a non-positive or non-finite close",
                self.symbol
            ));
        }

        let unordered = self
            .bars
            .windows(2)
            .filter(|w| w[1].timestamp <= w[0].timestamp)
            .count();
        if unordered > 0 {
            warnings.push(format!(
                "{}: {unordered} timestamp(s) not strictly after their predecessor",
                self.symbol
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(base + Duration::minutes(i as i64), c))
            .collect()
    }

    #[test]
    fn clone_shares_storage() {
        let series = PriceSeries::new("SPY", bars(&[1.0, 2.0, 3.0]));
        let copy = series.clone();
        assert!(std::ptr::eq(series.bars().as_ptr(), copy.bars().as_ptr()));
        assert_eq!(copy.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn clean_series_has_no_warnings() {
        let series = PriceSeries::new("SPY", bars(&[1.0, 2.0, 3.0]));
        assert!(series.quality_warnings().is_empty());
    }

    #[test]
    fn warns_on_bad_close_and_ordering() {
        let mut b = bars(&[1.0, -2.0, 3.0]);
        b[2].timestamp = b[0].timestamp;
        let series = PriceSeries::new("SPY", b);
        let warnings = series.quality_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("1 bar(s)"));
        assert!(warnings[1].contains("1 timestamp(s)"));
    }

    #[test]
    fn empty_series() {
        let series = PriceSeries::empty("SPY");
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
        assert!(series.quality_warnings().is_empty());
    }
}
