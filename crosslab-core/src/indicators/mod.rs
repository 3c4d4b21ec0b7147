//! Indicator trait and concrete indicators.
//!
//! Indicators are pure functions: close history in, series of the same length
//! out. Warmup positions carry `None`, never a placeholder number.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod sma;

pub use sma::Sma;

pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of leading bars that produce no value.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole close series.
    ///
    /// Returns a `Vec` of the same length as `closes`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
