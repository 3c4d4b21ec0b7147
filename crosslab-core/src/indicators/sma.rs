//! Simple Moving Average (SMA).
//!
//! Rolling arithmetic mean of close prices over a lookback window.
//! Lookback: period - 1 (first value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// A zero period is accepted and yields an all-`None` series.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if self.period == 0 || n < self.period {
            return result;
        }

        for (offset, window) in closes.windows(self.period).enumerate() {
            result[offset + self.period - 1] = Some(window_mean(window));
        }

        result
    }
}

/// Mean of a non-empty window.
///
/// A window of identical values yields that value exactly, whatever its
/// length, so averages of different periods over a flat stretch compare
/// equal. Other windows use a Neumaier-compensated sum.
fn window_mean(window: &[f64]) -> f64 {
    let first = window[0];
    if window.iter().all(|&v| v == first) {
        return first;
    }

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &v in window {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    (sum + compensation) / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let result = Sma::new(5).compute(&closes);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_none(), "expected None at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        // SMA[5] = mean(11,12,13,14,15) = 13.0
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        // SMA[6] = mean(12,13,14,15,16) = 14.0
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let result = Sma::new(1).compute(&[100.0, 200.0, 300.0]);
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
        assert_eq!(Sma::new(0).lookback(), 0);
    }

    #[test]
    fn sma_too_few_bars() {
        let result = Sma::new(5).compute(&[10.0, 11.0]);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn sma_zero_period_yields_nothing() {
        let result = Sma::new(0).compute(&[10.0, 11.0, 12.0]);
        assert_eq!(result, vec![None, None, None]);
    }

    #[test]
    fn sma_equal_windows_are_exactly_equal() {
        let closes = [0.1, 0.2, 0.7, 0.1, 0.2, 0.7, 0.1, 0.2, 0.7];
        let result = Sma::new(3).compute(&closes);
        assert_eq!(result[2], result[5]);
        assert_eq!(result[5], result[8]);
    }

    #[test]
    fn sma_name() {
        assert_eq!(Sma::new(20).name(), "sma_20");
    }

    #[test]
    fn flat_window_mean_is_exact_for_any_period() {
        for price in [100.07, 412.19, 0.3, 187.33] {
            let closes = [price; 25];
            let short = Sma::new(9).compute(&closes);
            let long = Sma::new(20).compute(&closes);
            assert_eq!(short[24], Some(price));
            assert_eq!(long[24], Some(price));
        }
    }

    #[test]
    fn compensated_mean_of_mixed_window() {
        let result = Sma::new(3).compute(&[0.1, 0.2, 0.3]);
        assert_approx(result[2].unwrap(), 0.2, 1e-15);
    }
}
