//! Performance metrics: pure functions over a trade list.
//!
//! Every metric is a pure function: trade list in, scalar out. No dependencies
//! on the runner, data loading, or the signal pass.

use crosslab_core::Trade;
use serde::{Deserialize, Serialize};

/// Summary statistics for one backtest run.
///
/// Money figures and percentages are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_pnl: f64,
    /// Percentage (0–100) of trades with positive pnl.
    pub win_rate: f64,
    pub trade_count: usize,
    pub avg_pnl: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    /// Gross wins over gross losses; `None` when no trade lost money.
    pub profit_factor: Option<f64>,
    pub max_consecutive_losses: usize,
}

impl PerformanceMetrics {
    /// Evaluate a trade list. No trades is the empty result (`None`), not an error.
    pub fn evaluate(trades: &[Trade]) -> Option<Self> {
        if trades.is_empty() {
            return None;
        }
        Some(Self {
            total_pnl: round2(total_pnl(trades)),
            win_rate: round2(win_rate(trades) * 100.0),
            trade_count: trades.len(),
            avg_pnl: round2(avg_pnl(trades)),
            best_trade: round2(best_trade(trades)),
            worst_trade: round2(worst_trade(trades)),
            profit_factor: profit_factor(trades).map(round2),
            max_consecutive_losses: max_consecutive_losses(trades),
        })
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Fraction (0.0–1.0) of trades with strictly positive pnl.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn avg_pnl(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_pnl(trades) / trades.len() as f64
}

pub fn best_trade(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).reduce(f64::max).unwrap_or(0.0)
}

pub fn worst_trade(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).reduce(f64::min).unwrap_or(0.0)
}

/// Gross profit / gross loss.
pub fn profit_factor(trades: &[Trade]) -> Option<f64> {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return None;
    }
    Some(gross_profit / gross_loss)
}

/// Longest run of trades that did not make money.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_winner() {
            current = 0;
        } else {
            current += 1;
            max_streak = max_streak.max(current);
        }
    }
    max_streak
}
