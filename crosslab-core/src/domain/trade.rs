//! Trade: a completed round-trip paper trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed long trade: entry on a golden cross, exit on the next death cross.
///
/// `pnl` is the raw close-to-close price difference; there is no sizing,
/// commission or slippage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry: DateTime<Utc>,
    pub entry_index: usize,
    pub entry_price: f64,

    // ── Exit ──
    pub exit: DateTime<Utc>,
    pub exit_index: usize,
    pub exit_price: f64,

    // ── PnL ──
    pub pnl: f64,
}

impl Trade {
    /// Close a position at the given bar.
    pub fn close(
        entry: DateTime<Utc>,
        entry_index: usize,
        entry_price: f64,
        exit: DateTime<Utc>,
        exit_index: usize,
        exit_price: f64,
    ) -> Self {
        Self {
            entry,
            entry_index,
            entry_price,
            exit,
            exit_index,
            exit_price,
            pnl: exit_price - entry_price,
        }
    }

    /// Number of bars between entry and exit.
    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }

    /// Return on the trade as a fraction of the entry price.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.pnl / self.entry_price
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
