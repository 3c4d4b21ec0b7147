//! Trade simulator: pairs golden-cross entries with death-cross exits.
//!
//! State machine over one forward pass:
//! - Golden cross: open a position at this bar's close, replacing any
//!   position that is already open
//! - Death cross with an open position: close it into a [`Trade`]
//! - Death cross while flat: ignored
//! - A position still open after the last bar is dropped

use tracing::debug;

use crate::domain::{OpenPosition, Trade};
use crate::signals::{Crossover, SignaledBar};

#[derive(Debug, Default)]
pub struct TradeSimulator {
    open: Option<OpenPosition>,
    trades: Vec<Trade>,
}

impl TradeSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the whole series and return the completed trades in exit order.
    pub fn simulate(bars: &[SignaledBar]) -> Vec<Trade> {
        let mut sim = Self::new();
        for (index, bar) in bars.iter().enumerate() {
            sim.on_bar(index, bar);
        }
        sim.finish()
    }

    /// Feed a single bar.
    pub fn on_bar(&mut self, index: usize, bar: &SignaledBar) {
        match bar.signal {
            Some(Crossover::Golden) => {
                if let Some(replaced) = self.open {
                    debug!(
                        replaced_entry = %replaced.entry,
                        new_entry = %bar.timestamp,
                        "entry signal while already open; previous entry discarded"
                    );
                }
                self.open = Some(OpenPosition {
                    entry: bar.timestamp,
                    entry_index: index,
                    entry_price: bar.close,
                });
            }
            Some(Crossover::Death) => match self.open.take() {
                Some(pos) => {
                    let trade = Trade::close(
                        pos.entry,
                        pos.entry_index,
                        pos.entry_price,
                        bar.timestamp,
                        index,
                        bar.close,
                    );
                    debug!(
                        entry = %trade.entry,
                        exit = %trade.exit,
                        pnl = trade.pnl,
                        "trade closed"
                    );
                    self.trades.push(trade);
                }
                None => debug!(at = %bar.timestamp, "exit signal with no open position ignored"),
            },
            Some(Crossover::Hold) | None => {}
        }
    }

    /// Position currently held, if any.
    pub fn open_position(&self) -> Option<&OpenPosition> {
        self.open.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Consume the simulator. An unmatched open position is discarded.
    pub fn finish(self) -> Vec<Trade> {
        if let Some(pos) = self.open {
            debug!(entry = %pos.entry, "position still open at end of series discarded");
        }
        self.trades
    }
}
