//! SMA crossover signal generator.
//!
//! - Long while the short SMA is strictly above the long SMA
//! - Flat otherwise, including warmup bars and exact ties
//! - Golden cross on flat → long, death cross on long → flat

use crate::domain::Bar;
use crate::indicators::{Indicator, Sma};

use super::{Crossover, Exposure, SignaledBar, SignaledSeries};

/// Computes both averages, the exposure and the crossover signal per bar.
///
/// `short < long` is the expected configuration but is not checked; swapped
/// windows simply produce an inverted signal.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    short: Sma,
    long: Sma,
}

impl SignalGenerator {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short: Sma::new(short_period),
            long: Sma::new(long_period),
        }
    }

    pub fn short_period(&self) -> usize {
        self.short.period()
    }

    pub fn long_period(&self) -> usize {
        self.long.period()
    }

    /// Bars needed before a crossover can appear.
    pub fn warmup(&self) -> usize {
        self.short.lookback().max(self.long.lookback())
    }

    /// One forward pass over `bars`. The input is only read.
    pub fn generate(&self, bars: &[Bar]) -> SignaledSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let sma_short = self.short.compute(&closes);
        let sma_long = self.long.compute(&closes);

        let mut previous: Option<Exposure> = None;
        let signaled = bars
            .iter()
            .zip(sma_short)
            .zip(sma_long)
            .map(|((bar, short), long)| {
                let position = match (short, long) {
                    (Some(s), Some(l)) if s > l => Exposure::Long,
                    _ => Exposure::Flat,
                };
                let signal = previous.map(|prev| Crossover::between(prev, position));
                previous = Some(position);

                SignaledBar {
                    timestamp: bar.timestamp,
                    close: bar.close,
                    sma_short: short,
                    sma_long: long,
                    position,
                    signal,
                }
            })
            .collect::<Vec<_>>();

        SignaledSeries::new(signaled)
    }
}
