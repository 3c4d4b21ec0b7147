//! Property tests for signal and simulator invariants.
//!
//! Uses proptest to verify:
//! 1. Output length: one signaled bar per input bar
//! 2. Signal alphabet: every signal after bar 0 is −1, 0 or +1 and equals the position diff
//! 3. Trade ordering: trades never overlap and entries precede exits
//! 4. Warmup: averages are absent exactly for the first window-1 bars

use chrono::{Duration, TimeZone, Utc};
use crosslab_core::{Bar, Crossover, SignalGenerator, TradeSimulator};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 0..120)
}

fn arb_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..15, 1usize..30)
}

fn to_bars(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(base + Duration::minutes(i as i64), c))
        .collect()
}

proptest! {
    #[test]
    fn output_matches_input_length(closes in arb_closes(), (short, long) in arb_windows()) {
        let bars = to_bars(&closes);
        let out = SignalGenerator::new(short, long).generate(&bars);
        prop_assert_eq!(out.len(), bars.len());
        for (s, b) in out.bars().iter().zip(&bars) {
            prop_assert_eq!(s.timestamp, b.timestamp);
            prop_assert_eq!(s.close, b.close);
        }
    }

    #[test]
    fn signal_is_position_diff(closes in arb_closes(), (short, long) in arb_windows()) {
        let out = SignalGenerator::new(short, long).generate(&to_bars(&closes));
        let bars = out.bars();
        if let Some(first) = bars.first() {
            prop_assert!(first.signal.is_none());
        }
        for w in bars.windows(2) {
            let signal = w[1].signal.map(Crossover::value);
            prop_assert!(matches!(signal, Some(-1 | 0 | 1)));
            prop_assert_eq!(signal, Some(w[1].position.value() - w[0].position.value()));
        }
    }

    #[test]
    fn trades_alternate_and_never_overlap(closes in arb_closes(), (short, long) in arb_windows()) {
        let out = SignalGenerator::new(short, long).generate(&to_bars(&closes));
        let trades = TradeSimulator::simulate(out.bars());
        for t in &trades {
            prop_assert!(t.entry < t.exit);
            prop_assert_eq!(t.pnl, t.exit_price - t.entry_price);
        }
        for pair in trades.windows(2) {
            prop_assert!(pair[0].exit <= pair[1].entry);
        }
    }

    #[test]
    fn averages_absent_only_during_warmup(closes in arb_closes(), (short, long) in arb_windows()) {
        let out = SignalGenerator::new(short, long).generate(&to_bars(&closes));
        for (i, b) in out.bars().iter().enumerate() {
            prop_assert_eq!(b.sma_short.is_some(), i + 1 >= short);
            prop_assert_eq!(b.sma_long.is_some(), i + 1 >= long);
        }
    }
}
