//! End-to-end signal + simulation scenarios on hand-built series.

use chrono::{DateTime, Duration, TimeZone, Utc};
use crosslab_core::{
    Bar, Crossover, Exposure, PriceSeries, SignalGenerator, SignaledBar, SmaCrossover, Strategy,
    TradeSimulator,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
}

fn series(closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(t0() + Duration::minutes(i as i64), c))
        .collect();
    PriceSeries::new("TEST", bars)
}

fn signal_values(bars: &[SignaledBar]) -> Vec<Option<i8>> {
    bars.iter().map(|b| b.signal.map(Crossover::value)).collect()
}

// ── Scenario A: flat prices never cross ──────────────────────────────

#[test]
fn constant_prices_produce_no_trades() {
    let strategy = SmaCrossover::new(series(&[100.0; 25]), 9, 20);
    let (signals, trades) = strategy.run();

    assert_eq!(signals.len(), 25);
    assert!(signals.bars().iter().all(|b| b.position == Exposure::Flat));
    assert!(signals
        .bars()
        .iter()
        .all(|b| matches!(b.signal, None | Some(Crossover::Hold))));
    assert!(trades.is_empty());
}

#[test]
fn constant_non_round_prices_never_go_long() {
    for price in [100.07, 412.19, 0.3, 187.33] {
        let (signals, trades) = SmaCrossover::new(series(&[price; 25]), 9, 20).run();
        let longs = signals.bars().iter().filter(|b| b.position == Exposure::Long).count();
        assert_eq!(longs, 0, "close={price}");
        assert_eq!(signals.crossover_counts(), (0, 0), "close={price}");
        assert!(trades.is_empty());
        assert_eq!(signals.bars()[24].sma_short, signals.bars()[24].sma_long);
    }
}

// ── Scenario B: one golden cross, one death cross ────────────────────

#[test]
fn rise_then_fall_makes_one_round_trip() {
    let closes = [1.0, 2.0, 3.0, 10.0, 10.0, 10.0, 1.0, 1.0, 1.0];
    let strategy = SmaCrossover::new(series(&closes), 2, 3);
    let (signals, trades) = strategy.run();

    let positions: Vec<i8> = signals.bars().iter().map(|b| b.position.value()).collect();
    // Index 2: sma2 = 2.5 > sma3 = 2.0. Index 5: both 10.0, a tie, so flat.
    assert_eq!(positions, vec![0, 0, 1, 1, 1, 0, 0, 0, 0]);
    assert_eq!(
        signal_values(signals.bars()),
        vec![None, Some(0), Some(1), Some(0), Some(0), Some(-1), Some(0), Some(0), Some(0)]
    );

    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.entry, t0() + Duration::minutes(2));
    assert_eq!(trade.exit, t0() + Duration::minutes(5));
    assert_eq!(trade.entry_price, 3.0);
    assert_eq!(trade.exit_price, 10.0);
    assert_eq!(trade.pnl, trade.exit_price - trade.entry_price);
    assert_eq!(trade.bars_held(), 3);
}

#[test]
fn losing_round_trip_has_negative_pnl() {
    // Rally lifts the short average, then the price collapses below entry.
    let closes = [10.0, 10.0, 10.0, 12.0, 8.0, 5.0];
    let strategy = SmaCrossover::new(series(&closes), 2, 3);
    let (_, trades) = strategy.run();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].entry_price, 12.0);
    assert_eq!(trades[0].exit_price, 8.0);
    assert_eq!(trades[0].pnl, -4.0);
}

// ── Scenario C: a second entry replaces the first ────────────────────

#[test]
fn repeated_entry_keeps_the_later_one() {
    let mut bars: Vec<SignaledBar> = (0..10)
        .map(|i| SignaledBar {
            timestamp: t0() + Duration::minutes(i),
            close: 50.0 + i as f64,
            sma_short: None,
            sma_long: None,
            position: Exposure::Flat,
            signal: if i == 0 { None } else { Some(Crossover::Hold) },
        })
        .collect();
    bars[2].signal = Some(Crossover::Golden);
    bars[5].signal = Some(Crossover::Golden);
    bars[8].signal = Some(Crossover::Death);

    let trades = TradeSimulator::simulate(&bars);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].entry, bars[5].timestamp);
    assert_eq!(trades[0].entry_price, 55.0);
    assert_eq!(trades[0].exit, bars[8].timestamp);
    assert_eq!(trades[0].pnl, 3.0);
}

// ── Edge cases ───────────────────────────────────────────────────────

#[test]
fn empty_series_flows_through() {
    let strategy = SmaCrossover::with_defaults(PriceSeries::empty("NONE"));
    let (signals, trades) = strategy.run();
    assert!(signals.is_empty());
    assert!(trades.is_empty());
}

#[test]
fn series_shorter_than_long_window_has_no_crosses() {
    let gen = SignalGenerator::new(2, 30);
    let out = gen.generate(series(&[1.0, 3.0, 9.0, 27.0, 81.0]).bars());
    assert!(out.bars().iter().all(|b| b.sma_long.is_none()));
    assert!(out.bars().iter().all(|b| b.position == Exposure::Flat));
    assert_eq!(out.crossover_counts(), (0, 0));
}

#[test]
fn open_position_at_end_is_not_reported() {
    let closes = [5.0, 5.0, 5.0, 6.0, 7.0, 8.0];
    let (signals, trades) = SmaCrossover::new(series(&closes), 2, 3).run();
    assert_eq!(signals.crossover_counts(), (1, 0));
    assert!(trades.is_empty());
}

#[test]
fn several_cycles_alternate_and_never_overlap() {
    let closes = [
        5.0, 5.0, 5.0, 8.0, 9.0, 4.0, 3.0, 3.0, 7.0, 9.0, 10.0, 2.0, 1.0, 1.0,
    ];
    let (_, trades) = SmaCrossover::new(series(&closes), 2, 3).run();
    assert!(trades.len() >= 2, "expected multiple trades, got {trades:?}");
    for t in &trades {
        assert!(t.entry < t.exit);
    }
    for pair in trades.windows(2) {
        assert!(pair[0].exit <= pair[1].entry);
    }
}
