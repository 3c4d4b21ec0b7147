//! CrossLab Core: price series, SMA crossover signals, trade simulation.
//!
//! This crate contains the analysis core:
//! - Domain types (bars, price series, open positions, trades)
//! - Simple moving average indicator
//! - Crossover signal generation (exposure + transition per bar)
//! - Single-pass trade simulator pairing entries with exits
//! - Strategy trait and serializable strategy selection
//! - Data providers (Polygon aggregates, CSV, synthetic)

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;
pub mod simulator;
pub mod strategy;

pub use domain::{Bar, PriceSeries, Trade};
pub use signals::{Crossover, Exposure, SignalGenerator, SignaledBar, SignaledSeries};
pub use simulator::TradeSimulator;
pub use strategy::{SmaCrossover, Strategy, StrategyConfig};
