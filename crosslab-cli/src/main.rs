//! CrossLab CLI: run and fetch commands.
//!
//! Commands:
//! - `run`: execute an SMA crossover backtest from a TOML config or flags
//! - `fetch`: download aggregates from Polygon and write them as CSV

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use crosslab_core::data::csv_file::write_series;
use crosslab_core::data::{DataProvider, Timespan};
use crosslab_core::StrategyConfig;
use crosslab_runner::export::save_artifacts;
use crosslab_runner::{
    polygon_provider, run_single_backtest, BacktestConfig, BacktestResult, LoadOptions,
};

#[derive(Parser)]
#[command(name = "crosslab", about = "CrossLab CLI: SMA crossover backtester")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or from flags.
    Run {
        /// Path to a TOML config file. Other data/strategy flags are ignored when set.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ticker symbol (required without --config).
        #[arg(long)]
        symbol: Option<String>,

        /// Start date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Short SMA window.
        #[arg(long, default_value_t = 9)]
        short: usize,

        /// Long SMA window.
        #[arg(long, default_value_t = 20)]
        long: usize,

        /// Bar size: minute, hour, day, week, month, quarter, year.
        #[arg(long, default_value = "minute")]
        timespan: Timespan,

        /// Read `<dir>/<SYMBOL>.csv` instead of calling Polygon.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Fetch aggregates from Polygon and write them as `timestamp,close` CSV.
    Fetch {
        #[arg(long)]
        symbol: String,

        /// Start date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        start: NaiveDate,

        /// End date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        end: NaiveDate,

        /// Bar size: minute, hour, day, week, month, quarter, year.
        #[arg(long, default_value = "minute")]
        timespan: Timespan,

        /// Output CSV file.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            symbol,
            start,
            end,
            short,
            long,
            timespan,
            csv_dir,
            offline,
            synthetic,
            output_dir,
        } => {
            let backtest_config = match config {
                Some(path) => BacktestConfig::from_file(&path)?,
                None => {
                    let (Some(symbol), Some(start), Some(end)) = (symbol, start, end) else {
                        bail!("--symbol, --start and --end are required without --config");
                    };
                    let mut cfg = BacktestConfig::new(symbol, start, end);
                    cfg.data.timespan = timespan;
                    cfg.data.csv_dir = csv_dir;
                    cfg.strategy = StrategyConfig::SmaCrossover { short, long };
                    cfg.validate()?;
                    cfg
                }
            };
            run_backtest_cmd(&backtest_config, LoadOptions { offline, synthetic }, &output_dir)
        }
        Commands::Fetch {
            symbol,
            start,
            end,
            timespan,
            out,
        } => run_fetch(symbol, start, end, timespan, &out),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("reqwest", tracing::Level::WARN)
                .with_default(level),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn run_backtest_cmd(
    config: &BacktestConfig,
    opts: LoadOptions,
    output_dir: &std::path::Path,
) -> Result<()> {
    let provider = if opts.offline || config.data.csv_dir.is_some() {
        None
    } else {
        match polygon_provider(config) {
            Ok(p) => Some(p),
            Err(e) if opts.synthetic => {
                warn!(error = %e, "Polygon unavailable");
                None
            }
            Err(e) => return Err(e.into()),
        }
    };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);

    let (result, signals) = run_single_backtest(config, provider_ref, &opts)?;

    print_summary(&result);

    let run_dir = save_artifacts(&result, &signals, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_fetch(
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
    timespan: Timespan,
    out: &std::path::Path,
) -> Result<()> {
    let mut config = BacktestConfig::new(symbol, start, end);
    config.data.timespan = timespan;
    config.validate()?;

    let provider = polygon_provider(&config)?;
    let fetched = provider
        .fetch(&config.fetch_request())
        .with_context(|| format!("failed to fetch {}", config.data.symbol))?;

    write_series(out, &fetched.series)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(bars = fetched.series.len(), path = %out.display(), "series written");
    println!("Wrote {} bars to {}", fetched.series.len(), out.display());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Strategy:       {}", result.strategy.type_name());
    for (name, value) in &result.params {
        println!("  {name:<13} {value}");
    }
    println!("Bars:           {}", result.bar_count);
    println!(
        "Crossovers:     {} golden / {} death",
        result.golden_crosses, result.death_crosses
    );
    println!();
    println!("--- Performance ---");
    match &result.metrics {
        Some(m) => {
            println!("Total PnL:      {:.2}", m.total_pnl);
            println!("Win Rate %:     {:.2}", m.win_rate);
            println!("Trades:         {}", m.trade_count);
            println!("Avg PnL:        {:.2}", m.avg_pnl);
            println!("Best Trade:     {:.2}", m.best_trade);
            println!("Worst Trade:    {:.2}", m.worst_trade);
            match m.profit_factor {
                Some(pf) => println!("Profit Factor:  {pf:.2}"),
                None => println!("Profit Factor:  n/a"),
            }
            println!("Max Consec Loss: {}", m.max_consecutive_losses);
        }
        None => println!("No trades."),
    }
    if result.synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for warn in &result.data_quality_warnings {
        println!("WARNING: {warn}");
    }
    println!();
}
