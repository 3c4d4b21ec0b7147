//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and the signaled series for external analysis tools
//! - **Markdown**: a human-readable single-run report
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crosslab_core::{SignaledSeries, Trade};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: entry, entry_index, entry_price, exit, exit_index, exit_price,
/// pnl, bars_held, return_pct
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry",
        "entry_index",
        "entry_price",
        "exit",
        "exit_index",
        "exit_price",
        "pnl",
        "bars_held",
        "return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry.to_rfc3339(),
            &t.entry_index.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit.to_rfc3339(),
            &t.exit_index.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.pnl),
            &t.bars_held().to_string(),
            &format!("{:.4}", t.return_pct() * 100.0),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the signaled series as CSV. Warmup averages and the first bar's
/// signal are written as empty cells.
pub fn export_signals_csv(signals: &SignaledSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "close", "sma_short", "sma_long", "position", "signal"])?;

    let opt = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();
    for b in signals.bars() {
        wtr.write_record([
            &b.timestamp.to_rfc3339(),
            &format!("{:.6}", b.close),
            &opt(b.sma_short),
            &opt(b.sma_long),
            &b.position.value().to_string(),
            &b.signal.map(|s| s.value().to_string()).unwrap_or_default(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{run_id prefix}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: trade tape
/// - `signals.csv`: bar-by-bar averages, exposure and signal
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    result: &BacktestResult,
    signals: &SignaledSeries,
    output_dir: &Path,
) -> Result<PathBuf> {
    let short_id: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", result.symbol, short_id));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write(&run_dir.join("signals.csv"), &export_signals_csv(signals)?)?;
    write(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!("| Strategy | {} |\n", result.strategy.type_name()));
    for (name, value) in &result.params {
        md.push_str(&format!("| {name} | {value} |\n"));
    }
    md.push_str(&format!("| Bars | {} |\n", result.bar_count));
    md.push_str(&format!(
        "| Crossovers | {} golden / {} death |\n",
        result.golden_crosses, result.death_crosses
    ));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    if result.synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Performance\n\n");
    match &result.metrics {
        Some(m) => {
            md.push_str("| Metric | Value |\n");
            md.push_str("| --- | --- |\n");
            md.push_str(&format!("| Total PnL | {:.2} |\n", m.total_pnl));
            md.push_str(&format!("| Win Rate % | {:.2} |\n", m.win_rate));
            md.push_str(&format!("| Trades | {} |\n", m.trade_count));
            md.push_str(&format!("| Avg PnL | {:.2} |\n", m.avg_pnl));
            md.push_str(&format!("| Best Trade | {:.2} |\n", m.best_trade));
            md.push_str(&format!("| Worst Trade | {:.2} |\n", m.worst_trade));
            md.push_str(&format!(
                "| Profit Factor | {} |\n",
                m.profit_factor
                    .map(|pf| format!("{pf:.2}"))
                    .unwrap_or_else(|| "n/a".into())
            ));
            md.push_str(&format!(
                "| Max Consecutive Losses | {} |\n",
                m.max_consecutive_losses
            ));
        }
        None => md.push_str("No trades.\n"),
    }

    if !result.data_quality_warnings.is_empty() {
        md.push_str("\n## Data Quality\n\n");
        for w in &result.data_quality_warnings {
            md.push_str(&format!("- {w}\n"));
        }
    }

    md
}
