//! CSV import/export of close-price series.
//!
//! Format: a `timestamp,close` header, one bar per row. Timestamps are
//! RFC 3339 (`2024-01-02T14:30:00Z`), `YYYY-MM-DD HH:MM:SS` (UTC) or plain
//! `YYYY-MM-DD` dates (midnight UTC).

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult};
use crate::domain::{Bar, PriceSeries};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    close: f64,
}

/// Parse one timestamp cell.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Read every bar in a CSV file, in file order.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let csv_err = |reason: String| DataError::Csv {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_err(e.to_string()))?;
    let mut bars = Vec::new();

    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| csv_err(e.to_string()))?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            csv_err(format!("row {}: bad timestamp '{}'", line + 1, row.timestamp))
        })?;
        bars.push(Bar::new(timestamp, row.close));
    }

    Ok(bars)
}

/// Write a series as `timestamp,close` CSV.
pub fn write_series(path: &Path, series: &PriceSeries) -> Result<(), DataError> {
    let csv_err = |e: csv::Error| DataError::Csv {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for bar in series.bars() {
        writer
            .serialize(CsvRow {
                timestamp: bar.timestamp.to_rfc3339(),
                close: bar.close,
            })
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads `<dir>/<SYMBOL>.csv` and keeps bars inside the requested date range.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let mut bars: Vec<Bar> = read_bars(&self.path_for(&request.symbol))?
            .into_iter()
            .filter(|b| {
                let day = b.timestamp.date_naive();
                day >= request.start && day <= request.end
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);

        Ok(FetchResult {
            series: PriceSeries::new(request.symbol.clone(), bars),
            source: DataSource::CsvImport,
        })
    }
}
