//! Synthetic price series for offline development.
//!
//! A seeded random walk starting at 100.0. The seed is derived from the symbol,
//! so the same request always yields the same series. Results built on this
//! data are tagged synthetic.

use chrono::{Datelike, Duration, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::polygon::DEFAULT_LIMIT;
use super::provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult};
use crate::domain::{Bar, PriceSeries};

pub struct SyntheticProvider {
    max_bars: usize,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            max_bars: DEFAULT_LIMIT as usize,
        }
    }
}

impl SyntheticProvider {
    pub fn new(max_bars: usize) -> Self {
        Self { max_bars }
    }

    pub fn generate(&self, request: &FetchRequest) -> PriceSeries {
        let seed_bytes = blake3::hash(request.symbol.as_bytes());
        let mut rng = StdRng::from_seed(*seed_bytes.as_bytes());

        let step = Duration::seconds(request.timespan.approx_seconds());
        let (Some(start), Some(end)) = (
            request.start.and_hms_opt(0, 0, 0),
            request.end.and_hms_opt(23, 59, 59),
        ) else {
            return PriceSeries::empty(request.symbol.clone());
        };
        let (start, end) = (start.and_utc(), end.and_utc());

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= end && bars.len() < self.max_bars {
            let weekday = current.weekday();
            if weekday == Weekday::Sat || weekday == Weekday::Sun {
                current += step;
                continue;
            }

            let change: f64 = rng.gen_range(-0.01..0.01);
            price = (price * (1.0 + change)).max(0.01);
            bars.push(Bar::new(current, price));
            current += step;
        }

        PriceSeries::new(request.symbol.clone(), bars)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            series: self.generate(request),
            source: DataSource::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::Timespan;
    use chrono::NaiveDate;

    fn request(symbol: &str, timespan: Timespan) -> FetchRequest {
        FetchRequest {
            symbol: symbol.into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            timespan,
        }
    }

    #[test]
    fn deterministic_per_symbol() {
        let p = SyntheticProvider::default();
        let a = p.generate(&request("SPY", Timespan::Day));
        let b = p.generate(&request("SPY", Timespan::Day));
        let c = p.generate(&request("QQQ", Timespan::Day));
        assert_eq!(a, b);
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn daily_bars_skip_weekends_and_stay_positive() {
        let series = SyntheticProvider::default().generate(&request("SPY", Timespan::Day));
        // January 2024 has 23 weekdays.
        assert_eq!(series.len(), 23);
        assert!(series.bars().iter().all(|b| b.is_sane()));
        assert!(series.quality_warnings().is_empty());
    }

    #[test]
    fn respects_max_bars() {
        let series = SyntheticProvider::new(100).generate(&request("SPY", Timespan::Minute));
        assert_eq!(series.len(), 100);
    }
}
