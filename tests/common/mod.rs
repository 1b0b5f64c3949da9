#![allow(dead_code)]

use chrono::NaiveDate;
use smacross::domain::backtest::BacktestConfig;
use smacross::domain::error::SmacrossError;
pub use smacross::domain::price::{Bar, PriceSeries};
use smacross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SmacrossError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SmacrossError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        Ok(self.data.get(code).and_then(|bars| {
            let first = bars.first()?;
            let last = bars.last()?;
            Some((first.date, last.date, bars.len()))
        }))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> Bar {
    Bar::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), close)
}

/// One bar per calendar day starting 2024-01-01.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_bars(closes)).unwrap()
}

/// Rises, falls, then rises again so a 2/3 crossover enters, exits and re-enters.
pub const WAVE_CLOSES: [f64; 14] = [
    100.0, 102.0, 104.0, 106.0, 108.0, 104.0, 100.0, 96.0, 94.0, 97.0, 101.0, 105.0, 109.0, 112.0,
];

pub fn small_config(short: usize, long: usize) -> BacktestConfig {
    BacktestConfig {
        short_window: short,
        long_window: long,
        initial_capital: 10_000.0,
        ..BacktestConfig::default()
    }
}

/// `date,close` CSV text for `bars`.
pub fn prices_csv(bars: &[Bar]) -> String {
    let mut out = String::from("date,close\n");
    for bar in bars {
        out.push_str(&format!("{},{}\n", bar.date, bar.close));
    }
    out
}
