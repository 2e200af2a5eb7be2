#![allow(dead_code)]

use chrono::NaiveDate;
use signalsim::domain::error::SignalsimError;
pub use signalsim::domain::ohlcv::{Bar, BarSeries};
use signalsim::ports::data_port::DataPort;
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

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self, symbol: &str) -> Result<BarSeries, SignalsimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalsimError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        BarSeries::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalsimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> Bar {
    Bar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000,
    }
}

/// Bars at daily spacing with the given closes, starting 2024-01-01.
pub fn make_series(closes: &[f64]) -> BarSeries {
    let start = date(2024, 1, 1);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect();
    BarSeries::new(bars).unwrap()
}

/// `count` bars drifting up from `start_price` by 0.1% per bar.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price * (1.0 + 0.001 * i as f64);
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            }
        })
        .collect()
}
