//! CSV file data adapter.
//!
//! Expects one `{symbol}.csv` per symbol under a base directory, columns
//! `date,open,high,low,close,volume` with ISO dates. Rows are sorted by
//! date before series validation, so unsorted files load fine; duplicate
//! dates and non-positive prices are rejected by [`BarSeries::new`].

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::SignalsimError;
use crate::domain::ohlcv::{Bar, BarSeries};
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn data_error(reason: String) -> SignalsimError {
    SignalsimError::Data { reason }
}

fn field<'a>(record: &'a csv::StringRecord, index: usize, name: &str) -> Result<&'a str, SignalsimError> {
    record
        .get(index)
        .ok_or_else(|| data_error(format!("missing {name} column")))
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, SignalsimError>
where
    T::Err: std::fmt::Display,
{
    field(record, index, name)?
        .parse()
        .map_err(|e| data_error(format!("invalid {name} value: {e}")))
}

impl DataPort for CsvAdapter {
    fn load_bars(&self, symbol: &str) -> Result<BarSeries, SignalsimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {e}")))?;

            let date = NaiveDate::parse_from_str(field(&record, 0, "date")?, "%Y-%m-%d")
                .map_err(|e| data_error(format!("invalid date format: {e}")))?;

            bars.push(Bar {
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        BarSeries::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalsimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {e}")))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";
        fs::write(path.join("SPY.csv"), csv_content).unwrap();

        let unsorted = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n";
        fs::write(path.join("QQQ.csv"), unsorted).unwrap();

        (dir, path)
    }

    #[test]
    fn load_bars_returns_series() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.load_bars("SPY").unwrap();
        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(first.open, 100.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000);
    }

    #[test]
    fn load_bars_sorts_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.load_bars("QQQ").unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.bars()[0].date < series.bars()[1].date);
    }

    #[test]
    fn load_bars_missing_file_is_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.load_bars("MISSING");
        assert!(matches!(result, Err(SignalsimError::Data { .. })));
    }

    #[test]
    fn load_bars_bad_value_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,110.0,90.0,105.0,50000\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);
        let result = adapter.load_bars("BAD");
        assert!(matches!(result, Err(SignalsimError::Data { .. })));
    }

    #[test]
    fn load_bars_empty_file_is_bad_series() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        let adapter = CsvAdapter::new(path);
        let result = adapter.load_bars("EMPTY");
        assert!(matches!(result, Err(SignalsimError::BadSeries { .. })));
    }

    #[test]
    fn list_symbols_strips_extension() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["QQQ", "SPY"]);
    }
}
