//! CSV file data adapter.
//!
//! Expects a wide CSV with a `Date` column (`%d/%m/%Y`), one price
//! column per ticker, and a `<TICKER>_MC` market-cap column per
//! rotation candidate. Market-cap cells that are empty or non-numeric
//! coerce to the sentinel so the row is never dropped from the walk.

use crate::domain::error::CapleaderError;
use crate::domain::observation::{Observation, SENTINEL_MARKET_CAP};
use crate::ports::config_port::ConfigPort;
use crate::ports::observation_port::{ObservationPort, TickerSet};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

const DATE_COLUMN: &str = "Date";
const DATE_FORMAT: &str = "%d/%m/%Y";
const MARKET_CAP_SUFFIX: &str = "_MC";

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CapleaderError> {
        let path =
            config
                .get_string("data", "csv_path")
                .ok_or_else(|| CapleaderError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_path".into(),
                })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn load_all(&self) -> Result<Vec<Observation>, CapleaderError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| CapleaderError::Data {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| CapleaderError::Data {
                reason: format!("CSV header error: {e}"),
            })?
            .clone();

        let mut date_col = None;
        let mut price_cols: Vec<(usize, String)> = Vec::new();
        let mut cap_cols: Vec<(usize, String)> = Vec::new();
        for (index, name) in headers.iter().enumerate() {
            if name == DATE_COLUMN {
                date_col = Some(index);
            } else if let Some(ticker) = name.strip_suffix(MARKET_CAP_SUFFIX) {
                cap_cols.push((index, ticker.to_string()));
            } else {
                price_cols.push((index, name.to_string()));
            }
        }
        let date_col = date_col.ok_or_else(|| CapleaderError::Data {
            reason: format!("missing {DATE_COLUMN} column"),
        })?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CapleaderError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let date_str = record.get(date_col).unwrap_or("");
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                CapleaderError::Data {
                    reason: format!("invalid date {date_str:?}: {e}"),
                }
            })?;

            let mut prices = BTreeMap::new();
            for (index, ticker) in &price_cols {
                let cell = record.get(*index).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                let value: f64 = cell.parse().map_err(|e| CapleaderError::Data {
                    reason: format!("invalid price for {ticker} on {date}: {e}"),
                })?;
                prices.insert(ticker.clone(), value);
            }

            let mut market_caps = BTreeMap::new();
            for (index, ticker) in &cap_cols {
                let cell = record.get(*index).unwrap_or("").trim();
                // A literal "NaN" parses as a float but would poison
                // the argmax, so it coerces like any other bad cell.
                let cap = cell
                    .parse::<f64>()
                    .ok()
                    .filter(|c| !c.is_nan())
                    .unwrap_or(SENTINEL_MARKET_CAP);
                market_caps.insert(ticker.clone(), cap);
            }

            rows.push(Observation {
                date,
                prices,
                market_caps,
            });
        }

        rows.sort_by_key(|obs| obs.date);
        Ok(rows)
    }
}

impl ObservationPort for CsvAdapter {
    fn fetch_observations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, CapleaderError> {
        let rows = self.load_all()?;
        Ok(rows
            .into_iter()
            .filter(|obs| obs.date >= start && obs.date <= end)
            .collect())
    }

    fn tickers(&self) -> Result<TickerSet, CapleaderError> {
        let rows = self.load_all()?;
        let mut priced: Vec<String> = Vec::new();
        let mut candidates: Vec<String> = Vec::new();
        if let Some(first) = rows.first() {
            priced = first.prices.keys().cloned().collect();
            candidates = first.market_caps.keys().cloned().collect();
        }
        Ok(TickerSet { priced, candidates })
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CapleaderError> {
        let rows = self.load_all()?;
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, rows.len()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn sample_csv() -> &'static str {
        "Date,SPY,QQQ,AAPL,AAPL_MC,MSFT,MSFT_MC\n\
         03/01/2024,470.0,400.0,185.0,2900.0,370.0,2750.0\n\
         04/01/2024,471.0,401.0,186.0,,371.0,2760.0\n\
         05/01/2024,472.0,402.0,187.0,abc,372.0,2770.0\n"
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_parses_dates_and_columns() {
        let (_dir, path) = write_csv(sample_csv());
        let adapter = CsvAdapter::new(path);

        let rows = adapter
            .fetch_observations(date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, date(2024, 1, 3));
        assert_eq!(rows[0].price("SPY"), Some(470.0));
        assert_eq!(rows[0].price("AAPL"), Some(185.0));
        assert_eq!(rows[0].market_caps["AAPL"], 2900.0);
        assert_eq!(rows[0].market_caps["MSFT"], 2750.0);
    }

    #[test]
    fn missing_and_non_numeric_market_caps_coerce_to_sentinel() {
        let (_dir, path) = write_csv(sample_csv());
        let adapter = CsvAdapter::new(path);

        let rows = adapter
            .fetch_observations(date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();

        // Empty cell on 04/01, garbage on 05/01: both rows survive with
        // the sentinel, never selected over MSFT's real value.
        assert_eq!(rows[1].market_caps["AAPL"], SENTINEL_MARKET_CAP);
        assert_eq!(rows[2].market_caps["AAPL"], SENTINEL_MARKET_CAP);
        assert_eq!(rows[1].leader(), Some("MSFT"));
    }

    #[test]
    fn fetch_filters_inclusive_range() {
        let (_dir, path) = write_csv(sample_csv());
        let adapter = CsvAdapter::new(path);

        let rows = adapter
            .fetch_observations(date(2024, 1, 4), date(2024, 1, 4))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date(2024, 1, 4));
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let (_dir, path) = write_csv(
            "Date,AAPL,AAPL_MC\n\
             05/01/2024,187.0,2900.0\n\
             03/01/2024,185.0,2900.0\n",
        );
        let adapter = CsvAdapter::new(path);

        let rows = adapter
            .fetch_observations(date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(rows[0].date, date(2024, 1, 3));
        assert_eq!(rows[1].date, date(2024, 1, 5));
    }

    #[test]
    fn tickers_splits_prices_and_candidates() {
        let (_dir, path) = write_csv(sample_csv());
        let adapter = CsvAdapter::new(path);

        let set = adapter.tickers().unwrap();
        assert_eq!(set.priced, vec!["AAPL", "MSFT", "QQQ", "SPY"]);
        assert_eq!(set.candidates, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn data_range_reports_span_and_count() {
        let (_dir, path) = write_csv(sample_csv());
        let adapter = CsvAdapter::new(path);

        let range = adapter.data_range().unwrap();
        assert_eq!(range, Some((date(2024, 1, 3), date(2024, 1, 5), 3)));
    }

    #[test]
    fn missing_file_is_data_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/data.csv"));
        let result = adapter.fetch_observations(date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(CapleaderError::Data { .. })));
    }

    #[test]
    fn bad_date_is_data_error() {
        let (_dir, path) = write_csv("Date,AAPL,AAPL_MC\n2024-01-03,185.0,2900.0\n");
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_observations(date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(CapleaderError::Data { .. })));
    }

    #[test]
    fn bad_price_is_data_error() {
        let (_dir, path) = write_csv("Date,AAPL,AAPL_MC\n03/01/2024,oops,2900.0\n");
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_observations(date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(CapleaderError::Data { .. })));
    }

    #[test]
    fn missing_date_column_is_data_error() {
        let (_dir, path) = write_csv("Day,AAPL,AAPL_MC\n03/01/2024,185.0,2900.0\n");
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_observations(date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(CapleaderError::Data { .. })));
    }
}
