#![allow(dead_code)]

use capleader::domain::engine::EngineConfig;
use capleader::domain::error::CapleaderError;
use capleader::domain::observation::Observation;
use capleader::ports::observation_port::{ObservationPort, TickerSet};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Observation builder: `candidates` are (ticker, price, market_cap),
/// `benchmarks` are (ticker, price).
pub fn make_obs(
    d: NaiveDate,
    candidates: &[(&str, f64, f64)],
    benchmarks: &[(&str, f64)],
) -> Observation {
    let mut prices = BTreeMap::new();
    let mut market_caps = BTreeMap::new();
    for (ticker, price, cap) in candidates {
        prices.insert(ticker.to_string(), *price);
        market_caps.insert(ticker.to_string(), *cap);
    }
    for (ticker, price) in benchmarks {
        prices.insert(ticker.to_string(), *price);
    }
    Observation {
        date: d,
        prices,
        market_caps,
    }
}

pub fn no_bench_config() -> EngineConfig {
    EngineConfig {
        benchmarks: Vec::new(),
        ..EngineConfig::default()
    }
}

pub struct MockObservationPort {
    pub rows: Vec<Observation>,
}

impl MockObservationPort {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn with_rows(mut self, rows: Vec<Observation>) -> Self {
        self.rows = rows;
        self
    }
}

impl ObservationPort for MockObservationPort {
    fn fetch_observations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, CapleaderError> {
        Ok(self
            .rows
            .iter()
            .filter(|obs| obs.date >= start && obs.date <= end)
            .cloned()
            .collect())
    }

    fn tickers(&self) -> Result<TickerSet, CapleaderError> {
        let (priced, candidates) = match self.rows.first() {
            Some(first) => (
                first.prices.keys().cloned().collect(),
                first.market_caps.keys().cloned().collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        Ok(TickerSet { priced, candidates })
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CapleaderError> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, self.rows.len()))),
            _ => Ok(None),
        }
    }
}
