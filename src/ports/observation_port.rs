//! Observation data access port trait.

use crate::domain::error::CapleaderError;
use crate::domain::observation::Observation;
use chrono::NaiveDate;

/// The ticker universe a data source carries: price columns (benchmarks
/// included) and the subset with market-cap data (rotation candidates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerSet {
    pub priced: Vec<String>,
    pub candidates: Vec<String>,
}

pub trait ObservationPort {
    /// Date-ordered observations within `[start, end]` inclusive.
    fn fetch_observations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, CapleaderError>;

    fn tickers(&self) -> Result<TickerSet, CapleaderError>;

    /// `(first_date, last_date, row_count)` of the full dataset, or
    /// `None` when it is empty.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CapleaderError>;
}
