//! Alignment of NAV series onto a shared date axis.
//!
//! The three rebalance grids produce NAV curves over different date
//! sets. For overlay comparison they are reindexed onto the ordered
//! union of all dates, forward-filling the last known value. Positions
//! before a series' first observation stay `None`; no value is ever
//! fabricated there.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// A NAV curve: date-ordered `(date, nav)` points.
pub type NavSeries = Vec<(NaiveDate, f64)>;

/// Ordered union of the dates of all series.
pub fn union_axis(series_list: &[&NavSeries]) -> Vec<NaiveDate> {
    let unique: BTreeSet<NaiveDate> = series_list
        .iter()
        .flat_map(|series| series.iter().map(|&(date, _)| date))
        .collect();
    unique.into_iter().collect()
}

/// Reindex `series` onto `axis`, carrying the last known value forward.
/// Axis positions before the first point of the series are `None`.
pub fn forward_fill(series: &NavSeries, axis: &[NaiveDate]) -> Vec<Option<f64>> {
    let mut filled = Vec::with_capacity(axis.len());
    let mut next = 0;
    let mut last: Option<f64> = None;

    for &date in axis {
        while next < series.len() && series[next].0 <= date {
            last = Some(series[next].1);
            next += 1;
        }
        filled.push(last);
    }

    filled
}

/// Joint three-grid NAV table on the union date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridComparison {
    pub dates: Vec<NaiveDate>,
    pub daily: Vec<Option<f64>>,
    pub weekly: Vec<Option<f64>>,
    pub monthly: Vec<Option<f64>>,
}

pub fn align(daily: &NavSeries, weekly: &NavSeries, monthly: &NavSeries) -> GridComparison {
    let dates = union_axis(&[daily, weekly, monthly]);
    GridComparison {
        daily: forward_fill(daily, &dates),
        weekly: forward_fill(weekly, &dates),
        monthly: forward_fill(monthly, &dates),
        dates,
    }
}
