//! Time-series preparation: date filtering and rebalance-grid resampling.
//!
//! Resampling is "last observation at-or-before boundary". Weekly
//! boundaries are Mondays, monthly boundaries are calendar month-ends,
//! and the boundary set runs from the first observation through the
//! last: a window with no observations contributes no row, and
//! observations whose boundary falls past the final date are dropped
//! rather than labelled with a fabricated future period.

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::error::CapleaderError;
use super::observation::Observation;

/// The calendar checkpoints at which the strategy may re-evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceGrid {
    Daily,
    Weekly,
    Monthly,
}

impl RebalanceGrid {
    /// Case-insensitive parse of `daily`/`weekly`/`monthly`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "daily" => Some(RebalanceGrid::Daily),
            "weekly" => Some(RebalanceGrid::Weekly),
            "monthly" => Some(RebalanceGrid::Monthly),
            _ => None,
        }
    }
}

impl std::fmt::Display for RebalanceGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RebalanceGrid::Daily => "Daily",
            RebalanceGrid::Weekly => "Weekly",
            RebalanceGrid::Monthly => "Monthly",
        };
        write!(f, "{name}")
    }
}

/// Inclusive `[start, end]` calendar filter.
pub fn filter_range(
    rows: &[Observation],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Observation> {
    rows.iter()
        .filter(|obs| obs.date >= start && obs.date <= end)
        .cloned()
        .collect()
}

/// Next Monday at-or-after `date`.
fn week_boundary(date: NaiveDate) -> NaiveDate {
    let offset = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(i64::from(offset))
}

/// Last day of `date`'s month.
fn month_boundary(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next_month) => next_month.pred_opt().unwrap_or(date),
        None => date,
    }
}

/// Collapse `rows` onto the grid, keeping the last observation per
/// boundary window. Daily is the identity. Input must be date-ordered.
pub fn resample(rows: Vec<Observation>, grid: RebalanceGrid) -> Vec<Observation> {
    let boundary_of: fn(NaiveDate) -> NaiveDate = match grid {
        RebalanceGrid::Daily => return rows,
        RebalanceGrid::Weekly => week_boundary,
        RebalanceGrid::Monthly => month_boundary,
    };

    let Some(last_date) = rows.last().map(|obs| obs.date) else {
        return Vec::new();
    };

    let mut sampled: Vec<Observation> = Vec::new();
    let mut current_boundary: Option<NaiveDate> = None;

    for obs in rows {
        let boundary = boundary_of(obs.date);
        if boundary > last_date {
            break;
        }
        if current_boundary == Some(boundary) {
            if let Some(slot) = sampled.last_mut() {
                *slot = obs;
            }
        } else {
            sampled.push(obs);
            current_boundary = Some(boundary);
        }
    }

    sampled
}

/// Filter then resample. An empty outcome at either stage is
/// [`CapleaderError::EmptyRange`], so the engine never walks an empty
/// table.
pub fn prepare(
    rows: &[Observation],
    start: NaiveDate,
    end: NaiveDate,
    grid: RebalanceGrid,
) -> Result<Vec<Observation>, CapleaderError> {
    let filtered = filter_range(rows, start, end);
    if filtered.is_empty() {
        return Err(CapleaderError::EmptyRange);
    }

    let sampled = resample(filtered, grid);
    if sampled.is_empty() {
        return Err(CapleaderError::EmptyRange);
    }

    Ok(sampled)
}
