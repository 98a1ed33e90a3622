//! Rotation backtest engine.
//!
//! A single pass over the prepared observation sequence. The strategy
//! always holds the candidate with the largest market cap: the first
//! observation buys the leader with all cash, and every later
//! observation either holds or sells-then-buys within the same row, so
//! no period is ever spent in cash. The walk ends in the final holding
//! with no implicit close-out.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::align::{self, GridComparison, NavSeries};
use super::error::CapleaderError;
use super::observation::Observation;
use super::position::{ClosedTrade, Position};
use super::series::{self, RebalanceGrid};

pub const DEFAULT_INITIAL_INVESTMENT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_investment: f64,
    /// Passive buy-and-hold comparators, sized once from the first
    /// prepared observation and never traded again.
    pub benchmarks: Vec<String>,
    /// When set, an all-sentinel market-cap row fails the run instead
    /// of falling back to the lexicographic default.
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            benchmarks: vec!["SPY".to_string(), "QQQ".to_string()],
            strict: false,
        }
    }
}

/// One row per walked observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodResult {
    pub date: NaiveDate,
    pub ticker: String,
    pub entry_price: f64,
    pub unrealized_pnl: f64,
    pub strategy_nav: f64,
    pub benchmark_nav: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub periods: Vec<PeriodResult>,
    pub trade_log: Vec<String>,
    pub closed_trades: Vec<ClosedTrade>,
}

fn ledger_line(date: NaiveDate, verb: &str, ticker: &str, price: f64, notional: f64) -> String {
    format!(
        "Date = {} {} {} @ {} for notional = ${}",
        date.format("%Y/%m/%d"),
        verb,
        ticker,
        price,
        notional as i64,
    )
}

fn select_leader(obs: &Observation, strict: bool) -> Result<String, CapleaderError> {
    if strict && obs.all_sentinel() {
        return Err(CapleaderError::AllCandidatesSentinel { date: obs.date });
    }
    obs.leader()
        .map(str::to_string)
        .ok_or_else(|| CapleaderError::Data {
            reason: format!("no rotation candidates on {}", obs.date),
        })
}

fn price_of(obs: &Observation, ticker: &str) -> Result<f64, CapleaderError> {
    obs.price(ticker)
        .ok_or_else(|| CapleaderError::MissingPrice {
            ticker: ticker.to_string(),
            date: obs.date,
        })
}

/// Run the rotation strategy over a prepared observation sequence.
///
/// Deterministic in its inputs; any error aborts the run before a
/// result is returned, so callers never see partial output.
pub fn run(rows: &[Observation], config: &EngineConfig) -> Result<BacktestResult, CapleaderError> {
    let first = rows.first().ok_or(CapleaderError::EmptyRange)?;

    // Benchmark shares are sized from the first prepared row only.
    let mut benchmark_shares: BTreeMap<String, f64> = BTreeMap::new();
    for ticker in &config.benchmarks {
        let price = first
            .price(ticker)
            .ok_or_else(|| CapleaderError::MissingBenchmark {
                ticker: ticker.clone(),
                date: first.date,
            })?;
        benchmark_shares.insert(ticker.clone(), config.initial_investment / price);
    }

    let mut position = Position::new(config.initial_investment);
    let mut periods = Vec::with_capacity(rows.len());
    let mut trade_log = Vec::new();
    let mut closed_trades = Vec::new();

    for obs in rows {
        let leader = select_leader(obs, config.strict)?;
        let leader_price = price_of(obs, &leader)?;

        match position.held.clone() {
            None => {
                let notional = position.buy(&leader, leader_price, obs.date);
                trade_log.push(ledger_line(obs.date, "Buy", &leader, leader_price, notional));
            }
            Some(held) if held != leader => {
                let exit_price = price_of(obs, &held)?;
                let entry_price = position.entry_price;
                let entry_date = position.entry_date;
                let shares = position.shares;

                let proceeds = position.sell(exit_price);
                trade_log.push(ledger_line(obs.date, "Sold", &held, exit_price, proceeds));
                closed_trades.push(ClosedTrade {
                    ticker: held,
                    entry_date,
                    exit_date: obs.date,
                    entry_price,
                    exit_price,
                    pnl: (shares * (exit_price - entry_price)) as i64,
                });

                let notional = position.buy(&leader, leader_price, obs.date);
                trade_log.push(ledger_line(obs.date, "Buy", &leader, leader_price, notional));
            }
            Some(_) => {}
        }

        // The match above always leaves the position in the leader.
        let mut benchmark_nav = BTreeMap::new();
        for (ticker, shares) in &benchmark_shares {
            let price = obs
                .price(ticker)
                .ok_or_else(|| CapleaderError::MissingBenchmark {
                    ticker: ticker.clone(),
                    date: obs.date,
                })?;
            benchmark_nav.insert(ticker.clone(), shares * price);
        }

        periods.push(PeriodResult {
            date: obs.date,
            ticker: leader,
            entry_price: position.entry_price,
            unrealized_pnl: position.unrealized_pnl(leader_price),
            strategy_nav: position.nav(leader_price),
            benchmark_nav,
        });
    }

    Ok(BacktestResult {
        periods,
        trade_log,
        closed_trades,
    })
}

/// Prepare and run once per rebalance grid, then align the three NAV
/// curves onto a shared date axis. The runs are independent of each
/// other and execute sequentially.
pub fn run_comparison(
    rows: &[Observation],
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
) -> Result<GridComparison, CapleaderError> {
    let mut curves: Vec<NavSeries> = Vec::with_capacity(3);

    for grid in [
        RebalanceGrid::Daily,
        RebalanceGrid::Weekly,
        RebalanceGrid::Monthly,
    ] {
        let prepared = series::prepare(rows, start, end, grid)?;
        let result = run(&prepared, config)?;
        curves.push(
            result
                .periods
                .iter()
                .map(|p| (p.date, p.strategy_nav))
                .collect(),
        );
    }

    Ok(align::align(&curves[0], &curves[1], &curves[2]))
}
