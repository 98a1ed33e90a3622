//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::engine::{self, EngineConfig, PeriodResult, DEFAULT_INITIAL_INVESTMENT};
use crate::domain::error::CapleaderError;
use crate::domain::series::{self, RebalanceGrid};
use crate::ports::config_port::ConfigPort;
use crate::ports::observation_port::ObservationPort;

#[derive(Parser, Debug)]
#[command(name = "capleader", about = "Market-cap rotation strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single-grid backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [backtest] start_date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Override [backtest] end_date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Override [backtest] rebalance (daily|weekly|monthly)
        #[arg(long)]
        grid: Option<String>,
        /// Write the per-period result table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare daily, weekly, and monthly rebalancing on one date axis
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Show the ticker universe and data range
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            start,
            end,
            grid,
            output,
        } => run_backtest(
            &config,
            start.as_deref(),
            end.as_deref(),
            grid.as_deref(),
            output.as_ref(),
        ),
        Command::Compare { config, start, end } => {
            run_compare(&config, start.as_deref(), end.as_deref())
        }
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CapleaderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolved run parameters: config file values with CLI overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub grid: RebalanceGrid,
    pub engine: EngineConfig,
}

fn parse_date(value: &str, key: &str) -> Result<NaiveDate, CapleaderError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CapleaderError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

pub fn build_run_config(
    adapter: &dyn ConfigPort,
    start_override: Option<&str>,
    end_override: Option<&str>,
    grid_override: Option<&str>,
) -> Result<RunConfig, CapleaderError> {
    let start_str = match start_override {
        Some(s) => s.to_string(),
        None => adapter.get_string("backtest", "start_date").ok_or_else(|| {
            CapleaderError::ConfigMissing {
                section: "backtest".into(),
                key: "start_date".into(),
            }
        })?,
    };
    let end_str = match end_override {
        Some(s) => s.to_string(),
        None => adapter.get_string("backtest", "end_date").ok_or_else(|| {
            CapleaderError::ConfigMissing {
                section: "backtest".into(),
                key: "end_date".into(),
            }
        })?,
    };

    let start = parse_date(&start_str, "start_date")?;
    let end = parse_date(&end_str, "end_date")?;
    if start > end {
        return Err(CapleaderError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: format!("end date {end} precedes start date {start}"),
        });
    }

    let grid_str = match grid_override {
        Some(s) => s.to_string(),
        None => adapter
            .get_string("backtest", "rebalance")
            .unwrap_or_else(|| "daily".to_string()),
    };
    let grid = RebalanceGrid::parse(&grid_str).ok_or_else(|| CapleaderError::ConfigInvalid {
        section: "backtest".into(),
        key: "rebalance".into(),
        reason: format!("unknown grid {grid_str:?} (expected daily, weekly, or monthly)"),
    })?;

    let initial_investment = adapter.get_double(
        "backtest",
        "initial_investment",
        DEFAULT_INITIAL_INVESTMENT,
    );
    if initial_investment <= 0.0 {
        return Err(CapleaderError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_investment".into(),
            reason: "must be positive".into(),
        });
    }

    let benchmarks: Vec<String> = adapter
        .get_string("backtest", "benchmarks")
        .unwrap_or_else(|| "SPY,QQQ".to_string())
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(RunConfig {
        start,
        end,
        grid,
        engine: EngineConfig {
            initial_investment,
            benchmarks,
            strict: adapter.get_bool("backtest", "strict", false),
        },
    })
}

fn run_backtest(
    config_path: &PathBuf,
    start_override: Option<&str>,
    end_override: Option<&str>,
    grid_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter, start_override, end_override, grid_override)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = match CsvAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running backtest: {} to {}, {} rebalancing",
        run_config.start, run_config.end, run_config.grid,
    );

    let result = match execute(&data_port, &run_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for line in &result.trade_log {
        println!("{line}");
    }

    print_summary(&run_config, &result);

    if let Some(path) = output_path {
        match write_period_csv(path, &result.periods) {
            Ok(()) => eprintln!("Period results written to: {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn execute(
    data_port: &dyn ObservationPort,
    run_config: &RunConfig,
) -> Result<engine::BacktestResult, CapleaderError> {
    let rows = data_port.fetch_observations(run_config.start, run_config.end)?;
    let prepared = series::prepare(&rows, run_config.start, run_config.end, run_config.grid)?;
    eprintln!("  Processing: {} periods", prepared.len());
    engine::run(&prepared, &run_config.engine)
}

fn print_summary(run_config: &RunConfig, result: &engine::BacktestResult) {
    let Some(last) = result.periods.last() else {
        return;
    };

    eprintln!("\n=== Results ===");
    eprintln!("Periods:          {}", result.periods.len());
    eprintln!("Closed trades:    {}", result.closed_trades.len());
    eprintln!("Final position:   {}", last.ticker);
    eprintln!("Strategy NAV:     {:.2}", last.strategy_nav);
    eprintln!(
        "Total return:     {:.2}%",
        (last.strategy_nav / run_config.engine.initial_investment - 1.0) * 100.0
    );
    for (ticker, nav) in &last.benchmark_nav {
        eprintln!("{ticker} NAV:          {nav:.2}");
    }
}

fn write_period_csv(path: &PathBuf, periods: &[PeriodResult]) -> Result<(), CapleaderError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| CapleaderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    })?;

    let benchmarks: Vec<String> = periods
        .first()
        .map(|p| p.benchmark_nav.keys().cloned().collect())
        .unwrap_or_default();

    let mut header = vec![
        "Date".to_string(),
        "Position".to_string(),
        "Cost".to_string(),
        "PnL".to_string(),
        "Strategy_NAV".to_string(),
    ];
    header.extend(benchmarks.iter().map(|b| format!("{b}_NAV")));
    writer.write_record(&header).map_err(|e| CapleaderError::Data {
        reason: format!("CSV write error: {e}"),
    })?;

    for period in periods {
        let mut record = vec![
            period.date.format("%Y/%m/%d").to_string(),
            period.ticker.clone(),
            period.entry_price.to_string(),
            period.unrealized_pnl.to_string(),
            period.strategy_nav.to_string(),
        ];
        for ticker in &benchmarks {
            record.push(
                period
                    .benchmark_nav
                    .get(ticker)
                    .map(|nav| nav.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record).map_err(|e| CapleaderError::Data {
            reason: format!("CSV write error: {e}"),
        })?;
    }

    writer.flush()?;
    Ok(())
}

fn run_compare(
    config_path: &PathBuf,
    start_override: Option<&str>,
    end_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let run_config = match build_run_config(&adapter, start_override, end_override, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = match CsvAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Comparing rebalance grids: {} to {}",
        run_config.start, run_config.end,
    );

    let table = match data_port
        .fetch_observations(run_config.start, run_config.end)
        .and_then(|rows| {
            engine::run_comparison(&rows, run_config.start, run_config.end, &run_config.engine)
        }) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("Date,Daily_NAV,Weekly_NAV,Monthly_NAV");
    for (i, date) in table.dates.iter().enumerate() {
        println!(
            "{},{},{},{}",
            date.format("%Y/%m/%d"),
            fill_cell(table.daily[i]),
            fill_cell(table.weekly[i]),
            fill_cell(table.monthly[i]),
        );
    }

    ExitCode::SUCCESS
}

fn fill_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match CsvAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let tickers = match data_port.tickers() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match data_port.data_range() {
        Ok(Some((first, last, count))) => {
            println!("{} observations, {} to {}", count, first, last);
            println!("candidates: {}", tickers.candidates.join(", "));
            let benchmarks: Vec<&str> = tickers
                .priced
                .iter()
                .filter(|t| !tickers.candidates.contains(t))
                .map(String::as_str)
                .collect();
            println!("price-only tickers: {}", benchmarks.join(", "));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("no data found");
            ExitCode::from(3)
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
