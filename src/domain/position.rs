//! Position state and closed-trade records.

use chrono::NaiveDate;

/// The engine's single mutable accumulator. Starts all-cash; after the
/// first buy it is always fully invested in exactly one ticker with
/// `cash == 0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub held: Option<String>,
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub cash: f64,
}

impl Position {
    pub fn new(initial_investment: f64) -> Self {
        Position {
            held: None,
            shares: 0.0,
            entry_price: 0.0,
            entry_date: NaiveDate::MIN,
            cash: initial_investment,
        }
    }

    pub fn is_invested(&self) -> bool {
        self.held.is_some()
    }

    /// Spend all cash on `ticker` at `price`. Returns the notional spent.
    pub fn buy(&mut self, ticker: &str, price: f64, date: NaiveDate) -> f64 {
        let notional = self.cash;
        self.shares = self.cash / price;
        self.held = Some(ticker.to_string());
        self.entry_price = price;
        self.entry_date = date;
        self.cash = 0.0;
        notional
    }

    /// Liquidate the holding at `price`. Proceeds land in cash and are
    /// also returned; the held ticker is cleared.
    pub fn sell(&mut self, price: f64) -> f64 {
        let proceeds = self.shares * price;
        self.cash = proceeds;
        self.shares = 0.0;
        self.held = None;
        proceeds
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares * (price - self.entry_price)
    }

    /// Marked-to-market worth: cash plus holding value.
    pub fn nav(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }
}

/// Emitted when the held ticker changes. `pnl` is the monetary amount
/// truncated toward zero for the ledger; the NAV series keeps full
/// precision.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: i64,
}
