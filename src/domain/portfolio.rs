//! Cash/shares ledger and equity tracking.

use chrono::NaiveDate;

/// Ledger snapshot at one bar. `equity` is always `cash + shares * close`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LedgerState {
    pub date: NaiveDate,
    pub close: f64,
    pub cash: f64,
    pub shares: f64,
    pub equity: f64,
}

/// How many shares a full-allocation entry buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareSizing {
    /// `cash / price`; the entry leaves no cash behind.
    #[default]
    Fractional,
    /// `floor(cash / price)`; the remainder stays in cash.
    Whole,
}

impl ShareSizing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fractional" => Some(ShareSizing::Fractional),
            "whole" | "integer" => Some(ShareSizing::Whole),
            _ => None,
        }
    }

    /// Shares affordable with `cash` at `price`, never costing more than `cash`.
    pub fn shares_for(self, cash: f64, price: f64) -> f64 {
        match self {
            ShareSizing::Fractional => cash / price,
            ShareSizing::Whole => {
                let mut shares = (cash / price).floor();
                if shares > 0.0 && shares * price > cash {
                    shares -= 1.0;
                }
                shares
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub shares: f64,
    pub initial_capital: f64,
    pub equity_curve: Vec<LedgerState>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            shares: 0.0,
            initial_capital,
            equity_curve: Vec::new(),
        }
    }

    pub fn is_invested(&self) -> bool {
        self.shares > 0.0
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }

    /// Convert cash into shares at `price`. Returns the shares bought.
    pub fn buy_all(&mut self, price: f64, sizing: ShareSizing) -> f64 {
        let shares = sizing.shares_for(self.cash, price);
        if shares <= 0.0 {
            return 0.0;
        }
        match sizing {
            ShareSizing::Fractional => self.cash = 0.0,
            ShareSizing::Whole => self.cash = (self.cash - shares * price).max(0.0),
        }
        self.shares += shares;
        shares
    }

    /// Liquidate every share at `price`. Returns the shares sold.
    pub fn sell_all(&mut self, price: f64) -> f64 {
        let shares = self.shares;
        self.cash += shares * price;
        self.shares = 0.0;
        shares
    }

    pub fn record_equity(&mut self, date: NaiveDate, close: f64) {
        self.equity_curve.push(LedgerState {
            date,
            close,
            cash: self.cash,
            shares: self.shares,
            equity: self.equity(close),
        });
    }
}
