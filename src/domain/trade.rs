//! Executed trades.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: Side,
    pub price: f64,
    pub shares: f64,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.price * self.shares
    }
}

/// A matched buy/sell pair; an entry still open at the end of the series has
/// no exit.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub entry: Trade,
    pub exit: Option<Trade>,
}

impl RoundTrip {
    /// Realised (or, for an open round trip, marked-to-`last_close`) profit.
    pub fn pnl(&self, last_close: f64) -> f64 {
        let exit_price = self.exit.as_ref().map_or(last_close, |t| t.price);
        self.entry.shares * (exit_price - self.entry.price)
    }

    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }
}

/// Pair each buy with the sell that follows it.
pub fn round_trips(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut trips = Vec::new();
    let mut open: Option<Trade> = None;

    for trade in trades {
        match trade.side {
            Side::Buy => open = Some(trade.clone()),
            Side::Sell => {
                if let Some(entry) = open.take() {
                    trips.push(RoundTrip {
                        entry,
                        exit: Some(trade.clone()),
                    });
                }
            }
        }
    }

    if let Some(entry) = open {
        trips.push(RoundTrip { entry, exit: None });
    }

    trips
}
