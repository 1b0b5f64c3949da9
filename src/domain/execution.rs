//! Signal replay through the cash/shares ledger.
//!
//! Full allocation on Flat→Long, full liquidation on Long→Flat. A transition
//! detected at bar `i` fills at bar `i`'s close; there is no look-ahead into
//! bar `i+1`. The ledger is Flat before bar 0.

use tracing::debug;

use super::error::SmacrossError;
use super::portfolio::{LedgerState, Portfolio, ShareSizing};
use super::price::PriceSeries;
use super::signal::{constant_signals, PositionSignal, SignalPoint};
use super::trade::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub equity_curve: Vec<LedgerState>,
    pub trades: Vec<Trade>,
}

impl SimulationResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|s| s.equity)
    }
}

pub fn validate_capital(initial_capital: f64) -> Result<(), SmacrossError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(SmacrossError::configuration(
            "initial_capital",
            format!("initial_capital must be positive, got {}", initial_capital),
        ));
    }
    Ok(())
}

fn check_alignment(series: &PriceSeries, signals: &[SignalPoint]) -> Result<(), SmacrossError> {
    if signals.len() != series.len() {
        return Err(SmacrossError::data_integrity(
            signals.len().min(series.len()),
            format!(
                "signal count {} does not match bar count {}",
                signals.len(),
                series.len()
            ),
        ));
    }
    for (i, (bar, point)) in series.bars().iter().zip(signals).enumerate() {
        if bar.date != point.date {
            return Err(SmacrossError::data_integrity(
                i,
                format!("signal date {} does not match bar date {}", point.date, bar.date),
            ));
        }
    }
    Ok(())
}

/// Replay `signals` against `series` with fractional shares.
pub fn simulate(
    series: &PriceSeries,
    signals: &[SignalPoint],
    initial_capital: f64,
) -> Result<SimulationResult, SmacrossError> {
    simulate_with_sizing(series, signals, initial_capital, ShareSizing::Fractional)
}

pub fn simulate_with_sizing(
    series: &PriceSeries,
    signals: &[SignalPoint],
    initial_capital: f64,
    sizing: ShareSizing,
) -> Result<SimulationResult, SmacrossError> {
    validate_capital(initial_capital)?;
    check_alignment(series, signals)?;

    let mut portfolio = Portfolio::new(initial_capital);
    portfolio.equity_curve.reserve(series.len());
    let mut trades = Vec::new();
    let mut prev = PositionSignal::Flat;

    for (bar, point) in series.bars().iter().zip(signals) {
        match (prev, point.position) {
            (PositionSignal::Flat, PositionSignal::Long) => {
                let shares = portfolio.buy_all(bar.close, sizing);
                if shares > 0.0 {
                    debug!(date = %bar.date, price = bar.close, shares, "buy");
                    trades.push(Trade {
                        date: bar.date,
                        side: Side::Buy,
                        price: bar.close,
                        shares,
                    });
                } else {
                    debug!(
                        date = %bar.date,
                        price = bar.close,
                        "entry skipped: cash buys no shares"
                    );
                }
            }
            (PositionSignal::Long, PositionSignal::Flat) if portfolio.is_invested() => {
                let shares = portfolio.sell_all(bar.close);
                debug!(date = %bar.date, price = bar.close, shares, "sell");
                trades.push(Trade {
                    date: bar.date,
                    side: Side::Sell,
                    price: bar.close,
                    shares,
                });
            }
            _ => {}
        }
        prev = point.position;
        portfolio.record_equity(bar.date, bar.close);
    }

    Ok(SimulationResult {
        equity_curve: portfolio.equity_curve,
        trades,
    })
}

/// Buy with all capital at bar 0 and never trade again.
pub fn buy_and_hold(
    series: &PriceSeries,
    initial_capital: f64,
    sizing: ShareSizing,
) -> Result<SimulationResult, SmacrossError> {
    let signals = constant_signals(series, PositionSignal::Long);
    simulate_with_sizing(series, &signals, initial_capital, sizing)
}
