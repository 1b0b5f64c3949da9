//! Backtest pipeline: signals → simulation → metrics, plus the buy-and-hold
//! benchmark over the same series.

use tracing::info;

use super::error::SmacrossError;
use super::execution::{buy_and_hold, simulate_with_sizing, validate_capital};
use super::metrics::{DEFAULT_PERIODS_PER_YEAR, MetricsReport};
use super::portfolio::{LedgerState, ShareSizing};
use super::price::PriceSeries;
use super::signal::{SignalPoint, check_window_order, generate_signals};
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
    pub periods_per_year: u32,
    pub sizing: ShareSizing,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            short_window: 50,
            long_window: 200,
            initial_capital: 100_000.0,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            sizing: ShareSizing::Fractional,
        }
    }
}

impl BacktestConfig {
    /// Checks every parameter that does not depend on the series.
    pub fn validate(&self) -> Result<(), SmacrossError> {
        check_window_order(self.short_window, self.long_window)?;
        validate_capital(self.initial_capital)?;
        if self.periods_per_year == 0 {
            return Err(SmacrossError::configuration(
                "periods_per_year",
                "periods_per_year must be at least 1",
            ));
        }
        Ok(())
    }

    /// Fewest bars a run with this config accepts.
    pub fn minimum_bars(&self) -> usize {
        self.long_window.max(2)
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub signals: Vec<SignalPoint>,
    pub equity_curve: Vec<LedgerState>,
    pub trades: Vec<Trade>,
    pub benchmark_curve: Vec<LedgerState>,
    pub metrics: MetricsReport,
    pub benchmark_metrics: MetricsReport,
}

pub fn run_backtest(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, SmacrossError> {
    config.validate()?;

    let minimum = config.minimum_bars();
    if series.len() < minimum {
        return Err(SmacrossError::InsufficientData {
            bars: series.len(),
            minimum,
        });
    }

    info!(
        bars = series.len(),
        short = config.short_window,
        long = config.long_window,
        "generating signals"
    );
    let signals = generate_signals(series, config.short_window, config.long_window)?;

    let strategy =
        simulate_with_sizing(series, &signals, config.initial_capital, config.sizing)?;
    let benchmark = buy_and_hold(series, config.initial_capital, config.sizing)?;
    info!(trades = strategy.trades.len(), "simulation complete");

    let metrics = MetricsReport::compute(&strategy.equity_curve, config.periods_per_year)?;
    let benchmark_metrics =
        MetricsReport::compute(&benchmark.equity_curve, config.periods_per_year)?;
    info!(
        cumulative_return = metrics.cumulative_return,
        sharpe = metrics.sharpe_ratio,
        "metrics computed"
    );

    Ok(BacktestResult {
        signals,
        equity_curve: strategy.equity_curve,
        trades: strategy.trades,
        benchmark_curve: benchmark.equity_curve,
        metrics,
        benchmark_metrics,
    })
}
