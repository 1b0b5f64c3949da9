//! Performance metrics computed from an equity curve.

use super::error::SmacrossError;
use super::portfolio::LedgerState;

pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub initial_equity: f64,
    pub final_equity: f64,
    /// Number of per-bar returns (curve length minus one).
    pub periods: usize,
}

impl MetricsReport {
    pub fn compute(
        equity_curve: &[LedgerState],
        periods_per_year: u32,
    ) -> Result<Self, SmacrossError> {
        let values: Vec<f64> = equity_curve.iter().map(|s| s.equity).collect();
        Self::compute_from_values(&values, periods_per_year)
    }

    /// Same as [`MetricsReport::compute`] for a bare sequence of equity values.
    pub fn compute_from_values(
        equity: &[f64],
        periods_per_year: u32,
    ) -> Result<Self, SmacrossError> {
        if periods_per_year == 0 {
            return Err(SmacrossError::configuration(
                "periods_per_year",
                "periods_per_year must be at least 1",
            ));
        }
        if equity.len() < 2 {
            return Err(SmacrossError::InsufficientData {
                bars: equity.len(),
                minimum: 2,
            });
        }

        let initial_equity = equity[0];
        let final_equity = equity[equity.len() - 1];
        let periods = equity.len() - 1;
        let ppy = periods_per_year as f64;

        let cumulative_return = final_equity / initial_equity - 1.0;
        let annualized_return = (1.0 + cumulative_return).powf(ppy / periods as f64) - 1.0;

        let returns = period_returns(equity);
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let stdev = sample_stdev(&returns, mean);

        let (annualized_volatility, sharpe_ratio) = if stdev > 0.0 {
            (stdev * ppy.sqrt(), mean / stdev * ppy.sqrt())
        } else {
            (0.0, 0.0)
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity);

        Ok(MetricsReport {
            cumulative_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            initial_equity,
            final_equity,
            periods,
        })
    }
}

/// `r[i] = equity[i] / equity[i-1] - 1` for every consecutive pair.
pub fn period_returns(equity: &[f64]) -> Vec<f64> {
    equity.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation (n-1 denominator). Zero for fewer than two values.
fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Running-peak drawdown for each bar, as a fraction of the peak.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            if peak > 0.0 { 1.0 - value / peak } else { 0.0 }
        })
        .collect()
}

/// Returns `(max_drawdown, longest run of bars below the running peak)`.
fn compute_drawdown(equity: &[f64]) -> (f64, usize) {
    let Some(&first) = equity.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for &value in equity {
        if value >= peak {
            peak = value;
            current_duration = 0;
        } else {
            if peak > 0.0 {
                max_dd = max_dd.max(1.0 - value / peak);
            }
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}
