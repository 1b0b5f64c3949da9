//! Parameter sweep over (short_window, long_window) pairs.
//!
//! Every pair is an independent backtest over the same immutable series, so
//! the grid is fanned out with rayon and collected back in grid order.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::info;

use super::backtest::{BacktestConfig, run_backtest};
use super::error::SmacrossError;
use super::metrics::MetricsReport;
use super::price::PriceSeries;

/// Inclusive `start:end:step` range of window lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl WindowRange {
    pub fn single(window: usize) -> Self {
        WindowRange {
            start: window,
            end: window,
            step: 1,
        }
    }

    pub fn values(&self) -> Vec<usize> {
        (self.start..=self.end).step_by(self.step).collect()
    }
}

impl FromStr for WindowRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let parse = |p: &str| {
            p.parse::<usize>()
                .map_err(|_| format!("invalid window length '{}' in '{}'", p, s))
        };
        let range = match parts.as_slice() {
            [single] => WindowRange::single(parse(single)?),
            [start, end] => WindowRange {
                start: parse(start)?,
                end: parse(end)?,
                step: 1,
            },
            [start, end, step] => WindowRange {
                start: parse(start)?,
                end: parse(end)?,
                step: parse(step)?,
            },
            _ => return Err(format!("expected start:end:step, got '{}'", s)),
        };
        if range.step == 0 {
            return Err(format!("step must be at least 1 in '{}'", s));
        }
        if range.start > range.end {
            return Err(format!("start exceeds end in '{}'", s));
        }
        Ok(range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGrid {
    pub short: WindowRange,
    pub long: WindowRange,
}

impl WindowGrid {
    /// Valid pairs for a series of `series_len` bars, short-major order.
    pub fn pairs(&self, series_len: usize) -> Vec<(usize, usize)> {
        let longs = self.long.values();
        self.short
            .values()
            .into_iter()
            .filter(|&s| s >= 1)
            .flat_map(|s| {
                longs
                    .iter()
                    .copied()
                    .filter(move |&l| s < l && l <= series_len)
                    .map(move |l| (s, l))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRun {
    pub metrics: MetricsReport,
    pub trade_count: usize,
}

#[derive(Debug)]
pub struct SweepOutcome {
    pub short_window: usize,
    pub long_window: usize,
    pub result: Result<SweepRun, SmacrossError>,
}

impl SweepOutcome {
    pub fn sharpe(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|r| r.metrics.sharpe_ratio)
    }
}

/// Run one backtest per grid pair. `base` supplies capital, sizing and
/// periods per year; its windows are replaced by each pair.
pub fn run_sweep(
    series: &PriceSeries,
    grid: &WindowGrid,
    base: &BacktestConfig,
) -> Vec<SweepOutcome> {
    let pairs = grid.pairs(series.len());
    info!(runs = pairs.len(), "starting sweep");

    pairs
        .into_par_iter()
        .map(|(short_window, long_window)| {
            let config = BacktestConfig {
                short_window,
                long_window,
                ..base.clone()
            };
            let result = run_backtest(series, &config).map(|r| SweepRun {
                trade_count: r.trades.len(),
                metrics: r.metrics,
            });
            SweepOutcome {
                short_window,
                long_window,
                result,
            }
        })
        .collect()
}

/// Successful outcomes, best Sharpe first. Ties keep grid order.
pub fn rank_by_sharpe(outcomes: &[SweepOutcome]) -> Vec<&SweepOutcome> {
    let mut ranked: Vec<&SweepOutcome> = outcomes.iter().filter(|o| o.result.is_ok()).collect();
    ranked.sort_by(|a, b| {
        let (sa, sb) = (a.sharpe().unwrap_or(0.0), b.sharpe().unwrap_or(0.0));
        sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
    });
    ranked
}
