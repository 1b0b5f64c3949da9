//! SMA crossover signal generation.
//!
//! Position rule: Long iff both averages are defined and short > long.
//! Ties and warmup bars are Flat.

use chrono::NaiveDate;
use std::fmt;

use super::error::SmacrossError;
use super::indicator::calculate_sma;
use super::price::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionSignal {
    Long,
    Flat,
}

impl PositionSignal {
    pub fn is_long(self) -> bool {
        self == PositionSignal::Long
    }
}

impl fmt::Display for PositionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSignal::Long => write!(f, "LONG"),
            PositionSignal::Flat => write!(f, "FLAT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
    pub position: PositionSignal,
}

/// Check `1 <= short_window < long_window`.
pub fn check_window_order(short_window: usize, long_window: usize) -> Result<(), SmacrossError> {
    if short_window < 1 {
        return Err(SmacrossError::configuration(
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if short_window >= long_window {
        return Err(SmacrossError::configuration(
            "long_window",
            format!(
                "short_window must be less than long_window (got {} >= {})",
                short_window, long_window
            ),
        ));
    }
    Ok(())
}

/// Check `1 <= short_window < long_window <= series_len`.
pub fn validate_windows(
    short_window: usize,
    long_window: usize,
    series_len: usize,
) -> Result<(), SmacrossError> {
    check_window_order(short_window, long_window)?;
    if long_window > series_len {
        return Err(SmacrossError::configuration(
            "long_window",
            format!(
                "long_window must not exceed series length (got {} > {})",
                long_window, series_len
            ),
        ));
    }
    Ok(())
}

pub fn generate_signals(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<Vec<SignalPoint>, SmacrossError> {
    validate_windows(short_window, long_window, series.len())?;

    let closes = series.closes();
    let short = calculate_sma(&closes, short_window);
    let long = calculate_sma(&closes, long_window);

    let signals = series
        .bars()
        .iter()
        .zip(short.into_iter().zip(long))
        .map(|(bar, (short_avg, long_avg))| {
            let position = match (short_avg, long_avg) {
                (Some(s), Some(l)) if s > l => PositionSignal::Long,
                _ => PositionSignal::Flat,
            };
            SignalPoint {
                date: bar.date,
                short_avg,
                long_avg,
                position,
            }
        })
        .collect();

    Ok(signals)
}

/// A signal sequence aligned to `series` that holds `position` on every bar.
pub fn constant_signals(series: &PriceSeries, position: PositionSignal) -> Vec<SignalPoint> {
    series
        .bars()
        .iter()
        .map(|bar| SignalPoint {
            date: bar.date,
            short_avg: None,
            long_avg: None,
            position,
        })
        .collect()
}

/// Indices where the position differs from the previous bar (Flat before bar 0).
pub fn transitions(signals: &[SignalPoint]) -> Vec<usize> {
    let mut prev = PositionSignal::Flat;
    let mut out = Vec::new();
    for (i, point) in signals.iter().enumerate() {
        if point.position != prev {
            out.push(i);
        }
        prev = point.position;
    }
    out
}
