//! Configuration validation.
//!
//! Checks the `[data]` and `[backtest]` sections before anything is loaded.

use crate::domain::error::SmacrossError;
use crate::domain::portfolio::ShareSizing;
use crate::domain::signal::check_window_order;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    require_non_empty(config, "data", "path")?;
    require_non_empty(config, "data", "code")?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    check_backtest_numbers(config)?;
    validate_windows(config)?;
    validate_initial_capital(config)?;
    validate_periods_per_year(config)?;
    validate_sizing(config)?;
    Ok(())
}

fn require_non_empty(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), SmacrossError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SmacrossError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SmacrossError {
    SmacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Numeric `[backtest]` keys. A present value that does not parse is an error
/// rather than a fallback to the getter's default.
const INTEGER_KEYS: [&str; 3] = ["short_window", "long_window", "periods_per_year"];
const FLOAT_KEYS: [&str; 1] = ["initial_capital"];

fn require_parsable<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<(), SmacrossError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() && raw.trim().parse::<T>().is_err() => Err(invalid(
            section,
            key,
            format!("{} must be {}, got '{}'", key, expected, raw.trim()),
        )),
        _ => Ok(()),
    }
}

/// Rejects `[backtest]` numbers that are present but malformed (`2O`, `1,000`).
pub fn check_backtest_numbers(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    for key in INTEGER_KEYS {
        require_parsable::<i64>(config, "backtest", key, "an integer")?;
    }
    for key in FLOAT_KEYS {
        require_parsable::<f64>(config, "backtest", key, "a number")?;
    }
    Ok(())
}

fn window(config: &dyn ConfigPort, key: &str, default: i64) -> Result<usize, SmacrossError> {
    let value = config.get_int("backtest", key, default);
    usize::try_from(value).map_err(|_| {
        invalid(
            "backtest",
            key,
            format!("{} must be a positive integer, got {}", key, value),
        )
    })
}

/// `[backtest] short_window/long_window` with defaults 50 and 200.
pub fn parse_windows(config: &dyn ConfigPort) -> Result<(usize, usize), SmacrossError> {
    Ok((
        window(config, "short_window", 50)?,
        window(config, "long_window", 200)?,
    ))
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let (short, long) = parse_windows(config)?;
    check_window_order(short, long).map_err(|e| match e {
        SmacrossError::Configuration { parameter, reason } => {
            invalid("backtest", &parameter, reason)
        }
        other => other,
    })
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let value = config.get_int("backtest", "periods_per_year", 252);
    if value < 1 || value > u32::MAX as i64 {
        return Err(invalid(
            "backtest",
            "periods_per_year",
            "periods_per_year must be a positive integer",
        ));
    }
    Ok(())
}

fn validate_sizing(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    parse_sizing(config).map(|_| ())
}

/// Reads `[backtest] sizing`, defaulting to fractional shares.
pub fn parse_sizing(config: &dyn ConfigPort) -> Result<ShareSizing, SmacrossError> {
    match config.get_string("backtest", "sizing") {
        None => Ok(ShareSizing::default()),
        Some(s) if s.trim().is_empty() => Ok(ShareSizing::default()),
        Some(s) => ShareSizing::parse(&s).ok_or_else(|| {
            invalid(
                "backtest",
                "sizing",
                format!("unknown sizing '{}', expected fractional or whole", s.trim()),
            )
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let start = parse_optional_date(config, "data", "start_date")?;
    let end = parse_optional_date(config, "data", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "data",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

/// Parses an optional `YYYY-MM-DD` value; absent or blank yields `None`.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, SmacrossError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    section,
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}
