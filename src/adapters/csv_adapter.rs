//! CSV price files and CSV exports.
//!
//! Prices live in one file per instrument, `<base_path>/<CODE>.csv`. Columns
//! are found by header name so both plain `date,close` files and quote-vendor
//! downloads (`Date,Open,High,Low,Close,Adj Close,Volume`) load unchanged.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SmacrossError;
use crate::domain::portfolio::LedgerState;
use crate::domain::price::Bar;
use crate::domain::sweep::SweepOutcome;
use crate::domain::trade::Trade;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportContext, ReportPort};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CLOSE_HEADERS: [&str; 3] = ["close", "adj close", "adj_close"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    /// Every usable row of `code`'s file, sorted by date.
    fn read_bars(&self, code: &str) -> Result<Vec<Bar>, SmacrossError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| SmacrossError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        parse_prices(&content, code)
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

/// Parses a price CSV. Rows with an empty, non-numeric or non-finite close
/// are dropped; a malformed date is an error.
pub fn parse_prices(content: &str, code: &str) -> Result<Vec<Bar>, SmacrossError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| SmacrossError::Data {
            reason: format!("CSV header error for {}: {}", code, e),
        })?
        .clone();
    let date_col = find_column(&headers, &["date"]).ok_or_else(|| SmacrossError::Data {
        reason: format!("{}: missing date column", code),
    })?;
    let close_col = find_column(&headers, &CLOSE_HEADERS).ok_or_else(|| SmacrossError::Data {
        reason: format!("{}: missing close column", code),
    })?;

    let mut bars = Vec::new();
    let mut dropped = 0usize;

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| SmacrossError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(date_col).unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            SmacrossError::Data {
                reason: format!("{}: invalid date '{}' on row {}: {}", code, date_str, row + 1, e),
            }
        })?;

        let close = record
            .get(close_col)
            .map(str::trim)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|c| c.is_finite());

        match close {
            Some(close) => bars.push(Bar::new(date, close)),
            None => {
                dropped += 1;
                debug!(code, %date, "dropping row with unusable close");
            }
        }
    }

    if dropped > 0 {
        warn!(code, dropped, "dropped rows with empty or non-numeric close");
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SmacrossError> {
        let mut bars = self.read_bars(code)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SmacrossError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SmacrossError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        if !self.csv_path(code).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(code)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}

fn csv_error(e: csv::Error) -> SmacrossError {
    SmacrossError::Io(e.into())
}

fn write_rows<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), SmacrossError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `date,close,cash,shares,equity`
pub fn write_equity_curve<W: io::Write>(
    writer: W,
    curve: &[LedgerState],
) -> Result<(), SmacrossError> {
    write_rows(writer, curve)
}

/// `date,side,price,shares`
pub fn write_trades<W: io::Write>(writer: W, trades: &[Trade]) -> Result<(), SmacrossError> {
    write_rows(writer, trades)
}

#[derive(Serialize)]
struct SweepRow {
    short_window: usize,
    long_window: usize,
    cumulative_return: Option<f64>,
    annualized_return: Option<f64>,
    annualized_volatility: Option<f64>,
    sharpe_ratio: Option<f64>,
    max_drawdown: Option<f64>,
    trades: Option<usize>,
    error: Option<String>,
}

impl From<&SweepOutcome> for SweepRow {
    fn from(outcome: &SweepOutcome) -> Self {
        let run = outcome.result.as_ref().ok();
        SweepRow {
            short_window: outcome.short_window,
            long_window: outcome.long_window,
            cumulative_return: run.map(|r| r.metrics.cumulative_return),
            annualized_return: run.map(|r| r.metrics.annualized_return),
            annualized_volatility: run.map(|r| r.metrics.annualized_volatility),
            sharpe_ratio: run.map(|r| r.metrics.sharpe_ratio),
            max_drawdown: run.map(|r| r.metrics.max_drawdown),
            trades: run.map(|r| r.trade_count),
            error: outcome.result.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// One row per window pair; failed runs carry only the error column.
pub fn write_sweep<W: io::Write, O: std::borrow::Borrow<SweepOutcome>>(
    writer: W,
    outcomes: &[O],
) -> Result<(), SmacrossError> {
    let rows: Vec<SweepRow> = outcomes.iter().map(|o| SweepRow::from(o.borrow())).collect();
    write_rows(writer, &rows)
}

/// Writes `equity.csv`, `benchmark.csv` and `trades.csv` into a directory.
pub struct CsvExportAdapter;

impl ReportPort for CsvExportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        ctx: &ReportContext<'_>,
        output_path: &Path,
    ) -> Result<(), SmacrossError> {
        fs::create_dir_all(output_path)?;
        let prefix = ctx.code.replace(['/', '\\'], "_");

        let equity = output_path.join(format!("{}_equity.csv", prefix));
        write_equity_curve(fs::File::create(&equity)?, &result.equity_curve)?;

        let benchmark = output_path.join(format!("{}_benchmark.csv", prefix));
        write_equity_curve(fs::File::create(&benchmark)?, &result.benchmark_curve)?;

        let trades = output_path.join(format!("{}_trades.csv", prefix));
        write_trades(fs::File::create(&trades)?, &result.trades)?;

        debug!(dir = %output_path.display(), "csv exports written");
        Ok(())
    }
}
