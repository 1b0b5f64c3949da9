//! Report generation port.

use std::path::Path;

use chrono::NaiveDate;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SmacrossError;

/// Run parameters a report needs besides the result itself.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub code: &'a str,
    pub currency: &'a str,
    pub config: &'a BacktestConfig,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        ctx: &ReportContext<'_>,
        output_path: &Path,
    ) -> Result<(), SmacrossError>;
}
