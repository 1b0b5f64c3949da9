//! Price data access port.

use crate::domain::error::SmacrossError;
use crate::domain::price::Bar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Closing-price bars for `code` within `[start_date, end_date]`, sorted by date.
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SmacrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError>;

    /// `(first date, last date, bar count)`, or `None` when the source has no
    /// rows for `code`.
    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError>;
}
