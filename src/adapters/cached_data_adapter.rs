//! Memoizing wrapper around any [`DataPort`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::error::SmacrossError;
use crate::domain::price::Bar;
use crate::ports::data_port::DataPort;

type CacheKey = (String, NaiveDate, NaiveDate);

/// Caches successful `fetch_prices` results keyed by `(code, start, end)`.
/// Errors are not cached. Symbol listing and data ranges pass through.
///
/// For long-lived callers that run many backtests over the same instrument
/// and window; each CLI invocation fetches once and uses the bare adapter.
pub struct CachedDataPort<P> {
    inner: P,
    cache: Mutex<HashMap<CacheKey, Vec<Bar>>>,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, SmacrossError> {
        let key = (code.to_string(), start_date, end_date);
        if let Some(bars) = self.cache.lock().ok().and_then(|c| c.get(&key).cloned()) {
            debug!(code, %start_date, %end_date, "price cache hit");
            return Ok(bars);
        }

        let bars = self.inner.fetch_prices(code, start_date, end_date)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, bars.clone());
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError> {
        self.inner.list_symbols()
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        self.inner.get_data_range(code)
    }
}
