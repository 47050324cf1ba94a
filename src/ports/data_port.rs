//! Bar storage port traits.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDateTime;

/// Read side: one ticker's bars, ascending by time.
pub trait DataPort {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, TradesimError>;

    fn list_tickers(&self) -> Result<Vec<String>, TradesimError>;

    /// First time, last time and bar count, or `None` when the ticker has no bars.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, TradesimError>;
}

/// Write side used by ingestion.
pub trait BarStorePort {
    fn initialize_schema(&self) -> Result<(), TradesimError>;

    /// Register `ticker` and store `bars`, skipping any `(time, ticker)` pair
    /// already present. Returns the number of rows inserted.
    fn upsert_bars(&self, ticker: &str, bars: &[Bar]) -> Result<usize, TradesimError>;
}
