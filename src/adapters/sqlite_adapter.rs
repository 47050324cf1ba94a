//! SQLite bar store.
//!
//! Two tables: `stocks` registers each ticker, `market_data` holds one row
//! per `(time, symbol)`. Times are stored as `YYYY-MM-DD HH:MM:SS` text so
//! lexical order is chronological order.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::{format_time, parse_time, Bar};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{BarStorePort, DataPort};
use chrono::NaiveDateTime;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS stocks (
        symbol TEXT PRIMARY KEY,
        name TEXT,
        exchange TEXT,
        active INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS market_data (
        time TEXT NOT NULL,
        symbol TEXT NOT NULL REFERENCES stocks (symbol),
        open REAL,
        high REAL,
        low REAL,
        close REAL,
        volume REAL,
        PRIMARY KEY (time, symbol)
    );
    CREATE INDEX IF NOT EXISTS ix_symbol_time ON market_data (symbol, time);";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn db_err(e: r2d2::Error) -> TradesimError {
    TradesimError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> TradesimError {
    TradesimError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn time_from_sql(value: String) -> rusqlite::Result<NaiveDateTime> {
    parse_time(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            value.len(),
            rusqlite::types::Type::Text,
            format!("invalid time '{value}'").into(),
        )
    })
}

/// NULL prices read as NaN.
fn price(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TradesimError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4);
        if pool_size < 1 {
            return Err(TradesimError::invalid(
                "sqlite",
                "pool_size",
                "must be at least 1",
            ));
        }

        let max_size = u32::try_from(pool_size).map_err(|_| {
            TradesimError::invalid("sqlite", "pool_size", format!("{pool_size} is too large"))
        })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(db_err)?;

        debug!(path = %db_path, pool_size, "opened sqlite pool");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TradesimError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(db_err)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradesimError> {
        self.pool.get().map_err(db_err)
    }
}

impl BarStorePort for SqliteAdapter {
    fn initialize_schema(&self) -> Result<(), TradesimError> {
        self.conn()?.execute_batch(SCHEMA).map_err(query_err)
    }

    fn upsert_bars(&self, ticker: &str, bars: &[Bar]) -> Result<usize, TradesimError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute(
            "INSERT OR IGNORE INTO stocks (symbol, name) VALUES (?1, ?1)",
            params![ticker],
        )
        .map_err(query_err)?;

        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO market_data (time, symbol, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(query_err)?;
            for bar in bars {
                inserted += stmt
                    .execute(params![
                        format_time(&bar.time),
                        ticker,
                        bar.open,
                        bar.high,
                        bar.low,
                        bar.close,
                        bar.volume
                    ])
                    .map_err(query_err)?;
            }
        }

        tx.commit().map_err(query_err)?;
        info!(ticker, inserted, skipped = bars.len() - inserted, "stored bars");
        Ok(inserted)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, TradesimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT time, open, high, low, close, volume
                 FROM market_data
                 WHERE symbol = ?1
                 ORDER BY time ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![ticker], |row| {
                Ok(Bar {
                    time: time_from_sql(row.get(0)?)?,
                    open: price(row, 1)?,
                    high: price(row, 2)?,
                    low: price(row, 3)?,
                    close: price(row, 4)?,
                    volume: price(row, 5)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn list_tickers(&self) -> Result<Vec<String>, TradesimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT s.symbol FROM stocks s
                 WHERE s.active = 1
                   AND EXISTS (SELECT 1 FROM market_data m WHERE m.symbol = s.symbol)
                 ORDER BY s.symbol",
            )
            .map_err(query_err)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;
        rows.collect::<Result<Vec<String>, _>>().map_err(query_err)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, TradesimError> {
        let conn = self.conn()?;
        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(time), MAX(time), COUNT(*) FROM market_data WHERE symbol = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => Ok(Some((
                time_from_sql(min).map_err(query_err)?,
                time_from_sql(max).map_err(query_err)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
