//! CSV file data adapter.
//!
//! One file per ticker, `<base_path>/<TICKER>.csv`, with the header
//! `time,open,high,low,close,volume`. Blank price fields read as NaN; the
//! engine drops bars without a finite close.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::{parse_time, Bar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const COLUMNS: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

/// Read a bar file, sorted ascending by time. Rows sharing a timestamp keep
/// their file order.
pub fn read_bars_file(path: &Path) -> Result<Vec<Bar>, TradesimError> {
    let content = fs::read_to_string(path)?;
    parse_bars(&content).map_err(|reason| TradesimError::DataFormat {
        reason: format!("{}: {}", path.display(), reason),
    })
}

fn parse_bars(content: &str) -> Result<Vec<Bar>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| format!("CSV header error: {e}"))?;
    for (i, expected) in COLUMNS.iter().enumerate() {
        match headers.get(i) {
            Some(h) if h.eq_ignore_ascii_case(expected) => {}
            other => {
                return Err(format!(
                    "expected column {} to be '{}', found {:?}",
                    i + 1,
                    expected,
                    other
                ));
            }
        }
    }

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let line = row + 2;
        let record = result.map_err(|e| format!("CSV parse error: {e}"))?;

        let time_str = record
            .get(0)
            .ok_or_else(|| format!("line {line}: missing time column"))?;
        let time = parse_time(time_str)
            .ok_or_else(|| format!("line {line}: invalid time '{time_str}'"))?;

        let number = |idx: usize| -> Result<f64, String> {
            let raw = record
                .get(idx)
                .ok_or_else(|| format!("line {line}: missing {} column", COLUMNS[idx]))?;
            if raw.is_empty() {
                return Ok(f64::NAN);
            }
            raw.parse()
                .map_err(|e| format!("line {line}: invalid {} value '{raw}': {e}", COLUMNS[idx]))
        };

        bars.push(Bar {
            time,
            open: number(1)?,
            high: number(2)?,
            low: number(3)?,
            close: number(4)?,
            volume: number(5)?,
        });
    }

    bars.sort_by_key(|b| b.time);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, TradesimError> {
        let path = self.csv_path(ticker);
        match read_bars_file(&path) {
            Err(TradesimError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(ticker, path = %path.display(), "no bar file");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, TradesimError> {
        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    tickers.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, TradesimError> {
        let bars = self.fetch_bars(ticker)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.time, last.time, bars.len()))),
            _ => Ok(None),
        }
    }
}
