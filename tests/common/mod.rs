#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::ohlcv::{parse_time, Bar};
use tradesim::domain::strategy::StrategyConfig;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    fn check(&self, ticker: &str) -> Result<(), TradesimError> {
        match self.errors.get(ticker) {
            Some(reason) => Err(TradesimError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<Bar>, TradesimError> {
        self.check(ticker)?;
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, TradesimError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, TradesimError> {
        self.check(ticker)?;
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.time).min().unwrap();
                let max = bars.iter().map(|b| b.time).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn make_bar(time: &str, close: f64) -> Bar {
    Bar {
        time: parse_time(time).unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per calendar day starting at `start`.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<Bar> {
    let first = parse_time(start).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            time: first + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// A linear ramp of `count` daily bars.
pub fn generate_bars(start: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(start, &closes)
}

pub fn sma_only(short: usize, long: usize) -> StrategyConfig {
    StrategyConfig {
        sma_short: short,
        sma_long: long,
        enable_sma: true,
        enable_rsi: false,
        enable_macd: false,
        enable_bb: false,
        ..StrategyConfig::default()
    }
}

pub fn all_disabled() -> StrategyConfig {
    StrategyConfig {
        enable_sma: false,
        enable_rsi: false,
        enable_macd: false,
        enable_bb: false,
        ..StrategyConfig::default()
    }
}
