//! Technical indicator implementations.
//!
//! Every indicator works on a close-price sequence and returns one value per
//! input bar. A value is `None` until enough history exists; `None` is never
//! coerced to zero because zero is a legitimate RSI or MACD reading.
//!
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSet`: all series computed for one run
//! - `IndicatorSnapshot`: the per-bar view handed to the vote evaluator

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{calculate_bollinger, BollingerSeries};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use std::fmt;

use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Indicator readings for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
}

/// All indicator series for one run, each the same length as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub sma_short: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
    pub bollinger: BollingerSeries,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.sma_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma_short.is_empty()
    }

    pub fn snapshot(&self, i: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            sma_short: self.sma_short[i],
            sma_long: self.sma_long[i],
            rsi: self.rsi[i],
            macd: self.macd.line[i],
            macd_signal: self.macd.signal[i],
            macd_hist: self.macd.histogram[i],
            bb_lower: self.bollinger.lower[i],
            bb_mid: self.bollinger.middle[i],
            bb_upper: self.bollinger.upper[i],
        }
    }

    pub fn snapshots(&self) -> Vec<IndicatorSnapshot> {
        (0..self.len()).map(|i| self.snapshot(i)).collect()
    }
}

/// Compute every indicator, independent of which ones are enabled for voting.
pub fn compute_indicators(closes: &[f64], config: &StrategyConfig) -> IndicatorSet {
    IndicatorSet {
        sma_short: calculate_sma(closes, config.sma_short),
        sma_long: calculate_sma(closes, config.sma_long),
        rsi: calculate_rsi(closes, config.rsi_period),
        macd: calculate_macd(closes, config.macd_fast, config.macd_slow, config.macd_signal),
        bollinger: calculate_bollinger(closes, config.bb_window, config.bb_std),
    }
}
