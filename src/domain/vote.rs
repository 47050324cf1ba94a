//! Per-bar vote evaluation.
//!
//! Each enabled indicator may veto a buy or raise a sell:
//!
//! | indicator | vetoes buy when          | raises sell when        |
//! |-----------|--------------------------|-------------------------|
//! | SMA       | `sma_short <= sma_long`  | `sma_short < sma_long`  |
//! | RSI       | `rsi >= threshold`       | never                   |
//! | MACD      | `macd <= macd_signal`    | `macd < macd_signal`    |
//! | Bollinger | never                    | `close > bb_upper`      |
//!
//! With nothing enabled, or with any value an enabled indicator needs still
//! undefined, both votes are false and the position is held.

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vote {
    pub buy: bool,
    pub sell: bool,
}

impl Vote {
    pub const HOLD: Vote = Vote {
        buy: false,
        sell: false,
    };
}

/// Readings an enabled indicator needs, or `None` if any is undefined.
struct Readings {
    sma: Option<(f64, f64)>,
    rsi: Option<f64>,
    macd: Option<(f64, f64)>,
    bb_upper: Option<f64>,
}

impl Readings {
    fn gather(snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> Option<Self> {
        let sma = if config.enable_sma {
            Some((snapshot.sma_short?, snapshot.sma_long?))
        } else {
            None
        };
        let rsi = if config.enable_rsi {
            Some(snapshot.rsi?)
        } else {
            None
        };
        let macd = if config.enable_macd {
            Some((snapshot.macd?, snapshot.macd_signal?))
        } else {
            None
        };
        let bb_upper = if config.enable_bb {
            Some(snapshot.bb_upper?)
        } else {
            None
        };
        Some(Self {
            sma,
            rsi,
            macd,
            bb_upper,
        })
    }
}

pub fn evaluate_vote(snapshot: &IndicatorSnapshot, close: f64, config: &StrategyConfig) -> Vote {
    if !config.any_enabled() {
        return Vote::HOLD;
    }
    let Some(readings) = Readings::gather(snapshot, config) else {
        return Vote::HOLD;
    };

    let mut buy = true;
    let mut sell = false;

    if let Some((short, long)) = readings.sma {
        if short <= long {
            buy = false;
        }
        if short < long {
            sell = true;
        }
    }

    if let Some(rsi) = readings.rsi {
        if rsi >= config.rsi_buy_threshold {
            buy = false;
        }
    }

    if let Some((macd, signal)) = readings.macd {
        if macd <= signal {
            buy = false;
        }
        if macd < signal {
            sell = true;
        }
    }

    if let Some(upper) = readings.bb_upper {
        if close > upper {
            sell = true;
        }
    }

    Vote { buy, sell }
}

/// Votes for a whole series. `snapshots` and `closes` must be the same length.
pub fn evaluate_votes(
    snapshots: &[IndicatorSnapshot],
    closes: &[f64],
    config: &StrategyConfig,
) -> Vec<Vote> {
    snapshots
        .iter()
        .zip(closes)
        .map(|(snap, &close)| evaluate_vote(snap, close, config))
        .collect()
}
