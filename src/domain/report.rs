//! Result packaging: calendar-day dedup, rounding, summary statistics.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::backtest::BacktestTrace;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::Bar;
use crate::domain::position::Action;

pub const NO_DATA: &str = "No data";

const EQUITY_DECIMALS: i32 = 4;
const INDICATOR_DECIMALS: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub time: String,
    pub value: f64,
    pub sma_s: Option<f64>,
    pub sma_l: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_h: Option<f64>,
    pub bb_u: Option<f64>,
    pub bb_m: Option<f64>,
    pub bb_l: Option<f64>,
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub ticker: String,
    pub results: Vec<EquityPoint>,
    /// Percentage from the equity of the last reported bar, to 2 dp.
    pub final_return: f64,
    pub total_trades: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BacktestOutcome {
    Report(BacktestReport),
    NoData { error: String },
}

impl BacktestOutcome {
    pub fn no_data() -> Self {
        BacktestOutcome::NoData {
            error: NO_DATA.to_string(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, BacktestOutcome::NoData { .. })
    }

    pub fn report(&self) -> Option<&BacktestReport> {
        match self {
            BacktestOutcome::Report(report) => Some(report),
            BacktestOutcome::NoData { .. } => None,
        }
    }
}

/// Indices of the bars to keep: the last bar of each calendar day, in
/// original order.
pub fn last_bar_per_day(bars: &[Bar]) -> Vec<usize> {
    let mut last_seen = HashMap::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        last_seen.insert(bar.date(), i);
    }
    (0..bars.len())
        .filter(|&i| last_seen.get(&bars[i].date()) == Some(&i))
        .collect()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn round_opt(value: Option<f64>) -> Option<f64> {
    value.map(|v| round_to(v, INDICATOR_DECIMALS))
}

pub fn package(ticker: &str, trace: &BacktestTrace) -> BacktestReport {
    let kept = last_bar_per_day(&trace.bars);

    let results: Vec<EquityPoint> = kept
        .iter()
        .map(|&i| {
            let snap = &trace.snapshots[i];
            EquityPoint {
                time: trace.bars[i].date().format("%Y-%m-%d").to_string(),
                value: round_to(trace.equity[i], EQUITY_DECIMALS),
                sma_s: round_opt(snap.sma_short),
                sma_l: round_opt(snap.sma_long),
                rsi: round_opt(snap.rsi),
                macd: round_opt(snap.macd),
                macd_h: round_opt(snap.macd_hist),
                bb_u: round_opt(snap.bb_upper),
                bb_m: round_opt(snap.bb_mid),
                bb_l: round_opt(snap.bb_lower),
                action: trace.signals[i].action,
            }
        })
        .collect();

    let final_return = kept
        .last()
        .map(|&i| round_to((trace.equity[i] - 1.0) * 100.0, INDICATOR_DECIMALS))
        .unwrap_or(0.0);

    let metrics = Metrics::compute(&trace.signals, &trace.strategy_returns, &trace.equity);

    BacktestReport {
        ticker: ticker.to_string(),
        results,
        final_return,
        total_trades: metrics.total_trades,
        win_rate: round_to(metrics.win_rate_pct, INDICATOR_DECIMALS),
        max_drawdown: round_to(metrics.max_drawdown_pct, INDICATOR_DECIMALS),
    }
}
