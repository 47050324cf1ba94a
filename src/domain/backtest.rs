//! Backtest engine.
//!
//! bars → indicators → votes → positions → returns → equity → report.
//! Pure and synchronous: every call owns its buffers, so independent runs
//! may execute concurrently.

use tracing::{debug, warn};

use crate::domain::config_validation::validate_strategy_config;
use crate::domain::equity::{equity_curve, forward_returns, strategy_returns};
use crate::domain::error::TradesimError;
use crate::domain::indicator::{compute_indicators, IndicatorSnapshot};
use crate::domain::ohlcv::Bar;
use crate::domain::position::{simulate_positions, SignalRecord};
use crate::domain::report::{package, BacktestOutcome};
use crate::domain::strategy::StrategyConfig;
use crate::domain::vote::{evaluate_votes, Vote};

/// Per-bar state of one run, before calendar-day dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestTrace {
    pub bars: Vec<Bar>,
    pub snapshots: Vec<IndicatorSnapshot>,
    pub votes: Vec<Vote>,
    pub signals: Vec<SignalRecord>,
    pub forward_returns: Vec<Option<f64>>,
    pub strategy_returns: Vec<f64>,
    pub equity: Vec<f64>,
}

impl BacktestTrace {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn positions(&self) -> Vec<u8> {
        self.signals.iter().map(|s| s.position).collect()
    }
}

/// Run the pipeline over `bars` without validating `config`.
pub fn simulate(bars: &[Bar], config: &StrategyConfig) -> BacktestTrace {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let snapshots = compute_indicators(&closes, config).snapshots();
    let votes = evaluate_votes(&snapshots, &closes, config);
    let signals = simulate_positions(&votes);
    let forward = forward_returns(&closes);
    let returns = strategy_returns(&forward, &signals);
    let equity = equity_curve(&returns);

    debug!(
        bars = bars.len(),
        entries = signals.iter().filter(|s| s.trade_signal == 1).count(),
        "simulated strategy"
    );

    BacktestTrace {
        bars: bars.to_vec(),
        snapshots,
        votes,
        signals,
        forward_returns: forward,
        strategy_returns: returns,
        equity,
    }
}

/// Validate `config`, run the engine and package the result.
///
/// An empty bar sequence yields [`BacktestOutcome::NoData`]; only invalid
/// configuration is an error.
pub fn run_backtest(
    ticker: &str,
    bars: &[Bar],
    config: &StrategyConfig,
) -> Result<BacktestOutcome, TradesimError> {
    validate_strategy_config(config)?;

    if bars.is_empty() {
        debug!(ticker, "no bars, skipping backtest");
        return Ok(BacktestOutcome::no_data());
    }

    let usable: Vec<Bar> = bars.iter().filter(|b| b.close.is_finite()).cloned().collect();
    if usable.len() < bars.len() {
        warn!(
            ticker,
            dropped = bars.len() - usable.len(),
            "dropping bars without a usable close"
        );
    }
    if usable.is_empty() {
        return Ok(BacktestOutcome::no_data());
    }

    let trace = simulate(&usable, config);
    Ok(BacktestOutcome::Report(package(ticker, &trace)))
}
