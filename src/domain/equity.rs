//! Forward returns and the compounded equity curve.
//!
//! The position held on bar t earns the move from close[t] to close[t+1]
//! (next-bar execution). Equity starts from a notional 1.0 before the first
//! bar.

use crate::domain::position::SignalRecord;

pub const INITIAL_EQUITY: f64 = 1.0;

/// `(close[t+1] - close[t]) / close[t]`; undefined on the last bar and
/// wherever close[t] is zero.
pub fn forward_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out: Vec<Option<f64>> = closes
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                None
            } else {
                Some((pair[1] - pair[0]) / pair[0])
            }
        })
        .collect();
    if !closes.is_empty() {
        out.push(None);
    }
    out
}

/// Forward return scaled by exposure; an undefined return contributes 0.
pub fn strategy_returns(forward: &[Option<f64>], signals: &[SignalRecord]) -> Vec<f64> {
    forward
        .iter()
        .zip(signals)
        .map(|(r, s)| r.unwrap_or(0.0) * s.position as f64)
        .collect()
}

/// `equity[t] = equity[t-1] * (1 + strategy_return[t])` with equity[-1] = 1.
pub fn equity_curve(strategy_returns: &[f64]) -> Vec<f64> {
    let mut equity = INITIAL_EQUITY;
    strategy_returns
        .iter()
        .map(|r| {
            equity *= 1.0 + r;
            equity
        })
        .collect()
}

/// Largest peak-to-trough decline as a fraction of the peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = INITIAL_EQUITY;
    let mut worst = 0.0;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > worst {
                worst = dd;
            }
        }
    }
    worst
}
