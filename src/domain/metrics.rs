//! Round-trip trades and summary statistics.

use crate::domain::equity::max_drawdown;
use crate::domain::position::{Action, SignalRecord};

/// One entry/exit round trip, by bar index.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    /// Bar where the position went flat, or the last bar for an open trade.
    pub exit_index: usize,
    pub open: bool,
    /// Compounded strategy return over the held bars, as a fraction.
    pub return_frac: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
}

impl Metrics {
    pub fn compute(signals: &[SignalRecord], strategy_returns: &[f64], equity: &[f64]) -> Self {
        let trades = extract_trades(signals, strategy_returns);
        let trades_won = trades.iter().filter(|t| t.return_frac > 0.0).count();
        let win_rate_pct = if trades.is_empty() {
            0.0
        } else {
            trades_won as f64 / trades.len() as f64 * 100.0
        };
        let total_return_pct = equity.last().map(|e| (e - 1.0) * 100.0).unwrap_or(0.0);

        Metrics {
            total_return_pct,
            total_trades: trades.len(),
            trades_won,
            win_rate_pct,
            max_drawdown_pct: max_drawdown(equity) * 100.0,
        }
    }
}

/// Pair each buy with the following sell. A position still open after the
/// last bar is closed there and flagged `open`.
pub fn extract_trades(signals: &[SignalRecord], strategy_returns: &[f64]) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut entry: Option<usize> = None;

    for (i, record) in signals.iter().enumerate() {
        match (record.action, entry) {
            (Some(Action::Buy), None) => entry = Some(i),
            (Some(Action::Sell), Some(start)) => {
                trades.push(Trade {
                    entry_index: start,
                    exit_index: i,
                    open: false,
                    return_frac: compound(&strategy_returns[start..i]),
                });
                entry = None;
            }
            _ => {}
        }
    }

    if let Some(start) = entry {
        let last = signals.len() - 1;
        trades.push(Trade {
            entry_index: start,
            exit_index: last,
            open: true,
            return_frac: compound(&strategy_returns[start..]),
        });
    }

    trades
}

fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}
