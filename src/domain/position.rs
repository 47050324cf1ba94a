//! Flat/long position state machine.

use serde::Serialize;

use crate::domain::vote::Vote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    /// One transition: Flat → Long on a buy vote, Long → Flat on a sell vote.
    pub fn next(self, vote: Vote) -> Self {
        match self {
            PositionState::Flat if vote.buy => PositionState::Long,
            PositionState::Long if vote.sell => PositionState::Flat,
            state => state,
        }
    }

    pub fn is_long(self) -> bool {
        self == PositionState::Long
    }

    /// 1 when long, 0 when flat.
    pub fn exposure(self) -> u8 {
        match self {
            PositionState::Flat => 0,
            PositionState::Long => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    fn from_trade_signal(signal: i8) -> Option<Self> {
        match signal {
            1 => Some(Action::Buy),
            -1 => Some(Action::Sell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRecord {
    pub position: u8,
    pub trade_signal: i8,
    pub action: Option<Action>,
}

/// Scan votes left to right carrying a single state, starting flat.
pub fn simulate_positions(votes: &[Vote]) -> Vec<SignalRecord> {
    let mut state = PositionState::Flat;
    let mut previous = 0u8;
    let mut records = Vec::with_capacity(votes.len());

    for &vote in votes {
        state = state.next(vote);
        let position = state.exposure();
        let trade_signal = position as i8 - previous as i8;
        records.push(SignalRecord {
            position,
            trade_signal,
            action: Action::from_trade_signal(trade_signal),
        });
        previous = position;
    }

    records
}
