//! Core domain types and the backtest pipeline.

pub mod ohlcv;
pub mod strategy;
pub mod config_validation;
pub mod indicator;
pub mod vote;
pub mod position;
pub mod equity;
pub mod metrics;
pub mod report;
pub mod backtest;
pub mod error;
