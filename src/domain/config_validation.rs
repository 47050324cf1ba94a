//! Configuration validation.
//!
//! Runs once at entry, before any indicator is computed.

use crate::domain::error::TradesimError;
use crate::domain::strategy::StrategyConfig;

const SECTION: &str = "strategy";

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), TradesimError> {
    validate_period("sma_short", config.sma_short, 1)?;
    validate_period("sma_long", config.sma_long, 1)?;
    validate_period("rsi_period", config.rsi_period, 1)?;
    validate_rsi_threshold(config.rsi_buy_threshold)?;
    validate_macd(config)?;
    validate_bollinger(config)?;
    Ok(())
}

fn validate_period(key: &str, value: usize, minimum: usize) -> Result<(), TradesimError> {
    if value < minimum {
        return Err(TradesimError::invalid(
            SECTION,
            key,
            format!("{key} must be at least {minimum}"),
        ));
    }
    Ok(())
}

fn validate_rsi_threshold(value: f64) -> Result<(), TradesimError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(TradesimError::invalid(
            SECTION,
            "rsi_buy_threshold",
            "rsi_buy_threshold must be between 0 and 100",
        ));
    }
    Ok(())
}

fn validate_macd(config: &StrategyConfig) -> Result<(), TradesimError> {
    validate_period("macd_fast", config.macd_fast, 1)?;
    validate_period("macd_slow", config.macd_slow, 1)?;
    validate_period("macd_signal", config.macd_signal, 1)?;
    if config.macd_fast >= config.macd_slow {
        return Err(TradesimError::invalid(
            SECTION,
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }
    Ok(())
}

fn validate_bollinger(config: &StrategyConfig) -> Result<(), TradesimError> {
    // Sample standard deviation needs two points.
    validate_period("bb_window", config.bb_window, 2)?;
    if !config.bb_std.is_finite() || config.bb_std < 0.0 {
        return Err(TradesimError::invalid(
            SECTION,
            "bb_std",
            "bb_std must be a non-negative number",
        ));
    }
    Ok(())
}
