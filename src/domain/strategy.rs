//! Strategy configuration.
//!
//! A [`StrategyConfig`] is built once per run, either from a JSON parameter
//! map (HTTP requests) or from the `[strategy]` section of an INI file, and
//! validated before any computation starts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::domain::config_validation::validate_strategy_config;
use crate::domain::error::TradesimError;
use crate::domain::indicator::IndicatorType;
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "strategy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    #[serde(alias = "short_window")]
    pub sma_short: usize,
    #[serde(alias = "long_window")]
    pub sma_long: usize,
    pub rsi_period: usize,
    #[serde(alias = "rsi_buy_k")]
    pub rsi_buy_threshold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_window: usize,
    pub bb_std: f64,
    #[serde(alias = "use_sma")]
    pub enable_sma: bool,
    #[serde(alias = "use_rsi")]
    pub enable_rsi: bool,
    #[serde(alias = "use_macd")]
    pub enable_macd: bool,
    #[serde(alias = "use_bb")]
    pub enable_bb: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            sma_short: 5,
            sma_long: 20,
            rsi_period: 14,
            rsi_buy_threshold: 60.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_window: 20,
            bb_std: 2.0,
            enable_sma: true,
            enable_rsi: true,
            enable_macd: false,
            enable_bb: false,
        }
    }
}

impl StrategyConfig {
    /// Build from a loosely typed parameter map and validate it.
    ///
    /// Missing keys take their defaults and unknown keys are ignored. A
    /// value of the wrong type (e.g. a string where a period is expected) is
    /// a configuration error.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, TradesimError> {
        let config: StrategyConfig = serde_json::from_value(Value::Object(params.clone()))
            .map_err(|e| TradesimError::invalid(SECTION, "params", e.to_string()))?;
        validate_strategy_config(&config)?;
        Ok(config)
    }

    /// Build from the `[strategy]` section of a config source and validate it.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        let defaults = StrategyConfig::default();
        let parsed = StrategyConfig {
            sma_short: read_key(config, "sma_short", defaults.sma_short)?,
            sma_long: read_key(config, "sma_long", defaults.sma_long)?,
            rsi_period: read_key(config, "rsi_period", defaults.rsi_period)?,
            rsi_buy_threshold: read_key(
                config,
                "rsi_buy_threshold",
                defaults.rsi_buy_threshold,
            )?,
            macd_fast: read_key(config, "macd_fast", defaults.macd_fast)?,
            macd_slow: read_key(config, "macd_slow", defaults.macd_slow)?,
            macd_signal: read_key(config, "macd_signal", defaults.macd_signal)?,
            bb_window: read_key(config, "bb_window", defaults.bb_window)?,
            bb_std: read_key(config, "bb_std", defaults.bb_std)?,
            enable_sma: read_flag(config, "enable_sma", defaults.enable_sma)?,
            enable_rsi: read_flag(config, "enable_rsi", defaults.enable_rsi)?,
            enable_macd: read_flag(config, "enable_macd", defaults.enable_macd)?,
            enable_bb: read_flag(config, "enable_bb", defaults.enable_bb)?,
        };
        validate_strategy_config(&parsed)?;
        Ok(parsed)
    }

    pub fn any_enabled(&self) -> bool {
        self.enable_sma || self.enable_rsi || self.enable_macd || self.enable_bb
    }

    /// Every indicator the engine computes, with this config's parameters.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.sma_short),
            IndicatorType::Sma(self.sma_long),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Bollinger {
                period: self.bb_window,
                stddev_mult_x100: (self.bb_std * 100.0).round() as u32,
            },
        ]
    }

    /// The indicators that take part in voting.
    pub fn voting_indicators(&self) -> Vec<IndicatorType> {
        let all = self.indicators();
        let enabled = [
            self.enable_sma,
            self.enable_sma,
            self.enable_rsi,
            self.enable_macd,
            self.enable_bb,
        ];
        all.into_iter()
            .zip(enabled)
            .filter_map(|(ind, on)| on.then_some(ind))
            .collect()
    }
}

fn read_key<T: FromStr>(config: &dyn ConfigPort, key: &str, default: T) -> Result<T, TradesimError> {
    match config.get_string(SECTION, key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| TradesimError::invalid(SECTION, key, format!("'{raw}' is not a number"))),
    }
}

fn read_flag(config: &dyn ConfigPort, key: &str, default: bool) -> Result<bool, TradesimError> {
    match config.get_string(SECTION, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(TradesimError::invalid(
                SECTION,
                key,
                format!("'{raw}' is not a boolean"),
            )),
        },
    }
}
