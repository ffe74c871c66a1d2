//! TOML run configuration — maps a `[backtest]` section onto engine
//! parameters.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use barlab_core::{BacktestConfig, SignalPriority, Timeframe, TradeMode};

/// Top-level run configuration from a TOML file.
#[derive(Debug, Deserialize)]
pub struct RunFileConfig {
    pub backtest: BacktestSection,
}

/// The `[backtest]` section.
#[derive(Debug, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_trade_mode")]
    pub trade_mode: String,
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_position_size")]
    pub position_size_pct: f64,
    #[serde(default = "default_commission")]
    pub commission_pct: f64,
    #[serde(default)]
    pub take_profit_pct: f64,
    #[serde(default)]
    pub stop_loss_pct: f64,
    #[serde(default = "default_min_holding")]
    pub min_holding_period: usize,
    #[serde(default)]
    pub max_holding_period: usize,
    #[serde(default)]
    pub slippage_pct: f64,
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
    #[serde(default = "default_force_close")]
    pub force_close_at_end: bool,
    #[serde(default = "default_priority")]
    pub signal_priority: String,
}

fn default_timeframe() -> String {
    "1d".to_string()
}
fn default_trade_mode() -> String {
    "long".to_string()
}
fn default_capital() -> f64 {
    10_000.0
}
fn default_position_size() -> f64 {
    1.0
}
fn default_commission() -> f64 {
    0.001
}
fn default_min_holding() -> usize {
    1
}
fn default_max_positions() -> usize {
    10
}
fn default_force_close() -> bool {
    true
}
fn default_priority() -> String {
    "exit_first".to_string()
}

impl RunFileConfig {
    /// Load from a TOML file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Convert into validated engine parameters.
    pub fn to_engine_config(&self) -> Result<BacktestConfig, ConfigError> {
        let section = &self.backtest;
        let config = BacktestConfig {
            timeframe: Timeframe::parse(&section.timeframe),
            trade_mode: TradeMode::from_str(&section.trade_mode)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            initial_capital: section.initial_capital,
            position_size_pct: section.position_size_pct,
            commission_pct: section.commission_pct,
            take_profit_pct: section.take_profit_pct,
            stop_loss_pct: section.stop_loss_pct,
            min_holding_period: section.min_holding_period,
            max_holding_period: section.max_holding_period,
            slippage_pct: section.slippage_pct,
            max_positions: section.max_positions,
            force_close_at_end: section.force_close_at_end,
            signal_priority: SignalPriority::from_str(&section.signal_priority)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        };
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }
}

/// Config loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
