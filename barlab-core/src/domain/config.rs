//! Immutable run parameters, validated before the first bar is processed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Bar interval of the input series.
///
/// Determines the periods-per-year constant used to annualise returns and
/// risk ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    #[default]
    OneDay,
}

impl Timeframe {
    /// Calendar periods per year for this interval.
    pub fn periods_per_year(self) -> u32 {
        match self {
            Timeframe::OneMinute => 525_600,
            Timeframe::FiveMinutes => 105_120,
            Timeframe::FifteenMinutes => 35_040,
            Timeframe::ThirtyMinutes => 17_520,
            Timeframe::OneHour => 8_760,
            Timeframe::FourHours => 2_190,
            Timeframe::OneDay => 365,
        }
    }

    /// Parse an interval label. Unrecognised labels fall back to `1d`.
    pub fn parse(label: &str) -> Self {
        match label {
            "1m" => Timeframe::OneMinute,
            "5m" => Timeframe::FiveMinutes,
            "15m" => Timeframe::FifteenMinutes,
            "30m" => Timeframe::ThirtyMinutes,
            "1h" => Timeframe::OneHour,
            "4h" => Timeframe::FourHours,
            _ => Timeframe::OneDay,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        }
    }
}

/// Which entry signals may open a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeMode {
    #[default]
    Long,
    Short,
    LongShort,
}

impl TradeMode {
    /// Whether a long (`+1`) entry signal is tradable under this mode.
    pub fn allows_long(self) -> bool {
        matches!(self, TradeMode::Long | TradeMode::LongShort)
    }

    /// Whether a short (`-1`) entry signal is tradable under this mode.
    pub fn allows_short(self) -> bool {
        matches!(self, TradeMode::Short | TradeMode::LongShort)
    }
}

impl FromStr for TradeMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(TradeMode::Long),
            "short" => Ok(TradeMode::Short),
            "long_short" => Ok(TradeMode::LongShort),
            other => Err(EngineError::InvalidParameter(format!(
                "unknown trade mode \"{other}\""
            ))),
        }
    }
}

/// Ordering of exit and entry processing within one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalPriority {
    /// Close positions first, then open new ones (default).
    #[default]
    ExitFirst,
    /// Open new positions first, then close.
    EntryFirst,
    /// Close, open, then close again — a position opened on this bar may
    /// also be closed on it.
    SameBarTrade,
}

impl FromStr for SignalPriority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exit_first" => Ok(SignalPriority::ExitFirst),
            "entry_first" => Ok(SignalPriority::EntryFirst),
            "same_bar_trade" => Ok(SignalPriority::SameBarTrade),
            other => Err(EngineError::InvalidParameter(format!(
                "unknown signal priority \"{other}\""
            ))),
        }
    }
}

/// Parameter bundle for a backtest run. Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub timeframe: Timeframe,
    pub trade_mode: TradeMode,
    /// Starting cash, must be positive.
    pub initial_capital: f64,
    /// Fraction of current free cash committed per new position, in (0, 1].
    pub position_size_pct: f64,
    /// Per-leg fee rate.
    pub commission_pct: f64,
    /// Favourable-side exit threshold; 0 disables.
    pub take_profit_pct: f64,
    /// Adverse-side exit threshold, stored positive; 0 disables.
    pub stop_loss_pct: f64,
    /// Bars a position must be held before a signal-driven exit is honoured.
    /// Take-profit, stop-loss and max-holding exits ignore this.
    pub min_holding_period: usize,
    /// Hard cap on bars held; 0 disables.
    pub max_holding_period: usize,
    /// Symmetric adverse slippage applied to every fill.
    pub slippage_pct: f64,
    /// Cap on concurrently open positions; 0 means unlimited.
    pub max_positions: usize,
    /// Close all still-open positions at the final bar.
    pub force_close_at_end: bool,
    pub signal_priority: SignalPriority,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::OneDay,
            trade_mode: TradeMode::Long,
            initial_capital: 10_000.0,
            position_size_pct: 1.0,
            commission_pct: 0.001,
            take_profit_pct: 0.0,
            stop_loss_pct: 0.0,
            min_holding_period: 1,
            max_holding_period: 0,
            slippage_pct: 0.0,
            max_positions: 10,
            force_close_at_end: true,
            signal_priority: SignalPriority::ExitFirst,
        }
    }
}

impl BacktestConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_capital > 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "position_size_pct must be in (0, 1], got {}",
                self.position_size_pct
            )));
        }
        if self.commission_pct < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "commission_pct must be non-negative, got {}",
                self.commission_pct
            )));
        }
        if self.slippage_pct < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "slippage_pct must be non-negative, got {}",
                self.slippage_pct
            )));
        }
        if self.take_profit_pct < 0.0 || self.stop_loss_pct < 0.0 {
            return Err(EngineError::InvalidParameter(
                "take_profit_pct and stop_loss_pct must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
