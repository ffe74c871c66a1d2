//! Completed trade record and exit-reason tagging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::Direction;

/// Why a position was closed.
///
/// Mapped to stable string identifiers only at the serialisation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    ExitSignal,
    MaxHoldingPeriod,
    EndOfBacktest,
    /// Emergency flush after an exit drove free capital below zero.
    ForceExit,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::ExitSignal => "exit_signal",
            ExitReason::MaxHoldingPeriod => "max_holding_period",
            ExitReason::EndOfBacktest => "end_of_backtest",
            ExitReason::ForceExit => "force_exit",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed position, immutable once appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_fee: f64,
    pub entry_investment: f64,
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_fee: f64,
    /// Cash returned to free capital at close.
    pub exit_value: f64,
    pub profit: f64,
    pub profit_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    /// Bars between entry and exit.
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
