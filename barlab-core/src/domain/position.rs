//! Position — one open trade leg owned by the simulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Stable identifier consumed by report writers.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// An open trade.
///
/// Entry money accounting is fixed at open; `current_value` is rewritten by
/// mark-to-market every bar. A short reserves its full `entry_investment` as
/// cash set aside to cover the eventual buy-back, which gives both legs the
/// same free-capital bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    /// Fill price after slippage.
    pub entry_price: f64,
    /// Units held (long) or units shorted.
    pub quantity: f64,
    pub entry_fee: f64,
    /// Cash removed from free capital at open.
    pub entry_investment: f64,
    /// Last mark-to-market value.
    pub current_value: f64,
}

impl Position {
    /// Price return relative to entry, signed in the direction of the trade.
    pub fn price_return(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - price) / self.entry_price,
        }
    }

    /// Rewrite `current_value` against the given bar price.
    ///
    /// Long value is plain `quantity × price`. Short value is the reserved
    /// cash plus the unrealised gain `(entry_price − price) × quantity`, so
    /// that free capital plus position value tracks price movement.
    pub fn mark_to_market(&mut self, price: f64) {
        self.current_value = match self.direction {
            Direction::Long => self.quantity * price,
            Direction::Short => {
                self.entry_investment + (self.entry_price - price) * self.quantity
            }
        };
    }

    /// Bars held as of bar `index`.
    pub fn holding_period(&self, index: usize) -> usize {
        index - self.entry_index
    }
}
