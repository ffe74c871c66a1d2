//! Entry processor — opens at most one position per bar.

use chrono::{DateTime, Utc};

use crate::domain::{BacktestConfig, Direction, Position};

/// Open a position at bar `i` if the entry signal, trade-mode filter,
/// concurrency cap, and free capital all allow it.
///
/// Returns true when a position was opened. The committed amount is the
/// configured fraction of current free cash; the entry fee comes out of that
/// amount before the fill quantity is computed at the slipped price.
pub(crate) fn process_entry(
    open: &mut Vec<Position>,
    i: usize,
    price: f64,
    time: DateTime<Utc>,
    entry_signal: i32,
    config: &BacktestConfig,
    free_capital: &mut f64,
) -> bool {
    if config.max_positions > 0 && open.len() >= config.max_positions {
        return false;
    }

    let direction = match entry_signal {
        1 if config.trade_mode.allows_long() => Direction::Long,
        -1 if config.trade_mode.allows_short() => Direction::Short,
        _ => return false,
    };

    let trade_amount = *free_capital * config.position_size_pct;
    if trade_amount <= 0.0 {
        return false;
    }

    let entry_price = match direction {
        Direction::Long => price * (1.0 + config.slippage_pct),
        Direction::Short => price * (1.0 - config.slippage_pct),
    };
    let entry_fee = trade_amount * config.commission_pct;
    let actual_investment = trade_amount - entry_fee;
    let quantity = actual_investment / entry_price;

    *free_capital -= trade_amount;
    open.push(Position {
        direction,
        entry_index: i,
        entry_time: time,
        entry_price,
        quantity,
        entry_fee,
        entry_investment: trade_amount,
        current_value: actual_investment,
    });

    true
}
