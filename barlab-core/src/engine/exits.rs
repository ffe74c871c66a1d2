//! Exit processor — per-bar scan of the open set.

use chrono::{DateTime, Utc};

use crate::domain::{BacktestConfig, Direction, ExitReason, Position, Trade};

/// Decide whether `pos` must close on this bar.
///
/// Conditions are checked in a fixed order and the first match wins:
/// take-profit, stop-loss, max holding period, exit signal. Only the signal
/// path is gated by the minimum holding period.
fn exit_decision(
    pos: &Position,
    price: f64,
    holding_period: usize,
    exit_signal: i32,
    config: &BacktestConfig,
) -> Option<ExitReason> {
    let price_return = pos.price_return(price);

    if config.take_profit_pct > 0.0 && price_return >= config.take_profit_pct {
        return Some(ExitReason::TakeProfit);
    }
    if config.stop_loss_pct > 0.0 && price_return <= -config.stop_loss_pct {
        return Some(ExitReason::StopLoss);
    }
    if config.max_holding_period > 0 && holding_period >= config.max_holding_period {
        return Some(ExitReason::MaxHoldingPeriod);
    }

    let signal_matches = match pos.direction {
        Direction::Long => exit_signal == -1,
        Direction::Short => exit_signal == 1,
    };
    if signal_matches && holding_period >= config.min_holding_period {
        return Some(ExitReason::ExitSignal);
    }

    None
}

/// Turn an open position into a closed trade at the given bar.
///
/// Slippage is adverse per direction: a long sells below the bar price, a
/// short buys back above it. A short's exit value is its reserved cash plus
/// the realised profit, so both legs refund free capital the same way.
pub(crate) fn close_position(
    pos: Position,
    index: usize,
    price: f64,
    time: DateTime<Utc>,
    reason: ExitReason,
    config: &BacktestConfig,
) -> Trade {
    let (exit_price, exit_fee, exit_value, profit) = match pos.direction {
        Direction::Long => {
            let exit_price = price * (1.0 - config.slippage_pct);
            let gross = pos.quantity * exit_price;
            let exit_fee = gross * config.commission_pct;
            let exit_value = gross - exit_fee;
            let profit = exit_value - pos.entry_investment;
            (exit_price, exit_fee, exit_value, profit)
        }
        Direction::Short => {
            let exit_price = price * (1.0 + config.slippage_pct);
            let buyback = pos.quantity * exit_price;
            let exit_fee = buyback * config.commission_pct;
            let profit = pos.entry_investment - (buyback + exit_fee);
            let exit_value = pos.entry_investment + profit;
            (exit_price, exit_fee, exit_value, profit)
        }
    };

    let profit_pct = profit / pos.entry_investment * 100.0;

    Trade {
        direction: pos.direction,
        entry_index: pos.entry_index,
        entry_time: pos.entry_time,
        entry_price: pos.entry_price,
        quantity: pos.quantity,
        entry_fee: pos.entry_fee,
        entry_investment: pos.entry_investment,
        exit_index: index,
        exit_time: time,
        exit_price,
        exit_fee,
        exit_value,
        profit,
        profit_pct,
        exit_reason: reason,
    }
}

/// Scan the open set at bar `i`, closing every position whose exit condition
/// fires. Returns true if at least one position was closed.
///
/// When applying an exit leaves free capital below zero (pathological fee or
/// slippage settings), the remaining positions are flushed immediately with
/// the `force_exit` tag and the run continues from zero free capital.
#[allow(clippy::too_many_arguments)]
pub(crate) fn process_exits(
    open: &mut Vec<Position>,
    ledger: &mut Vec<Trade>,
    i: usize,
    price: f64,
    time: DateTime<Utc>,
    exit_signal: i32,
    config: &BacktestConfig,
    free_capital: &mut f64,
) -> bool {
    let mut exited = false;
    let mut k = 0;

    while k < open.len() {
        let holding_period = open[k].holding_period(i);
        match exit_decision(&open[k], price, holding_period, exit_signal, config) {
            Some(reason) => {
                exited = true;
                let pos = open.remove(k);
                let trade = close_position(pos, i, price, time, reason, config);
                *free_capital += trade.exit_value;
                ledger.push(trade);

                if *free_capital < 0.0 {
                    for pos in open.drain(..) {
                        let trade =
                            close_position(pos, i, price, time, ExitReason::ForceExit, config);
                        *free_capital += trade.exit_value;
                        ledger.push(trade);
                    }
                    *free_capital = free_capital.max(0.0);
                    return true;
                }
            }
            None => k += 1,
        }
    }

    exited
}
