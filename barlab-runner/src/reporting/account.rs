//! Per-bar account-details CSV, reconstructed from the trade ledger.
//!
//! The writer replays entry and exit cash events against the price series to
//! rebuild balance, position value, and drawdown at every bar, then appends
//! a summary block.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

use barlab_core::{Direction, Trade};

/// Format a timestamp for the CSV, clamping implausible years.
///
/// Dates before 1970 or beyond 2100 keep their month/day/time but have the
/// year replaced with the current one; each replacement logs a warning.
fn format_timestamp(time: DateTime<Utc>) -> String {
    let formatted = time.format("%Y-%m-%d %H:%M:%S").to_string();
    let year = time.year();
    if !(1970..=2100).contains(&year) {
        let current_year = Utc::now().year();
        warn!(%formatted, current_year, "implausible date in account details, clamping year");
        return format!("{current_year}{}", &formatted[formatted.len() - 15..]);
    }
    formatted
}

/// Value of an open trade at the given price, per direction.
fn open_value(trade: &Trade, price: f64) -> f64 {
    match trade.direction {
        Direction::Long => trade.quantity * price,
        Direction::Short => {
            trade.entry_investment + (trade.entry_price - price) * trade.quantity
        }
    }
}

/// Write per-bar account rows plus a summary block.
///
/// Columns: `Date, Price, Balance, Position Value, Total Value, Profit/Loss,
/// Cumulative Return (%), Drawdown (%), Active Trades`.
pub fn write_account_details_csv(
    path: &Path,
    trades: &[Trade],
    prices: &[f64],
    dates: &[DateTime<Utc>],
    initial_capital: f64,
) -> Result<()> {
    if trades.is_empty() {
        bail!("no trades provided for account details generation");
    }
    if prices.is_empty() || prices.len() != dates.len() {
        bail!(
            "invalid price/date series for account details: {} prices, {} dates",
            prices.len(),
            dates.len()
        );
    }

    // Cash events in bar order; entries before exits on the same bar.
    struct CashEvent {
        bar: usize,
        is_entry: bool,
        trade_id: usize,
    }
    let mut events = Vec::with_capacity(trades.len() * 2);
    for (trade_id, trade) in trades.iter().enumerate() {
        events.push(CashEvent {
            bar: trade.entry_index,
            is_entry: true,
            trade_id,
        });
        events.push(CashEvent {
            bar: trade.exit_index,
            is_entry: false,
            trade_id,
        });
    }
    events.sort_by_key(|e| e.bar);

    let file = File::create(path)
        .with_context(|| format!("failed to create account details CSV {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "Date,Price,Balance,Position Value,Total Value,Profit/Loss,Cumulative Return (%),Drawdown (%),Active Trades"
    )?;

    let mut balance = initial_capital;
    let mut peak_value = initial_capital;
    let mut max_drawdown = 0.0_f64;
    let mut active: Vec<usize> = Vec::new();
    let mut next_event = 0;

    for (i, (&price, &date)) in prices.iter().zip(dates).enumerate() {
        while next_event < events.len() && events[next_event].bar <= i {
            let event = &events[next_event];
            let trade = &trades[event.trade_id];
            if event.is_entry {
                balance -= trade.entry_investment;
                active.push(event.trade_id);
            } else {
                balance += trade.exit_value;
                active.retain(|&id| id != event.trade_id);
            }
            next_event += 1;
        }

        let position_value: f64 = active.iter().map(|&id| open_value(&trades[id], price)).sum();
        let total_value = balance + position_value;
        let profit_loss = total_value - initial_capital;
        let cumulative_return = (total_value / initial_capital - 1.0) * 100.0;

        peak_value = peak_value.max(total_value);
        let drawdown = (peak_value - total_value) / peak_value * 100.0;
        max_drawdown = max_drawdown.max(drawdown);

        writeln!(
            out,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
            format_timestamp(date),
            price,
            balance,
            position_value,
            total_value,
            profit_loss,
            cumulative_return,
            drawdown,
            active.len()
        )?;
    }

    let final_value = balance; // all events consumed by the last bar
    let total_return = (final_value / initial_capital - 1.0) * 100.0;

    writeln!(out)?;
    writeln!(out, "Summary Statistics")?;
    writeln!(out, "Initial Capital,{initial_capital:.2}")?;
    writeln!(out, "Final Value,{final_value:.2}")?;
    writeln!(out, "Total Return (%),{total_return:.2}")?;
    writeln!(out, "Max Drawdown (%),{max_drawdown:.2}")?;
    writeln!(out, "Total Trades,{}", trades.len())?;
    writeln!(out, "Total Data Points,{}", dates.len())?;

    out.flush()?;
    Ok(())
}
