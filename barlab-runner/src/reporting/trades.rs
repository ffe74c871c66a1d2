//! Trade tape export (CSV/JSON).

use std::path::Path;

use anyhow::{Context, Result};

use barlab_core::Trade;

/// Write the trade ledger as CSV.
///
/// Columns: direction, entry_index, entry_time, entry_price, quantity,
/// entry_fee, entry_investment, exit_index, exit_time, exit_price, exit_fee,
/// exit_value, profit, profit_pct, exit_reason.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    wtr.write_record([
        "direction",
        "entry_index",
        "entry_time",
        "entry_price",
        "quantity",
        "entry_fee",
        "entry_investment",
        "exit_index",
        "exit_time",
        "exit_price",
        "exit_fee",
        "exit_value",
        "profit",
        "profit_pct",
        "exit_reason",
    ])?;

    for trade in trades {
        wtr.write_record([
            trade.direction.as_str().to_string(),
            trade.entry_index.to_string(),
            trade.entry_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.6}", trade.entry_price),
            format!("{:.6}", trade.quantity),
            format!("{:.6}", trade.entry_fee),
            format!("{:.6}", trade.entry_investment),
            trade.exit_index.to_string(),
            trade.exit_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.6}", trade.exit_price),
            format!("{:.6}", trade.exit_fee),
            format!("{:.6}", trade.exit_value),
            format!("{:.6}", trade.profit),
            format!("{:.4}", trade.profit_pct),
            trade.exit_reason.as_str().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the trade ledger as pretty JSON.
pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}
