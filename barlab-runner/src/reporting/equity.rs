//! Equity curve export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use barlab_core::EquitySeries;

/// Write the per-bar equity vectors as CSV.
pub fn write_equity_csv(
    path: &Path,
    dates: &[DateTime<Utc>],
    equity: &EquitySeries,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "date,free_capital,position_value,total_capital,bar_return"
    )?;
    for (i, date) in dates.iter().enumerate().take(equity.len()) {
        writeln!(
            out,
            "{},{:.4},{:.4},{:.4},{:.8}",
            date.format("%Y-%m-%d %H:%M:%S"),
            equity.free_capital[i],
            equity.position_value[i],
            equity.total_capital[i],
            equity.bar_return[i]
        )?;
    }
    out.flush()?;
    Ok(())
}
