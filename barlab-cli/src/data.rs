//! CSV market-data loader: one row per bar with date, price, and signals.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Parallel input vectors for one backtest.
#[derive(Debug, Default)]
pub struct MarketData {
    pub dates: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    pub entries: Vec<i32>,
    pub exits: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    price: f64,
    #[serde(default)]
    entry: i32,
    #[serde(default)]
    exit: i32,
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }
    bail!("unparseable date \"{raw}\" (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")
}

/// Load bars from a CSV file with columns `date,price,entry,exit`.
pub fn load_csv(path: &Path) -> Result<MarketData> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open data CSV {}", path.display()))?;

    let mut data = MarketData::default();
    for (line, record) in reader.deserialize::<Row>().enumerate() {
        let row = record.with_context(|| format!("bad row {} in {}", line + 2, path.display()))?;
        data.dates.push(parse_date(&row.date)?);
        data.prices.push(row.price);
        data.entries.push(row.entry);
        data.exits.push(row.exit);
    }

    if data.prices.is_empty() {
        bail!("data CSV {} contains no rows", path.display());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_dates_prices_and_signals() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,price,entry,exit").unwrap();
        writeln!(file, "2024-01-01,100.0,1,0").unwrap();
        writeln!(file, "2024-01-02 12:30:00,110.5,0,-1").unwrap();
        file.flush().unwrap();

        let data = load_csv(file.path()).unwrap();
        assert_eq!(data.prices, vec![100.0, 110.5]);
        assert_eq!(data.entries, vec![1, 0]);
        assert_eq!(data.exits, vec![0, -1]);
        assert_eq!(
            data.dates[1].format("%H:%M:%S").to_string(),
            "12:30:00"
        );
    }

    #[test]
    fn rejects_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,price,entry,exit").unwrap();
        file.flush().unwrap();
        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn rejects_malformed_date() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,price,entry,exit").unwrap();
        writeln!(file, "01/02/2024,100.0,0,0").unwrap();
        file.flush().unwrap();
        assert!(load_csv(file.path()).is_err());
    }
}
