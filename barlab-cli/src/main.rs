//! Barlab CLI — run a backtest from a TOML config and a CSV data file.
//!
//! Subcommand:
//!   - `run` — simulate, print the metrics summary, optionally write the
//!     account-details / trade-tape / equity-curve artifacts

mod config;
mod data;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use barlab_core::simulate;
use barlab_runner::reporting::{
    write_account_details_csv, write_equity_csv, write_trades_csv, write_trades_json,
};

use crate::config::RunFileConfig;

#[derive(Parser)]
#[command(name = "barlab", version, about = "Signal-vector backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the TOML run configuration
    #[arg(long)]
    config: PathBuf,

    /// Path to the CSV data file (columns: date,price,entry,exit)
    #[arg(long)]
    data: PathBuf,

    /// Directory for report artifacts; skipped when absent
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = RunFileConfig::from_file(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?
        .to_engine_config()?;
    let market = data::load_csv(&args.data)?;

    info!(bars = market.prices.len(), "running backtest");
    let result = simulate(
        &config,
        &market.prices,
        &market.entries,
        &market.exits,
        &market.dates,
    )?;

    let m = &result.metrics;
    println!("Start value:          {:>14.2}", m.start_value);
    println!("End value:            {:>14.2}", m.end_value);
    println!("Total return:         {:>13.2}%", m.total_return_pct);
    println!("Annualized return:    {:>13.2}%", m.annualized_return_pct);
    println!("Max drawdown:         {:>13.2}%", m.max_drawdown_pct);
    println!("Trades:               {:>14}", m.total_trades);
    println!("Win rate:             {:>13.2}%", m.win_rate_pct);
    println!("Profit factor:        {:>14.2}", m.profit_factor);
    println!("Sharpe:               {:>14.2}", m.sharpe);
    println!("Sortino:              {:>14.2}", m.sortino);
    println!("Calmar:               {:>14.2}", m.calmar);

    if let Some(out_dir) = args.out_dir {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        write_trades_csv(&out_dir.join("trades.csv"), &result.trades)?;
        write_trades_json(&out_dir.join("trades.json"), &result.trades)?;
        write_equity_csv(&out_dir.join("equity.csv"), &market.dates, &result.equity)?;
        if !result.trades.is_empty() {
            write_account_details_csv(
                &out_dir.join("account_details.csv"),
                &result.trades,
                &market.prices,
                &market.dates,
                config.initial_capital,
            )?;
        }
        info!(dir = %out_dir.display(), "artifacts written");
    }

    Ok(())
}
