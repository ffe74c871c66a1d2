//! Bar-by-bar simulation loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BacktestConfig, EquitySeries, ExitReason, Position, SignalPriority, Trade};
use crate::engine::entries::process_entry;
use crate::engine::exits::{close_position, process_exits};
use crate::error::EngineError;
use crate::metrics::Metrics;

/// Everything a completed run produces: the chronological trade ledger, the
/// per-bar equity series, and the aggregate metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<Trade>,
    pub equity: EquitySeries,
    pub metrics: Metrics,
}

/// Run a backtest over equal-length price, signal, and date vectors.
///
/// Deterministic: the same inputs produce bit-identical outputs. Length
/// mismatches and invalid parameters fail before any bar is processed; an
/// empty price series yields an empty ledger and zeroed metrics.
pub fn simulate(
    config: &BacktestConfig,
    prices: &[f64],
    entries: &[i32],
    exits: &[i32],
    dates: &[DateTime<Utc>],
) -> Result<RunResult, EngineError> {
    config.validate()?;
    if prices.len() != entries.len() || prices.len() != exits.len() || prices.len() != dates.len()
    {
        return Err(EngineError::LengthMismatch {
            prices: prices.len(),
            entries: entries.len(),
            exits: exits.len(),
            dates: dates.len(),
        });
    }

    let n = prices.len();
    if n == 0 {
        return Ok(RunResult::default());
    }

    let mut equity = EquitySeries::with_capital(n, config.initial_capital);
    let mut ledger: Vec<Trade> = Vec::with_capacity((n / 5).min(1000));
    let mut open: Vec<Position> = Vec::with_capacity(config.max_positions.max(1));
    let mut free_capital = config.initial_capital;

    for i in 0..n {
        let price = prices[i];
        let time = dates[i];

        for pos in open.iter_mut() {
            pos.mark_to_market(price);
        }

        // The ordering rule lives in this one match.
        match config.signal_priority {
            SignalPriority::ExitFirst => {
                process_exits(
                    &mut open,
                    &mut ledger,
                    i,
                    price,
                    time,
                    exits[i],
                    config,
                    &mut free_capital,
                );
                process_entry(
                    &mut open,
                    i,
                    price,
                    time,
                    entries[i],
                    config,
                    &mut free_capital,
                );
            }
            SignalPriority::EntryFirst => {
                process_entry(
                    &mut open,
                    i,
                    price,
                    time,
                    entries[i],
                    config,
                    &mut free_capital,
                );
                process_exits(
                    &mut open,
                    &mut ledger,
                    i,
                    price,
                    time,
                    exits[i],
                    config,
                    &mut free_capital,
                );
            }
            SignalPriority::SameBarTrade => {
                process_exits(
                    &mut open,
                    &mut ledger,
                    i,
                    price,
                    time,
                    exits[i],
                    config,
                    &mut free_capital,
                );
                let entered = process_entry(
                    &mut open,
                    i,
                    price,
                    time,
                    entries[i],
                    config,
                    &mut free_capital,
                );
                // Second pass so the position opened above may close on the
                // same bar. Signal exits stay gated by the minimum holding
                // period, which is zero bars here, so only a configured
                // min_holding_period of 0 lets the signal path fire.
                if entered {
                    process_exits(
                        &mut open,
                        &mut ledger,
                        i,
                        price,
                        time,
                        exits[i],
                        config,
                        &mut free_capital,
                    );
                }
            }
        }

        let position_value: f64 = open.iter().map(|p| p.current_value).sum();
        equity.record(i, free_capital, position_value);
    }

    if config.force_close_at_end && !open.is_empty() {
        let last = n - 1;
        for pos in open.drain(..) {
            let trade = close_position(
                pos,
                last,
                prices[last],
                dates[last],
                ExitReason::EndOfBacktest,
                config,
            );
            free_capital += trade.exit_value;
            ledger.push(trade);
        }
        equity.overwrite_last(free_capital, 0.0);
    }

    let metrics = Metrics::compute(
        &equity,
        dates,
        &ledger,
        config.initial_capital,
        config.timeframe.periods_per_year(),
        0.0,
    );

    Ok(RunResult {
        trades: ledger,
        equity,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, TradeMode};
    use chrono::TimeZone;

    fn dates(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(i as i64))
            .collect()
    }

    fn base_config() -> BacktestConfig {
        BacktestConfig {
            initial_capital: 1000.0,
            position_size_pct: 1.0,
            commission_pct: 0.0,
            min_holding_period: 1,
            force_close_at_end: false,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_length_mismatch() {
        let cfg = base_config();
        let err = simulate(&cfg, &[100.0, 101.0], &[0], &[0, 0], &dates(2)).unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { .. }));
    }

    #[test]
    fn empty_series_yields_empty_result() {
        let cfg = base_config();
        let result = simulate(&cfg, &[], &[], &[], &[]).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.equity.is_empty());
        assert_eq!(result.metrics.total_trades, 0);
        assert_eq!(result.metrics.end_value, 0.0);
    }

    #[test]
    fn flat_run_keeps_capital_constant() {
        let cfg = base_config();
        let n = 10;
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let result = simulate(&cfg, &prices, &vec![0; n], &vec![0; n], &dates(n)).unwrap();

        assert!(result.trades.is_empty());
        for i in 0..n {
            assert_eq!(result.equity.total_capital[i], 1000.0);
        }
    }

    #[test]
    fn entry_first_can_exit_position_opened_earlier() {
        // With entry_first the exit scan at bar 0 runs after the entry, but
        // min_holding blocks a same-bar signal exit anyway.
        let cfg = BacktestConfig {
            signal_priority: SignalPriority::EntryFirst,
            ..base_config()
        };
        let prices = [100.0, 110.0, 120.0];
        let result = simulate(&cfg, &prices, &[1, 0, 0], &[0, 0, -1], &dates(3)).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_index, 2);
    }

    #[test]
    fn short_round_trip_total_capital_tracks_price() {
        let cfg = BacktestConfig {
            trade_mode: TradeMode::Short,
            ..base_config()
        };
        let prices = [100.0, 95.0, 90.0];
        let result = simulate(&cfg, &prices, &[-1, 0, 0], &[0, 0, 1], &dates(3)).unwrap();

        // Mark-to-market at bar 1: reserved 1000 plus 5 points on 10 units.
        assert!((result.equity.total_capital[1] - 1050.0).abs() < 1e-9);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].direction, Direction::Short);
        assert!((result.trades[0].profit - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ledger_is_ordered_by_exit_index() {
        let cfg = BacktestConfig {
            max_positions: 0,
            position_size_pct: 0.5,
            min_holding_period: 0,
            max_holding_period: 3,
            ..base_config()
        };
        let n = 12;
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + (i % 4) as f64).collect();
        let entries: Vec<i32> = (0..n).map(|i| if i % 2 == 0 { 1 } else { 0 }).collect();
        let result = simulate(&cfg, &prices, &entries, &vec![0; n], &dates(n)).unwrap();

        assert!(result.trades.len() > 1);
        for pair in result.trades.windows(2) {
            assert!(pair[0].exit_index <= pair[1].exit_index);
        }
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let cfg = BacktestConfig {
            commission_pct: 0.00137,
            slippage_pct: 0.0009,
            take_profit_pct: 0.03,
            stop_loss_pct: 0.02,
            ..base_config()
        };
        let n = 64;
        let prices: Vec<f64> = (0..n)
            .map(|i| 100.0 * (1.0 + 0.01 * ((i * 7 % 13) as f64 - 6.0) / 6.0))
            .collect();
        let entries: Vec<i32> = (0..n).map(|i| if i % 5 == 0 { 1 } else { 0 }).collect();
        let exits: Vec<i32> = (0..n).map(|i| if i % 7 == 0 { -1 } else { 0 }).collect();

        let a = simulate(&cfg, &prices, &entries, &exits, &dates(n)).unwrap();
        let b = simulate(&cfg, &prices, &entries, &exits, &dates(n)).unwrap();

        assert_eq!(a.trades.len(), b.trades.len());
        for (x, y) in a.trades.iter().zip(&b.trades) {
            assert_eq!(x.profit.to_bits(), y.profit.to_bits());
            assert_eq!(x.exit_price.to_bits(), y.exit_price.to_bits());
        }
        assert_eq!(
            a.metrics.sharpe.to_bits(),
            b.metrics.sharpe.to_bits()
        );
    }
}
