//! End-to-end scenarios for the bar loop: exact money accounting for long
//! and short round-trips, exit-rule precedence, signal priorities, and the
//! end-of-run flush.

use barlab_core::{
    simulate, BacktestConfig, Direction, EngineError, ExitReason, SignalPriority, TradeMode,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn dates(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

fn no_cost_config() -> BacktestConfig {
    BacktestConfig {
        initial_capital: 1000.0,
        position_size_pct: 1.0,
        commission_pct: 0.0,
        slippage_pct: 0.0,
        min_holding_period: 1,
        max_positions: 10,
        force_close_at_end: false,
        ..Default::default()
    }
}

#[test]
fn single_long_round_trip_no_costs() {
    let cfg = no_cost_config();
    let result = simulate(&cfg, &[100.0, 110.0], &[1, 0], &[0, -1], &dates(2)).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, Direction::Long);
    assert_eq!(trade.entry_price, 100.0);
    assert_eq!(trade.exit_price, 110.0);
    assert_eq!(trade.quantity, 10.0);
    assert!((trade.profit - 100.0).abs() < 1e-9);
    assert!((trade.profit_pct - 10.0).abs() < 1e-9);
    assert_eq!(trade.exit_reason, ExitReason::ExitSignal);
    assert!((result.metrics.end_value - 1100.0).abs() < 1e-9);
}

#[test]
fn take_profit_fires_before_exit_signal() {
    let cfg = BacktestConfig {
        take_profit_pct: 0.10,
        min_holding_period: 0,
        ..no_cost_config()
    };
    let result = simulate(
        &cfg,
        &[100.0, 105.0, 120.0],
        &[1, 0, 0],
        &[0, 0, -1],
        &dates(3),
    )
    .unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_index, 2);
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_eq!(trade.exit_price, 120.0);
    assert!((trade.profit_pct - 20.0).abs() < 1e-9);
}

#[test]
fn stop_loss_takes_precedence_over_max_holding() {
    let cfg = BacktestConfig {
        stop_loss_pct: 0.10,
        max_holding_period: 1,
        min_holding_period: 0,
        ..no_cost_config()
    };
    let result = simulate(&cfg, &[100.0, 80.0], &[1, 0], &[0, 0], &dates(2)).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].exit_index, 1);
    assert_eq!(result.trades[0].exit_reason, ExitReason::StopLoss);
}

#[test]
fn short_round_trip_with_fees() {
    let cfg = BacktestConfig {
        trade_mode: TradeMode::Short,
        commission_pct: 0.001,
        ..no_cost_config()
    };
    let result = simulate(&cfg, &[100.0, 90.0], &[-1, 0], &[0, 1], &dates(2)).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, Direction::Short);
    assert!((trade.entry_fee - 1.0).abs() < 1e-12);
    assert!((trade.quantity - 9.99).abs() < 1e-12);
    let buyback = 9.99 * 90.0;
    assert!((trade.exit_fee - buyback * 0.001).abs() < 1e-9);
    assert!((trade.profit - (1000.0 - 899.10 - 0.89910)).abs() < 1e-9);
    assert!((result.metrics.end_value - 1100.00090).abs() < 1e-6);
}

#[test]
fn same_bar_trade_enters_and_exits_on_one_bar() {
    let cfg = BacktestConfig {
        signal_priority: SignalPriority::SameBarTrade,
        min_holding_period: 0,
        ..no_cost_config()
    };
    let result = simulate(
        &cfg,
        &[100.0, 110.0, 110.0],
        &[0, 1, 0],
        &[0, -1, 0],
        &dates(3),
    )
    .unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.entry_index, 1);
    assert_eq!(trade.exit_index, 1);
    assert!((trade.profit - 0.0).abs() < 1e-9);
}

#[test]
fn same_bar_trade_blocked_by_min_holding() {
    let cfg = BacktestConfig {
        signal_priority: SignalPriority::SameBarTrade,
        min_holding_period: 1,
        ..no_cost_config()
    };
    let result = simulate(
        &cfg,
        &[100.0, 110.0, 120.0],
        &[0, 1, 0],
        &[0, -1, -1],
        &dates(3),
    )
    .unwrap();

    // The same-bar signal exit is suppressed; the exit lands one bar later.
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].entry_index, 1);
    assert_eq!(result.trades[0].exit_index, 2);
}

#[test]
fn same_bar_trade_stop_loss_ignores_min_holding() {
    // The second exit pass checks the full ladder, not just the signal path.
    // Heavy slippage puts the fill far enough above the bar price that the
    // stop-loss fires on the entry bar despite the minimum holding period.
    let cfg = BacktestConfig {
        signal_priority: SignalPriority::SameBarTrade,
        min_holding_period: 5,
        stop_loss_pct: 0.04,
        slippage_pct: 0.05,
        ..no_cost_config()
    };
    let result = simulate(&cfg, &[100.0, 100.0], &[1, 0], &[0, 0], &dates(2)).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].entry_index, 0);
    assert_eq!(result.trades[0].exit_index, 0);
    assert_eq!(result.trades[0].exit_reason, ExitReason::StopLoss);
}

#[test]
fn force_close_at_end_flushes_open_positions() {
    let cfg = BacktestConfig {
        force_close_at_end: true,
        ..no_cost_config()
    };
    let result = simulate(&cfg, &[100.0, 120.0], &[1, 0], &[0, 0], &dates(2)).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::EndOfBacktest);
    assert!((trade.profit - 20.0 * trade.quantity).abs() < 1e-9);
    assert_eq!(*result.equity.position_value.last().unwrap(), 0.0);
    assert!((result.metrics.end_value - 1200.0).abs() < 1e-9);
}

#[test]
fn no_flush_leaves_position_marked_to_market() {
    let cfg = no_cost_config();
    let result = simulate(&cfg, &[100.0, 120.0], &[1, 0], &[0, 0], &dates(2)).unwrap();

    assert!(result.trades.is_empty());
    assert!((result.equity.position_value[1] - 1200.0).abs() < 1e-9);
    assert!((result.metrics.end_value - 1200.0).abs() < 1e-9);
}

#[test]
fn entry_first_processes_entries_before_exits() {
    // At bar 1 both an exit for the old position and a fresh entry arrive.
    // With entry_first the new position is opened before the exit scan, so
    // the scan sees two positions and closes only the seasoned one.
    let cfg = BacktestConfig {
        signal_priority: SignalPriority::EntryFirst,
        position_size_pct: 0.5,
        ..no_cost_config()
    };
    let result = simulate(
        &cfg,
        &[100.0, 110.0, 120.0],
        &[1, 1, 0],
        &[0, -1, 0],
        &dates(3),
    )
    .unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].entry_index, 0);
    assert_eq!(result.trades[0].exit_index, 1);
}

#[test]
fn max_positions_zero_means_unlimited() {
    let cfg = BacktestConfig {
        max_positions: 0,
        position_size_pct: 0.1,
        ..no_cost_config()
    };
    let n = 20;
    let prices = vec![100.0; n];
    let entries = vec![1; n];
    let result = simulate(&cfg, &prices, &entries, &vec![0; n], &dates(n)).unwrap();

    assert!(result.trades.is_empty());
    // One position opened per bar, never blocked.
    assert!((result.equity.free_capital[n - 1] - 1000.0 * 0.9_f64.powi(n as i32)).abs() < 1e-6);
}

#[test]
fn long_short_mode_trades_both_directions() {
    let cfg = BacktestConfig {
        trade_mode: TradeMode::LongShort,
        min_holding_period: 0,
        position_size_pct: 0.5,
        ..no_cost_config()
    };
    let result = simulate(
        &cfg,
        &[100.0, 110.0, 100.0, 90.0],
        &[1, 0, -1, 0],
        &[0, -1, 0, 1],
        &dates(4),
    )
    .unwrap();

    assert_eq!(result.trades.len(), 2);
    assert_eq!(result.trades[0].direction, Direction::Long);
    assert_eq!(result.trades[1].direction, Direction::Short);
    assert!(result.trades[0].profit > 0.0);
    assert!(result.trades[1].profit > 0.0);
}

#[test]
fn mismatched_inputs_fail_before_simulation() {
    let cfg = no_cost_config();
    let err = simulate(&cfg, &[100.0, 110.0], &[1, 0, 0], &[0, -1], &dates(2)).unwrap_err();
    assert!(matches!(err, EngineError::LengthMismatch { .. }));
}

#[test]
fn invalid_parameters_fail_before_simulation() {
    let cfg = BacktestConfig {
        initial_capital: -5.0,
        ..no_cost_config()
    };
    let err = simulate(&cfg, &[100.0], &[0], &[0], &dates(1)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidParameter(_)));
}

#[test]
fn equity_identity_holds_every_bar() {
    let cfg = BacktestConfig {
        commission_pct: 0.002,
        slippage_pct: 0.001,
        take_profit_pct: 0.05,
        stop_loss_pct: 0.03,
        trade_mode: TradeMode::LongShort,
        min_holding_period: 0,
        max_positions: 3,
        position_size_pct: 0.4,
        force_close_at_end: true,
        ..no_cost_config()
    };
    let n = 200;
    let prices: Vec<f64> = (0..n)
        .map(|i| 100.0 + 10.0 * ((i as f64) * 0.37).sin())
        .collect();
    let entries: Vec<i32> = (0..n)
        .map(|i| match i % 6 {
            0 => 1,
            3 => -1,
            _ => 0,
        })
        .collect();
    let exits: Vec<i32> = (0..n)
        .map(|i| match i % 9 {
            4 => -1,
            7 => 1,
            _ => 0,
        })
        .collect();

    let result = simulate(&cfg, &prices, &entries, &exits, &dates(n)).unwrap();
    for i in 0..n {
        let sum = result.equity.free_capital[i] + result.equity.position_value[i];
        assert!(
            (result.equity.total_capital[i] - sum).abs() < 1e-9,
            "identity broken at bar {i}"
        );
    }
    // Flush leaves nothing open.
    assert_eq!(*result.equity.position_value.last().unwrap(), 0.0);
    for trade in &result.trades {
        assert!(trade.exit_index >= trade.entry_index);
    }
}
