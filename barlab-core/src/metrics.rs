//! Performance metrics — pure functions over the equity series and ledger.
//!
//! Every ratio has an explicit deterministic fallback for degenerate inputs
//! (zero variance, no downside, tiny drawdown): `0.0`, or the sentinel
//! `100.0` where the ratio is "as good as it gets". No metric ever returns
//! an infinity or NaN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EquitySeries, Trade};

/// One down-sampled point of the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: f64,
}

/// Aggregate performance metrics for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub start_value: f64,
    pub end_value: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate_pct: f64,
    pub profit_factor: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    /// `(date, total_capital)` pairs at stride `max(1, N / 1000)`.
    pub equity_curve: Vec<EquityPoint>,
}

impl Metrics {
    /// Compute all metrics from a finished run.
    ///
    /// `dates` must be at least as long as the equity series; the simulator
    /// guarantees this for its own outputs.
    pub fn compute(
        equity: &EquitySeries,
        dates: &[DateTime<Utc>],
        trades: &[Trade],
        initial_capital: f64,
        periods_per_year: u32,
        risk_free_rate: f64,
    ) -> Self {
        if equity.is_empty() {
            return Self::default();
        }

        let n = equity.len();
        let start_value = initial_capital;
        let end_value = *equity.total_capital.last().unwrap();
        let total_return_pct = (end_value / start_value - 1.0) * 100.0;

        let mut winning_trades = 0usize;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        for trade in trades {
            if trade.is_winner() {
                winning_trades += 1;
                gross_profit += trade.profit;
            } else {
                gross_loss -= trade.profit;
            }
        }
        let win_rate_pct = if trades.is_empty() {
            0.0
        } else {
            winning_trades as f64 / trades.len() as f64 * 100.0
        };
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        let max_drawdown_pct = max_drawdown_pct(&equity.total_capital);

        let years = n as f64 / periods_per_year as f64;
        let annualized_return_pct = if years > 0.0 && total_return_pct != 0.0 {
            ((1.0 + total_return_pct / 100.0).powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };

        let stride = (n / 1000).max(1);
        let equity_curve = (0..n)
            .step_by(stride)
            .map(|i| EquityPoint {
                time: dates[i],
                equity: equity.total_capital[i],
            })
            .collect();

        Self {
            start_value,
            end_value,
            total_return_pct,
            annualized_return_pct,
            max_drawdown_pct,
            total_trades: trades.len(),
            winning_trades,
            win_rate_pct,
            profit_factor,
            sharpe: annualized_sharpe(&equity.bar_return, risk_free_rate, periods_per_year),
            sortino: sortino_ratio(&equity.bar_return, risk_free_rate, periods_per_year),
            calmar: calmar_ratio(annualized_return_pct, max_drawdown_pct),
            equity_curve,
        }
    }
}

/// Largest peak-to-trough decline of the capital series, in percent.
pub fn max_drawdown_pct(total_capital: &[f64]) -> f64 {
    if total_capital.is_empty() {
        return 0.0;
    }
    let mut peak = total_capital[0];
    let mut max_dd = 0.0_f64;
    for &value in &total_capital[1..] {
        if value > peak {
            peak = value;
        } else {
            let dd = (peak - value) / peak * 100.0;
            max_dd = max_dd.max(dd);
        }
    }
    max_dd
}

/// Excess returns over the per-period risk-free rate, NaN entries dropped.
fn excess_returns(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> Vec<f64> {
    let period_rf = (1.0 + risk_free_rate).powf(1.0 / periods_per_year as f64) - 1.0;
    returns
        .iter()
        .filter(|r| !r.is_nan())
        .map(|r| r - period_rf)
        .collect()
}

/// Annualised Sharpe ratio over the per-bar returns.
///
/// Zero when there are no usable returns or the deviation vanishes.
pub fn annualized_sharpe(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> f64 {
    let excess = excess_returns(returns, risk_free_rate, periods_per_year);
    if excess.is_empty() {
        return 0.0;
    }

    let mean = excess.iter().sum::<f64>() / excess.len() as f64;
    let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / excess.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev <= f64::EPSILON {
        return 0.0;
    }

    mean / std_dev * (periods_per_year as f64).sqrt()
}

/// Annualised Sortino ratio: deviation counts only negative excess returns.
///
/// With no downside at all, the ratio is the sentinel 100 for a positive
/// mean and 0 otherwise.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> f64 {
    let excess = excess_returns(returns, risk_free_rate, periods_per_year);
    if excess.is_empty() {
        return 0.0;
    }

    let mean = excess.iter().sum::<f64>() / excess.len() as f64;

    let mut sum_sq_downside = 0.0;
    let mut downside_count = 0usize;
    for &r in &excess {
        if r < 0.0 {
            sum_sq_downside += r * r;
            downside_count += 1;
        }
    }

    if downside_count == 0 || sum_sq_downside <= f64::EPSILON {
        return if mean > 0.0 { 100.0 } else { 0.0 };
    }

    let downside_dev = (sum_sq_downside / downside_count as f64).sqrt();
    mean / downside_dev * (periods_per_year as f64).sqrt()
}

/// Calmar ratio: annualised return over max drawdown, both in percent.
///
/// A drawdown under one basis point collapses to the sentinel 100 (positive
/// return) or 0.
pub fn calmar_ratio(annualized_return_pct: f64, max_drawdown_pct: f64) -> f64 {
    if max_drawdown_pct < 0.01 {
        return if annualized_return_pct > 0.0 { 100.0 } else { 0.0 };
    }
    annualized_return_pct / max_drawdown_pct
}
