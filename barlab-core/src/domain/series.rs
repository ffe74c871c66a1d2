//! Per-bar equity accounting vectors.

use serde::{Deserialize, Serialize};

/// Four parallel vectors of length N, written in place by the simulator.
///
/// `total_capital[i] = free_capital[i] + position_value[i]` holds at the end
/// of every bar. `bar_return[0]` is always 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquitySeries {
    pub free_capital: Vec<f64>,
    pub position_value: Vec<f64>,
    pub total_capital: Vec<f64>,
    pub bar_return: Vec<f64>,
}

impl EquitySeries {
    /// Allocate all vectors at length `n`, seeded with the starting cash.
    pub fn with_capital(n: usize, initial_capital: f64) -> Self {
        Self {
            free_capital: vec![initial_capital; n],
            position_value: vec![0.0; n],
            total_capital: vec![initial_capital; n],
            bar_return: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.total_capital.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_capital.is_empty()
    }

    /// Record the end-of-bar state at index `i`.
    ///
    /// The bar return compares against the previous total and is 0 whenever
    /// the previous total is not strictly positive.
    pub fn record(&mut self, i: usize, free_capital: f64, position_value: f64) {
        self.free_capital[i] = free_capital;
        self.position_value[i] = position_value;
        self.total_capital[i] = free_capital + position_value;
        if i > 0 {
            let prev = self.total_capital[i - 1];
            self.bar_return[i] = if prev > 0.0 {
                self.total_capital[i] / prev - 1.0
            } else {
                0.0
            };
        }
    }

    /// Overwrite the final bar's capital split after an end-of-run flush.
    ///
    /// The already-computed bar return is left untouched.
    pub fn overwrite_last(&mut self, free_capital: f64, position_value: f64) {
        if let Some(last) = self.total_capital.len().checked_sub(1) {
            self.free_capital[last] = free_capital;
            self.position_value[last] = position_value;
            self.total_capital[last] = free_capital + position_value;
        }
    }

    /// Cumulative return in percent, by multiplicative accumulation of the
    /// per-bar returns.
    pub fn cumulative_returns(&self) -> Vec<f64> {
        let mut acc = 1.0;
        self.bar_return
            .iter()
            .map(|r| {
                acc *= 1.0 + r;
                (acc - 1.0) * 100.0
            })
            .collect()
    }
}
