//! Multi-strategy execution: one independent simulation per named signal pair.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use barlab_core::{simulate, BacktestConfig, EngineError, Metrics, RunResult};

/// Runs the simulator once per named (entries, exits) pair over a shared
/// price/date series. Strategies share no state and no capital, so they may
/// be simulated in parallel; each simulation itself stays single-threaded.
///
/// All pairs are validated up front: a missing exit vector or a length
/// mismatch fails construction before anything runs.
#[derive(Debug)]
pub struct MultiRunner {
    config: BacktestConfig,
    prices: Vec<f64>,
    dates: Vec<DateTime<Utc>>,
    strategies: BTreeMap<String, (Vec<i32>, Vec<i32>)>,
    parallel: bool,
}

impl MultiRunner {
    pub fn new(
        config: BacktestConfig,
        prices: Vec<f64>,
        dates: Vec<DateTime<Utc>>,
        entries: BTreeMap<String, Vec<i32>>,
        exits: BTreeMap<String, Vec<i32>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut strategies = BTreeMap::new();
        for (name, entry_signals) in entries {
            let exit_signals = exits
                .get(&name)
                .ok_or_else(|| EngineError::MissingExits(name.clone()))?
                .clone();
            if entry_signals.len() != prices.len()
                || exit_signals.len() != prices.len()
                || prices.len() != dates.len()
            {
                return Err(EngineError::LengthMismatch {
                    prices: prices.len(),
                    entries: entry_signals.len(),
                    exits: exit_signals.len(),
                    dates: dates.len(),
                });
            }
            strategies.insert(name, (entry_signals, exit_signals));
        }

        Ok(Self {
            config,
            prices,
            dates,
            strategies,
            parallel: true,
        })
    }

    /// Enable or disable parallel execution across strategies.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    /// Simulate every strategy and collect results keyed by name.
    pub fn run(&self) -> Result<MultiRunResult, EngineError> {
        let run_one = |name: &String, signals: &(Vec<i32>, Vec<i32>)| {
            simulate(
                &self.config,
                &self.prices,
                &signals.0,
                &signals.1,
                &self.dates,
            )
            .map(|result| (name.clone(), result))
        };

        let results: BTreeMap<String, RunResult> = if self.parallel {
            self.strategies
                .par_iter()
                .map(|(name, signals)| run_one(name, signals))
                .collect::<Result<_, _>>()?
        } else {
            self.strategies
                .iter()
                .map(|(name, signals)| run_one(name, signals))
                .collect::<Result<_, _>>()?
        };

        Ok(MultiRunResult { results })
    }
}

/// Results of a multi-strategy run, one full `RunResult` per strategy name.
#[derive(Debug, Clone, Default)]
pub struct MultiRunResult {
    results: BTreeMap<String, RunResult>,
}

impl MultiRunResult {
    pub fn get(&self, name: &str) -> Option<&RunResult> {
        self.results.get(name)
    }

    /// The `{name → metrics}` view.
    pub fn metrics_by_name(&self) -> BTreeMap<&str, &Metrics> {
        self.results
            .iter()
            .map(|(name, result)| (name.as_str(), &result.metrics))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunResult)> {
        self.results.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
