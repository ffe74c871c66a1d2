//! Domain types — the vocabulary of the engine.
//!
//! Configuration, open positions, completed trades, and the per-bar equity
//! series that every other module builds on.

pub mod config;
pub mod position;
pub mod series;
pub mod trade;

pub use config::{BacktestConfig, SignalPriority, Timeframe, TradeMode};
pub use position::{Direction, Position};
pub use series::EquitySeries;
pub use trade::{ExitReason, Trade};
