//! Barlab core engine
//!
//! Simulates portfolio evolution bar-by-bar from a price series and per-bar
//! entry/exit signal vectors. Each bar is processed in a fixed order: open
//! positions are marked to market, exit and entry signals are applied per the
//! configured priority, and the equity vectors are written in place. The run
//! produces a chronological trade ledger, a per-bar equity series, and
//! aggregate performance metrics.

pub mod domain;
pub mod engine;
pub mod error;
pub mod metrics;

pub use domain::{
    BacktestConfig, Direction, EquitySeries, ExitReason, Position, SignalPriority, Timeframe,
    Trade, TradeMode,
};
pub use engine::{simulate, RunResult};
pub use error::EngineError;
pub use metrics::{EquityPoint, Metrics};
