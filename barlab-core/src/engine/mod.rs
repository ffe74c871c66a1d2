//! The bar loop and its two signal processors.
//!
//! Per bar: mark-to-market, then exit/entry processing in the order chosen
//! by the configured signal priority, then equity recording. The loop is
//! single-threaded; its semantics depend on strict bar-by-bar ordering.

pub mod entries;
pub mod exits;
pub mod simulator;

pub use simulator::{simulate, RunResult};
