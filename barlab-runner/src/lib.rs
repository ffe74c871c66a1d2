//! # Barlab Runner
//!
//! Batch execution layer above the core engine.
//!
//! ## Components
//!
//! - `MultiRunner`: runs the simulator once per named (entries, exits) pair
//!   with fully independent state, optionally across worker threads
//! - `reporting`: CSV/JSON artifact writers — per-bar account details,
//!   trade tape, equity curve

pub mod multi;
pub mod reporting;

pub use multi::{MultiRunResult, MultiRunner};
