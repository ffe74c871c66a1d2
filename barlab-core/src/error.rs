use thiserror::Error;

/// Invalid-input failures raised at construction, before any simulation runs.
///
/// Numeric edge cases (zero variance, single bar, empty series) are never
/// errors: metric computations fall back to deterministic values instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input vectors must share one length: prices={prices}, entries={entries}, exits={exits}, dates={dates}")]
    LengthMismatch {
        prices: usize,
        entries: usize,
        exits: usize,
        dates: usize,
    },

    #[error("exit signals not found for strategy \"{0}\"")]
    MissingExits(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
