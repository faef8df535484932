//! Engine error types

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EngineError {
    #[error("Invalid board size {0} (expected 2..=16)")]
    InvalidSize(usize),

    #[error("Invalid spawn probability for 4: {0} (expected 0.0..=1.0)")]
    InvalidFourProbability(f64),

    #[error("Invalid start tile count {count} for a board of {cells} cells")]
    InvalidStartTiles { count: usize, cells: usize },

    #[error("Invalid tile value {0} (expected a power of two in 2..=2^30)")]
    InvalidTileValue(u32),

    #[error("Expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("Previous move has not completed (spawn pending)")]
    SpawnPending,

    #[error("No move pending completion")]
    NoMovePending,
}

/// Unrecognised direction text
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);
