//! Error types for duke-calc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building value-model instances
#[derive(Debug, Error)]
pub enum Error {
    /// The backing grid does not match the declared area shape
    #[error("Invalid area: {0}")]
    InvalidRange(String),

    /// Area extends past the sheet limits
    #[error("Area corner ({row}, {col}) is outside the sheet")]
    OutOfBounds { row: u64, col: u64 },
}
