//! Function evaluation error types

use duke_calc_core::ErrorCode;
use thiserror::Error;

/// Result of a single function body
///
/// `Err` carries the spreadsheet error the cell will display; the dispatcher folds it into
/// [`duke_calc_core::Value::Error`].
pub type EvalResult<T> = std::result::Result<T, ErrorCode>;

/// Result type for engine-level operations
pub type FunctionResult<T> = std::result::Result<T, FunctionError>;

/// Engine-level failures
///
/// These are never spreadsheet values: they mean the engine cannot service the call at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FunctionError {
    /// Function name unknown to the catalog, or a known Excel function with no
    /// implementation yet
    #[error("Function not implemented: {0}")]
    NotImplemented(String),

    /// Internal defect: a function produced a value the calling convention forbids
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}
