//! Prelude module - common imports for duke-calc users
//!
//! ```rust
//! use duke_calc::prelude::*;
//! ```

pub use crate::{
    // Value model
    Area,
    CellRef,
    // Settings and context
    EngineSettings,
    ErrorCode,
    EvaluationContext,
    // Errors
    FunctionError,
    FunctionResult,
    Value,

    // Entry points
    evaluate,
    evaluate_at,
};
