//! # duke-calc
//!
//! An Excel-compatible spreadsheet function evaluation engine.
//!
//! The engine evaluates built-in functions over operands that an upstream cell-evaluation
//! layer has already resolved. It never reads a workbook itself: references arrive with
//! their content and areas arrive as materialized grids.
//!
//! ## Features
//!
//! - Lookup functions (VLOOKUP, HLOOKUP, LOOKUP, MATCH, INDEX) with Excel's binary-search
//!   and wildcard semantics
//! - Aggregate and statistical functions, including COUNTIF/SUMIF criteria
//! - Text, date (1900 and 1904 systems), financial, logical and information functions
//! - A case-insensitive function catalog with arity checks
//!
//! ## Example
//!
//! ```rust
//! use duke_calc::prelude::*;
//!
//! let range = Area::column(0, 0, vec![
//!     Value::Number(1.0),
//!     Value::Number(2.0),
//!     Value::text("apple"),
//! ]).unwrap();
//!
//! let ctx = EvaluationContext::simple();
//! let count = evaluate("COUNTIF", &[Value::Range(range), Value::text(">1")], &ctx).unwrap();
//! assert_eq!(count, Value::Number(1.0));
//!
//! // Spreadsheet errors are ordinary values
//! let avg = evaluate("AVERAGE", &[Value::text("x")], &ctx).unwrap();
//! assert_eq!(avg, Value::Error(ErrorCode::InvalidValue));
//! ```

pub mod prelude;

// Re-export core types
pub use duke_calc_core::{Area, CellRef, Error, ErrorCode, Result, Value, MAX_COLS, MAX_ROWS};

// Re-export function engine
pub use duke_calc_functions::{
    build_predicate, evaluate, evaluate_at, registry, CriteriaPredicate, EngineSettings,
    EvalResult, EvaluationContext, FunctionDef, FunctionError, FunctionImpl, FunctionRegistry,
    FunctionResult,
};

/// Building blocks for implementing further functions in the same conventions
pub use duke_calc_functions::{criteria, lookup_utils, mathx, multi_operand, resolver};
