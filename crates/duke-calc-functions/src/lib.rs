//! # duke-calc-functions
//!
//! Excel-compatible built-in function library for duke-calc.
//!
//! This crate provides:
//! - Operand resolution and Excel's coercion rules ([`resolver`])
//! - Pure numeric/statistical primitives ([`mathx`])
//! - Shared machinery for variadic numeric functions ([`multi_operand`])
//! - COUNTIF/SUMIF criteria predicates ([`criteria`])
//! - VLOOKUP/HLOOKUP/MATCH search helpers ([`lookup_utils`])
//! - The built-in function catalog and registry ([`functions`])
//! - The dispatch entry point ([`evaluate`])
//!
//! ## Example
//!
//! ```rust
//! use duke_calc_core::{Area, Value};
//! use duke_calc_functions::{evaluate, EvaluationContext};
//!
//! let table = Area::new(0, 0, vec![
//!     vec![Value::Number(1.0), Value::text("a")],
//!     vec![Value::Number(2.0), Value::text("b")],
//! ]).unwrap();
//!
//! let ctx = EvaluationContext::simple();
//! let args = [Value::Number(2.0), Value::Range(table), Value::Number(2.0), Value::Boolean(false)];
//! assert_eq!(evaluate("VLOOKUP", &args, &ctx).unwrap(), Value::text("b"));
//! ```

pub mod context;
pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lookup_utils;
pub mod mathx;
pub mod multi_operand;
pub mod resolver;

pub use context::{EngineSettings, EvaluationContext};
pub use criteria::{build_predicate, CriteriaPredicate};
pub use error::{EvalResult, FunctionError, FunctionResult};
pub use evaluator::{evaluate, evaluate_at, registry};
pub use functions::{FunctionDef, FunctionImpl, FunctionRegistry};
