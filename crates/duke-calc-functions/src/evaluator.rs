//! Function dispatch
//!
//! The single entry point the cell-evaluation layer calls: look the name up, check the
//! operand count, run the implementation and fold spreadsheet errors into the result.

use crate::context::{EngineSettings, EvaluationContext};
use crate::error::{FunctionError, FunctionResult};
use crate::functions::FunctionRegistry;
use duke_calc_core::{ErrorCode, Value};
use log::{debug, trace};
use once_cell::sync::Lazy;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// The built-in function catalog
pub fn registry() -> &'static FunctionRegistry {
    &FUNCTION_REGISTRY
}

/// Evaluate the built-in function `name` over already-resolved operands
///
/// Spreadsheet-level failures, wrong operand counts included, come back as
/// `Ok(Value::Error(_))`. `Err` is reserved for names the engine cannot run at all.
pub fn evaluate(
    name: &str,
    operands: &[Value],
    ctx: &EvaluationContext,
) -> FunctionResult<Value> {
    let Some(func) = registry().get(name) else {
        debug!(
            "refusing {}: {}",
            name,
            if registry().contains(name) {
                "known but not implemented"
            } else {
                "unknown function"
            }
        );
        return Err(FunctionError::NotImplemented(name.to_uppercase()));
    };

    trace!(
        "{}({} operands) at row {} col {}",
        func.name,
        operands.len(),
        ctx.row,
        ctx.col
    );

    if !func.accepts(operands.len()) {
        debug!(
            "{} called with {} operands, expected {}..{}",
            func.name,
            operands.len(),
            func.min_args,
            func.max_args.map_or_else(|| "".to_string(), |m| m.to_string())
        );
        return Ok(Value::Error(ErrorCode::InvalidValue));
    }

    let result = (func.implementation)(operands, ctx).unwrap_or_else(Value::Error);

    debug_assert!(
        !matches!(result, Value::Missing),
        "{} returned a missing-argument marker",
        func.name
    );
    if matches!(result, Value::Missing) {
        return Err(FunctionError::Invariant(format!(
            "{} returned a missing-argument marker",
            func.name
        )));
    }
    Ok(result)
}

/// Evaluate with default settings on behalf of the cell at `(row, col)`, 0-based
pub fn evaluate_at(
    name: &str,
    operands: &[Value],
    calling_cell: (u32, u32),
) -> FunctionResult<Value> {
    let settings = EngineSettings::default();
    let ctx = EvaluationContext::new(calling_cell.0, calling_cell.1, &settings);
    evaluate(name, operands, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_calc_core::Area;
    use pretty_assertions::assert_eq;

    fn eval(name: &str, operands: &[Value]) -> FunctionResult<Value> {
        evaluate(name, operands, &EvaluationContext::simple())
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(
            eval("sum", &[Value::Number(1.0), Value::Number(2.0)]),
            Ok(Value::Number(3.0))
        );
        assert_eq!(eval("PI", &[]), Ok(Value::Number(std::f64::consts::PI)));
    }

    #[test]
    fn test_errors_become_values() {
        assert_eq!(
            eval("AVERAGE", &[Value::Range(Area::column(0, 1, vec![Value::Blank]).unwrap())]),
            Ok(Value::Error(ErrorCode::DivideByZero))
        );
        assert_eq!(eval("NA", &[]), Ok(Value::Error(ErrorCode::NotAvailable)));
    }

    #[test]
    fn test_arity_mismatch_is_value_error() {
        assert_eq!(eval("ABS", &[]), Ok(Value::Error(ErrorCode::InvalidValue)));
        assert_eq!(
            eval("LEN", &[Value::text("a"), Value::text("b")]),
            Ok(Value::Error(ErrorCode::InvalidValue))
        );
    }

    #[test]
    fn test_not_implemented() {
        assert_eq!(
            eval("offset", &[Value::Number(1.0)]),
            Err(FunctionError::NotImplemented("OFFSET".into()))
        );
        assert_eq!(
            eval("NOSUCHFUNCTION", &[]),
            Err(FunctionError::NotImplemented("NOSUCHFUNCTION".into()))
        );
    }

    #[test]
    fn test_evaluate_at_uses_calling_cell() {
        assert_eq!(evaluate_at("ROW", &[], (4, 7)), Ok(Value::Number(5.0)));
        assert_eq!(evaluate_at("COLUMN", &[], (4, 7)), Ok(Value::Number(8.0)));
    }

    #[test]
    fn test_settings_reach_functions() {
        let settings = EngineSettings {
            date_1904: true,
            ..EngineSettings::default()
        };
        let ctx = EvaluationContext::new(0, 0, &settings);
        assert_eq!(
            evaluate("YEAR", &[Value::Number(0.0)], &ctx),
            Ok(Value::Number(1904.0))
        );
    }
}
