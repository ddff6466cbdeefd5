//! Information functions

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::resolver::{arg, single_value};
use duke_calc_core::{ErrorCode, Value};

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("ISERROR", 1, Some(1), fn_iserror),
    FunctionDef::new("ISERR", 1, Some(1), fn_iserr),
    FunctionDef::new("ISNA", 1, Some(1), fn_isna),
    FunctionDef::new("ISBLANK", 1, Some(1), fn_isblank),
    FunctionDef::new("ISNUMBER", 1, Some(1), fn_isnumber),
    FunctionDef::new("ISTEXT", 1, Some(1), fn_istext),
    FunctionDef::new("ISNONTEXT", 1, Some(1), fn_isnontext),
    FunctionDef::new("ISLOGICAL", 1, Some(1), fn_islogical),
    FunctionDef::new("ISREF", 1, Some(1), fn_isref),
    FunctionDef::new("ERROR.TYPE", 1, Some(1), fn_error_type),
    FunctionDef::new("NA", 0, Some(0), fn_na),
];

/// Resolve the inspected value, turning errors into values
///
/// A reference that points back at the calling cell is a circular reference and is
/// reported as such rather than inspected.
fn inspected(arg: &Value, ctx: &EvaluationContext) -> EvalResult<Value> {
    let self_referencing = match arg {
        Value::Range(area) => area.contains(ctx.row, ctx.col),
        Value::Reference(r) => r.row == ctx.row && r.col == ctx.col,
        _ => false,
    };
    if self_referencing {
        return Err(ErrorCode::CircularReference);
    }
    Ok(single_value(arg, ctx.row, ctx.col).unwrap_or_else(Value::Error))
}

fn is(args: &[Value], ctx: &EvaluationContext, test: fn(&Value) -> bool) -> EvalResult<Value> {
    let v = inspected(arg(args, 0)?, ctx)?;
    Ok(Value::Boolean(test(&v)))
}

/// ISERROR(value)
pub fn fn_iserror(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, Value::is_error)
}

/// ISERR(value) - any error except #N/A
pub fn fn_iserr(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| {
        matches!(v, Value::Error(e) if *e != ErrorCode::NotAvailable)
    })
}

/// ISNA(value)
pub fn fn_isna(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| matches!(v, Value::Error(ErrorCode::NotAvailable)))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, Value::is_blank)
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| matches!(v, Value::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| matches!(v, Value::Text(_)))
}

/// ISNONTEXT(value)
pub fn fn_isnontext(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| !matches!(v, Value::Text(_)))
}

/// ISLOGICAL(value)
pub fn fn_islogical(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    is(args, ctx, |v| matches!(v, Value::Boolean(_)))
}

/// ISREF(value) - looks at the operand itself, not its content
pub fn fn_isref(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Boolean(arg(args, 0)?.is_reference()))
}

/// ERROR.TYPE(error_val) - `#N/A` for anything that is not an error
pub fn fn_error_type(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    match inspected(arg(args, 0)?, ctx)? {
        Value::Error(e) => e
            .error_type()
            .map(|n| Value::Number(n as f64))
            .ok_or(ErrorCode::NotAvailable),
        _ => Err(ErrorCode::NotAvailable),
    }
}

/// NA()
pub fn fn_na(_args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Err(ErrorCode::NotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_calc_core::Area;
    use pretty_assertions::assert_eq;

    fn call(f: super::super::FunctionImpl, args: &[Value]) -> EvalResult<Value> {
        f(args, &EvaluationContext::at(10, 10))
    }

    fn t() -> EvalResult<Value> {
        Ok(Value::Boolean(true))
    }

    fn f() -> EvalResult<Value> {
        Ok(Value::Boolean(false))
    }

    #[test]
    fn test_error_predicates() {
        let na = Value::Error(ErrorCode::NotAvailable);
        let div = Value::Error(ErrorCode::DivideByZero);
        assert_eq!(call(fn_iserror, &[na.clone()]), t());
        assert_eq!(call(fn_iserror, &[Value::Number(1.0)]), f());
        assert_eq!(call(fn_iserr, &[na.clone()]), f());
        assert_eq!(call(fn_iserr, &[div.clone()]), t());
        assert_eq!(call(fn_isna, &[na]), t());
        assert_eq!(call(fn_isna, &[div]), f());
    }

    #[test]
    fn test_iserror_through_references() {
        let r = Value::reference(0, 0, Value::Error(ErrorCode::InvalidReference));
        assert_eq!(call(fn_iserror, &[r]), t());
        // a 2-D area cannot be intersected, which is itself an error
        let grid = Value::Range(
            Area::new(
                0,
                0,
                vec![
                    vec![Value::Number(1.0), Value::Number(2.0)],
                    vec![Value::Number(3.0), Value::Number(4.0)],
                ],
            )
            .unwrap(),
        );
        assert_eq!(call(fn_iserror, &[grid]), t());
    }

    #[test]
    fn test_self_reference_is_circular() {
        let col = Value::Range(Area::column(5, 10, vec![Value::Number(1.0); 10]).unwrap());
        assert_eq!(call(fn_iserror, &[col]), Err(ErrorCode::CircularReference));
        let me = Value::reference(10, 10, Value::Blank);
        assert_eq!(call(fn_isblank, &[me]), Err(ErrorCode::CircularReference));
    }

    #[test]
    fn test_type_predicates() {
        assert_eq!(call(fn_isblank, &[Value::reference(0, 0, Value::Blank)]), t());
        assert_eq!(call(fn_isblank, &[Value::text("")]), f());
        assert_eq!(call(fn_isnumber, &[Value::Number(1.0)]), t());
        assert_eq!(call(fn_isnumber, &[Value::text("1")]), f());
        assert_eq!(call(fn_istext, &[Value::text("1")]), t());
        assert_eq!(call(fn_isnontext, &[Value::Blank]), t());
        assert_eq!(call(fn_islogical, &[Value::Boolean(false)]), t());
        assert_eq!(call(fn_isref, &[Value::reference(0, 0, Value::Blank)]), t());
        assert_eq!(call(fn_isref, &[Value::Number(1.0)]), f());
    }

    #[test]
    fn test_error_type() {
        assert_eq!(
            call(fn_error_type, &[Value::Error(ErrorCode::DivideByZero)]),
            Ok(Value::Number(2.0))
        );
        assert_eq!(
            call(fn_error_type, &[Value::Error(ErrorCode::NotAvailable)]),
            Ok(Value::Number(7.0))
        );
        assert_eq!(
            call(fn_error_type, &[Value::Number(1.0)]),
            Err(ErrorCode::NotAvailable)
        );
        assert_eq!(call(fn_na, &[]), Err(ErrorCode::NotAvailable));
    }
}
