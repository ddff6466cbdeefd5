//! Logical functions

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::resolver::{arg, single_value, to_boolean};
use duke_calc_core::{ErrorCode, Value};

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("IF", 2, Some(3), fn_if),
    FunctionDef::new("AND", 1, None, fn_and),
    FunctionDef::new("OR", 1, None, fn_or),
    FunctionDef::new("XOR", 1, None, fn_xor),
    FunctionDef::new("NOT", 1, Some(1), fn_not),
    FunctionDef::new("TRUE", 0, Some(0), fn_true),
    FunctionDef::new("FALSE", 0, Some(0), fn_false),
    FunctionDef::new("IFERROR", 2, Some(2), fn_iferror),
];

/// Evaluate a scalar argument as a condition; text that is not TRUE/FALSE is `#VALUE!`
fn condition_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<bool> {
    to_boolean(&single_value(arg, ctx.row, ctx.col)?, true)?.ok_or(ErrorCode::InvalidValue)
}

/// A branch value handed back to the caller; an omitted branch reads as 0
fn branch(value: &Value) -> Value {
    match value {
        Value::Missing => Value::Number(0.0),
        Value::Reference(r) => r.inner().clone(),
        other => other.clone(),
    }
}

/// IF(condition, value_if_true, [value_if_false])
pub fn fn_if(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    if condition_arg(arg(args, 0)?, ctx)? {
        Ok(branch(arg(args, 1)?))
    } else {
        Ok(args.get(2).map_or(Value::Boolean(false), branch))
    }
}

/// Fold every boolean-valued operand with `op`
///
/// Inside references and areas, text and blanks are skipped. Directly supplied text must
/// read TRUE/FALSE. With nothing to fold the result is `#VALUE!`.
fn fold_booleans(
    args: &[Value],
    init: bool,
    op: impl Fn(bool, bool) -> bool,
) -> EvalResult<Value> {
    let mut acc = init;
    let mut seen = false;
    let mut fold = |b: bool| {
        acc = op(acc, b);
        seen = true;
    };
    for a in args {
        match a {
            Value::Range(area) => {
                for cell in area.iter() {
                    if let Some(b) = referenced_boolean(cell)? {
                        fold(b);
                    }
                }
            }
            Value::Reference(r) => {
                if let Some(b) = referenced_boolean(r.inner())? {
                    fold(b);
                }
            }
            Value::Missing | Value::Blank => {}
            direct => {
                let b = to_boolean(direct, false)?.ok_or(ErrorCode::InvalidValue)?;
                fold(b);
            }
        }
    }
    if seen {
        Ok(Value::Boolean(acc))
    } else {
        Err(ErrorCode::InvalidValue)
    }
}

fn referenced_boolean(cell: &Value) -> EvalResult<Option<bool>> {
    match cell {
        Value::Text(_) => Ok(None),
        other => to_boolean(other, false),
    }
}

/// AND(logical1, ...)
pub fn fn_and(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    fold_booleans(args, true, |a, b| a && b)
}

/// OR(logical1, ...)
pub fn fn_or(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    fold_booleans(args, false, |a, b| a || b)
}

/// XOR(logical1, ...) - true when an odd number of operands are true
pub fn fn_xor(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    fold_booleans(args, false, |a, b| a ^ b)
}

/// NOT(logical)
pub fn fn_not(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Boolean(!condition_arg(arg(args, 0)?, ctx)?))
}

pub fn fn_true(_args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Boolean(true))
}

pub fn fn_false(_args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Boolean(false))
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let value = arg(args, 0)?;
    match single_value(value, ctx.row, ctx.col) {
        Err(_) => Ok(branch(arg(args, 1)?)),
        Ok(_) => Ok(branch(value)),
    }
}
