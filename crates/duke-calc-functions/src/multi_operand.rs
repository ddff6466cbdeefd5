//! Shared evaluation for variadic numeric functions (SUM, AVERAGE, STDEV, ...)
//!
//! Operands are flattened row-major into one numeric vector. Values typed directly into the
//! call are coerced; values read out of references and areas are filtered.

use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::resolver::parse_double;
use duke_calc_core::{ErrorCode, Value};
use log::trace;

/// How referenced cells contribute to the numeric vector
///
/// The default skips booleans and text found in references (SUM, AVERAGE, MAX). The
/// `...A` variants (AVERAGEA, MAXA, MINA) count them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Referenced booleans count as 1/0
    pub reference_booleans: bool,
    /// Referenced text counts as 0
    pub reference_text: bool,
}

impl CollectOptions {
    /// Options for the `...A` functions
    pub fn counting_all() -> Self {
        Self {
            reference_booleans: true,
            reference_text: true,
        }
    }
}

/// Flatten operands into a numeric vector
///
/// - direct numbers, booleans and numeric text are coerced; other direct text is `#VALUE!`
/// - an omitted argument counts as 0
/// - referenced blanks are skipped; referenced booleans and text follow `options`
/// - the first error encountered, direct or referenced, is returned
/// - more than `max_operands` arguments is `#VALUE!`
pub fn collect_numbers(
    args: &[Value],
    options: CollectOptions,
    ctx: &EvaluationContext,
) -> EvalResult<Vec<f64>> {
    if args.len() > ctx.settings.max_operands {
        trace!(
            "{} operands exceed the limit of {}",
            args.len(),
            ctx.settings.max_operands
        );
        return Err(ErrorCode::InvalidValue);
    }
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Value::Range(area) => {
                for cell in area.iter() {
                    collect_referenced(cell, options, &mut out)?;
                }
            }
            Value::Reference(r) => collect_referenced(r.inner(), options, &mut out)?,
            direct => collect_direct(direct, &mut out)?,
        }
    }
    Ok(out)
}

fn collect_direct(value: &Value, out: &mut Vec<f64>) -> EvalResult<()> {
    match value {
        Value::Number(n) => out.push(*n),
        Value::Boolean(b) => out.push(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => out.push(parse_double(s).ok_or(ErrorCode::InvalidValue)?),
        Value::Missing => out.push(0.0),
        Value::Error(e) => return Err(*e),
        Value::Blank | Value::Reference(_) | Value::Range(_) => {}
    }
    Ok(())
}

fn collect_referenced(value: &Value, options: CollectOptions, out: &mut Vec<f64>) -> EvalResult<()> {
    match value {
        Value::Number(n) => out.push(*n),
        Value::Boolean(b) if options.reference_booleans => out.push(if *b { 1.0 } else { 0.0 }),
        Value::Text(_) if options.reference_text => out.push(0.0),
        Value::Error(e) => return Err(*e),
        _ => {}
    }
    Ok(())
}

/// Collect the operands and reduce them to one number
///
/// Non-finite results become `#NUM!`.
pub fn reduce(
    args: &[Value],
    options: CollectOptions,
    ctx: &EvaluationContext,
    f: impl FnOnce(&[f64]) -> EvalResult<f64>,
) -> EvalResult<Value> {
    let values = collect_numbers(args, options, ctx)?;
    let result = f(&values)?;
    if result.is_finite() {
        Ok(Value::Number(result))
    } else {
        Err(ErrorCode::NumericError)
    }
}
