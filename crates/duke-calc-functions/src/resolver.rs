//! Operand resolution and Excel's coercion rules
//!
//! Every function body funnels its scalar arguments through here: a reference or area is
//! first collapsed to one value ([`single_value`]), then coerced to the type the parameter
//! needs.

use crate::context::EvaluationContext;
use crate::error::EvalResult;
use duke_calc_core::{Area, ErrorCode, Value};
use lazy_regex::regex_captures;

/// Collapse an operand to a single scalar value
///
/// References yield the referenced content. Areas go through implicit intersection with the
/// calling cell at `(row, col)`:
/// - a 1x1 area yields its only cell
/// - a single-column area yields the cell on the caller's row
/// - a single-row area yields the cell in the caller's column
/// - anything else is `#VALUE!`
///
/// An error value anywhere along the way is returned as `Err`. An omitted argument reads as
/// blank.
pub fn single_value(arg: &Value, row: u32, col: u32) -> EvalResult<Value> {
    let value = match arg {
        Value::Reference(r) => r.inner().clone(),
        Value::Range(area) => intersect(area, row, col)?.clone(),
        Value::Missing => Value::Blank,
        other => other.clone(),
    };
    match value {
        Value::Error(e) => Err(e),
        // a reference can only hold cell content
        Value::Reference(_) | Value::Range(_) => Err(ErrorCode::InvalidValue),
        v => Ok(v),
    }
}

/// Implicit intersection of an area with the calling cell
pub fn intersect(area: &Area, row: u32, col: u32) -> EvalResult<&Value> {
    let hit = if area.is_column() && area.is_row() {
        area.get(0, 0)
    } else if area.is_column() {
        area.get_absolute(row, area.first_col())
    } else if area.is_row() {
        area.get_absolute(area.first_row(), col)
    } else {
        None
    };
    hit.ok_or(ErrorCode::InvalidValue)
}

/// Coerce a scalar to a number
///
/// Blank reads as 0, booleans as 0/1, and text must parse as an Excel numeric literal.
pub fn to_number(value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => parse_double(s).ok_or(ErrorCode::InvalidValue),
        Value::Blank | Value::Missing => Ok(0.0),
        Value::Error(e) => Err(*e),
        Value::Reference(r) => to_number(r.inner()),
        Value::Range(_) => Err(ErrorCode::InvalidValue),
    }
}

/// Coerce a scalar to a boolean
///
/// Returns `Ok(None)` when the value has no boolean reading: text other than TRUE/FALSE,
/// and blank unless `blank_is_false` is set. Numbers are true when non-zero.
pub fn to_boolean(value: &Value, blank_is_false: bool) -> EvalResult<Option<bool>> {
    match value {
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Number(n) => {
            if n.is_nan() {
                Err(ErrorCode::InvalidValue)
            } else {
                Ok(Some(*n != 0.0))
            }
        }
        Value::Text(s) => Ok(parse_boolean(s)),
        Value::Blank | Value::Missing => Ok(if blank_is_false { Some(false) } else { None }),
        Value::Error(e) => Err(*e),
        Value::Reference(r) => to_boolean(r.inner(), blank_is_false),
        Value::Range(_) => Err(ErrorCode::InvalidValue),
    }
}

/// Coerce a scalar to text
///
/// Numbers use the canonical shortest form, booleans read TRUE/FALSE and blank is the empty
/// string. Callers strip errors first; an error renders as its display text.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Blank | Value::Missing => String::new(),
        Value::Error(e) => e.to_string(),
        Value::Reference(r) => to_text(r.inner()),
        Value::Range(_) => ErrorCode::InvalidValue.to_string(),
    }
}

/// Coerce a scalar to an integer, rounding toward negative infinity
pub fn to_int(value: &Value) -> EvalResult<i64> {
    let n = to_number(value)?;
    if !n.is_finite() {
        return Err(ErrorCode::NumericError);
    }
    Ok(n.floor() as i64)
}

/// Parse `TRUE`/`FALSE` (any case)
pub fn parse_boolean(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// Parse an Excel numeric literal
///
/// Accepts surrounding whitespace, one sign placed before or after an optional leading `$`,
/// thousands separators in groups of three, a decimal point and an exponent.
pub fn parse_double(text: &str) -> Option<f64> {
    let (_, lead_sign, _dollar, trail_sign, int_part, frac_part, exp_part) = regex_captures!(
        r"^([+-]?)(\$?)([+-]?)(\d{1,3}(?:,\d{3})+|\d*)(\.\d*)?([eE][+-]?\d+)?$",
        text.trim()
    )?;
    if !lead_sign.is_empty() && !trail_sign.is_empty() {
        return None;
    }
    if int_part.is_empty() && frac_part.len() <= 1 {
        return None;
    }
    let sign = if lead_sign == "-" || trail_sign == "-" {
        "-"
    } else {
        ""
    };
    let digits = int_part.replace(',', "");
    format!("{}{}{}{}", sign, digits, frac_part, exp_part)
        .parse::<f64>()
        .ok()
}

/// Canonical text for a number
///
/// The shortest text that reads back as the same value, switching to Excel's `1E+21`
/// notation for very large and very small magnitudes.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_nan() {
        return ErrorCode::NumericError.to_string();
    }
    let abs = n.abs();
    if (1e-9..1e21).contains(&abs) {
        return format!("{}", n);
    }
    let s = format!("{:E}", n);
    match s.split_once('E') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}E+{}", mantissa, exp),
        _ => s,
    }
}

/// Argument at `index`; a missing required argument is `#VALUE!`
pub fn arg(args: &[Value], index: usize) -> EvalResult<&Value> {
    args.get(index).ok_or(ErrorCode::InvalidValue)
}

/// Evaluate a scalar argument to a number
pub fn number_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<f64> {
    to_number(&single_value(arg, ctx.row, ctx.col)?)
}

/// Evaluate a scalar argument to text
pub fn text_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<String> {
    Ok(to_text(&single_value(arg, ctx.row, ctx.col)?))
}

/// Evaluate a scalar argument to an integer
pub fn int_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<i64> {
    to_int(&single_value(arg, ctx.row, ctx.col)?)
}

/// Evaluate an optional numeric argument, falling back to `default` when it was not supplied
pub fn optional_number_arg(
    args: &[Value],
    index: usize,
    default: f64,
    ctx: &EvaluationContext,
) -> EvalResult<f64> {
    match args.get(index) {
        None => Ok(default),
        Some(arg) => number_arg(arg, ctx),
    }
}

/// Reject NaN and infinities as `#NUM!`
pub fn check_number(n: f64) -> EvalResult<Value> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(ErrorCode::NumericError)
    }
}
