//! Text functions
//!
//! Positions and lengths count characters, not bytes.

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::resolver::{arg, number_arg, parse_double, single_value, text_arg};
use duke_calc_core::{ErrorCode, Value};

/// Longest string a cell can hold
const MAX_TEXT_LEN: usize = 32_767;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("LEN", 1, Some(1), fn_len),
    FunctionDef::new("LEFT", 1, Some(2), fn_left),
    FunctionDef::new("RIGHT", 1, Some(2), fn_right),
    FunctionDef::new("MID", 3, Some(3), fn_mid),
    FunctionDef::new("FIND", 2, Some(3), fn_find),
    FunctionDef::new("SEARCH", 2, Some(3), fn_search),
    FunctionDef::new("SUBSTITUTE", 3, Some(4), fn_substitute),
    FunctionDef::new("REPLACE", 4, Some(4), fn_replace),
    FunctionDef::new("LOWER", 1, Some(1), fn_lower),
    FunctionDef::new("UPPER", 1, Some(1), fn_upper),
    FunctionDef::new("PROPER", 1, Some(1), fn_proper),
    FunctionDef::new("TRIM", 1, Some(1), fn_trim),
    FunctionDef::new("EXACT", 2, Some(2), fn_exact),
    FunctionDef::new("REPT", 2, Some(2), fn_rept),
    FunctionDef::new("CONCATENATE", 1, None, fn_concatenate),
    FunctionDef::new("VALUE", 1, Some(1), fn_value),
    FunctionDef::new("T", 1, Some(1), fn_t),
    FunctionDef::new("N", 1, Some(1), fn_n),
    FunctionDef::new("CHAR", 1, Some(1), fn_char),
    FunctionDef::new("CODE", 1, Some(1), fn_code),
    FunctionDef::new("CLEAN", 1, Some(1), fn_clean),
];

fn take_left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_right(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}

fn take_mid(s: &str, start0: usize, n: usize) -> String {
    s.chars().skip(start0).take(n).collect()
}

/// Non-negative character count argument, truncated toward zero
fn count_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<usize> {
    let n = number_arg(arg, ctx)?.trunc();
    if n.is_nan() || n < 0.0 {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(n.min(usize::MAX as f64) as usize)
}

/// 1-based position argument, truncated toward zero and returned 0-based
fn position_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<usize> {
    let n = number_arg(arg, ctx)?.trunc();
    if n.is_nan() || n < 1.0 {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(n.min(usize::MAX as f64) as usize - 1)
}

/// Character index of `needle` in `haystack`, searching from character `start0`
fn find_chars(haystack: &str, needle: &str, start0: usize) -> Option<usize> {
    let byte_start = haystack
        .char_indices()
        .nth(start0)
        .map_or(haystack.len(), |(i, _)| i);
    let tail = &haystack[byte_start..];
    tail.find(needle)
        .map(|b| start0 + tail[..b].chars().count())
}

// Compares char by char so positions stay in the original text even when
// lowercasing changes a character's length.
fn find_chars_ignore_case(haystack: &str, needle: &str, start0: usize) -> Option<usize> {
    let hay: Vec<char> = haystack.chars().collect();
    let pattern: Vec<char> = needle.chars().collect();
    if pattern.len() > hay.len() {
        return None;
    }
    (start0..=hay.len() - pattern.len()).find(|&i| {
        pattern
            .iter()
            .zip(&hay[i..])
            .all(|(p, h)| p == h || p.to_lowercase().eq(h.to_lowercase()))
    })
}

/// LEN(text)
pub fn fn_len(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    Ok(Value::Number(s.chars().count() as f64))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let n = match args.get(1) {
        Some(a) => count_arg(a, ctx)?,
        None => 1,
    };
    Ok(Value::Text(take_left(&s, n)))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let n = match args.get(1) {
        Some(a) => count_arg(a, ctx)?,
        None => 1,
    };
    Ok(Value::Text(take_right(&s, n)))
}

/// MID(text, start_num, num_chars)
///
/// A start past the end yields empty text; a count running past the end is clamped.
pub fn fn_mid(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let start0 = position_arg(arg(args, 1)?, ctx)?;
    let n = count_arg(arg(args, 2)?, ctx)?;
    Ok(Value::Text(take_mid(&s, start0, n)))
}

fn find_impl(args: &[Value], ctx: &EvaluationContext, ignore_case: bool) -> EvalResult<Value> {
    let needle = text_arg(arg(args, 0)?, ctx)?;
    let haystack = text_arg(arg(args, 1)?, ctx)?;
    let start0 = match args.get(2) {
        Some(a) => position_arg(a, ctx)?,
        None => 0,
    };
    if start0 > haystack.chars().count() {
        return Err(ErrorCode::InvalidValue);
    }
    let found = if ignore_case {
        find_chars_ignore_case(&haystack, &needle, start0)
    } else {
        find_chars(&haystack, &needle, start0)
    };
    found
        .map(|i| Value::Number((i + 1) as f64))
        .ok_or(ErrorCode::InvalidValue)
}

/// FIND(find_text, within_text, [start_num]) - case-sensitive
pub fn fn_find(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    find_impl(args, ctx, false)
}

/// SEARCH(find_text, within_text, [start_num]) - case-insensitive
pub fn fn_search(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    find_impl(args, ctx, true)
}

/// SUBSTITUTE(text, old_text, new_text, [instance_num])
pub fn fn_substitute(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let text = text_arg(arg(args, 0)?, ctx)?;
    let old = text_arg(arg(args, 1)?, ctx)?;
    let new = text_arg(arg(args, 2)?, ctx)?;
    let instance = match args.get(3) {
        Some(a) => Some(position_arg(a, ctx)?),
        None => None,
    };
    if old.is_empty() {
        return Ok(Value::Text(text));
    }
    let result = match instance {
        None => text.replace(&old, &new),
        Some(nth) => match text.match_indices(&old).nth(nth) {
            Some((at, _)) => format!("{}{}{}", &text[..at], new, &text[at + old.len()..]),
            None => text,
        },
    };
    Ok(Value::Text(result))
}

/// REPLACE(old_text, start_num, num_chars, new_text)
pub fn fn_replace(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let text = text_arg(arg(args, 0)?, ctx)?;
    let start0 = position_arg(arg(args, 1)?, ctx)?;
    let n = count_arg(arg(args, 2)?, ctx)?;
    let new = text_arg(arg(args, 3)?, ctx)?;
    let mut out = take_left(&text, start0);
    out.push_str(&new);
    out.extend(text.chars().skip(start0.saturating_add(n)));
    Ok(Value::Text(out))
}

pub fn fn_lower(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Text(text_arg(arg(args, 0)?, ctx)?.to_lowercase()))
}

pub fn fn_upper(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Text(text_arg(arg(args, 0)?, ctx)?.to_uppercase()))
}

/// PROPER(text) - capitalizes every letter that follows a non-letter
pub fn fn_proper(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }
    Ok(Value::Text(out))
}

/// TRIM(text) - strips leading/trailing spaces and collapses runs of spaces
pub fn fn_trim(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let trimmed = s
        .split(' ')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::Text(trimmed))
}

/// EXACT(text1, text2) - case-sensitive comparison
pub fn fn_exact(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let a = text_arg(arg(args, 0)?, ctx)?;
    let b = text_arg(arg(args, 1)?, ctx)?;
    Ok(Value::Boolean(a == b))
}

/// REPT(text, number_times)
pub fn fn_rept(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    let times = count_arg(arg(args, 1)?, ctx)?;
    let len = s.chars().count();
    if len.saturating_mul(times) > MAX_TEXT_LEN {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(Value::Text(s.repeat(times)))
}

/// CONCATENATE(text1, ...)
pub fn fn_concatenate(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let mut out = String::new();
    for a in args {
        out.push_str(&text_arg(a, ctx)?);
    }
    Ok(Value::Text(out))
}

/// VALUE(text)
pub fn fn_value(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    match single_value(arg(args, 0)?, ctx.row, ctx.col)? {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::Blank => Ok(Value::Number(0.0)),
        Value::Text(s) => parse_double(&s)
            .map(Value::Number)
            .ok_or(ErrorCode::InvalidValue),
        _ => Err(ErrorCode::InvalidValue),
    }
}

/// T(value) - the value if it is text, otherwise empty text
pub fn fn_t(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    match single_value(arg(args, 0)?, ctx.row, ctx.col)? {
        Value::Text(s) => Ok(Value::Text(s)),
        _ => Ok(Value::Text(String::new())),
    }
}

/// N(value) - numbers pass, booleans become 0/1, everything else is 0
pub fn fn_n(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = match single_value(arg(args, 0)?, ctx.row, ctx.col)? {
        Value::Number(n) => n,
        Value::Boolean(true) => 1.0,
        _ => 0.0,
    };
    Ok(Value::Number(n))
}

/// CHAR(number) - character for a code in 1..=255
pub fn fn_char(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?.trunc();
    if !(1.0..=255.0).contains(&n) {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(Value::Text(char::from(n as u8).to_string()))
}

/// CODE(text) - code of the first character
pub fn fn_code(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    s.chars()
        .next()
        .map(|c| Value::Number(u32::from(c) as f64))
        .ok_or(ErrorCode::InvalidValue)
}

/// CLEAN(text) - removes non-printable control characters
pub fn fn_clean(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let s = text_arg(arg(args, 0)?, ctx)?;
    Ok(Value::Text(s.chars().filter(|c| u32::from(*c) >= 32).collect()))
}
