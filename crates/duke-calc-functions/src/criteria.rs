//! Criteria matching for COUNTIF, SUMIF and AVERAGEIF
//!
//! A criterion is a number, boolean, error or text. Text may start with a comparison
//! operator (`>=`, `<=`, `<>`, `>`, `<`, `=`); the remainder is then read as a boolean,
//! a number, an error literal or plain text, in that order. Text supports wildcards:
//! `*` matches any run of characters, `?` one character, and `~` escapes either.

use crate::context::EvaluationContext;
use crate::resolver::{parse_boolean, parse_double, single_value};
use duke_calc_core::{ErrorCode, Value};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

/// Comparison operator prefixed to a text criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    /// No operator: plain equality, with some blank-handling differences from `=`
    None,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl CmpOp {
    /// Split a leading operator off the criterion text
    fn parse(s: &str) -> (CmpOp, &str) {
        // two-character operators first so "<=" is not read as "<"
        for (prefix, op) in [
            ("<=", CmpOp::LessEqual),
            (">=", CmpOp::GreaterEqual),
            ("<>", CmpOp::NotEqual),
            ("<", CmpOp::LessThan),
            (">", CmpOp::GreaterThan),
            ("=", CmpOp::Equal),
        ] {
            if let Some(rest) = s.strip_prefix(prefix) {
                return (op, rest);
            }
        }
        (CmpOp::None, s)
    }

    /// Apply the operator to `target.cmp(criterion)`
    fn evaluate(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::None | CmpOp::Equal => ordering == Ordering::Equal,
            CmpOp::NotEqual => ordering != Ordering::Equal,
            CmpOp::LessThan => ordering == Ordering::Less,
            CmpOp::LessEqual => ordering != Ordering::Greater,
            CmpOp::GreaterThan => ordering == Ordering::Greater,
            CmpOp::GreaterEqual => ordering != Ordering::Less,
        }
    }

    /// Apply an equality-only operator to a pattern match
    fn evaluate_match(self, matched: bool) -> bool {
        match self {
            CmpOp::NotEqual => !matched,
            _ => matched,
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, CmpOp::None | CmpOp::Equal | CmpOp::NotEqual)
    }
}

#[derive(Debug)]
enum Matcher {
    Number(f64),
    Boolean(bool),
    Error(ErrorCode),
    Text { value: String, pattern: Option<Regex> },
}

/// Compiled criterion; test cells with [`CriteriaPredicate::matches`]
#[derive(Debug)]
pub struct CriteriaPredicate {
    op: CmpOp,
    matcher: Matcher,
}

/// Build a predicate from a criteria operand
///
/// References and areas are collapsed against the calling cell first. An error criterion
/// matches that error. Returns `None` for a blank criterion, which matches nothing.
pub fn build_predicate(criteria: &Value, ctx: &EvaluationContext) -> Option<CriteriaPredicate> {
    let value = match single_value(criteria, ctx.row, ctx.col) {
        Ok(v) => v,
        Err(e) => Value::Error(e),
    };
    let (op, matcher) = match value {
        Value::Number(n) => (CmpOp::None, Matcher::Number(n)),
        Value::Boolean(b) => (CmpOp::None, Matcher::Boolean(b)),
        Value::Error(e) => (CmpOp::None, Matcher::Error(e)),
        Value::Text(s) => parse_text_criterion(&s),
        _ => return None,
    };
    Some(CriteriaPredicate { op, matcher })
}

fn parse_text_criterion(s: &str) -> (CmpOp, Matcher) {
    let (op, rest) = CmpOp::parse(s);
    let matcher = if let Some(b) = parse_boolean(rest) {
        Matcher::Boolean(b)
    } else if let Some(n) = parse_double(rest) {
        Matcher::Number(n)
    } else if let Some(e) = ErrorCode::from_str(rest) {
        Matcher::Error(e)
    } else {
        let pattern = if op.is_equality() {
            wildcard_pattern(rest)
        } else {
            None
        };
        Matcher::Text {
            value: rest.to_string(),
            pattern,
        }
    };
    (op, matcher)
}

impl CriteriaPredicate {
    /// Test one cell
    pub fn matches(&self, target: &Value) -> bool {
        let target = match target {
            Value::Reference(r) => r.inner(),
            other => other,
        };
        // a blank cell matches only "not equal to something"
        if matches!(target, Value::Blank | Value::Missing) {
            return match &self.matcher {
                Matcher::Text { value, .. } => match self.op {
                    CmpOp::None | CmpOp::Equal => value.is_empty(),
                    CmpOp::NotEqual => !value.is_empty(),
                    _ => false,
                },
                _ => self.op == CmpOp::NotEqual,
            };
        }
        match (&self.matcher, target) {
            (Matcher::Number(n), Value::Number(t)) => self.op.evaluate(t.total_cmp(n)),
            (Matcher::Number(n), Value::Text(t)) => {
                // numeric text only counts for (in)equality
                let equal = parse_double(t) == Some(*n);
                match self.op {
                    CmpOp::None | CmpOp::Equal => equal,
                    CmpOp::NotEqual => !equal,
                    _ => false,
                }
            }
            (Matcher::Boolean(b), Value::Boolean(t)) => self.op.evaluate(t.cmp(b)),
            (Matcher::Error(e), Value::Error(t)) => self.op.evaluate(t.code().cmp(&e.code())),
            (Matcher::Text { value, pattern }, Value::Text(t)) => {
                if t.is_empty() && value.is_empty() {
                    // "=" and "" differ on empty text
                    return matches!(self.op, CmpOp::None | CmpOp::NotEqual);
                }
                match pattern {
                    Some(re) => self.op.evaluate_match(re.is_match(t)),
                    None => self.op.evaluate(compare_ignore_case(t, value)),
                }
            }
            _ => self.op == CmpOp::NotEqual,
        }
    }
}

/// Case-insensitive text ordering
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Compile Excel wildcards into an anchored case-insensitive regex
///
/// Returns `None` when the text holds no wildcard or escape, so callers can fall back to a
/// plain comparison.
pub fn wildcard_pattern(text: &str) -> Option<Regex> {
    let mut pattern = String::with_capacity(text.len() + 8);
    let mut has_wildcard = false;
    let mut chars = text.chars().peekable();
    pattern.push('^');
    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                has_wildcard = true;
                pattern.push_str(".*");
            }
            '?' => {
                has_wildcard = true;
                pattern.push('.');
            }
            '~' if matches!(chars.peek(), Some('*' | '?' | '~')) => {
                has_wildcard = true;
                if let Some(escaped) = chars.next() {
                    pattern.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    if !has_wildcard {
        return None;
    }
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .ok()
}
