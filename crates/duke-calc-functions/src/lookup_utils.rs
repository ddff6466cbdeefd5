//! Search helpers shared by VLOOKUP, HLOOKUP, LOOKUP and MATCH

use crate::context::EvaluationContext;
use crate::criteria::{compare_ignore_case, wildcard_pattern};
use crate::error::EvalResult;
use crate::resolver::{parse_boolean, parse_double, single_value, to_int};
use duke_calc_core::{Area, ErrorCode, Value};
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;

static BLANK: Value = Value::Blank;

/// A one-dimensional view over a row or column of an area
#[derive(Debug, Clone, Copy)]
pub struct ValueVector<'a> {
    area: &'a Area,
    line: Line,
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Row(usize),
    Column(usize),
}

impl<'a> ValueVector<'a> {
    /// The relative row `row` of `area`
    pub fn row(area: &'a Area, row: usize) -> Option<Self> {
        (row < area.height()).then_some(Self {
            area,
            line: Line::Row(row),
        })
    }

    /// The relative column `col` of `area`
    pub fn column(area: &'a Area, col: usize) -> Option<Self> {
        (col < area.width()).then_some(Self {
            area,
            line: Line::Column(col),
        })
    }

    /// View a single-row or single-column area as a vector
    pub fn of(area: &'a Area) -> Option<Self> {
        if area.is_column() {
            Self::column(area, 0)
        } else if area.is_row() {
            Self::row(area, 0)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        match self.line {
            Line::Row(_) => self.area.width(),
            Line::Column(_) => self.area.height(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item `i`; out-of-range reads as blank
    pub fn item(&self, i: usize) -> &'a Value {
        let cell = match self.line {
            Line::Row(r) => self.area.get(r, i),
            Line::Column(c) => self.area.get(i, c),
        };
        cell.unwrap_or(&BLANK)
    }
}

/// Outcome of comparing the lookup value against one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    /// The item has a different type and is skipped
    TypeMismatch,
    /// Lookup value is less than the item
    LessThan,
    Equal,
    /// Lookup value is greater than the item
    GreaterThan,
}

impl From<Ordering> for CompareResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => CompareResult::LessThan,
            Ordering::Equal => CompareResult::Equal,
            Ordering::Greater => CompareResult::GreaterThan,
        }
    }
}

/// Compares a lookup value against vector items of the same type
#[derive(Debug)]
pub enum LookupComparer {
    Number(f64),
    Boolean(bool),
    Text { value: String, pattern: Option<Regex> },
}

impl LookupComparer {
    /// Build a comparer; `wildcards` enables `*`/`?` in text lookup values
    ///
    /// A blank lookup value searches for 0.
    pub fn new(lookup_value: &Value, wildcards: bool) -> EvalResult<Self> {
        match lookup_value {
            Value::Number(n) => Ok(LookupComparer::Number(*n)),
            Value::Blank | Value::Missing => Ok(LookupComparer::Number(0.0)),
            Value::Boolean(b) => Ok(LookupComparer::Boolean(*b)),
            Value::Text(s) => Ok(LookupComparer::Text {
                value: s.clone(),
                pattern: if wildcards { wildcard_pattern(s) } else { None },
            }),
            Value::Error(e) => Err(*e),
            Value::Reference(r) => Self::new(r.inner(), wildcards),
            Value::Range(_) => Err(ErrorCode::InvalidValue),
        }
    }

    /// Compare the lookup value with `item`
    pub fn compare_to(&self, item: &Value) -> CompareResult {
        let item = match item {
            Value::Reference(r) => r.inner(),
            other => other,
        };
        match (self, item) {
            (LookupComparer::Number(n), Value::Number(m)) => n.total_cmp(m).into(),
            (LookupComparer::Boolean(a), Value::Boolean(b)) => a.cmp(b).into(),
            (LookupComparer::Text { value, pattern }, Value::Text(t)) => match pattern {
                Some(re) if re.is_match(t) => CompareResult::Equal,
                Some(_) => CompareResult::LessThan,
                None => compare_ignore_case(value, t).into(),
            },
            _ => CompareResult::TypeMismatch,
        }
    }
}

/// Find the lookup value in `vector`
///
/// With `range_lookup` the vector is assumed sorted ascending and a binary search returns
/// the last item not greater than the lookup value, stepping over items of other types.
/// Otherwise the first exact match wins and text may use wildcards. `#N/A` when nothing
/// qualifies.
pub fn lookup_index_of_value(
    lookup_value: &Value,
    vector: &ValueVector<'_>,
    range_lookup: bool,
) -> EvalResult<usize> {
    let comparer = LookupComparer::new(lookup_value, !range_lookup)?;
    let found = if range_lookup {
        binary_search(vector, &comparer)
    } else {
        (0..vector.len()).find(|&i| comparer.compare_to(vector.item(i)) == CompareResult::Equal)
    };
    found.ok_or(ErrorCode::NotAvailable)
}

/// Low and high bounds both point at items assumed out of range; `-1` and `len` to start.
struct SearchBounds {
    low: isize,
    high: isize,
}

impl SearchBounds {
    fn mid(&self) -> Option<isize> {
        let diff = self.high - self.low;
        (diff >= 2).then_some(self.low + diff / 2)
    }

    fn narrow(&mut self, mid: isize, lookup_is_less: bool) {
        if lookup_is_less {
            self.high = mid;
        } else {
            self.low = mid;
        }
    }
}

fn binary_search(vector: &ValueVector<'_>, comparer: &LookupComparer) -> Option<usize> {
    let mut bounds = SearchBounds {
        low: -1,
        high: vector.len() as isize,
    };
    loop {
        let Some(mut mid) = bounds.mid() else {
            return usize::try_from(bounds.low).ok();
        };
        let mut cr = comparer.compare_to(vector.item(mid as usize));
        if cr == CompareResult::TypeMismatch {
            match step_over_mismatches(comparer, vector, &mut bounds, mid) {
                Some(equal_at) => {
                    mid = equal_at;
                    cr = CompareResult::Equal;
                }
                None => continue,
            }
        }
        if cr == CompareResult::Equal {
            return Some(last_in_run_of_equal(comparer, vector, mid as usize, bounds.high as usize));
        }
        bounds.narrow(mid, cr == CompareResult::LessThan);
    }
}

// Walk forward from a mismatched midpoint to the first comparable item. Returns that index
// only on an exact match; otherwise the bounds have been narrowed.
fn step_over_mismatches(
    comparer: &LookupComparer,
    vector: &ValueVector<'_>,
    bounds: &mut SearchBounds,
    mid: isize,
) -> Option<isize> {
    let mut next = mid;
    loop {
        next += 1;
        if next == bounds.high {
            // everything from mid up to high has the wrong type
            bounds.narrow(mid, true);
            return None;
        }
        let cr = comparer.compare_to(vector.item(next as usize));
        if cr == CompareResult::LessThan && next == bounds.high - 1 {
            bounds.narrow(mid, true);
            return None;
        }
        match cr {
            CompareResult::TypeMismatch => continue,
            CompareResult::Equal => return Some(next),
            other => {
                bounds.narrow(next, other == CompareResult::LessThan);
                return None;
            }
        }
    }
}

fn last_in_run_of_equal(
    comparer: &LookupComparer,
    vector: &ValueVector<'_>,
    first: usize,
    max: usize,
) -> usize {
    (first + 1..max)
        .find(|&i| comparer.compare_to(vector.item(i)) != CompareResult::Equal)
        .map_or(max - 1, |i| i - 1)
}

/// Resolve the `range_lookup` argument of VLOOKUP/HLOOKUP
///
/// Blank is FALSE, numbers are true when non-zero and text must read TRUE or FALSE; any
/// other text, numeric text included, is `#VALUE!`.
pub fn resolve_range_lookup_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<bool> {
    match single_value(arg, ctx.row, ctx.col)? {
        Value::Blank | Value::Missing => Ok(false),
        Value::Boolean(b) => Ok(b),
        Value::Number(n) => Ok(n != 0.0),
        Value::Text(s) => parse_boolean(&s).ok_or(ErrorCode::InvalidValue),
        _ => Err(ErrorCode::InvalidValue),
    }
}

/// Resolve a 1-based row or column index argument to a 0-based index
///
/// Errors and non-numeric text are `#REF!`; an index below 1 is `#VALUE!`.
pub fn resolve_row_or_col_index_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<usize> {
    let value = single_value(arg, ctx.row, ctx.col).map_err(|_| ErrorCode::InvalidReference)?;
    if let Value::Text(s) = &value {
        if parse_double(s).is_none() {
            return Err(ErrorCode::InvalidReference);
        }
    }
    let index = to_int(&value).map_err(|_| ErrorCode::InvalidReference)?;
    if index < 1 {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(index as usize - 1)
}

/// Resolve a table argument to an area; a single reference becomes a 1x1 area
pub fn resolve_table_array_arg(arg: &Value) -> EvalResult<Cow<'_, Area>> {
    match arg {
        Value::Range(area) => Ok(Cow::Borrowed(area)),
        Value::Reference(r) => Area::from_cells(r.row, r.col, 1, 1, vec![r.inner().clone()])
            .map(Cow::Owned)
            .map_err(|_| ErrorCode::InvalidReference),
        Value::Error(e) => Err(*e),
        _ => Err(ErrorCode::InvalidValue),
    }
}
