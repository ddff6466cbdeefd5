//! Lookup and reference functions

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::lookup_utils::{
    lookup_index_of_value, resolve_range_lookup_arg, resolve_row_or_col_index_arg,
    resolve_table_array_arg, CompareResult, LookupComparer, ValueVector,
};
use crate::resolver::{arg, int_arg, number_arg, single_value};
use duke_calc_core::{Area, ErrorCode, Value};
use std::borrow::Cow;

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("VLOOKUP", 3, Some(4), fn_vlookup),
    FunctionDef::new("HLOOKUP", 3, Some(4), fn_hlookup),
    FunctionDef::new("LOOKUP", 2, Some(3), fn_lookup),
    FunctionDef::new("MATCH", 2, Some(3), fn_match),
    FunctionDef::new("INDEX", 2, Some(3), fn_index),
    FunctionDef::new("CHOOSE", 2, None, fn_choose),
    FunctionDef::new("ROW", 0, Some(1), fn_row),
    FunctionDef::new("COLUMN", 0, Some(1), fn_column),
    FunctionDef::new("ROWS", 1, Some(1), fn_rows),
    FunctionDef::new("COLUMNS", 1, Some(1), fn_columns),
];

/// Orientation of a table search
#[derive(Clone, Copy)]
enum Orientation {
    /// Search the first column, return from a column (VLOOKUP)
    Vertical,
    /// Search the first row, return from a row (HLOOKUP)
    Horizontal,
}

fn table_lookup(
    args: &[Value],
    ctx: &EvaluationContext,
    orientation: Orientation,
) -> EvalResult<Value> {
    let lookup_value = single_value(arg(args, 0)?, ctx.row, ctx.col)?;
    let table = resolve_table_array_arg(arg(args, 1)?)?;
    let range_lookup = match args.get(3) {
        None => true,
        Some(a) => resolve_range_lookup_arg(a, ctx)?,
    };
    let search = match orientation {
        Orientation::Vertical => ValueVector::column(&table, 0),
        Orientation::Horizontal => ValueVector::row(&table, 0),
    }
    .ok_or(ErrorCode::InvalidReference)?;
    let found = lookup_index_of_value(&lookup_value, &search, range_lookup)?;

    // the index is only inspected once a match exists
    let index = resolve_row_or_col_index_arg(arg(args, 2)?, ctx)?;
    let cell = match orientation {
        Orientation::Vertical => table.get(found, index),
        Orientation::Horizontal => table.get(index, found),
    };
    cell.cloned().ok_or(ErrorCode::InvalidReference)
}

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
pub fn fn_vlookup(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    table_lookup(args, ctx, Orientation::Vertical)
}

/// HLOOKUP(lookup_value, table_array, row_index_num, [range_lookup])
pub fn fn_hlookup(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    table_lookup(args, ctx, Orientation::Horizontal)
}

/// LOOKUP(lookup_value, lookup_vector, [result_vector])
///
/// The two-argument form searches the first row of a wide table or the first column of a
/// tall one and returns from the opposite edge.
pub fn fn_lookup(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let lookup_value = single_value(arg(args, 0)?, ctx.row, ctx.col)?;
    let table = resolve_table_array_arg(arg(args, 1)?)?;

    let (search, result) = match args.get(2) {
        None => {
            if table.width() > table.height() {
                (
                    ValueVector::row(&table, 0),
                    ValueVector::row(&table, table.height() - 1),
                )
            } else {
                (
                    ValueVector::column(&table, 0),
                    ValueVector::column(&table, table.width() - 1),
                )
            }
        }
        Some(result_arg) => {
            let result_area = resolve_table_array_arg(result_arg)?;
            let search = ValueVector::of(&table).ok_or(ErrorCode::NotAvailable)?;
            let result = ValueVector::of(&result_area).ok_or(ErrorCode::NotAvailable)?;
            if search.len() != result.len() {
                return Err(ErrorCode::InvalidValue);
            }
            let index = lookup_index_of_value(&lookup_value, &search, true)?;
            return Ok(result.item(index).clone());
        }
    };
    let (search, result) = (
        search.ok_or(ErrorCode::InvalidReference)?,
        result.ok_or(ErrorCode::InvalidReference)?,
    );
    let index = lookup_index_of_value(&lookup_value, &search, true)?;
    Ok(result.item(index).clone())
}

/// Resolve the match_type argument; omitted means 1, blank means 0
fn match_type_arg(args: &[Value], ctx: &EvaluationContext) -> EvalResult<i64> {
    match args.get(2) {
        None => Ok(1),
        Some(a) => Ok(number_arg(a, ctx)?.trunc() as i64),
    }
}

/// MATCH(lookup_value, lookup_array, [match_type])
pub fn fn_match(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let lookup_value = single_value(arg(args, 0)?, ctx.row, ctx.col)?;
    let lookup_range = match arg(args, 1)? {
        range @ (Value::Range(_) | Value::Reference(_) | Value::Error(_)) => {
            resolve_table_array_arg(range)?
        }
        _ => return Err(ErrorCode::NotAvailable),
    };
    let vector = ValueVector::of(&lookup_range).ok_or(ErrorCode::NotAvailable)?;
    let match_type = match_type_arg(args, ctx)?;

    let comparer = LookupComparer::new(&lookup_value, match_type == 0)?;
    let index = match match_type {
        0 => exact_match(&comparer, &vector),
        t if t > 0 => largest_not_greater(&comparer, &vector),
        _ => smallest_not_less(&comparer, &vector),
    }
    .ok_or(ErrorCode::NotAvailable)?;
    Ok(Value::Number((index + 1) as f64))
}

fn exact_match(comparer: &LookupComparer, vector: &ValueVector<'_>) -> Option<usize> {
    (0..vector.len()).find(|&i| comparer.compare_to(vector.item(i)) == CompareResult::Equal)
}

// Scan from the end for the last item the lookup value is not less than
fn largest_not_greater(comparer: &LookupComparer, vector: &ValueVector<'_>) -> Option<usize> {
    (0..vector.len()).rev().find(|&i| {
        matches!(
            comparer.compare_to(vector.item(i)),
            CompareResult::Equal | CompareResult::GreaterThan
        )
    })
}

// Descending input: stop at an equal item, or step back once an item drops below the
// lookup value
fn smallest_not_less(comparer: &LookupComparer, vector: &ValueVector<'_>) -> Option<usize> {
    let mut previous = None;
    for i in 0..vector.len() {
        match comparer.compare_to(vector.item(i)) {
            CompareResult::Equal => return Some(i),
            CompareResult::LessThan => previous = Some(i),
            CompareResult::GreaterThan => return previous,
            CompareResult::TypeMismatch => {}
        }
    }
    previous
}

/// Resolve a 1-based INDEX argument to 0-based; 0 selects the whole row or column
fn index_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<Option<usize>> {
    let n = number_arg(arg, ctx)?;
    if n < 0.0 {
        return Err(ErrorCode::InvalidValue);
    }
    let n = n.trunc() as usize;
    Ok(n.checked_sub(1))
}

/// INDEX(reference, row_num, [column_num])
pub fn fn_index(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let area: Cow<'_, Area> = match arg(args, 0)? {
        reference @ (Value::Range(_) | Value::Reference(_) | Value::Error(_)) => {
            resolve_table_array_arg(reference)?
        }
        scalar => Area::from_cells(ctx.row, ctx.col, 1, 1, vec![scalar.clone()])
            .map(Cow::Owned)
            .map_err(|_| ErrorCode::InvalidReference)?,
    };

    let first = index_arg(arg(args, 1)?, ctx)?;
    let (row, col) = match args.get(2) {
        Some(c) => (first, index_arg(c, ctx)?),
        // a single index addresses whichever dimension the area has
        None if area.is_column() => (first, Some(0)),
        None if area.is_row() => (Some(0), first),
        None => return Err(ErrorCode::InvalidReference),
    };
    if row.is_some_and(|r| r >= area.height()) || col.is_some_and(|c| c >= area.width()) {
        return Err(ErrorCode::InvalidReference);
    }

    match (row, col) {
        (Some(r), Some(c)) => area.get(r, c).cloned().ok_or(ErrorCode::InvalidReference),
        (Some(r), None) => sub_area(&area, r, 1, 0, area.width()),
        (None, Some(c)) => sub_area(&area, 0, area.height(), c, 1),
        (None, None) => sub_area(&area, 0, area.height(), 0, area.width()),
    }
}

// A block of `area` starting at relative (row, col); a single cell collapses to its value
fn sub_area(area: &Area, row: usize, height: usize, col: usize, width: usize) -> EvalResult<Value> {
    if height == 1 && width == 1 {
        return area.get(row, col).cloned().ok_or(ErrorCode::InvalidReference);
    }
    let mut cells = Vec::with_capacity(height * width);
    for r in row..row + height {
        for c in col..col + width {
            cells.push(area.get(r, c).cloned().ok_or(ErrorCode::InvalidReference)?);
        }
    }
    Area::from_cells(
        area.first_row() + row as u32,
        area.first_col() + col as u32,
        height,
        width,
        cells,
    )
    .map(Value::Range)
    .map_err(|_| ErrorCode::InvalidReference)
}

/// CHOOSE(index_num, value1, [value2], ...)
pub fn fn_choose(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let index = int_arg(arg(args, 0)?, ctx)?;
    if index < 1 || index as usize >= args.len() {
        return Err(ErrorCode::InvalidValue);
    }
    Ok(match &args[index as usize] {
        Value::Missing => Value::Blank,
        Value::Reference(r) => r.inner().clone(),
        other => other.clone(),
    })
}

/// Top-left coordinates of a reference operand
fn reference_origin(arg: &Value) -> EvalResult<(u32, u32)> {
    match arg {
        Value::Reference(r) => Ok((r.row, r.col)),
        Value::Range(a) => Ok((a.first_row(), a.first_col())),
        Value::Error(e) => Err(*e),
        _ => Err(ErrorCode::InvalidValue),
    }
}

/// ROW([reference]) - the calling cell's row when omitted
pub fn fn_row(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let row = match args.first() {
        None | Some(Value::Missing) => ctx.row,
        Some(a) => reference_origin(a)?.0,
    };
    Ok(Value::Number(row as f64 + 1.0))
}

/// COLUMN([reference]) - the calling cell's column when omitted
pub fn fn_column(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let col = match args.first() {
        None | Some(Value::Missing) => ctx.col,
        Some(a) => reference_origin(a)?.1,
    };
    Ok(Value::Number(col as f64 + 1.0))
}

/// Height and width of an operand; a scalar counts as 1x1
fn dimensions(arg: &Value) -> EvalResult<(usize, usize)> {
    match arg {
        Value::Range(a) => Ok((a.height(), a.width())),
        Value::Error(e) => Err(*e),
        _ => Ok((1, 1)),
    }
}

/// ROWS(array)
pub fn fn_rows(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Number(dimensions(arg(args, 0)?)?.0 as f64))
}

/// COLUMNS(array)
pub fn fn_columns(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Number(dimensions(arg(args, 0)?)?.1 as f64))
}
