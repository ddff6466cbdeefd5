//! Statistical and aggregate functions

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::criteria::build_predicate;
use crate::error::EvalResult;
use crate::lookup_utils::resolve_table_array_arg;
use crate::mathx;
use crate::multi_operand::{collect_numbers, reduce, CollectOptions};
use crate::resolver::{arg, number_arg};
use duke_calc_core::{Area, ErrorCode, Value};

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("SUM", 0, None, fn_sum),
    FunctionDef::new("AVERAGE", 1, None, fn_average),
    FunctionDef::new("AVERAGEA", 1, None, fn_averagea),
    FunctionDef::new("MIN", 1, None, fn_min),
    FunctionDef::new("MAX", 1, None, fn_max),
    FunctionDef::new("MINA", 1, None, fn_mina),
    FunctionDef::new("MAXA", 1, None, fn_maxa),
    FunctionDef::new("PRODUCT", 1, None, fn_product),
    FunctionDef::new("COUNT", 0, None, fn_count),
    FunctionDef::new("COUNTA", 1, None, fn_counta),
    FunctionDef::new("COUNTBLANK", 1, Some(1), fn_countblank),
    FunctionDef::new("COUNTIF", 2, Some(2), fn_countif),
    FunctionDef::new("SUMIF", 2, Some(3), fn_sumif),
    FunctionDef::new("AVERAGEIF", 2, Some(3), fn_averageif),
    FunctionDef::new("STDEV", 1, None, fn_stdev),
    FunctionDef::new("STDEVP", 1, None, fn_stdevp),
    FunctionDef::new("VAR", 1, None, fn_var),
    FunctionDef::new("VARP", 1, None, fn_varp),
    FunctionDef::new("DEVSQ", 1, None, fn_devsq),
    FunctionDef::new("AVEDEV", 1, None, fn_avedev),
    FunctionDef::new("MEDIAN", 1, None, fn_median),
    FunctionDef::new("MODE", 1, None, fn_mode),
    FunctionDef::new("LARGE", 2, Some(2), fn_large),
    FunctionDef::new("SMALL", 2, Some(2), fn_small),
];

fn non_empty(values: &[f64], error: ErrorCode) -> EvalResult<&[f64]> {
    if values.is_empty() {
        Err(error)
    } else {
        Ok(values)
    }
}

/// SUM function
pub fn fn_sum(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| Ok(mathx::sum(v)))
}

/// AVERAGE function
pub fn fn_average(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(mathx::mean(non_empty(v, ErrorCode::DivideByZero)?))
    })
}

/// AVERAGEA function - referenced text counts as 0 and booleans as 0/1
pub fn fn_averagea(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::counting_all(), ctx, |v| {
        Ok(mathx::mean(non_empty(v, ErrorCode::DivideByZero)?))
    })
}

/// MIN function (0 when there are no numbers)
pub fn fn_min(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(if v.is_empty() { 0.0 } else { mathx::min(v) })
    })
}

/// MAX function (0 when there are no numbers)
pub fn fn_max(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(if v.is_empty() { 0.0 } else { mathx::max(v) })
    })
}

pub fn fn_mina(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::counting_all(), ctx, |v| {
        Ok(if v.is_empty() { 0.0 } else { mathx::min(v) })
    })
}

pub fn fn_maxa(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::counting_all(), ctx, |v| {
        Ok(if v.is_empty() { 0.0 } else { mathx::max(v) })
    })
}

/// PRODUCT function
pub fn fn_product(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| Ok(mathx::product(v)))
}

/// COUNT function - counts numbers and omitted arguments
pub fn fn_count(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    let count = count_matching(args, |v| matches!(v, Value::Number(_) | Value::Missing));
    Ok(Value::Number(count as f64))
}

/// COUNTA function - counts everything except blank cells
pub fn fn_counta(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    let count = count_matching(args, |v| !v.is_blank());
    Ok(Value::Number(count as f64))
}

fn count_matching(args: &[Value], predicate: impl Fn(&Value) -> bool) -> usize {
    args.iter()
        .map(|a| match a {
            Value::Range(area) => area.iter().filter(|v| predicate(v)).count(),
            Value::Reference(r) => usize::from(predicate(r.inner())),
            direct => usize::from(predicate(direct)),
        })
        .sum()
}

/// COUNTBLANK function - blank cells and empty text
pub fn fn_countblank(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    let area = resolve_table_array_arg(arg(args, 0)?)?;
    let count = area
        .iter()
        .filter(|v| match v {
            Value::Blank => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        })
        .count();
    Ok(Value::Number(count as f64))
}

/// COUNTIF function
pub fn fn_countif(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let range = resolve_table_array_arg(arg(args, 0)?)?;
    let count = match build_predicate(arg(args, 1)?, ctx) {
        Some(p) => range.iter().filter(|v| p.matches(v)).count(),
        None => 0,
    };
    Ok(Value::Number(count as f64))
}

/// Numbers from the sum range whose criteria cell matches
///
/// The sum range is re-anchored to the criteria range's shape at its own top-left corner.
/// Errors in matching sum cells propagate.
fn matching_numbers(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Vec<f64>> {
    let range = resolve_table_array_arg(arg(args, 0)?)?;
    let Some(predicate) = build_predicate(arg(args, 1)?, ctx) else {
        return Ok(Vec::new());
    };
    let sum_range: Area = match args.get(2) {
        Some(a) => resolve_table_array_arg(a)?
            .reshaped(range.height(), range.width())
            .map_err(|_| ErrorCode::InvalidReference)?,
        None => range.clone().into_owned(),
    };

    let mut out = Vec::new();
    for ((r, c), cell) in range.indexed() {
        if !predicate.matches(cell) {
            continue;
        }
        match sum_range.get(r, c) {
            Some(Value::Number(n)) => out.push(*n),
            Some(Value::Error(e)) => return Err(*e),
            _ => {}
        }
    }
    Ok(out)
}

/// SUMIF function
pub fn fn_sumif(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Number(mathx::sum(&matching_numbers(args, ctx)?)))
}

/// AVERAGEIF function
pub fn fn_averageif(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let values = matching_numbers(args, ctx)?;
    Ok(Value::Number(mathx::mean(non_empty(
        &values,
        ErrorCode::DivideByZero,
    )?)))
}

/// STDEV function (sample)
pub fn fn_stdev(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, mathx::sample_standard_deviation)
}

/// STDEVP function (population)
pub fn fn_stdevp(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, mathx::population_standard_deviation)
}

/// VAR function (sample)
pub fn fn_var(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, mathx::sample_variance)
}

/// VARP function (population)
pub fn fn_varp(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, mathx::population_variance)
}

/// DEVSQ function
pub fn fn_devsq(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(mathx::sum_of_squared_deviations(non_empty(
            v,
            ErrorCode::NumericError,
        )?))
    })
}

/// AVEDEV function
pub fn fn_avedev(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(mathx::average_absolute_deviation(non_empty(
            v,
            ErrorCode::NumericError,
        )?))
    })
}

/// MEDIAN function
pub fn fn_median(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(mathx::median(non_empty(v, ErrorCode::NumericError)?))
    })
}

/// MODE function - `#N/A` when no value repeats
pub fn fn_mode(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        mathx::mode(v).ok_or(ErrorCode::NotAvailable)
    })
}

/// LARGE function
pub fn fn_large(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    kth(args, ctx, mathx::kth_largest)
}

/// SMALL function
pub fn fn_small(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    kth(args, ctx, mathx::kth_smallest)
}

fn kth(
    args: &[Value],
    ctx: &EvaluationContext,
    select: fn(&[f64], usize) -> Option<f64>,
) -> EvalResult<Value> {
    let values = collect_numbers(&args[..1.min(args.len())], CollectOptions::default(), ctx)?;
    let k = number_arg(arg(args, 1)?, ctx)?;
    if k.is_nan() || k < 1.0 {
        return Err(ErrorCode::NumericError);
    }
    let k = k.ceil().min(usize::MAX as f64) as usize;
    select(&values, k)
        .map(Value::Number)
        .ok_or(ErrorCode::NumericError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(f: super::super::FunctionImpl, args: &[Value]) -> EvalResult<Value> {
        f(args, &EvaluationContext::simple())
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn column(values: Vec<Value>) -> Value {
        Value::Range(Area::column(0, 0, values).unwrap())
    }

    fn numbers(values: &[f64]) -> Value {
        column(values.iter().copied().map(Value::Number).collect())
    }

    #[test]
    fn test_sum_and_average() {
        let r = column(vec![num(1.0), Value::text("x"), Value::Boolean(true), num(2.0)]);
        assert_eq!(call(fn_sum, &[r.clone(), num(3.0)]), Ok(num(6.0)));
        assert_eq!(call(fn_sum, &[]), Ok(num(0.0)));
        assert_eq!(call(fn_average, &[r.clone()]), Ok(num(1.5)));
        assert_eq!(call(fn_averagea, &[r]), Ok(num(1.0)));
        assert_eq!(
            call(fn_average, &[column(vec![Value::Blank])]),
            Err(ErrorCode::DivideByZero)
        );
    }

    #[test]
    fn test_min_max() {
        let r = numbers(&[3.0, -1.0, 7.0]);
        assert_eq!(call(fn_min, &[r.clone()]), Ok(num(-1.0)));
        assert_eq!(call(fn_max, &[r]), Ok(num(7.0)));
        assert_eq!(call(fn_max, &[column(vec![Value::text("a")])]), Ok(num(0.0)));
        let r = column(vec![num(-2.0), Value::Boolean(true)]);
        assert_eq!(call(fn_maxa, &[r.clone()]), Ok(num(1.0)));
        assert_eq!(call(fn_mina, &[r]), Ok(num(-2.0)));
    }

    #[test]
    fn test_product() {
        assert_eq!(call(fn_product, &[numbers(&[2.0, 3.0]), num(4.0)]), Ok(num(24.0)));
        assert_eq!(call(fn_product, &[column(vec![Value::Blank])]), Ok(num(0.0)));
    }

    #[test]
    fn test_counts() {
        let r = column(vec![
            num(1.0),
            Value::text("a"),
            Value::Blank,
            Value::text(""),
            Value::Boolean(false),
            Value::Error(ErrorCode::NotAvailable),
        ]);
        assert_eq!(call(fn_count, &[r.clone(), Value::Missing]), Ok(num(2.0)));
        assert_eq!(call(fn_counta, &[r.clone()]), Ok(num(5.0)));
        assert_eq!(call(fn_countblank, &[r]), Ok(num(2.0)));
    }

    #[test]
    fn test_countif() {
        let r = column(vec![
            num(1.0),
            num(2.0),
            Value::text("apple"),
            Value::Boolean(true),
            Value::text(""),
        ]);
        assert_eq!(call(fn_countif, &[r.clone(), Value::text(">1")]), Ok(num(1.0)));
        assert_eq!(call(fn_countif, &[r.clone(), Value::text("a*")]), Ok(num(1.0)));
        assert_eq!(call(fn_countif, &[r.clone(), Value::Blank]), Ok(num(0.0)));
        assert_eq!(call(fn_countif, &[r.clone(), Value::Boolean(true)]), Ok(num(1.0)));
        assert_eq!(call(fn_countif, &[r, Value::text("<>1")]), Ok(num(4.0)));
        assert_eq!(
            call(fn_countif, &[num(1.0), num(1.0)]),
            Err(ErrorCode::InvalidValue)
        );
    }

    #[test]
    fn test_sumif() {
        let names = column(vec![Value::text("a"), Value::text("b"), Value::text("a")]);
        let amounts = Value::Range(
            Area::column(0, 1, vec![num(10.0), num(20.0), num(30.0)]).unwrap(),
        );
        assert_eq!(
            call(fn_sumif, &[names.clone(), Value::text("a"), amounts.clone()]),
            Ok(num(40.0))
        );
        assert_eq!(
            call(fn_averageif, &[names.clone(), Value::text("a"), amounts.clone()]),
            Ok(num(20.0))
        );
        assert_eq!(
            call(fn_averageif, &[names, Value::text("z"), amounts]),
            Err(ErrorCode::DivideByZero)
        );

        let r = numbers(&[1.0, 5.0, 10.0]);
        assert_eq!(call(fn_sumif, &[r, Value::text(">=5")]), Ok(num(15.0)));
    }

    #[test]
    fn test_sumif_sum_range_is_reshaped() {
        let keys = column(vec![Value::text("x"), Value::text("y"), Value::text("x")]);
        // only the first cell of the sum range is supplied; the rest read as blank
        let short = Value::Range(Area::column(0, 1, vec![num(5.0)]).unwrap());
        assert_eq!(call(fn_sumif, &[keys, Value::text("x"), short]), Ok(num(5.0)));
    }

    #[test]
    fn test_sumif_errors_only_when_matched() {
        let keys = column(vec![Value::text("x"), Value::text("y")]);
        let sums = Value::Range(
            Area::column(0, 1, vec![num(1.0), Value::Error(ErrorCode::DivideByZero)]).unwrap(),
        );
        assert_eq!(
            call(fn_sumif, &[keys.clone(), Value::text("x"), sums.clone()]),
            Ok(num(1.0))
        );
        assert_eq!(
            call(fn_sumif, &[keys, Value::text("y"), sums]),
            Err(ErrorCode::DivideByZero)
        );
    }

    #[test]
    fn test_dispersion() {
        let r = numbers(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(call(fn_stdevp, &[r.clone()]), Ok(num(2.0)));
        assert_eq!(call(fn_varp, &[r.clone()]), Ok(num(4.0)));
        assert_eq!(call(fn_devsq, &[r.clone()]), Ok(num(32.0)));
        assert_eq!(call(fn_avedev, &[r]), Ok(num(1.5)));
        assert_eq!(call(fn_stdev, &[num(1.0)]), Err(ErrorCode::DivideByZero));
        assert_eq!(call(fn_var, &[num(1.0), num(3.0)]), Ok(num(2.0)));
    }

    #[test]
    fn test_median_mode() {
        assert_eq!(call(fn_median, &[numbers(&[5.0, 1.0, 3.0, 2.0])]), Ok(num(2.5)));
        assert_eq!(
            call(fn_median, &[column(vec![Value::text("a")])]),
            Err(ErrorCode::NumericError)
        );
        assert_eq!(call(fn_mode, &[numbers(&[1.0, 2.0, 2.0, 3.0])]), Ok(num(2.0)));
        assert_eq!(
            call(fn_mode, &[numbers(&[1.0, 2.0, 3.0])]),
            Err(ErrorCode::NotAvailable)
        );
    }

    #[test]
    fn test_large_small() {
        let r = numbers(&[1.0, 2.0, 3.0, 3.0, 4.0]);
        assert_eq!(call(fn_large, &[r.clone(), num(2.0)]), Ok(num(3.0)));
        assert_eq!(call(fn_large, &[r.clone(), num(1.5)]), Ok(num(3.0)));
        assert_eq!(call(fn_small, &[r.clone(), num(1.0)]), Ok(num(1.0)));
        assert_eq!(call(fn_small, &[r.clone(), num(0.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_large, &[r, num(6.0)]), Err(ErrorCode::NumericError));
    }
}
