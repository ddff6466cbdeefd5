//! Math functions

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::mathx;
use crate::multi_operand::{reduce, CollectOptions};
use crate::resolver::{arg, check_number, number_arg, optional_number_arg, to_number};
use duke_calc_core::{ErrorCode, Value};

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("ABS", 1, Some(1), fn_abs),
    FunctionDef::new("INT", 1, Some(1), fn_int),
    FunctionDef::new("TRUNC", 1, Some(2), fn_trunc),
    FunctionDef::new("SIGN", 1, Some(1), fn_sign),
    FunctionDef::new("SQRT", 1, Some(1), fn_sqrt),
    FunctionDef::new("POWER", 2, Some(2), fn_power),
    FunctionDef::new("EXP", 1, Some(1), fn_exp),
    FunctionDef::new("LN", 1, Some(1), fn_ln),
    FunctionDef::new("LOG", 1, Some(2), fn_log),
    FunctionDef::new("LOG10", 1, Some(1), fn_log10),
    FunctionDef::new("PI", 0, Some(0), fn_pi),
    FunctionDef::new("SIN", 1, Some(1), fn_sin),
    FunctionDef::new("COS", 1, Some(1), fn_cos),
    FunctionDef::new("TAN", 1, Some(1), fn_tan),
    FunctionDef::new("ASIN", 1, Some(1), fn_asin),
    FunctionDef::new("ACOS", 1, Some(1), fn_acos),
    FunctionDef::new("ATAN", 1, Some(1), fn_atan),
    FunctionDef::new("ATAN2", 2, Some(2), fn_atan2),
    FunctionDef::new("SINH", 1, Some(1), fn_sinh),
    FunctionDef::new("COSH", 1, Some(1), fn_cosh),
    FunctionDef::new("TANH", 1, Some(1), fn_tanh),
    FunctionDef::new("ASINH", 1, Some(1), fn_asinh),
    FunctionDef::new("ACOSH", 1, Some(1), fn_acosh),
    FunctionDef::new("ATANH", 1, Some(1), fn_atanh),
    FunctionDef::new("DEGREES", 1, Some(1), fn_degrees),
    FunctionDef::new("RADIANS", 1, Some(1), fn_radians),
    FunctionDef::new("MOD", 2, Some(2), fn_mod),
    FunctionDef::new("FACT", 1, Some(1), fn_fact),
    FunctionDef::new("COMBIN", 2, Some(2), fn_combin),
    FunctionDef::new("FLOOR", 2, Some(2), fn_floor),
    FunctionDef::new("CEILING", 2, Some(2), fn_ceiling),
    FunctionDef::new("EVEN", 1, Some(1), fn_even),
    FunctionDef::new("ODD", 1, Some(1), fn_odd),
    FunctionDef::new("ROUND", 2, Some(2), fn_round),
    FunctionDef::new("ROUNDUP", 2, Some(2), fn_roundup),
    FunctionDef::new("ROUNDDOWN", 2, Some(2), fn_rounddown),
    FunctionDef::new("SUMSQ", 1, None, fn_sumsq),
    FunctionDef::new("SUMPRODUCT", 1, None, fn_sumproduct),
];

fn unary(args: &[Value], ctx: &EvaluationContext, f: impl Fn(f64) -> f64) -> EvalResult<Value> {
    check_number(f(number_arg(arg(args, 0)?, ctx)?))
}

fn binary(
    args: &[Value],
    ctx: &EvaluationContext,
    f: impl Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    let a = number_arg(arg(args, 0)?, ctx)?;
    let b = number_arg(arg(args, 1)?, ctx)?;
    check_number(f(a, b))
}

/// Digits argument of ROUND and friends, truncated toward zero
fn digits_arg(args: &[Value], index: usize, ctx: &EvaluationContext) -> EvalResult<i32> {
    let d = optional_number_arg(args, index, 0.0, ctx)?;
    if !d.is_finite() {
        return Err(ErrorCode::NumericError);
    }
    Ok(d.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

/// ABS function
pub fn fn_abs(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::abs)
}

/// INT function - rounds down to the nearest integer
pub fn fn_int(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::floor)
}

/// TRUNC function
pub fn fn_trunc(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    let digits = digits_arg(args, 1, ctx)?;
    check_number(mathx::round_down(n, digits))
}

/// SIGN function
pub fn fn_sign(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, |n| {
        if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        }
    })
}

/// SQRT function
pub fn fn_sqrt(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::sqrt)
}

/// POWER function
pub fn fn_power(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let base = number_arg(arg(args, 0)?, ctx)?;
    let exp = number_arg(arg(args, 1)?, ctx)?;
    if base == 0.0 && exp < 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    check_number(base.powf(exp))
}

/// EXP function
pub fn fn_exp(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::exp)
}

/// LN function
pub fn fn_ln(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::ln)
}

/// LOG function (default base 10)
pub fn fn_log(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    let base = optional_number_arg(args, 1, 10.0, ctx)?;
    if n <= 0.0 || base <= 0.0 {
        return Err(ErrorCode::NumericError);
    }
    if base == 1.0 {
        return Err(ErrorCode::DivideByZero);
    }
    if base == 10.0 {
        return check_number(n.log10());
    }
    check_number(n.ln() / base.ln())
}

/// LOG10 function
pub fn fn_log10(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::log10)
}

/// PI function
pub fn fn_pi(_args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    Ok(Value::Number(std::f64::consts::PI))
}

pub fn fn_sin(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::sin)
}

pub fn fn_cos(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::cos)
}

pub fn fn_tan(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::tan)
}

pub fn fn_asin(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::asin)
}

pub fn fn_acos(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::acos)
}

pub fn fn_atan(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::atan)
}

/// ATAN2(x_num, y_num) - angle of the point (x, y)
pub fn fn_atan2(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let x = number_arg(arg(args, 0)?, ctx)?;
    let y = number_arg(arg(args, 1)?, ctx)?;
    if x == 0.0 && y == 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    check_number(y.atan2(x))
}

pub fn fn_sinh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::sinh)
}

pub fn fn_cosh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::cosh)
}

pub fn fn_tanh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::tanh)
}

pub fn fn_asinh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::asinh)
}

pub fn fn_acosh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::acosh)
}

pub fn fn_atanh(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::atanh)
}

pub fn fn_degrees(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::to_degrees)
}

pub fn fn_radians(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, f64::to_radians)
}

/// MOD function - result takes the sign of the divisor
pub fn fn_mod(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    let d = number_arg(arg(args, 1)?, ctx)?;
    if d == 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    check_number(mathx::excel_mod(n, d))
}

/// FACT function
pub fn fn_fact(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    if n < 0.0 {
        return Err(ErrorCode::NumericError);
    }
    check_number(mathx::factorial(n.trunc().min(i64::MAX as f64) as i64))
}

/// COMBIN function
pub fn fn_combin(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    binary(args, ctx, |n, k| {
        if !n.is_finite() || !k.is_finite() {
            return f64::NAN;
        }
        mathx::n_choose_k(n.trunc() as i64, k.trunc() as i64)
    })
}

/// FLOOR function
pub fn fn_floor(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    let step = number_arg(arg(args, 1)?, ctx)?;
    if step == 0.0 && n != 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    check_number(mathx::floor(n, step))
}

/// CEILING function
pub fn fn_ceiling(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    binary(args, ctx, mathx::ceiling)
}

/// EVEN function - rounds away from zero to an even integer
pub fn fn_even(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, |n| {
        let a = n.abs().ceil();
        let even = if a % 2.0 == 0.0 { a } else { a + 1.0 };
        even.copysign(n)
    })
}

/// ODD function - rounds away from zero to an odd integer
pub fn fn_odd(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    unary(args, ctx, |n| {
        let a = n.abs().ceil();
        let odd = if a % 2.0 == 1.0 { a } else { a + 1.0 };
        if n < 0.0 {
            -odd
        } else {
            odd
        }
    })
}

/// ROUND function - halves round away from zero
pub fn fn_round(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    check_number(mathx::round(n, digits_arg(args, 1, ctx)?))
}

/// ROUNDUP function
pub fn fn_roundup(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    check_number(mathx::round_up(n, digits_arg(args, 1, ctx)?))
}

/// ROUNDDOWN function
pub fn fn_rounddown(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let n = number_arg(arg(args, 0)?, ctx)?;
    check_number(mathx::round_down(n, digits_arg(args, 1, ctx)?))
}

/// SUMSQ function
pub fn fn_sumsq(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    reduce(args, CollectOptions::default(), ctx, |v| {
        Ok(mathx::sum_of_squares(v))
    })
}

/// SUMPRODUCT function
///
/// All arrays must share one shape. Non-numeric cells count as 0; errors propagate.
pub fn fn_sumproduct(args: &[Value], _ctx: &EvaluationContext) -> EvalResult<Value> {
    let mut shape: Option<(usize, usize)> = None;
    let mut products: Vec<f64> = Vec::new();

    for a in args {
        let (dims, terms) = match a {
            Value::Range(area) => (
                (area.height(), area.width()),
                area.iter().map(product_term).collect::<EvalResult<Vec<f64>>>()?,
            ),
            Value::Reference(r) => ((1, 1), vec![product_term(r.inner())?]),
            scalar => ((1, 1), vec![to_number(scalar)?]),
        };
        match shape {
            None => {
                shape = Some(dims);
                products = terms;
            }
            Some(s) if s == dims => {
                for (p, t) in products.iter_mut().zip(terms) {
                    *p *= t;
                }
            }
            Some(_) => return Err(ErrorCode::InvalidValue),
        }
    }

    check_number(products.iter().sum())
}

fn product_term(cell: &Value) -> EvalResult<f64> {
    match cell {
        Value::Number(n) => Ok(*n),
        Value::Error(e) => Err(*e),
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_calc_core::Area;
    use pretty_assertions::assert_eq;

    fn call(f: super::super::FunctionImpl, args: &[Value]) -> EvalResult<Value> {
        f(args, &EvaluationContext::simple())
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_abs_int_sign() {
        assert_eq!(call(fn_abs, &[num(-3.5)]), Ok(num(3.5)));
        assert_eq!(call(fn_int, &[num(-3.5)]), Ok(num(-4.0)));
        assert_eq!(call(fn_sign, &[num(-0.1)]), Ok(num(-1.0)));
        assert_eq!(call(fn_sign, &[num(0.0)]), Ok(num(0.0)));
        assert_eq!(call(fn_trunc, &[num(-3.99)]), Ok(num(-3.0)));
        assert_eq!(call(fn_trunc, &[num(3.14159), num(2.0)]), Ok(num(3.14)));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(call(fn_sqrt, &[num(-1.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_ln, &[num(0.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_log, &[num(8.0), num(1.0)]), Err(ErrorCode::DivideByZero));
        match call(fn_log, &[num(8.0), num(2.0)]) {
            Ok(Value::Number(n)) => assert!((n - 3.0).abs() < 1e-12),
            other => panic!("expected a number, got {:?}", other),
        }
        assert_eq!(call(fn_log, &[num(1000.0)]), Ok(num(3.0)));
        assert_eq!(call(fn_asin, &[num(2.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_acosh, &[num(0.5)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_atanh, &[num(1.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_power, &[num(0.0), num(-1.0)]), Err(ErrorCode::DivideByZero));
        assert_eq!(call(fn_atan2, &[num(0.0), num(0.0)]), Err(ErrorCode::DivideByZero));
    }

    #[test]
    fn test_text_arguments_are_coerced() {
        assert_eq!(call(fn_abs, &[Value::text("-2")]), Ok(num(2.0)));
        assert_eq!(call(fn_abs, &[Value::text("two")]), Err(ErrorCode::InvalidValue));
        assert_eq!(call(fn_abs, &[Value::Boolean(true)]), Ok(num(1.0)));
    }

    #[test]
    fn test_mod() {
        assert_eq!(call(fn_mod, &[num(-3.0), num(2.0)]), Ok(num(1.0)));
        assert_eq!(call(fn_mod, &[num(3.0), num(0.0)]), Err(ErrorCode::DivideByZero));
    }

    #[test]
    fn test_fact_and_combin() {
        assert_eq!(call(fn_fact, &[num(0.0)]), Ok(num(1.0)));
        assert_eq!(call(fn_fact, &[num(5.9)]), Ok(num(120.0)));
        assert_eq!(call(fn_fact, &[num(-1.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_fact, &[num(171.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_combin, &[num(5.0), num(2.0)]), Ok(num(10.0)));
        assert_eq!(call(fn_combin, &[num(2.0), num(5.0)]), Err(ErrorCode::NumericError));
    }

    #[test]
    fn test_floor_ceiling() {
        assert_eq!(call(fn_floor, &[num(1.0), num(0.0)]), Err(ErrorCode::DivideByZero));
        assert_eq!(call(fn_floor, &[num(0.0), num(0.0)]), Ok(num(0.0)));
        assert_eq!(call(fn_floor, &[num(7.0), num(-2.0)]), Err(ErrorCode::NumericError));
        assert_eq!(call(fn_floor, &[num(7.0), num(2.0)]), Ok(num(6.0)));
        assert_eq!(call(fn_ceiling, &[num(7.0), num(2.0)]), Ok(num(8.0)));
        assert_eq!(call(fn_ceiling, &[num(7.0), num(0.0)]), Ok(num(0.0)));
    }

    #[test]
    fn test_even_odd() {
        assert_eq!(call(fn_even, &[num(1.5)]), Ok(num(2.0)));
        assert_eq!(call(fn_even, &[num(3.0)]), Ok(num(4.0)));
        assert_eq!(call(fn_even, &[num(-1.0)]), Ok(num(-2.0)));
        assert_eq!(call(fn_odd, &[num(0.0)]), Ok(num(1.0)));
        assert_eq!(call(fn_odd, &[num(2.0)]), Ok(num(3.0)));
        assert_eq!(call(fn_odd, &[num(-1.5)]), Ok(num(-3.0)));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(call(fn_round, &[num(2.5), num(0.0)]), Ok(num(3.0)));
        assert_eq!(call(fn_round, &[num(-2.5), num(0.0)]), Ok(num(-3.0)));
        assert_eq!(call(fn_round, &[num(1234.5678), num(-2.0)]), Ok(num(1200.0)));
        assert_eq!(call(fn_round, &[num(1.005), num(2.7)]), Ok(num(1.01)));
        assert_eq!(call(fn_roundup, &[num(3.2), num(0.0)]), Ok(num(4.0)));
        assert_eq!(call(fn_rounddown, &[num(-3.7), num(0.0)]), Ok(num(-3.0)));
    }

    #[test]
    fn test_rounding_far_past_the_value() {
        assert_eq!(call(fn_round, &[num(5.0), num(-400.0)]), Ok(num(0.0)));
        assert_eq!(call(fn_round, &[num(1e300), num(400.0)]), Ok(num(1e300)));
        assert_eq!(call(fn_rounddown, &[num(-7.0), num(-400.0)]), Ok(num(0.0)));
    }

    #[test]
    fn test_sumsq() {
        let range = Value::Range(
            Area::column(0, 0, vec![num(1.0), Value::text("x"), num(2.0)]).unwrap(),
        );
        assert_eq!(call(fn_sumsq, &[range, num(3.0)]), Ok(num(14.0)));
    }

    #[test]
    fn test_sumproduct() {
        let a = Value::Range(Area::column(0, 0, vec![num(1.0), num(2.0), num(3.0)]).unwrap());
        let b = Value::Range(
            Area::column(0, 1, vec![num(4.0), Value::text("x"), num(6.0)]).unwrap(),
        );
        assert_eq!(call(fn_sumproduct, &[a.clone(), b]), Ok(num(22.0)));
        assert_eq!(call(fn_sumproduct, &[a.clone()]), Ok(num(6.0)));

        let short = Value::Range(Area::column(0, 1, vec![num(4.0), num(5.0)]).unwrap());
        assert_eq!(
            call(fn_sumproduct, &[a.clone(), short]),
            Err(ErrorCode::InvalidValue)
        );

        let bad = Value::Range(
            Area::column(0, 1, vec![num(4.0), Value::Error(ErrorCode::NotAvailable), num(6.0)])
                .unwrap(),
        );
        assert_eq!(call(fn_sumproduct, &[a, bad]), Err(ErrorCode::NotAvailable));
    }
}
