//! Financial functions: time value of money and NPV

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::multi_operand::{collect_numbers, CollectOptions};
use crate::resolver::{arg, check_number, number_arg, optional_number_arg};
use duke_calc_core::{ErrorCode, Value};

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("FV", 3, Some(5), fn_fv),
    FunctionDef::new("PV", 3, Some(5), fn_pv),
    FunctionDef::new("PMT", 3, Some(5), fn_pmt),
    FunctionDef::new("NPER", 3, Some(5), fn_nper),
    FunctionDef::new("NPV", 2, None, fn_npv),
];

/// Returns `((1+rate)^nper, (1+rate)^nper - 1)` using `ln_1p`/`exp_m1` for small rates
fn pow1p(rate: f64, nper: f64) -> EvalResult<(f64, f64)> {
    let ln1p = rate.ln_1p();
    if !ln1p.is_finite() {
        return Err(ErrorCode::NumericError);
    }
    let g_minus_1 = (nper * ln1p).exp_m1();
    let g = g_minus_1 + 1.0;
    if !g.is_finite() || !g_minus_1.is_finite() {
        return Err(ErrorCode::NumericError);
    }
    Ok((g, g_minus_1))
}

/// Payments at the start of each period scale the annuity by `1 + rate`
fn payment_factor(rate: f64, g_minus_1: f64, due_at_start: bool) -> f64 {
    let annuity = g_minus_1 / rate;
    if due_at_start {
        (1.0 + rate) * annuity
    } else {
        annuity
    }
}

pub fn future_value(rate: f64, nper: f64, pmt: f64, pv: f64, due_at_start: bool) -> EvalResult<f64> {
    if rate == 0.0 {
        return Ok(-(pv + pmt * nper));
    }
    let (g, g_minus_1) = pow1p(rate, nper)?;
    Ok(-(pv * g + pmt * payment_factor(rate, g_minus_1, due_at_start)))
}

pub fn present_value(rate: f64, nper: f64, pmt: f64, fv: f64, due_at_start: bool) -> EvalResult<f64> {
    if rate == 0.0 {
        return Ok(-(fv + pmt * nper));
    }
    let (g, g_minus_1) = pow1p(rate, nper)?;
    if g == 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    Ok(-(fv + pmt * payment_factor(rate, g_minus_1, due_at_start)) / g)
}

pub fn payment(rate: f64, nper: f64, pv: f64, fv: f64, due_at_start: bool) -> EvalResult<f64> {
    if nper == 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    if rate == 0.0 {
        return Ok(-(pv + fv) / nper);
    }
    let (g, g_minus_1) = pow1p(rate, nper)?;
    let factor = payment_factor(rate, g_minus_1, due_at_start);
    if factor == 0.0 {
        return Err(ErrorCode::DivideByZero);
    }
    Ok(-(pv * g + fv) / factor)
}

pub fn periods(rate: f64, pmt: f64, pv: f64, fv: f64, due_at_start: bool) -> EvalResult<f64> {
    if rate == 0.0 {
        if pmt == 0.0 {
            return Err(ErrorCode::DivideByZero);
        }
        return Ok(-(pv + fv) / pmt);
    }
    let ln1p = rate.ln_1p();
    if !ln1p.is_finite() || ln1p == 0.0 {
        return Err(ErrorCode::NumericError);
    }
    let adjusted = if due_at_start { pmt * (1.0 + rate) } else { pmt } / rate;
    let ratio = (adjusted - fv) / (adjusted + pv);
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ErrorCode::NumericError);
    }
    Ok(ratio.ln() / ln1p)
}

/// Net present value; flow `i` (0-based) is discounted by `(1+rate)^(i+1)`
pub fn net_present_value(rate: f64, flows: &[f64]) -> EvalResult<f64> {
    if rate == -1.0 {
        return Err(ErrorCode::DivideByZero);
    }
    let mut discount = 1.0;
    let mut total = 0.0;
    for flow in flows {
        discount *= 1.0 + rate;
        total += flow / discount;
    }
    Ok(total)
}

/// The four arguments after `rate` plus the payment-type flag, with defaults for the
/// optional trailing pair
fn tvm_args(args: &[Value], ctx: &EvaluationContext) -> EvalResult<(f64, f64, f64, f64, bool)> {
    let rate = number_arg(arg(args, 0)?, ctx)?;
    let second = number_arg(arg(args, 1)?, ctx)?;
    let third = number_arg(arg(args, 2)?, ctx)?;
    let fourth = optional_number_arg(args, 3, 0.0, ctx)?;
    let due_at_start = optional_number_arg(args, 4, 0.0, ctx)? != 0.0;
    Ok((rate, second, third, fourth, due_at_start))
}

/// FV(rate, nper, pmt, [pv], [type])
pub fn fn_fv(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (rate, nper, pmt, pv, t) = tvm_args(args, ctx)?;
    check_number(future_value(rate, nper, pmt, pv, t)?)
}

/// PV(rate, nper, pmt, [fv], [type])
pub fn fn_pv(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (rate, nper, pmt, fv, t) = tvm_args(args, ctx)?;
    check_number(present_value(rate, nper, pmt, fv, t)?)
}

/// PMT(rate, nper, pv, [fv], [type])
pub fn fn_pmt(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (rate, nper, pv, fv, t) = tvm_args(args, ctx)?;
    check_number(payment(rate, nper, pv, fv, t)?)
}

/// NPER(rate, pmt, pv, [fv], [type])
pub fn fn_nper(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (rate, pmt, pv, fv, t) = tvm_args(args, ctx)?;
    check_number(periods(rate, pmt, pv, fv, t)?)
}

/// NPV(rate, value1, ...)
pub fn fn_npv(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let rate = number_arg(arg(args, 0)?, ctx)?;
    let flows = collect_numbers(args.get(1..).unwrap_or(&[]), CollectOptions::default(), ctx)?;
    check_number(net_present_value(rate, &flows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_calc_core::Area;

    fn call(f: super::super::FunctionImpl, args: &[Value]) -> f64 {
        match f(args, &EvaluationContext::simple()) {
            Ok(Value::Number(n)) => n,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_pmt() {
        let pmt = call(fn_pmt, &[num(0.08 / 12.0), num(10.0), num(10_000.0)]);
        assert_close(pmt, -1037.03, 0.005);
        let due = call(
            fn_pmt,
            &[num(0.08 / 12.0), num(10.0), num(10_000.0), num(0.0), num(1.0)],
        );
        assert_close(due, -1030.16, 0.005);
        assert_close(call(fn_pmt, &[num(0.0), num(10.0), num(1000.0)]), -100.0, 1e-12);
    }

    #[test]
    fn test_fv_pv() {
        let fv = call(
            fn_fv,
            &[num(0.06 / 12.0), num(10.0), num(-200.0), num(-500.0), num(1.0)],
        );
        assert_close(fv, 2581.40, 0.005);
        let pv = call(fn_pv, &[num(0.08 / 12.0), num(240.0), num(500.0)]);
        assert_close(pv, -59_777.15, 0.005);
        assert_close(call(fn_fv, &[num(0.0), num(10.0), num(-100.0)]), 1000.0, 1e-12);
    }

    #[test]
    fn test_nper() {
        let n = call(
            fn_nper,
            &[num(0.01), num(-100.0), num(-1000.0), num(10_000.0), num(1.0)],
        );
        assert_close(n, 59.6738657, 1e-6);
        assert_close(call(fn_nper, &[num(0.0), num(-100.0), num(1000.0)]), 10.0, 1e-12);
        assert_eq!(
            fn_nper(
                &[num(0.0), num(0.0), num(1000.0)],
                &EvaluationContext::simple()
            ),
            Err(ErrorCode::DivideByZero)
        );
    }

    #[test]
    fn test_npv() {
        let flows = Value::Range(
            Area::row(
                0,
                0,
                vec![num(-10_000.0), num(3000.0), num(4200.0), num(6800.0)],
            )
            .unwrap(),
        );
        assert_close(call(fn_npv, &[num(0.1), flows]), 1188.44, 0.005);
        assert_close(call(fn_npv, &[num(0.0), num(1.0), num(2.0)]), 3.0, 1e-12);
    }
}
