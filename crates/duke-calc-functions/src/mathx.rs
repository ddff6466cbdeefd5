//! Numeric and statistical primitives
//!
//! Pure functions over `f64` slices. Domain failures come back as NaN (or `None`/`Err`
//! where noted) and the function bodies translate them into spreadsheet errors.

use crate::error::EvalResult;
use ahash::AHashMap;
use duke_calc_core::ErrorCode;
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

/// Sum of all values (0 for an empty slice)
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Sum of squares
pub fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Product of all values
///
/// An empty slice yields 0, not 1, matching PRODUCT over a range with no numbers.
pub fn product(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().product()
}

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    sum(values) / values.len() as f64
}

/// Smallest value (+inf for an empty slice)
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest value (-inf for an empty slice)
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Sum of squared deviations from the mean
pub fn sum_of_squared_deviations(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

/// Mean absolute deviation from the mean
pub fn average_absolute_deviation(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).abs()).sum::<f64>() / values.len() as f64
}

/// Sample variance; needs at least two values
pub fn sample_variance(values: &[f64]) -> EvalResult<f64> {
    if values.len() < 2 {
        return Err(ErrorCode::DivideByZero);
    }
    Ok(sum_of_squared_deviations(values) / (values.len() - 1) as f64)
}

/// Population variance; needs at least one value
pub fn population_variance(values: &[f64]) -> EvalResult<f64> {
    if values.is_empty() {
        return Err(ErrorCode::DivideByZero);
    }
    Ok(sum_of_squared_deviations(values) / values.len() as f64)
}

/// Sample standard deviation; needs at least two values
pub fn sample_standard_deviation(values: &[f64]) -> EvalResult<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Population standard deviation; needs at least one value
pub fn population_standard_deviation(values: &[f64]) -> EvalResult<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Median (NaN for an empty slice)
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value
///
/// Ties go to the value that appears first. `None` when no value occurs more than once.
pub fn mode(values: &[f64]) -> Option<f64> {
    // bits of the value -> (first index, occurrences); -0.0 folds into 0.0
    let mut counts: AHashMap<u64, (usize, usize)> = AHashMap::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let key = if *v == 0.0 { 0.0f64 } else { *v }.to_bits();
        counts.entry(key).or_insert((i, 0)).1 += 1;
    }
    counts
        .into_values()
        .filter(|(_, count)| *count > 1)
        .max_by(|(ia, ca), (ib, cb)| ca.cmp(cb).then(ib.cmp(ia)))
        .map(|(first, _)| values[first])
}

/// The k-th largest value, 1-based; `None` when `k` is out of range
pub fn kth_largest(values: &[f64], k: usize) -> Option<f64> {
    if k == 0 || k > values.len() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    Some(sorted[k - 1])
}

/// The k-th smallest value, 1-based; `None` when `k` is out of range
pub fn kth_smallest(values: &[f64], k: usize) -> Option<f64> {
    if k == 0 || k > values.len() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[k - 1])
}

/// Round half away from zero to `places` decimal places (negative rounds left of the point)
pub fn round(n: f64, places: i32) -> f64 {
    round_with(n, places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round away from zero
pub fn round_up(n: f64, places: i32) -> f64 {
    round_with(n, places, RoundingStrategy::AwayFromZero)
}

/// Round toward zero
pub fn round_down(n: f64, places: i32) -> f64 {
    round_with(n, places, RoundingStrategy::ToZero)
}

fn round_with(n: f64, places: i32, strategy: RoundingStrategy) -> f64 {
    if !n.is_finite() {
        return n;
    }
    decimal_round(n, places, strategy).unwrap_or_else(|| float_round(n, places, strategy))
}

// Rounds the shortest decimal text of `n`, so 2.675 rounds as written rather than as its
// binary approximation.
fn decimal_round(n: f64, places: i32, strategy: RoundingStrategy) -> Option<f64> {
    let d = Decimal::from_str(&n.to_string()).ok()?;
    let rounded = if places >= 0 {
        d.round_dp_with_strategy(places.min(28) as u32, strategy)
    } else {
        let shift = places.unsigned_abs();
        if shift > 28 {
            return None;
        }
        let scale = Decimal::try_from_i128_with_scale(10i128.pow(shift), 0).ok()?;
        d.checked_div(scale)?
            .round_dp_with_strategy(0, strategy)
            .checked_mul(scale)?
    };
    rounded.to_f64()
}

// Fallback for digit counts outside what `Decimal` can scale.
fn float_round(n: f64, places: i32, strategy: RoundingStrategy) -> f64 {
    if n == 0.0 {
        return n;
    }
    let magnitude = n.abs().log10().floor() as i32;
    if places > 15 - magnitude {
        // already exact at this precision
        return n;
    }
    if places < -magnitude {
        // the rounding step exceeds |n|, so the result is 0 or one step
        let step = 10f64.powi(places.saturating_neg());
        let r = match strategy {
            RoundingStrategy::AwayFromZero => step,
            RoundingStrategy::ToZero => 0.0,
            _ if n.abs() * 2.0 >= step => step,
            _ => 0.0,
        };
        return r.copysign(n);
    }
    // split the scale so neither factor overflows for subnormal or huge inputs
    let a = 10f64.powi(places / 2);
    let b = 10f64.powi(places - places / 2);
    let scaled = n.abs() * a * b;
    let r = match strategy {
        RoundingStrategy::AwayFromZero => scaled.ceil(),
        RoundingStrategy::ToZero => scaled.trunc(),
        _ => scaled.round(),
    };
    (r / a / b).copysign(n)
}

/// n! as a float; NaN for negative `n`, +inf once the result overflows
pub fn factorial(n: i64) -> f64 {
    if n < 0 {
        return f64::NAN;
    }
    if n > 170 {
        return f64::INFINITY;
    }
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Binomial coefficient; NaN when `k` is outside `0..=n`
pub fn n_choose_k(n: i64, k: i64) -> f64 {
    if n < 0 || k < 0 || k > n {
        return f64::NAN;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 1..=k {
        result = result * (n - k + i) as f64 / i as f64;
    }
    result.round()
}

/// Modulus taking the sign of the divisor; NaN for a zero divisor
pub fn excel_mod(n: f64, d: f64) -> f64 {
    if d == 0.0 {
        return f64::NAN;
    }
    let r = n % d;
    if r != 0.0 && (r < 0.0) != (d < 0.0) {
        r + d
    } else {
        r
    }
}

/// Round `n` down (toward zero) to a multiple of `step`
///
/// NaN when the signs differ or when a non-zero value meets a zero step.
pub fn floor(n: f64, step: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    if step == 0.0 || (n < 0.0) != (step < 0.0) {
        return f64::NAN;
    }
    step * snap(n / step).floor()
}

/// Round `n` up (away from zero) to a multiple of `step`
///
/// A zero step yields 0; differing signs yield NaN.
pub fn ceiling(n: f64, step: f64) -> f64 {
    if n == 0.0 || step == 0.0 {
        return 0.0;
    }
    if (n < 0.0) != (step < 0.0) {
        return f64::NAN;
    }
    step * snap(n / step).ceil()
}

// Absorb representation noise such as 0.3 / 0.1 == 2.9999999999999996.
fn snap(q: f64) -> f64 {
    let nearest = q.round();
    if (q - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        nearest
    } else {
        q
    }
}
