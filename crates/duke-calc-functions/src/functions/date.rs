//! Date/time functions
//!
//! Dates are serial numbers: days since a base date, with the time of day as the fraction.
//!
//! Notes:
//! - In the 1900 date system serial 1 is 1900-01-01 and serial 0 reads as the fictional
//!   1900-01-00.
//! - The 1900 system keeps the historical "1900 leap year" bug, inserting a non-existent
//!   1900-02-29 as serial 60.
//! - In the 1904 date system serial 0 is 1904-01-01 and there is no bug.

use super::FunctionDef;
use crate::context::EvaluationContext;
use crate::error::EvalResult;
use crate::resolver::{arg, number_arg, single_value, to_boolean};
use chrono::{Datelike, Duration, Local, NaiveDate, Timelike};
use duke_calc_core::{ErrorCode, Value};

const SECONDS_PER_DAY: i64 = 86_400;

/// Serial of 9999-12-31 in the active date system
fn max_serial(date_1904: bool) -> f64 {
    if date_1904 {
        2_957_003.0
    } else {
        2_958_465.0
    }
}

pub(super) const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("DATE", 3, Some(3), fn_date),
    FunctionDef::new("YEAR", 1, Some(1), fn_year),
    FunctionDef::new("MONTH", 1, Some(1), fn_month),
    FunctionDef::new("DAY", 1, Some(1), fn_day),
    FunctionDef::new("WEEKDAY", 1, Some(2), fn_weekday),
    FunctionDef::new("HOUR", 1, Some(1), fn_hour),
    FunctionDef::new("MINUTE", 1, Some(1), fn_minute),
    FunctionDef::new("SECOND", 1, Some(1), fn_second),
    FunctionDef::new("TIME", 3, Some(3), fn_time),
    FunctionDef::new("DAYS360", 2, Some(3), fn_days360),
    FunctionDef::new("TODAY", 0, Some(0), fn_today).volatile(),
    FunctionDef::new("NOW", 0, Some(0), fn_now).volatile(),
];

fn is_leap_gregorian(year: i32) -> bool {
    (year % 4 == 0) && ((year % 100 != 0) || (year % 400 == 0))
}

fn days_in_month(year: i32, month: u32, date_1904: bool) -> u32 {
    match month {
        2 if is_leap_gregorian(year) || (year == 1900 && !date_1904) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn epoch(date_1904: bool) -> Option<NaiveDate> {
    if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    }
}

/// Serial of a calendar date
///
/// In the 1900 system every date after 1900-02-28 is shifted by the phantom leap day.
fn serial_from_date(date: NaiveDate, date_1904: bool) -> Option<i64> {
    let days = (date - epoch(date_1904)?).num_days();
    let phantom = !date_1904 && date >= NaiveDate::from_ymd_opt(1900, 3, 1)?;
    Some(if phantom { days + 1 } else { days })
}

/// Serial for `year`/`month` (1-based, already normalized) plus a day offset that may run
/// past the end of the month or below 1
fn serial_from_ymd(year: i32, month: u32, day: i64, date_1904: bool) -> Option<i64> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(serial_from_date(first, date_1904)? + day - 1)
}

/// Calendar parts of a whole serial number; `None` for negative serials
fn ymd_from_serial(serial: i64, date_1904: bool) -> Option<(i32, u32, u32)> {
    if serial < 0 {
        return None;
    }
    if !date_1904 {
        match serial {
            0 => return Some((1900, 1, 0)),
            60 => return Some((1900, 2, 29)),
            _ => {}
        }
    }
    let offset = if !date_1904 && serial > 60 {
        serial - 1
    } else {
        serial
    };
    let date = epoch(date_1904)?.checked_add_signed(Duration::days(offset))?;
    Some((date.year(), date.month(), date.day()))
}

/// Evaluate a serial date argument, rejecting negative and out-of-range values
fn serial_arg(arg: &Value, ctx: &EvaluationContext) -> EvalResult<f64> {
    let n = number_arg(arg, ctx)?;
    if !(0.0..=max_serial(ctx.settings.date_1904) + 1.0).contains(&n) {
        return Err(ErrorCode::NumericError);
    }
    Ok(n)
}

fn date_parts(arg: &Value, ctx: &EvaluationContext) -> EvalResult<(i32, u32, u32)> {
    let serial = serial_arg(arg, ctx)?.floor() as i64;
    ymd_from_serial(serial, ctx.settings.date_1904).ok_or(ErrorCode::NumericError)
}

/// Time of day in whole seconds, rounded to the nearest second
fn seconds_of_day(serial: f64) -> i64 {
    let fraction = serial - serial.floor();
    ((fraction * SECONDS_PER_DAY as f64).round() as i64) % SECONDS_PER_DAY
}

/// DATE(year, month, day)
///
/// Years 0..=1899 are offset by 1900; months and days outside their usual range roll over.
pub fn fn_date(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let mut year = number_arg(arg(args, 0)?, ctx)?.trunc();
    let month = number_arg(arg(args, 1)?, ctx)?.trunc();
    let day = number_arg(arg(args, 2)?, ctx)?.trunc();

    if (0.0..1900.0).contains(&year) {
        year += 1900.0;
    }
    if !(0.0..10_000.0).contains(&year) || !month.is_finite() || !day.is_finite() {
        return Err(ErrorCode::NumericError);
    }
    if month.abs() > 1e6 || day.abs() > 1e8 {
        return Err(ErrorCode::NumericError);
    }

    // 0-based month index so negative months borrow from the year
    let total_months = year as i64 * 12 + (month as i64 - 1);
    let norm_year = total_months.div_euclid(12) as i32;
    let norm_month = total_months.rem_euclid(12) as u32 + 1;

    let serial = serial_from_ymd(norm_year, norm_month, day as i64, ctx.settings.date_1904)
        .ok_or(ErrorCode::NumericError)?;
    if serial < 0 || serial as f64 > max_serial(ctx.settings.date_1904) {
        return Err(ErrorCode::NumericError);
    }
    Ok(Value::Number(serial as f64))
}

/// YEAR(serial_number)
pub fn fn_year(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (y, _, _) = date_parts(arg(args, 0)?, ctx)?;
    Ok(Value::Number(y as f64))
}

/// MONTH(serial_number)
pub fn fn_month(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (_, m, _) = date_parts(arg(args, 0)?, ctx)?;
    Ok(Value::Number(m as f64))
}

/// DAY(serial_number)
pub fn fn_day(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let (_, _, d) = date_parts(arg(args, 0)?, ctx)?;
    Ok(Value::Number(d as f64))
}

/// WEEKDAY(serial_number, [return_type])
///
/// Return type 1: Sunday=1..Saturday=7, 2: Monday=1..Sunday=7, 3: Monday=0..Sunday=6.
pub fn fn_weekday(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let serial = serial_arg(arg(args, 0)?, ctx)?.floor() as i64;
    let return_type = match args.get(1) {
        Some(a) => number_arg(a, ctx)?.trunc(),
        None => 1.0,
    };
    // 0 = Sunday; serial 1 of the 1900 system is treated as a Sunday
    let shift = if ctx.settings.date_1904 { 5 } else { 6 };
    let sunday0 = (serial + shift) % 7;
    let monday0 = (sunday0 + 6) % 7;
    let weekday = match return_type as i64 {
        1 => sunday0 + 1,
        2 => monday0 + 1,
        3 => monday0,
        _ => return Err(ErrorCode::NumericError),
    };
    Ok(Value::Number(weekday as f64))
}

/// HOUR(serial_number)
pub fn fn_hour(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let secs = seconds_of_day(serial_arg(arg(args, 0)?, ctx)?);
    Ok(Value::Number((secs / 3600) as f64))
}

/// MINUTE(serial_number)
pub fn fn_minute(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let secs = seconds_of_day(serial_arg(arg(args, 0)?, ctx)?);
    Ok(Value::Number((secs % 3600 / 60) as f64))
}

/// SECOND(serial_number)
pub fn fn_second(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let secs = seconds_of_day(serial_arg(arg(args, 0)?, ctx)?);
    Ok(Value::Number((secs % 60) as f64))
}

/// TIME(hour, minute, second) - fraction of a day, wrapping past midnight
pub fn fn_time(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let h = number_arg(arg(args, 0)?, ctx)?.trunc();
    let m = number_arg(arg(args, 1)?, ctx)?.trunc();
    let s = number_arg(arg(args, 2)?, ctx)?.trunc();
    if [h, m, s].iter().any(|v| !v.is_finite() || v.abs() > 32_767.0) {
        return Err(ErrorCode::NumericError);
    }
    let total = h as i64 * 3600 + m as i64 * 60 + s as i64;
    if total < 0 {
        return Err(ErrorCode::NumericError);
    }
    Ok(Value::Number(
        (total % SECONDS_PER_DAY) as f64 / SECONDS_PER_DAY as f64,
    ))
}

/// DAYS360(start_date, end_date, [method])
///
/// Day count on a 360-day year. The default US (NASD) method moves a start date on the last
/// day of its month to the 30th, and an end date on the 31st to the 1st of the following
/// month when the start day is before the 30th. The European method caps both days at 30.
pub fn fn_days360(args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let date_1904 = ctx.settings.date_1904;
    let (sy, sm, sd) = date_parts(arg(args, 0)?, ctx)?;
    let (ey, em, ed) = date_parts(arg(args, 1)?, ctx)?;
    let european = match args.get(2) {
        Some(a) => to_boolean(&single_value(a, ctx.row, ctx.col)?, true)?
            .ok_or(ErrorCode::InvalidValue)?,
        None => false,
    };

    let mut start_day = sd.min(30);
    if !european && sd == days_in_month(sy, sm, date_1904) {
        start_day = 30;
    }

    let (mut end_month, mut end_day) = (em, ed.min(30));
    if !european && ed == 31 {
        if start_day < 30 {
            end_month += 1;
            end_day = 1;
        } else {
            end_day = 30;
        }
    }

    let days = (ey - sy) as i64 * 360 + (end_month as i64 - sm as i64) * 30
        + (end_day as i64 - start_day as i64);
    Ok(Value::Number(days as f64))
}

/// TODAY()
pub fn fn_today(_args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let today = Local::now().date_naive();
    serial_from_date(today, ctx.settings.date_1904)
        .map(|s| Value::Number(s as f64))
        .ok_or(ErrorCode::NumericError)
}

/// NOW()
pub fn fn_now(_args: &[Value], ctx: &EvaluationContext) -> EvalResult<Value> {
    let now = Local::now().naive_local();
    let days = serial_from_date(now.date(), ctx.settings.date_1904).ok_or(ErrorCode::NumericError)?;
    let secs = now.num_seconds_from_midnight() as f64;
    Ok(Value::Number(days as f64 + secs / SECONDS_PER_DAY as f64))
}
