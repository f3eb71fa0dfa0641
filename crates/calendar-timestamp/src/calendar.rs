//! Calendar-length lookup on the proleptic Gregorian calendar.
//!
//! Month lengths come from [`chrono::NaiveDate`]: the last day of a month is
//! the day before the first of the following month, so leap years fall out
//! of chrono's own calendar rules. December always ends on the 31st, which
//! keeps the last supported year usable.

use chrono::{Datelike, NaiveDate};

use crate::error::{CalendarError, Result};

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year` (28..=31).
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if `month` is not in `1..=12`, or
/// [`CalendarError::OutOfRange`] if `year` is outside chrono's supported range.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    Ok(last_day_of_month(year, month)?.day())
}

/// The last date of `month` in `year`.
pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    check_month(year, month)?;
    let last = if month == 12 {
        NaiveDate::from_ymd_opt(year, 12, 31)
    } else {
        let first_of_next = NaiveDate::from_ymd_opt(year, month + 1, 1);
        first_of_next.and_then(|first| first.pred_opt())
    };
    last.ok_or_else(|| CalendarError::OutOfRange(format!("year {year} is not representable")))
}

/// Validate a (year, month, day) triple and return it as a [`NaiveDate`].
///
/// Never clamps: a day past the end of the month is an error naming the day
/// and the month it was checked against.
pub fn checked_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let last = days_in_month(year, month)?;
    if day == 0 || day > last {
        return Err(CalendarError::InvalidDate(format!(
            "day {day} invalid for {year:04}-{month:02}"
        )));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CalendarError::OutOfRange(format!("{year:04}-{month:02}-{day:02}")))
}

/// Build a date from (year, month, day), reducing `day` to the last valid day
/// of the month when the month is shorter.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let last = days_in_month(year, month)?;
    checked_date(year, month, day.clamp(1, last))
}

fn check_month(year: i32, month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CalendarError::InvalidDate(format!(
            "month {month} invalid for year {year:04}"
        )))
    }
}
