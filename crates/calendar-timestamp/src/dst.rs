//! DST transition policies.
//!
//! Rebuilding a timestamp from wall-clock fields (month arithmetic, boundary
//! queries, relabeling) can land on a local time that a zone skips (a gap,
//! when clocks spring forward) or repeats (a fold, when clocks fall back).
//! [`Disambiguation`] decides which instant such a wall-clock time maps to.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// How to map a local time that is skipped or repeated by a DST transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disambiguation {
    /// Fold: earlier instant. Gap: shift forward by the length of the gap.
    #[default]
    Compatible,
    /// Fold: earlier instant. Gap: shift backward by the length of the gap.
    Earlier,
    /// Fold: later instant. Gap: shift forward by the length of the gap.
    Later,
    /// Fail with [`CalendarError::InvalidLocalTime`] for any gap or fold.
    Reject,
}

/// Resolve wall-clock `naive` in `tz` under `policy`.
pub fn resolve_local(
    tz: &Tz,
    naive: &NaiveDateTime,
    policy: Disambiguation,
) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, later) => match policy {
            Disambiguation::Compatible | Disambiguation::Earlier => Ok(earlier),
            Disambiguation::Later => Ok(later),
            Disambiguation::Reject => Err(CalendarError::InvalidLocalTime(format!(
                "{naive} is ambiguous in {}",
                tz.name()
            ))),
        },
        LocalResult::None => match policy {
            Disambiguation::Compatible | Disambiguation::Later => {
                let before = offset_seconds_near(tz, naive, -1)?;
                shift_out_of_gap(tz, naive, before)
            }
            Disambiguation::Earlier => {
                let after = offset_seconds_near(tz, naive, 1)?;
                shift_out_of_gap(tz, naive, after)
            }
            Disambiguation::Reject => Err(CalendarError::InvalidLocalTime(format!(
                "{naive} does not exist in {}",
                tz.name()
            ))),
        },
    }
}

/// UTC offset in effect one day before (`direction < 0`) or after `naive`.
fn offset_seconds_near(tz: &Tz, naive: &NaiveDateTime, direction: i64) -> Result<i32> {
    let at = naive
        .checked_add_signed(TimeDelta::days(direction))
        .ok_or_else(|| out_of_range(naive))?;
    Ok(tz.offset_from_utc_datetime(&at).fix().local_minus_utc())
}

/// Interpret `naive` with a fixed offset taken from one side of the gap.
fn shift_out_of_gap(tz: &Tz, naive: &NaiveDateTime, offset_seconds: i32) -> Result<DateTime<Tz>> {
    let utc = naive
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset_seconds)))
        .ok_or_else(|| out_of_range(naive))?;
    Ok(tz.from_utc_datetime(&utc))
}

fn out_of_range(naive: &NaiveDateTime) -> CalendarError {
    CalendarError::OutOfRange(format!("{naive} cannot be resolved"))
}
