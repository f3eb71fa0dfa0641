//! Calendar-aware timestamps.
//!
//! [`CalendarTimestamp`] wraps a `chrono::DateTime<Tz>` and always carries an
//! explicit zone. On top of chrono's instant arithmetic it adds:
//!
//! - month and year arithmetic that clamps the day to the target month
//!   (Jan 30 + 1 month is Feb 28/29, never March)
//! - fixed-duration day, week, hour, minute and second arithmetic
//! - start/end of day, month and year
//! - relabeling (keep wall clock, change zone) and converting (keep instant,
//!   change zone)
//! - range and equality predicates
//!
//! Every operation returns a new value. Comparison, ordering and hashing use
//! the absolute instant, exactly like `DateTime<Tz>`.
//!
//! # Examples
//!
//! ```
//! use calendar_timestamp::{CalendarTimestamp, WallClock};
//!
//! let jan30 = CalendarTimestamp::new(WallClock::date(2016, 1, 30), Some("UTC")).unwrap();
//! let feb = jan30.plus_months(1).unwrap();
//! assert_eq!((feb.month(), feb.day()), (2, 29));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, TimeDelta,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::calendar;
use crate::config::ZoneConfig;
use crate::dst::{self, Disambiguation};
use crate::error::{CalendarError, Result};
use crate::zone;

/// 23:59:59.999999 on `date`.
fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .ok_or_else(|| CalendarError::InvalidTime(format!("end of day on {date}")))
}

// ── Wall-clock fields ───────────────────────────────────────────────────────

/// The seven wall-clock fields of a timestamp, without a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallClock {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    /// 1 up to the length of the month.
    pub day: u32,
    /// 0-23.
    pub hour: u32,
    /// 0-59.
    pub minute: u32,
    /// 0-59.
    pub second: u32,
    /// 0-999999.
    pub microsecond: u32,
}

impl WallClock {
    /// Midnight on the given date.
    pub fn date(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond: 0,
        }
    }

    pub fn with_microsecond(self, microsecond: u32) -> Self {
        Self {
            microsecond,
            ..self
        }
    }

    /// Validate the fields and build a naive datetime. Never clamps.
    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        let date = calendar::checked_date(self.year, self.month, self.day)?;
        check_field("hour", self.hour, 23)?;
        check_field("minute", self.minute, 59)?;
        check_field("second", self.second, 59)?;
        check_field("microsecond", self.microsecond, 999_999)?;
        NaiveTime::from_hms_micro_opt(self.hour, self.minute, self.second, self.microsecond)
            .map(|time| date.and_time(time))
            .ok_or_else(|| CalendarError::InvalidTime(format!("{self:?}")))
    }

    fn from_naive(naive: &NaiveDateTime) -> Self {
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
            microsecond: (naive.nanosecond() % 1_000_000_000) / 1_000,
        }
    }
}

fn check_field(name: &str, value: u32, max: u32) -> Result<()> {
    if value > max {
        return Err(CalendarError::InvalidTime(format!(
            "{name} {value} out of range 0..={max}"
        )));
    }
    Ok(())
}

// ── CalendarTimestamp ───────────────────────────────────────────────────────

/// An immutable point in time with an attached zone.
///
/// The [`Disambiguation`] policy it carries decides how wall-clock rebuilds
/// (month arithmetic, boundaries, relabeling) treat DST gaps and folds. It
/// does not take part in comparison.
#[derive(Debug, Clone, Copy)]
pub struct CalendarTimestamp {
    inner: DateTime<Tz>,
    disambiguation: Disambiguation,
}

impl CalendarTimestamp {
    // ── Construction ────────────────────────────────────────────────────

    /// Build a timestamp from wall-clock fields in the zone named `zone`, or
    /// in the process local zone when `zone` is `None`.
    ///
    /// # Errors
    ///
    /// - [`CalendarError::InvalidDate`] for a (year, month, day) that does not
    ///   exist, e.g. `"day 30 invalid for 2015-02"`
    /// - [`CalendarError::InvalidTime`] for an out-of-range time field
    /// - [`CalendarError::UnknownTimezone`] if `zone` is not in the database
    /// - [`CalendarError::InvalidLocalTime`] if the fields fall in a DST gap
    ///   or fold and the policy is [`Disambiguation::Reject`]
    pub fn new(fields: WallClock, zone: Option<&str>) -> Result<Self> {
        Self::new_with(fields, zone, &ZoneConfig::system())
    }

    /// Like [`CalendarTimestamp::new`], with an explicit configuration for the
    /// local zone and the disambiguation policy.
    pub fn new_with(fields: WallClock, zone: Option<&str>, config: &ZoneConfig) -> Result<Self> {
        let tz = zone_or_local(zone, config)?;
        let naive = fields.to_naive()?;
        Self::from_local(&tz, &naive, config.disambiguation)
    }

    /// Midnight on the given date in the local zone.
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::new(WallClock::date(year, month, day), None)
    }

    pub fn ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        Self::new(WallClock::new(year, month, day, hour, minute, second), None)
    }

    pub fn ymd_hms_micro(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Result<Self> {
        Self::new(
            WallClock::new(year, month, day, hour, minute, second).with_microsecond(microsecond),
            None,
        )
    }

    /// Wrap a zoned datetime.
    ///
    /// With `zone == None` the value keeps its own zone. With a zone, the
    /// wall-clock fields are relabeled into that zone.
    pub fn from_datetime(dt: DateTime<Tz>, zone: Option<&str>) -> Result<Self> {
        let ts = Self::from(dt);
        match zone {
            None => Ok(ts),
            Some(name) => ts.with_timezone_label(name),
        }
    }

    /// Attach a zone to a naive datetime: the zone named `zone`, or the local
    /// zone.
    pub fn from_naive(naive: NaiveDateTime, zone: Option<&str>) -> Result<Self> {
        Self::from_naive_with(naive, zone, &ZoneConfig::system())
    }

    pub fn from_naive_with(
        naive: NaiveDateTime,
        zone: Option<&str>,
        config: &ZoneConfig,
    ) -> Result<Self> {
        let tz = zone_or_local(zone, config)?;
        Self::from_local(&tz, &naive.trunc_subsecs(6), config.disambiguation)
    }

    /// The instant `millis` milliseconds after the Unix epoch, expressed in the
    /// zone named `zone` or in the local zone.
    pub fn from_millis(millis: i64, zone: Option<&str>) -> Result<Self> {
        Self::from_millis_with(millis, zone, &ZoneConfig::system())
    }

    pub fn from_millis_with(millis: i64, zone: Option<&str>, config: &ZoneConfig) -> Result<Self> {
        let tz = zone_or_local(zone, config)?;
        let utc = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| CalendarError::OutOfRange(format!("{millis} ms since the epoch")))?;
        Ok(Self {
            inner: utc.with_timezone(&tz),
            disambiguation: config.disambiguation,
        })
    }

    /// The current instant in the local zone.
    pub fn now() -> Self {
        Self::now_with(&ZoneConfig::system())
    }

    pub fn now_with(config: &ZoneConfig) -> Self {
        Self {
            inner: Utc::now()
                .trunc_subsecs(6)
                .with_timezone(&config.local_zone),
            disambiguation: config.disambiguation,
        }
    }

    fn from_local(tz: &Tz, naive: &NaiveDateTime, policy: Disambiguation) -> Result<Self> {
        Ok(Self {
            inner: dst::resolve_local(tz, naive, policy)?,
            disambiguation: policy,
        })
    }

    /// Rebuild from wall-clock fields in this value's zone and policy.
    fn rebuild(&self, naive: NaiveDateTime) -> Result<Self> {
        Self::from_local(&self.timezone(), &naive, self.disambiguation)
    }

    /// Wall-clock fields for a rebuild. A leap second reads as second 59.
    fn local_fields(&self) -> Result<NaiveDateTime> {
        self.wall_clock().to_naive()
    }

    /// Same instant and zone, different disambiguation policy.
    pub fn with_disambiguation(self, disambiguation: Disambiguation) -> Self {
        Self {
            disambiguation,
            ..self
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour()
    }

    pub fn minute(&self) -> u32 {
        self.inner.minute()
    }

    pub fn second(&self) -> u32 {
        self.inner.second()
    }

    pub fn microsecond(&self) -> u32 {
        (self.inner.nanosecond() % 1_000_000_000) / 1_000
    }

    pub fn timezone(&self) -> Tz {
        self.inner.timezone()
    }

    /// IANA name of the attached zone.
    pub fn timezone_name(&self) -> &'static str {
        self.timezone().name()
    }

    pub fn disambiguation(&self) -> Disambiguation {
        self.disambiguation
    }

    pub fn wall_clock(&self) -> WallClock {
        WallClock::from_naive(&self.inner.naive_local())
    }

    pub fn naive_local(&self) -> NaiveDateTime {
        self.inner.naive_local()
    }

    pub fn as_datetime(&self) -> &DateTime<Tz> {
        &self.inner
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.inner.timestamp_millis()
    }

    /// UTC offset at this instant, e.g. `"+01:00"`.
    pub fn utc_offset(&self) -> String {
        zone::format_utc_offset(&self.inner)
    }

    /// Whether daylight saving time is in effect at this instant.
    pub fn is_dst(&self) -> bool {
        zone::is_dst_active(&self.inner)
    }

    // ── Month / year arithmetic ─────────────────────────────────────────

    /// Move `months` calendar months into the past.
    ///
    /// The day is clamped to the length of the target month and the time of
    /// day is kept; a negative `months` moves forward.
    pub fn minus_months(&self, months: i64) -> Result<Self> {
        let mut year_offset = months.div_euclid(12);
        let mut month = i64::from(self.month()) - months.rem_euclid(12);
        if month <= 0 {
            month += 12;
            year_offset += 1;
        }

        let year = i64::from(self.year())
            .checked_sub(year_offset)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| {
                CalendarError::OutOfRange(format!(
                    "{} minus {months} months",
                    self.naive_local().date()
                ))
            })?;
        // 1..=12 after the adjustment above
        let month = month as u32;

        let date = calendar::clamped_date(year, month, self.day())?;
        let time = self.local_fields()?.time();
        self.rebuild(date.and_time(time))
    }

    pub fn plus_months(&self, months: i64) -> Result<Self> {
        self.minus_months(negate(months, "months")?)
    }

    pub fn minus_years(&self, years: i64) -> Result<Self> {
        self.minus_months(years_to_months(years)?)
    }

    pub fn plus_years(&self, years: i64) -> Result<Self> {
        self.plus_months(years_to_months(years)?)
    }

    // ── Fixed-duration arithmetic ───────────────────────────────────────

    /// Subtract `weeks` × 7 days of elapsed time.
    pub fn minus_weeks(&self, weeks: i64) -> Result<Self> {
        let days = weeks
            .checked_mul(7)
            .ok_or_else(|| CalendarError::OutOfRange(format!("{weeks} weeks")))?;
        self.minus_days(days)
    }

    pub fn plus_weeks(&self, weeks: i64) -> Result<Self> {
        self.minus_weeks(negate(weeks, "weeks")?)
    }

    /// Subtract `days` × 24 hours of elapsed time. Across a DST transition
    /// the wall-clock hour moves with the offset change.
    pub fn minus_days(&self, days: i64) -> Result<Self> {
        self.minus_delta(TimeDelta::try_days(days), days, "days")
    }

    pub fn plus_days(&self, days: i64) -> Result<Self> {
        self.minus_days(negate(days, "days")?)
    }

    pub fn minus_hours(&self, hours: i64) -> Result<Self> {
        self.minus_delta(TimeDelta::try_hours(hours), hours, "hours")
    }

    pub fn plus_hours(&self, hours: i64) -> Result<Self> {
        self.minus_hours(negate(hours, "hours")?)
    }

    pub fn minus_minutes(&self, minutes: i64) -> Result<Self> {
        self.minus_delta(TimeDelta::try_minutes(minutes), minutes, "minutes")
    }

    pub fn plus_minutes(&self, minutes: i64) -> Result<Self> {
        self.minus_minutes(negate(minutes, "minutes")?)
    }

    pub fn minus_seconds(&self, seconds: i64) -> Result<Self> {
        self.minus_delta(TimeDelta::try_seconds(seconds), seconds, "seconds")
    }

    pub fn plus_seconds(&self, seconds: i64) -> Result<Self> {
        self.minus_seconds(negate(seconds, "seconds")?)
    }

    fn minus_delta(&self, delta: Option<TimeDelta>, amount: i64, unit: &str) -> Result<Self> {
        let overflow = || CalendarError::OutOfRange(format!("{self} minus {amount} {unit}"));
        let shifted = self
            .inner
            .checked_sub_signed(delta.ok_or_else(overflow)?)
            .ok_or_else(overflow)?;
        Ok(Self {
            inner: shifted.with_timezone(&self.timezone()),
            ..*self
        })
    }

    // ── Boundaries ──────────────────────────────────────────────────────

    /// Same date, 00:00:00.000000.
    pub fn with_start_of_day(&self) -> Result<Self> {
        self.rebuild(self.naive_local().date().and_time(NaiveTime::MIN))
    }

    /// Same date, 23:59:59.999999.
    pub fn with_end_of_day(&self) -> Result<Self> {
        self.rebuild(end_of_day(self.naive_local().date())?)
    }

    /// First day of the month, 00:00:00.000000.
    pub fn with_start_of_month(&self) -> Result<Self> {
        let first = calendar::checked_date(self.year(), self.month(), 1)?;
        self.rebuild(first.and_time(NaiveTime::MIN))
    }

    /// Last day of the month, 23:59:59.999999.
    pub fn with_end_of_month(&self) -> Result<Self> {
        let last = calendar::last_day_of_month(self.year(), self.month())?;
        self.rebuild(end_of_day(last)?)
    }

    /// January 1st, 00:00:00.000000.
    pub fn with_start_of_year(&self) -> Result<Self> {
        let first = calendar::checked_date(self.year(), 1, 1)?;
        self.rebuild(first.and_time(NaiveTime::MIN))
    }

    /// December 31st, 23:59:59.999999.
    pub fn with_end_of_year(&self) -> Result<Self> {
        let last = calendar::checked_date(self.year(), 12, 31)?;
        self.rebuild(end_of_day(last)?)
    }

    // ── Timezone re-expression ──────────────────────────────────────────

    /// Keep the wall-clock fields and attach the zone named `name`. The
    /// represented instant changes by the difference in offsets.
    pub fn with_timezone_label(&self, name: &str) -> Result<Self> {
        self.relabel(zone::resolve_timezone(name)?)
    }

    pub fn relabel(&self, tz: Tz) -> Result<Self> {
        Self::from_local(&tz, &self.local_fields()?, self.disambiguation)
    }

    /// The same instant expressed in the zone named `name`.
    ///
    /// Converting back to the original zone reproduces the original fields:
    ///
    /// ```
    /// use calendar_timestamp::{CalendarTimestamp, WallClock};
    ///
    /// let utc = CalendarTimestamp::new(WallClock::new(2016, 1, 3, 18, 33, 0), Some("UTC")).unwrap();
    /// let berlin = utc.as_timezone("Europe/Berlin").unwrap();
    /// assert_eq!(berlin.hour(), 19);
    /// assert!(berlin.in_zone(utc.timezone()).equals(&utc));
    /// ```
    pub fn as_timezone(&self, name: &str) -> Result<Self> {
        Ok(self.in_zone(zone::resolve_timezone(name)?))
    }

    pub fn in_zone(&self, tz: Tz) -> Self {
        Self {
            inner: self.inner.with_timezone(&tz),
            ..*self
        }
    }

    /// The same instant in the process local zone.
    pub fn as_local_timezone(&self) -> Self {
        self.in_zone(zone::system_local_zone())
    }

    pub fn as_local_timezone_with(&self, config: &ZoneConfig) -> Self {
        self.in_zone(config.local_zone)
    }

    // ── Predicates ──────────────────────────────────────────────────────

    /// `start < self < end`, by absolute instant. An inverted range is empty.
    pub fn between(&self, start: &Self, end: &Self) -> bool {
        start < self && self < end
    }

    /// Like [`CalendarTimestamp::between`], but `start > end` is an error.
    pub fn try_between(&self, start: &Self, end: &Self) -> Result<bool> {
        if start > end {
            return Err(CalendarError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(self.between(start, end))
    }

    /// Same wall-clock fields (year through microsecond) and same zone.
    pub fn equals(&self, other: &Self) -> bool {
        self.time_equals(other) && self.timezone() == other.timezone()
    }

    /// Same year, month, day, second, microsecond and zone. Hour and minute
    /// are not compared.
    pub fn equals_ignoring_hour_minute(&self, other: &Self) -> bool {
        let (a, b) = (self.wall_clock(), other.wall_clock());
        a.year == b.year
            && a.month == b.month
            && a.day == b.day
            && a.second == b.second
            && a.microsecond == b.microsecond
            && self.timezone() == other.timezone()
    }

    /// Same wall-clock fields, whatever the zone.
    pub fn time_equals(&self, other: &Self) -> bool {
        self.wall_clock() == other.wall_clock()
    }

    /// Same absolute instant, whatever the zone. Equivalent to `==`.
    pub fn same_instant(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

fn zone_or_local(zone: Option<&str>, config: &ZoneConfig) -> Result<Tz> {
    match zone {
        Some(name) => zone::resolve_timezone(name),
        None => Ok(config.local_zone),
    }
}

fn negate(amount: i64, unit: &str) -> Result<i64> {
    amount
        .checked_neg()
        .ok_or_else(|| CalendarError::OutOfRange(format!("{amount} {unit}")))
}

fn years_to_months(years: i64) -> Result<i64> {
    years
        .checked_mul(12)
        .ok_or_else(|| CalendarError::OutOfRange(format!("{years} years")))
}

// ── Trait impls ─────────────────────────────────────────────────────────────

impl PartialEq for CalendarTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for CalendarTimestamp {}

impl PartialOrd for CalendarTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarTimestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl Hash for CalendarTimestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.naive_utc().hash(state);
    }
}

impl Sub for CalendarTimestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Self) -> TimeDelta {
        self.inner.signed_duration_since(rhs.inner)
    }
}

impl From<DateTime<Tz>> for CalendarTimestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self {
            inner: dt.trunc_subsecs(6),
            disambiguation: Disambiguation::default(),
        }
    }
}

impl From<DateTime<Utc>> for CalendarTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from(dt.with_timezone(&Tz::UTC))
    }
}

impl From<CalendarTimestamp> for DateTime<Tz> {
    fn from(ts: CalendarTimestamp) -> Self {
        ts.inner
    }
}

impl From<CalendarTimestamp> for NaiveDate {
    fn from(ts: CalendarTimestamp) -> Self {
        ts.naive_local().date()
    }
}

impl fmt::Display for CalendarTimestamp {
    /// RFC 3339 followed by the zone name, e.g.
    /// `2016-01-03T19:33:00+01:00[Europe/Berlin]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]",
            self.inner.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            self.timezone_name()
        )
    }
}

/// Serialized form of a [`CalendarTimestamp`].
#[derive(Serialize)]
struct TimestampRecord {
    /// The instant in its own zone (RFC 3339 with offset).
    local: String,
    /// The instant in UTC (RFC 3339).
    utc: String,
    /// The IANA zone name.
    timezone: &'static str,
    /// The UTC offset at this instant (e.g., "-05:00").
    utc_offset: String,
    /// Whether daylight saving time is active at this instant.
    dst_active: bool,
}

impl Serialize for CalendarTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        TimestampRecord {
            local: self.inner.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            utc: self
                .inner
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            timezone: self.timezone_name(),
            utc_offset: self.utc_offset(),
            dst_active: self.is_dst(),
        }
        .serialize(serializer)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
