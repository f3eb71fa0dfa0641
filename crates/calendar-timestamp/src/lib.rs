//! # calendar-timestamp
//!
//! Calendar-aware timestamps on top of `chrono` and `chrono-tz`.
//!
//! [`CalendarTimestamp`] is an immutable zoned point in time with convenience
//! arithmetic that respects the calendar: adding a month to January 30th
//! lands on the last day of February, never in March. Every value carries an
//! explicit IANA zone; constructors default it to the configured local zone.
//!
//! ## Modules
//!
//! - [`timestamp`] — The [`CalendarTimestamp`] type: construction, month/year and fixed-duration arithmetic, boundaries, zone conversion, predicates
//! - [`calendar`] — Leap years and month lengths
//! - [`zone`] — Timezone lookup, local zone discovery, offset and DST metadata
//! - [`dst`] — Policies for wall-clock times in DST gaps and folds
//! - [`config`] — Injectable local zone and disambiguation policy
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod dst;
pub mod error;
pub mod timestamp;
pub mod zone;

pub use calendar::{days_in_month, is_leap_year};
pub use config::ZoneConfig;
pub use dst::Disambiguation;
pub use error::{CalendarError, Result};
pub use timestamp::{CalendarTimestamp, WallClock};
pub use zone::{resolve_timezone, system_local_zone};

pub use chrono_tz::Tz;
