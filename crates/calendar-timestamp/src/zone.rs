//! Timezone database access.
//!
//! Identifiers resolve through the IANA database compiled into `chrono-tz`.
//! The host's local zone is discovered once per process: the `TZ` environment
//! variable wins if it names an IANA zone, then the platform lookup from
//! `iana-time-zone`, then UTC.

use std::sync::OnceLock;

use chrono::{DateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{CalendarError, Result};

/// Parse an IANA timezone identifier into [`Tz`].
///
/// # Errors
///
/// Returns [`CalendarError::UnknownTimezone`] for identifiers missing from the
/// database. There is no fallback zone.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
}

/// The process's local zone, discovered on first use and cached.
pub fn system_local_zone() -> Tz {
    static LOCAL: OnceLock<Tz> = OnceLock::new();
    *LOCAL.get_or_init(discover_local_zone)
}

fn discover_local_zone() -> Tz {
    let tz_var = std::env::var("TZ").ok();
    if let Some(tz) = tz_var.as_deref().and_then(zone_from_tz_var) {
        tracing::debug!(zone = tz.name(), "local zone taken from TZ");
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => {
                tracing::debug!(zone = tz.name(), "local zone discovered from host");
                tz
            }
            Err(_) => {
                tracing::warn!(zone = %name, "host zone not in tz database, using UTC");
                Tz::UTC
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "cannot determine host zone, using UTC");
            Tz::UTC
        }
    }
}

/// Accepts `Europe/Berlin`, `:Europe/Berlin` and zoneinfo file paths.
fn zone_from_tz_var(value: &str) -> Option<Tz> {
    let value = value.trim().trim_start_matches(':');
    if value.is_empty() {
        return None;
    }
    if let Ok(tz) = value.parse::<Tz>() {
        return Some(tz);
    }
    value
        .split_once("zoneinfo/")
        .and_then(|(_, name)| name.parse::<Tz>().ok())
}

/// Format the UTC offset as a string (e.g., "-05:00", "+09:00").
pub fn format_utc_offset<T: TimeZone>(dt: &DateTime<T>) -> String {
    let offset_secs = dt.offset().fix().local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}

/// Whether daylight saving time is in effect at this instant.
pub fn is_dst_active(dt: &DateTime<Tz>) -> bool {
    dt.offset().dst_offset() != TimeDelta::zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_resolve_known_zones() {
        assert_eq!(resolve_timezone("UTC").unwrap(), Tz::UTC);
        assert_eq!(
            resolve_timezone("Europe/Berlin").unwrap(),
            chrono_tz::Europe::Berlin
        );
        assert_eq!(
            resolve_timezone(" America/New_York ").unwrap(),
            chrono_tz::America::New_York
        );
    }

    #[test]
    fn test_resolve_unknown_zone_fails() {
        let err = resolve_timezone("Invalid/Zone").unwrap_err();
        assert_eq!(err, CalendarError::UnknownTimezone("Invalid/Zone".into()));
        assert!(err.to_string().contains("Unknown timezone"), "got: {err}");
    }

    #[test]
    fn test_tz_var_forms() {
        let tokyo = Some(chrono_tz::Asia::Tokyo);
        assert_eq!(zone_from_tz_var("Asia/Tokyo"), tokyo);
        assert_eq!(zone_from_tz_var(":Asia/Tokyo"), tokyo);
        assert_eq!(
            zone_from_tz_var("/usr/share/zoneinfo/Europe/Berlin"),
            Some(chrono_tz::Europe::Berlin)
        );
        assert_eq!(zone_from_tz_var(""), None);
        assert_eq!(zone_from_tz_var("EST5EDT,M3.2.0,M11.1.0"), None);
    }

    #[test]
    fn test_system_local_zone_is_stable() {
        assert_eq!(system_local_zone(), system_local_zone());
    }

    #[test]
    fn test_format_utc_offset() {
        let tokyo = Utc
            .with_ymd_and_hms(2026, 6, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Asia::Tokyo);
        assert_eq!(format_utc_offset(&tokyo), "+09:00");

        let ny = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::New_York);
        assert_eq!(format_utc_offset(&ny), "-05:00");

        let kolkata = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Asia::Kolkata);
        assert_eq!(format_utc_offset(&kolkata), "+05:30");
    }

    #[test]
    fn test_dst_active() {
        let summer = Utc
            .with_ymd_and_hms(2026, 7, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::New_York);
        assert!(is_dst_active(&summer));

        let winter = Utc
            .with_ymd_and_hms(2026, 12, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::New_York);
        assert!(!is_dst_active(&winter));

        // Southern hemisphere: January is summer
        let sydney = Utc
            .with_ymd_and_hms(2026, 1, 15, 0, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Australia::Sydney);
        assert!(is_dst_active(&sydney));
    }
}
