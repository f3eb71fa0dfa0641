//! Property tests for calendar arithmetic and zone conversion.

use calendar_timestamp::{CalendarTimestamp, Tz, WallClock, ZoneConfig};
use proptest::prelude::*;

/// Fixed-offset zones, so wall-clock rebuilds never hit a gap or fold.
const STEADY_ZONES: &[&str] = &["UTC", "Etc/GMT+5", "Etc/GMT-9", "Etc/GMT-14"];

const ANY_ZONES: &[&str] = &[
    "UTC",
    "Europe/Berlin",
    "America/New_York",
    "America/Los_Angeles",
    "Australia/Sydney",
    "Asia/Kolkata",
    "Pacific/Chatham",
];

fn wall_clock(max_day: u32) -> impl Strategy<Value = WallClock> {
    let date = (1960i32..2100, 1u32..=12, 1u32..=max_day);
    let time = (0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000);
    (date, time).prop_map(|((year, month, day), (hour, minute, second, micro))| {
        let last = calendar_timestamp::days_in_month(year, month).unwrap();
        let fields = WallClock::new(year, month, day.min(last), hour, minute, second);
        fields.with_microsecond(micro)
    })
}

fn steady_timestamp(max_day: u32) -> impl Strategy<Value = CalendarTimestamp> {
    (wall_clock(max_day), prop::sample::select(STEADY_ZONES)).prop_map(|(fields, zone)| {
        CalendarTimestamp::new(fields, Some(zone)).expect("fields are valid")
    })
}

fn any_timestamp() -> impl Strategy<Value = CalendarTimestamp> {
    (wall_clock(28), prop::sample::select(ANY_ZONES)).prop_map(|(fields, zone)| {
        CalendarTimestamp::new(fields, Some(zone)).expect("fields are valid")
    })
}

proptest! {
    #[test]
    fn plus_then_minus_months_restores(ts in steady_timestamp(28), months in -2400i64..2400) {
        let back = ts.plus_months(months).unwrap().minus_months(months).unwrap();
        prop_assert!(back.time_equals(&ts), "{ts} -> {back}");
        prop_assert!(back.equals(&ts));
    }

    #[test]
    fn plus_then_minus_years_restores(ts in steady_timestamp(28), years in -200i64..200) {
        let back = ts.plus_years(years).unwrap().minus_years(years).unwrap();
        prop_assert!(back.time_equals(&ts), "{ts} -> {back}");
    }

    #[test]
    fn month_arithmetic_clamps_day(ts in steady_timestamp(31), months in -240i64..240) {
        let moved = ts.plus_months(months).unwrap();
        let last = calendar_timestamp::days_in_month(moved.year(), moved.month()).unwrap();
        prop_assert_eq!(moved.day(), ts.day().min(last));
        prop_assert_eq!(
            (moved.hour(), moved.minute(), moved.second(), moved.microsecond()),
            (ts.hour(), ts.minute(), ts.second(), ts.microsecond())
        );
        prop_assert_eq!(moved.timezone(), ts.timezone());

        let total = i64::from(ts.year()) * 12 + i64::from(ts.month()) - 1 + months;
        prop_assert_eq!(i64::from(moved.year()), total.div_euclid(12));
        prop_assert_eq!(i64::from(moved.month()), total.rem_euclid(12) + 1);
    }

    #[test]
    fn plus_is_minus_negated(ts in any_timestamp(), n in -200_000i64..200_000) {
        prop_assert!(ts.plus_days(n).unwrap().equals(&ts.minus_days(-n).unwrap()));
        prop_assert!(ts.plus_hours(n).unwrap().equals(&ts.minus_hours(-n).unwrap()));
        prop_assert!(ts.plus_seconds(n).unwrap().equals(&ts.minus_seconds(-n).unwrap()));
        prop_assert!(ts.plus_weeks(n / 7).unwrap().equals(&ts.minus_weeks(-(n / 7)).unwrap()));
    }

    #[test]
    fn fixed_durations_shift_the_instant(ts in any_timestamp(), n in -200_000i64..200_000) {
        prop_assert_eq!((ts.plus_days(n).unwrap() - ts).num_days(), n);
        prop_assert_eq!((ts.plus_hours(n).unwrap() - ts).num_hours(), n);
        prop_assert_eq!(ts.plus_days(n).unwrap().timezone(), ts.timezone());
    }

    #[test]
    fn converting_round_trips(
        ts in any_timestamp(),
        target in prop::sample::select(ANY_ZONES),
    ) {
        let there = ts.as_timezone(target).unwrap();
        prop_assert_eq!(there, ts);
        prop_assert_eq!(there.timezone_name(), target);
        prop_assert!(there.in_zone(ts.timezone()).equals(&ts));
    }

    #[test]
    fn between_is_strict(ts in any_timestamp(), a in 1i64..10_000, b in 1i64..10_000) {
        let start = ts.minus_seconds(a).unwrap();
        let end = ts.plus_seconds(b).unwrap();
        prop_assert!(ts.between(&start, &end));
        prop_assert!(!ts.between(&ts, &end));
        prop_assert!(!ts.between(&start, &ts));
        prop_assert!(!ts.between(&end, &start));
    }

    #[test]
    fn boundaries_bracket_the_value(ts in any_timestamp()) {
        let day_start = ts.with_start_of_day().unwrap();
        let day_end = ts.with_end_of_day().unwrap();
        let month_start = ts.with_start_of_month().unwrap();
        let month_end = ts.with_end_of_month().unwrap();
        prop_assert!(month_start <= day_start);
        prop_assert!(day_start <= ts && ts <= day_end);
        prop_assert!(day_end <= month_end);
        prop_assert_eq!(month_start.day(), 1);
        prop_assert_eq!(
            month_end.day(),
            calendar_timestamp::days_in_month(ts.year(), ts.month()).unwrap()
        );
    }

    #[test]
    fn local_zone_is_always_attached(
        fields in wall_clock(28),
        zone in prop::sample::select(STEADY_ZONES),
    ) {
        let config = ZoneConfig::pinned(zone.parse::<Tz>().unwrap());
        let ts = CalendarTimestamp::new_with(fields, None, &config).unwrap();
        prop_assert_eq!(ts.timezone_name(), zone);
        prop_assert_eq!(ts.wall_clock(), fields);
    }
}
