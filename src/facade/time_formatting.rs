//! Relative and absolute date strings in a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Utc};

const SECONDS_PER_HOUR: i64 = 3600;

/// `dd/mm/YYYY` in `offset`
pub fn format_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y").to_string()
}

/// `dd/mm/YYYY HH:MM:SS` in `offset`
pub fn format_date_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

fn format_unix_date(unix: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|at| format_date(at, offset))
        .unwrap_or_else(|| unix.to_string())
}

/// Elapsed whole hours and days from `unix` to `now`, floored
fn elapsed_hours_days(unix: i64, now: DateTime<Utc>) -> (i64, i64) {
    let hours = (now.timestamp() - unix).div_euclid(SECONDS_PER_HOUR);
    (hours, hours.div_euclid(24))
}

fn format_past(unix: i64, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let (hours, days) = elapsed_hours_days(unix, now);
    if hours < 1 {
        "Il y a moins d'1h".to_string()
    } else if hours < 24 {
        format!("Il y a {hours}h")
    } else if days < 7 {
        format!("Il y a {days}j")
    } else {
        format_unix_date(unix, offset)
    }
}

/// "Last seen" style timestamp; `0` means never.
pub fn format_relative_timestamp_with_time(
    unix: i64,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> String {
    if unix == 0 {
        return "Jamais".to_string();
    }
    format_past(unix, now, offset)
}

/// Match kickoff relative to `now`, counting down for upcoming matches.
pub fn format_match_date_with_time(unix: i64, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let remaining = unix - now.timestamp();
    if remaining <= 0 {
        return format_past(unix, now, offset);
    }

    let hours = remaining / SECONDS_PER_HOUR;
    let days = hours / 24;
    if hours < 24 {
        format!("Dans {hours}h")
    } else if days < 7 {
        format!("Dans {days}j")
    } else {
        format_unix_date(unix, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_date_uses_offset() {
        let late_evening = Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(format_date(late_evening, cet()), "10/03/2025");
        assert_eq!(
            format_date(late_evening, FixedOffset::east_opt(0).unwrap()),
            "09/03/2025"
        );
        assert_eq!(format_date_time(late_evening, cet()), "10/03/2025 00:30:00");
    }

    #[test]
    fn test_relative_timestamp() {
        let now = now();
        let ts = now.timestamp();
        assert_eq!(format_relative_timestamp_with_time(0, now, cet()), "Jamais");
        assert_eq!(
            format_relative_timestamp_with_time(ts - 1800, now, cet()),
            "Il y a moins d'1h"
        );
        assert_eq!(
            format_relative_timestamp_with_time(ts - 5 * 3600, now, cet()),
            "Il y a 5h"
        );
        assert_eq!(
            format_relative_timestamp_with_time(ts - 3 * 86400, now, cet()),
            "Il y a 3j"
        );
        assert_eq!(
            format_relative_timestamp_with_time(ts - 10 * 86400, now, cet()),
            "28/02/2025"
        );
    }

    #[test]
    fn test_match_date_future_and_past() {
        let now = now();
        let ts = now.timestamp();
        assert_eq!(format_match_date_with_time(ts + 2 * 3600, now, cet()), "Dans 2h");
        assert_eq!(format_match_date_with_time(ts + 1800, now, cet()), "Dans 0h");
        assert_eq!(format_match_date_with_time(ts + 3 * 86400, now, cet()), "Dans 3j");
        assert_eq!(
            format_match_date_with_time(ts + 9 * 86400, now, cet()),
            "19/03/2025"
        );
        assert_eq!(
            format_match_date_with_time(ts - 2 * 3600, now, cet()),
            "Il y a 2h"
        );
        assert_eq!(format_match_date_with_time(0, now, cet()), "01/01/1970");
    }
}
