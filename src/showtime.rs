//! Showtime and running-time text as printed on the listing.

use std::sync::LazyLock;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

use crate::error::MalformedTime;
use crate::store::DateKey;

static RE_TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*(?i:(AM|PM))?\s*$").expect("invalid regex: time of day")
});

static RE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*hours?,\s*(\d+)\s*minutes?").expect("invalid regex: duration")
});

/// Used when the listing gives no usable running time.
pub const DEFAULT_DURATION: TimeDelta = TimeDelta::minutes(120);

/// Parse `"7:30 PM"`, `"12:15am"` or `"19:30"` into a moment on `date`.
///
/// 12 without a suffix is read the same as 12 AM (midnight).
pub fn parse_time_of_day(text: &str, date: DateKey) -> Result<NaiveDateTime, MalformedTime> {
    let malformed = || MalformedTime(text.to_string());
    let caps = RE_TIME_OF_DAY.captures(text).ok_or_else(malformed)?;

    let mut hour: u32 = caps[1].parse().map_err(|_| malformed())?;
    let minute: u32 = caps[2].parse().map_err(|_| malformed())?;
    let pm = match caps.get(3) {
        Some(suffix) => {
            if hour == 0 || hour > 12 {
                return Err(malformed());
            }
            suffix.as_str().eq_ignore_ascii_case("pm")
        }
        None => false,
    };

    if pm && hour != 12 {
        hour += 12;
    } else if !pm && hour == 12 {
        hour = 0;
    }

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)?;
    Ok(date.date().and_time(time))
}

/// Parse `"2 hours, 15 minutes"`; anything else yields [`DEFAULT_DURATION`].
pub fn parse_duration(text: &str) -> TimeDelta {
    RE_DURATION
        .captures(text)
        .and_then(|caps| {
            let hours: i64 = caps[1].parse().ok()?;
            let minutes: i64 = caps[2].parse().ok()?;
            TimeDelta::try_hours(hours)?.checked_add(&TimeDelta::try_minutes(minutes)?)
        })
        .unwrap_or(DEFAULT_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn twelve_am_is_midnight() {
        let t = parse_time_of_day("12:15 AM", date("2025-01-10")).unwrap();
        assert_eq!(t.to_string(), "2025-01-10 00:15:00");
        let t = parse_time_of_day("12:00am", date("2025-01-10")).unwrap();
        assert_eq!(t.hour(), 0);
    }

    #[test]
    fn pm_adds_twelve_except_noon() {
        let d = date("2025-01-10");
        for h in 1..12 {
            let t = parse_time_of_day(&format!("{h}:30 PM"), d).unwrap();
            assert_eq!((t.hour(), t.minute()), (h + 12, 30));
        }
        assert_eq!(parse_time_of_day("12:05 PM", d).unwrap().hour(), 12);
        assert_eq!(parse_time_of_day("  7:30 pm ", d).unwrap().hour(), 19);
    }

    #[test]
    fn am_and_bare_times() {
        let d = date("2025-01-10");
        assert_eq!(parse_time_of_day("9:45 AM", d).unwrap().hour(), 9);
        assert_eq!(parse_time_of_day("10:00", d).unwrap().hour(), 10);
        assert_eq!(parse_time_of_day("21:10", d).unwrap().hour(), 21);
        assert_eq!(parse_time_of_day("12:30", d).unwrap().hour(), 0);
    }

    #[test]
    fn rejects_malformed_times() {
        let d = date("2025-01-10");
        let texts = [
            "", "7 PM", "7:3 PM", "19:30 PM", "0:15 AM", "24:00", "7:60", "7:30 XM", "noon",
        ];
        for text in texts {
            assert_eq!(
                parse_time_of_day(text, d),
                Err(MalformedTime(text.to_string())),
                "{text:?}"
            );
        }
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("2 hours, 15 minutes").num_minutes(), 135);
        assert_eq!(parse_duration("1 hour, 1 minute").num_minutes(), 61);
        assert_eq!(parse_duration("PG13 | 1 HOUR, 50 MINUTES | Drama").num_minutes(), 110);
        assert_eq!(parse_duration("garbled").num_minutes(), 120);
        assert_eq!(parse_duration("").num_minutes(), 120);
        assert_eq!(parse_duration("9999999999 hours, 0 minutes").num_hours(), 9_999_999_999);
    }
}
