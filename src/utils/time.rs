use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Attach an exchange time zone to a wall-clock time, picking the earlier
/// instant when the local time is ambiguous.
pub fn localize(naive: &NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Some(first.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

pub fn start_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    localize(&date.and_hms_opt(0, 0, 0)?, tz)
}

pub fn format_exchange_time(timestamp: i64, tz: Tz) -> String {
    match Utc.timestamp_opt(timestamp, 0) {
        LocalResult::Single(dt) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}

pub fn format_window_bound(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}
