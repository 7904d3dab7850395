//! Tag timestamps: fixed-width `YYMMDDHHmm` strings in UTC.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Stored when a time is not known.
pub const UNSET_TIMESTAMP: &str = "0000000000";

pub const TAG_TIME_FORMAT: &str = "%y%m%d%H%M";
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const NOT_AVAILABLE: &str = "Date not available";

pub fn format_tag_time(time: DateTime<Utc>) -> String {
    time.format(TAG_TIME_FORMAT).to_string()
}

pub fn now_tag_time() -> String {
    format_tag_time(Utc::now())
}

/// Empty or all-zero strings mean "no date".
pub fn is_unset(raw: &str) -> bool {
    raw.trim().chars().all(|c| c == '0')
}

pub fn parse_tag_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.len() != 10 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TAG_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a stored timestamp in `tz`. Strings that are not tag timestamps
/// are shown as-is so foreign data stays readable.
pub fn display_with<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if is_unset(raw) {
        return NOT_AVAILABLE.to_string();
    }
    match parse_tag_time(raw) {
        Some(time) => time.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

pub fn display_local(raw: &str) -> String {
    display_with(raw, &Local)
}
