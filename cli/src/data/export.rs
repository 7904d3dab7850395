use std::fmt;

use chrono::{Local, NaiveDateTime, TimeZone};

use super::audit_store::{LogEntry, AUDIT_TIME_FORMAT};

pub const CSV_HEADER: &str = "Time,Type,Data";

pub fn to_json(entries: &[LogEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// CSV with times shown in the local zone.
pub fn to_csv(entries: &[LogEntry]) -> Result<String, serde_json::Error> {
    to_csv_with(entries, &Local)
}

/// Every field is quoted. Double quotes inside the record JSON become single
/// quotes so the data column never needs escaping.
pub fn to_csv_with<Tz>(entries: &[LogEntry], tz: &Tz) -> Result<String, serde_json::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut output = String::from(CSV_HEADER);
    output.push('\n');

    for entry in entries {
        let data = entry.data.to_json()?.replace('"', "'");
        output.push_str(&format!(
            "\"{}\",\"{}\",\"{}\"\n",
            local_time(&entry.time, tz),
            entry.kind.as_str(),
            data
        ));
    }

    Ok(output)
}

fn local_time<Tz>(stored: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match NaiveDateTime::parse_from_str(stored, AUDIT_TIME_FORMAT) {
        Ok(naive) => naive
            .and_utc()
            .with_timezone(tz)
            .format(AUDIT_TIME_FORMAT)
            .to_string(),
        Err(_) => stored.to_string(),
    }
}
