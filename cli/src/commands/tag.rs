use std::fmt;
use std::path::{Path, PathBuf};

use battag_ndef::{framed_len, TagTransport};
use battag_record::timestamp::display_with;
use battag_record::{BatteryRecord, DeviceType, NoteType, SerialScheme};
use bytesize::ByteSize;
use chrono::{Local, TimeZone};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::config::UserConfig;
use crate::data::SqliteAuditLog;
use crate::session::TagSession;

const DUPLICATE_CHARGER_PROMPT: &str = "The last log was already a charger. Add another anyway?";

fn open_audit() -> Result<SqliteAuditLog> {
    SqliteAuditLog::open().wrap_err("Failed to open audit log")
}

pub fn run_init(config: &UserConfig, scheme: SerialScheme) -> Result<()> {
    let serial = scheme.build()?;
    let tag = super::image_tag(config);

    if !tag.exists() {
        tag.create_blank()
            .wrap_err_with(|| format!("Failed to create tag image {}", tag.path().display()))?;
        info!(path = ?tag.path(), capacity = config.tag_capacity, "created blank tag image");
    }

    let mut audit = open_audit()?;
    let mut session = TagSession::new(tag, &mut audit);
    let record = session.initialize(&serial)?;

    println!("Initialized tag with serial {}", record.sn);
    print!("{}", format_record(&record, &Local));
    Ok(())
}

pub fn run_read(config: &UserConfig, json: bool) -> Result<()> {
    let mut audit = open_audit()?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);
    let record = session.read()?;

    if json {
        println!("{}", record.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", format_record(&record, &Local));
    let used = framed_len(&record.to_json()?, &config.language)?;
    println!(
        "Tag usage:   {} of {}",
        format_bytes(used),
        format_bytes(session.tag().capacity())
    );
    Ok(())
}

pub fn run_usage(config: &UserConfig, device: DeviceType, yes: bool) -> Result<()> {
    let mut audit = open_audit()?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);

    let updated = session.record_usage(device, config.charger_policy, |_| {
        yes || super::confirm(DUPLICATE_CHARGER_PROMPT).unwrap_or(false)
    })?;

    match updated {
        Some(record) => {
            println!("Logged {} session.", device.label().to_lowercase());
            print!("{}", format_record(&record, &Local));
        }
        None => println!("Cancelled."),
    }
    Ok(())
}

pub fn run_note(config: &UserConfig, note: NoteType) -> Result<()> {
    let mut audit = open_audit()?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);
    let record = session.set_note(note)?;

    println!("Note set to {}.", record.note().label());
    Ok(())
}

pub fn run_export(config: &UserConfig, output: Option<PathBuf>) -> Result<()> {
    let mut audit = open_audit()?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);
    let record = session.read()?;

    let path = output.unwrap_or_else(|| default_export_name(&record));
    std::fs::write(&path, record.to_json_pretty()?)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    println!("Saved record to {}", path.display());
    Ok(())
}

pub fn run_import(config: &UserConfig, file: &Path, write: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;

    let mut audit = open_audit()?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);
    let record = session
        .import(&raw, write)
        .wrap_err_with(|| format!("Failed to import {}", file.display()))?;

    print!("{}", format_record(&record, &Local));
    if write {
        println!("Wrote record to {}", session.tag().path().display());
    }
    Ok(())
}

fn format_bytes(bytes: usize) -> String {
    ByteSize::b(bytes as u64).display().si().to_string()
}

pub(crate) fn default_export_name(record: &BatteryRecord) -> PathBuf {
    let stem: String = record
        .sn
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        PathBuf::from("battery.BEST.json")
    } else {
        PathBuf::from(format!("{}.BEST.json", stem))
    }
}

pub(crate) fn format_record<Tz>(record: &BatteryRecord, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let stats = record.summarize();
    let mut out = String::new();

    out.push_str(&format!("Serial:      {}\n", record.sn));
    out.push_str(&format!("First use:   {}\n", display_with(&record.fu, tz)));
    out.push_str(&format!("Cycles:      {}\n", record.cc));
    out.push_str(&format!(
        "Note:        {} ({})\n",
        record.n,
        record.note().label()
    ));
    out.push_str(&format!(
        "Usage:       {} robot, {} charger, {} total\n",
        stats.robot, stats.charger, stats.total
    ));

    for entry in record.usage_newest_first() {
        let device = entry.device().map(DeviceType::label).unwrap_or("Unknown");
        out.push_str(&format!(
            "  #{:<4} {:<18} {:<8} e={} v={}\n",
            entry.i,
            display_with(&entry.t, tz),
            device,
            entry.e,
            entry.v
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use battag_record::UsageEntry;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_listing() {
        let mut record = BatteryRecord::initialize_at("1234-007", "2408301415");
        record.cc = 1;
        record.u = vec![
            UsageEntry {
                i: 1,
                t: "2409010930".to_string(),
                d: 1,
                e: 0,
                v: 0,
            },
            UsageEntry {
                i: 2,
                t: "0000000000".to_string(),
                d: 2,
                e: 0,
                v: 0,
            },
        ];

        let expected = concat!(
            "Serial:      1234-007\n",
            "First use:   2024-08-30 14:15\n",
            "Cycles:      1\n",
            "Note:        0 (Normal)\n",
            "Usage:       1 robot, 1 charger, 2 total\n",
            "  #2    Date not available Charger  e=0 v=0\n",
            "  #1    2024-09-01 09:30   Robot    e=0 v=0\n",
        );
        assert_eq!(format_record(&record, &Utc), expected);
    }

    #[test]
    fn export_name_from_serial() {
        let record = BatteryRecord::initialize_at("1234-007", "2408301415");
        assert_eq!(default_export_name(&record), PathBuf::from("1234-007.BEST.json"));

        let odd = BatteryRecord::initialize_at("a/b c", "2408301415");
        assert_eq!(default_export_name(&odd), PathBuf::from("a_b_c.BEST.json"));

        let blank = BatteryRecord::initialize_at("", "2408301415");
        assert_eq!(default_export_name(&blank), PathBuf::from("battery.BEST.json"));
    }
}
