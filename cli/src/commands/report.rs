use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use color_eyre::eyre::{Result, WrapErr};

use crate::config::UserConfig;
use crate::data::SqliteAuditLog;
use crate::report::render_report;
use crate::session::TagSession;

pub fn run(config: &UserConfig, output: Option<PathBuf>) -> Result<()> {
    let mut audit = SqliteAuditLog::open().wrap_err("Failed to open audit log")?;
    let mut session = TagSession::new(super::image_tag(config), &mut audit);
    let record = session.read()?;

    let now = Local::now().naive_local();
    let html = render_report(&record, now, config.effective_report_rows());

    let path = output.unwrap_or_else(|| default_report_name(now));
    std::fs::write(&path, html).wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    println!("Report for {} saved to {}", record.sn, path.display());
    Ok(())
}

fn default_report_name(now: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!("battery_report_{}.html", now.format("%Y%m%d_%H%M%S")))
}
