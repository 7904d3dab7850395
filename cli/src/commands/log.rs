use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use crate::cli::{ExportFormat, LogCommands};
use crate::data::{export, AuditLog, LogEntry, SqliteAuditLog};

pub fn run(command: Option<LogCommands>) -> Result<()> {
    let mut store = SqliteAuditLog::open().wrap_err("Failed to open audit log")?;

    match command.unwrap_or(LogCommands::List) {
        LogCommands::List => {
            let entries = store.list()?;
            if entries.is_empty() {
                println!("Audit log is empty.");
                return Ok(());
            }
            print!("{}", format_entries(&entries)?);
            println!("\n{} entries in {}", entries.len(), store.path().display());
        }
        LogCommands::Export { format, output } => {
            let entries = store.list()?;
            let content = match format {
                ExportFormat::Json => export::to_json(&entries)?,
                ExportFormat::Csv => export::to_csv(&entries)?,
            };
            write_output(output.as_deref(), &content)?;
            if let Some(path) = output {
                println!("Exported {} entries to {}", entries.len(), path.display());
            }
        }
        LogCommands::Clear { yes } => {
            let count = store.count()?;
            if count == 0 {
                println!("Audit log is already empty.");
                return Ok(());
            }
            if !yes && !super::confirm(&format!("Delete {} audit entries?", count))? {
                println!("Cancelled.");
                return Ok(());
            }
            store.clear()?;
            println!("Deleted {} audit entries.", count);
        }
    }

    Ok(())
}

fn format_entries(entries: &[LogEntry]) -> Result<String> {
    let mut out = format!("{:<17} {:<13} {}\n", "Time (UTC)", "Type", "Data");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for entry in entries {
        out.push_str(&format!(
            "{:<17} {:<13} {}\n",
            entry.time,
            entry.kind.as_str(),
            entry.data.to_json()?
        ));
    }
    Ok(out)
}

pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
