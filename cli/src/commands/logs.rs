use color_eyre::eyre::Result;

use crate::logging::{log_dir, LOG_FILE_PREFIX};

pub fn run(lines: usize) -> Result<()> {
    let log_dir = log_dir();
    let prefix = format!("{}.", LOG_FILE_PREFIX);

    let mut log_files: Vec<_> = std::fs::read_dir(&log_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    let name = e.file_name();
                    let name = name.to_string_lossy();
                    name.starts_with(&prefix) && name.ends_with(".log")
                })
                .map(|e| e.path())
                .collect()
        })
        .unwrap_or_default();

    log_files.sort();

    let Some(path) = log_files.last() else {
        println!("No log files found in {:?}", log_dir);
        println!("Log files are created by commands that read or write a tag.");
        return Ok(());
    };

    let content = std::fs::read_to_string(path)?;
    for line in tail(&content, lines) {
        println!("{}", line);
    }

    Ok(())
}

fn tail(content: &str, lines: usize) -> impl Iterator<Item = &str> {
    let total = content.lines().count();
    content.lines().skip(total.saturating_sub(lines))
}
