use std::fs;
use std::path::PathBuf;

use battag_ndef::{DEFAULT_CAPACITY, DEFAULT_LANGUAGE};
use battag_record::ChargerPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_ROWS: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => LogLevel::Off,
            "error" => LogLevel::Error,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    pub fn as_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Trace => Some(tracing::Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub log_level: LogLevel,
    /// Tag image used when `--tag` is not given.
    pub tag_path: Option<PathBuf>,
    pub tag_capacity: usize,
    /// Language code written into NDEF Text records.
    pub language: String,
    pub charger_policy: ChargerPolicy,
    pub report_max_rows: usize,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            tag_path: None,
            tag_capacity: DEFAULT_CAPACITY,
            language: DEFAULT_LANGUAGE.to_string(),
            charger_policy: ChargerPolicy::Warn,
            report_max_rows: DEFAULT_REPORT_ROWS,
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("battag")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("battag")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("battag")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn default_tag_path() -> PathBuf {
    data_dir().join("tag.bin")
}

pub fn ensure_dirs() -> std::io::Result<()> {
    fs::create_dir_all(config_dir())?;
    fs::create_dir_all(data_dir())?;
    Ok(())
}

impl UserConfig {
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(_) => Self::default(),
        }
    }

    /// Unparseable files fall back to defaults rather than blocking the tool.
    pub fn from_toml(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let _ = ensure_dirs();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(config_path(), content)
    }

    pub fn merge_with_args(&mut self, tag: Option<PathBuf>) {
        if let Some(path) = tag {
            self.tag_path = Some(path);
        }
    }

    pub fn effective_tag_path(&self) -> PathBuf {
        self.tag_path.clone().unwrap_or_else(default_tag_path)
    }

    pub fn effective_report_rows(&self) -> usize {
        if self.report_max_rows == 0 {
            DEFAULT_REPORT_ROWS
        } else {
            self.report_max_rows
        }
    }
}
