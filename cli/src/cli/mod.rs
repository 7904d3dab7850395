mod log;

pub use log::{ExportFormat, LogCommands};

use std::path::PathBuf;

use battag_record::{BestKind, NoteType};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoteArg {
    Normal,
    Practice,
    Scrap,
    Other,
}

impl From<NoteArg> for NoteType {
    fn from(arg: NoteArg) -> Self {
        match arg {
            NoteArg::Normal => NoteType::Normal,
            NoteArg::Practice => NoteType::Practice,
            NoteArg::Scrap => NoteType::Scrap,
            NoteArg::Other => NoteType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    New,
    Old,
    Special,
}

impl From<KindArg> for BestKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::New => BestKind::New,
            KindArg::Old => BestKind::Old,
            KindArg::Special => BestKind::Special,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Label a tag with a fresh record
    Init {
        /// Serial number (1-8 ASCII characters)
        #[arg(conflicts_with = "team", required_unless_present = "team")]
        serial: Option<String>,

        /// Team number for a BEST serial
        #[arg(long)]
        team: Option<String>,

        /// BEST battery kind [default: new]
        #[arg(long, value_enum, requires = "team")]
        kind: Option<KindArg>,

        /// Battery id within the kind (not used for special)
        #[arg(long, requires = "team")]
        id: Option<u32>,
    },

    /// Show the record on the tag
    #[command(alias = "show")]
    Read {
        /// Print the raw record as pretty JSON
        #[arg(long)]
        json: bool,
    },

    /// Log a robot session
    Robot,

    /// Log a charger session
    Charge {
        /// Allow a charger entry right after another one without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Set the classification note
    Note {
        #[arg(value_enum)]
        note: NoteArg,
    },

    /// Save the tag's record to a file
    Export {
        /// Output file (defaults to <serial>.BEST.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Open a record file
    Import {
        file: PathBuf,

        /// Also write the record to the tag
        #[arg(short, long)]
        write: bool,
    },

    /// Render a printable HTML report of the tag's record
    Report {
        /// Output file (defaults to battery_report_<timestamp>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// View and manage the audit log
    Log {
        #[command(subcommand)]
        command: Option<LogCommands>,
    },

    /// Show or reset configuration
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Show recent diagnostic log output
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
}

impl Commands {
    /// Commands that touch a tag keep a file log.
    pub fn uses_tag(&self) -> bool {
        matches!(
            self,
            Commands::Init { .. }
                | Commands::Read { .. }
                | Commands::Robot
                | Commands::Charge { .. }
                | Commands::Note { .. }
                | Commands::Export { .. }
                | Commands::Import { .. }
                | Commands::Report { .. }
        )
    }
}

/// Battery usage records on NFC tags
#[derive(Debug, Parser)]
#[command(name = "battag", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tag image to use instead of the configured one
    #[arg(long, global = true)]
    pub tag: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}
