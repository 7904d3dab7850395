mod cli;
mod commands;
mod config;
mod data;
mod logging;
mod report;
mod session;

use battag_record::{DeviceType, SerialScheme};
use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let mut config = UserConfig::load();
    config.merge_with_args(cli.tag);
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);

    let mode = if cli.command.uses_tag() {
        LogMode::File
    } else {
        LogMode::Stderr
    };
    let _guard = logging::init(config.log_level, mode, log_level_override);

    match cli.command {
        Commands::Init {
            serial,
            team,
            kind,
            id,
        } => {
            let scheme = match team {
                Some(team) => SerialScheme::Best {
                    team,
                    kind: kind.map(Into::into).unwrap_or_default(),
                    id,
                },
                None => SerialScheme::Manual(serial.unwrap_or_default()),
            };
            commands::tag::run_init(&config, scheme)
        }
        Commands::Read { json } => commands::tag::run_read(&config, json),
        Commands::Robot => commands::tag::run_usage(&config, DeviceType::Robot, false),
        Commands::Charge { yes } => commands::tag::run_usage(&config, DeviceType::Charger, yes),
        Commands::Note { note } => commands::tag::run_note(&config, note.into()),
        Commands::Export { output } => commands::tag::run_export(&config, output),
        Commands::Import { file, write } => commands::tag::run_import(&config, &file, write),
        Commands::Report { output } => commands::report::run(&config, output),
        Commands::Log { command } => commands::log::run(command),
        Commands::Config { path, reset } => commands::config::run(&config, path, reset),
        Commands::Logs { lines } => commands::logs::run(lines),
    }
}
