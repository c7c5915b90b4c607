mod cli;
mod commands;
mod config;
mod data;
mod input;
mod logging;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};

use cli::{Cli, Commands, RangeArgs};
use commands::StepTask;
use config::{ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let mut config = UserConfig::load();
    config
        .merge_with_args(cli.source.as_deref(), cli.timezone.as_deref())
        .map_err(|e| eyre!(e))?;

    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let _guard = logging::init(
        config.log_level,
        LogMode::for_config(config.log_to_file),
        log_level_override,
    );

    let task = match cli.command {
        Some(Commands::Config { path, reset, edit }) => {
            return commands::config::run(path, reset, edit, &config);
        }
        Some(Commands::Auth) => StepTask::Authorize,
        Some(Commands::Days { range }) => StepTask::Days(range.into()),
        Some(Commands::Hours { date }) => StepTask::Hours(date),
        Some(Commands::Export {
            range,
            format,
            output,
        }) => StepTask::Export {
            range: range.into(),
            format,
            output,
        },
        None => StepTask::Days(RangeArgs::default().into()),
    };

    tracing::debug!(task = ?task, source = ?config.health.source, "Running");
    commands::steps::run(task, &config)
}
