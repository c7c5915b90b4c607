use std::path::Path;

use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::{bail, Result};

use crate::config::{config_path, TimezoneSetting, UserConfig};
use crate::data::DateBucketing;
use crate::logging;

pub fn run(path: bool, reset: bool, edit: bool, config: &UserConfig) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
    } else if reset {
        UserConfig::default().save()?;
        println!("Config reset to defaults at: {}", config_file.display());
    } else if edit {
        edit_file(&config_file)?;
    } else {
        println!("Config file: {}", config_file.display());
        println!();
        for (name, value) in describe(config, Utc::now()) {
            println!("{:<14} {}", name, value);
        }
    }

    Ok(())
}

fn edit_file(config_file: &Path) -> Result<()> {
    if !config_file.exists() {
        UserConfig::default().save()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
    let status = std::process::Command::new(&editor).arg(config_file).status()?;
    if !status.success() {
        bail!("{} exited with {}", editor, status);
    }

    if let Err(reason) = UserConfig::validate(config_file) {
        println!("Warning: {}. Defaults will be used until it is fixed.", reason);
    }
    Ok(())
}

/// The settings stride will actually run with, resolved against `now`.
fn describe(config: &UserConfig, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let (zone, today) = match config.timezone {
        TimezoneSetting::Local => (
            format!("local (UTC{})", now.with_timezone(&Local).offset()),
            DateBucketing::new(Local).day_key(&now),
        ),
        TimezoneSetting::Fixed(offset) => (
            format!("UTC{}", offset),
            DateBucketing::new(offset).day_key(&now),
        ),
    };

    let source = &config.health.source;
    let source = if source.exists() {
        source.display().to_string()
    } else {
        format!("{} (missing)", source.display())
    };

    let logs = if config.log_to_file {
        logging::log_dir().display().to_string()
    } else {
        "stderr".to_string()
    };

    vec![
        ("Step samples", source),
        (
            "Read access",
            if config.health.authorized { "granted" } else { "denied" }.to_string(),
        ),
        ("Timezone", zone),
        ("Today", today),
        ("Locale", config.locale.clone()),
        ("Log level", format!("{:?}", config.log_level).to_lowercase()),
        ("Logs", logs),
    ]
}
