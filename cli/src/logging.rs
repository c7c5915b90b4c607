//! Tracing setup for the `stride` binary.
//!
//! Stride's own crates log at the configured level. Everything else is held
//! at `warn` or quieter unless `RUST_LOG` says otherwise.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{runtime_dir, LogLevel};

/// Log targets owned by this workspace.
const STRIDE_TARGETS: &[&str] = &["stride", "stride_health", "stride_model"];

const LOG_FILE_PREFIX: &str = "stride";
const KEPT_LOG_FILES: usize = 7;

static INIT: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Daily files under [`log_dir`].
    File,
    Stderr,
}

impl LogMode {
    pub fn for_config(log_to_file: bool) -> Self {
        if log_to_file {
            LogMode::File
        } else {
            LogMode::Stderr
        }
    }
}

/// Keeps the file writer flushing until dropped.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(level: LogLevel, mode: LogMode, cli_override: Option<LogLevel>) -> LogGuard {
    let mut guard = None;

    INIT.get_or_init(|| {
        let Some(level) = cli_override.unwrap_or(level).as_tracing_level() else {
            return;
        };
        guard = install(level, mode);
    });

    LogGuard { _guard: guard }
}

fn install(level: Level, mode: LogMode) -> Option<WorkerGuard> {
    let (writer, guard, fallback) = match mode {
        LogMode::File => match open_log_file() {
            Ok((writer, guard)) => (Some(writer), Some(guard), None),
            Err(reason) => (None, None, Some(reason)),
        },
        LogMode::Stderr => (None, None, None),
    };

    let file_layer = writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(UtcTime::rfc_3339())
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(file_layer)
        .with(stderr_layer)
        .init();

    if let Some(reason) = fallback {
        tracing::warn!(%reason, "Log file unavailable, logging to stderr");
    }
    let resolved = if guard.is_some() { LogMode::File } else { LogMode::Stderr };
    tracing::debug!(mode = ?resolved, %level, "Logging initialized");

    guard
}

fn open_log_file() -> Result<(NonBlocking, WorkerGuard), String> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).map_err(|e| format!("{}: {}", dir.display(), e))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEPT_LOG_FILES)
        .build(&dir)
        .map_err(|e| format!("{}: {}", dir.display(), e))?;

    Ok(tracing_appender::non_blocking(appender))
}

fn build_env_filter(level: Level) -> EnvFilter {
    let quiet = LevelFilter::from_level(level).min(LevelFilter::WARN);
    let mut filter = EnvFilter::builder()
        .with_default_directive(quiet.into())
        .from_env_lossy();

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        for spec in stride_directives(level) {
            if let Ok(directive) = spec.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

fn stride_directives(level: Level) -> Vec<String> {
    let level = level.as_str().to_lowercase();
    STRIDE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect()
}

/// Directory holding the daily `stride.*.log` files.
pub fn log_dir() -> PathBuf {
    runtime_dir()
}
