use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::input::RangeInput;

#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub to: Option<String>,

    /// Time period (alternative to from/to): today, week, month
    #[arg(short, long)]
    pub period: Option<String>,
}

impl From<RangeArgs> for RangeInput {
    fn from(args: RangeArgs) -> Self {
        RangeInput {
            from: args.from,
            to: args.to,
            period: args.period,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Request read access to step count data
    Auth,

    /// Show daily step totals (default)
    #[command(alias = "d")]
    Days {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Show the hourly breakdown of one day
    #[command(alias = "h")]
    Hours {
        /// Day to break down (YYYY-MM-DD)
        date: String,
    },

    /// Export aggregated step counts
    Export {
        #[command(flatten)]
        range: RangeArgs,

        /// Output format: json, csv
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or edit configuration
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },
}

/// Hourly and daily step counts from your health data
#[derive(Debug, Parser)]
#[command(name = "stride", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Step sample export to read instead of the configured one
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Timezone for day and hour buckets: local, utc or +HH:MM
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}
