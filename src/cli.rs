//! CLI definitions for cc-launcher.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// cc-launcher CLI.
#[derive(Parser)]
#[command(name = "cc-launcher")]
#[command(about = "Scheduled and on-demand command runner for project launchers")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.cc-launcher/config.toml)
    #[arg(short, long, env = "CC_LAUNCHER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler and local API in the foreground (default)
    Serve {
        /// API host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// API port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check a 5-field cron expression and print its next fire times
    Validate {
        /// Cron expression, quoted
        expression: String,

        /// Number of fire times to print
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },

    /// Run a command once in a project directory and record it
    Exec {
        /// Project directory
        #[arg(long)]
        path: PathBuf,

        /// Shell command line
        command: String,

        /// Open a terminal window instead of capturing output
        #[arg(long)]
        terminal: bool,

        /// Timeout in minutes (overrides config)
        #[arg(long)]
        timeout: Option<u32>,
    },

    /// List schedules
    Jobs {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show execution logs, newest first
    Logs {
        /// Only logs of this schedule
        #[arg(long)]
        schedule: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Entries to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Delete the matching logs instead of listing them
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
