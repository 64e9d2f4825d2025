//! cc-launcher: scheduled and on-demand command runner.
//!
//! Main entry point for the CLI and the local scheduler service.

mod cli;
mod commands;
mod server;

use clap::Parser;

use launcher_protocols::LogQuery;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = server::load_config(cli.config.as_deref())?;
    server::init_tracing(&config.logging, &config.resolved_log_dir())?;

    match cli.command {
        None => server::run_server(config, None, None).await,
        Some(Commands::Serve { host, port }) => server::run_server(config, host, port).await,
        Some(Commands::Validate { expression, count }) => {
            commands::validate_cron(&expression, count)
        }
        Some(Commands::Exec {
            path,
            command,
            terminal,
            timeout,
        }) => commands::exec(&config, &path, command, terminal, timeout).await,
        Some(Commands::Jobs { format }) => commands::list_jobs(&config, format).await,
        Some(Commands::Logs {
            schedule,
            limit,
            offset,
            format,
            clear,
        }) => {
            let query = match schedule {
                Some(id) => LogQuery::for_schedule(id),
                None => LogQuery::default(),
            };
            let query = query.with_limit(limit).with_offset(offset);
            commands::logs(&config, query, format, clear).await
        }
    }
}
