//! One-shot subcommands.

use std::path::Path;

use launcher_config::Config;
use launcher_protocols::{ExecutionMode, LogQuery};
use launcher_scheduler::{CronSchedule, ManualRequest};

use crate::cli::OutputFormat;
use crate::server::build_scheduler;

/// Print whether `expression` is valid and its next fire times.
pub(crate) fn validate_cron(expression: &str, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = CronSchedule::parse(expression)?;
    println!("valid: {}", schedule.expression());
    for time in schedule.upcoming(count) {
        println!("  {}", time.format("%a %Y-%m-%d %H:%M"));
    }
    Ok(())
}

pub(crate) async fn exec(
    config: &Config,
    path: &Path,
    command: String,
    terminal: bool,
    timeout: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = build_scheduler(config).await?;

    let project_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let project_name = project_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mode = if terminal {
        ExecutionMode::Terminal
    } else {
        ExecutionMode::Silent
    };
    let mut request = ManualRequest::new(project_path.to_string_lossy(), command.clone())
        .with_mode(mode)
        .with_names(project_name, command);
    if let Some(minutes) = timeout {
        request = request.with_timeout_minutes(minutes);
    }

    let outcome = scheduler.execute_now(request).await?;
    let result = &outcome.result;
    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
    println!(
        "{} (exit {}) in {}s",
        result.status,
        result
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        result.duration_secs_rounded()
    );
    Ok(())
}

pub(crate) async fn list_jobs(
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = build_scheduler(config).await?;
    let jobs = scheduler.list_jobs().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }
    if jobs.is_empty() {
        println!("No schedules.");
        return Ok(());
    }

    println!("{:<38} {:<8} {:<16} {:<24} {}", "ID", "ENABLED", "CRON", "PROJECT", "COMMAND");
    println!("{}", "-".repeat(100));
    for job in jobs {
        println!(
            "{:<38} {:<8} {:<16} {:<24} {}",
            job.id, job.enabled, job.cron_expression, job.project_name, job.command
        );
    }
    Ok(())
}

pub(crate) async fn logs(
    config: &Config,
    query: LogQuery,
    format: OutputFormat,
    clear: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = build_scheduler(config).await?;

    if clear {
        let removed = scheduler.clear_logs(query.schedule_id.as_deref()).await?;
        println!("Removed {} log entries.", removed);
        return Ok(());
    }

    let page = scheduler.list_logs(&query).await?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }
    if page.logs.is_empty() {
        println!("No logs.");
        return Ok(());
    }

    println!("{:<20} {:<8} {:<9} {:<6} {}", "STARTED", "STATUS", "TRIGGER", "EXIT", "COMMAND");
    println!("{}", "-".repeat(80));
    for entry in &page.logs {
        let started = entry.start_time.with_timezone(&chrono::Local);
        println!(
            "{:<20} {:<8} {:<9} {:<6} {}",
            started.format("%Y-%m-%d %H:%M:%S"),
            entry.status,
            entry.trigger,
            entry
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            entry.command
        );
    }
    println!("{} of {} shown", page.logs.len(), page.total);
    Ok(())
}
