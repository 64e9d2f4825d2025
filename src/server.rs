//! Tracing setup, component wiring and the `serve` command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use launcher_api::{ApiServer, AppState, ServerConfig};
use launcher_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use launcher_runner::{ConfiguredTerminal, ProcessRunner};
use launcher_scheduler::JobScheduler;
use launcher_store::{FileJobStore, FileProjectRegistry};

/// Longest wait for in-flight runs to record their logs on shutdown.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(10);

/// Initialize tracing with console and optional file output.
///
/// Files rotate daily under `log_dir`; the last 14 are kept.
pub(crate) fn init_tracing(
    logging: &LoggingConfig,
    log_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = if logging.file {
        std::fs::create_dir_all(log_dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("cc-launcher")
            .filename_suffix("log")
            .max_log_files(14)
            .build(log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The worker flushes until the guard is dropped.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => ConfigLoader::expand_path(path),
        None => ConfigLoader::default_path(),
    };
    let config = ConfigLoader::load_or_default(&path)?;
    Ok(config)
}

/// Build the scheduler from config. Manual runs are restricted to
/// registered projects when a project registry file exists.
pub(crate) async fn build_scheduler(
    config: &Config,
) -> Result<JobScheduler, Box<dyn std::error::Error>> {
    let data_dir = config.resolved_data_dir();
    let store = FileJobStore::new(&data_dir)
        .await?
        .with_max_logs(config.scheduler.max_log_entries);
    info!("Data directory: {}", data_dir.display());

    let runner = ProcessRunner::new()
        .with_output_cap(config.scheduler.output_cap_bytes)
        .with_kill_grace(Duration::from_secs(config.scheduler.kill_grace_seconds));
    let terminal = ConfiguredTerminal::new(
        config.terminal.program.clone(),
        config.terminal.args.clone(),
    );

    let mut builder = JobScheduler::builder(Arc::new(store))
        .runner(runner)
        .notifier(launcher_notify::from_config(&config.notifications))
        .terminal(Arc::new(terminal))
        .default_timeout_minutes(config.scheduler.default_timeout_minutes)
        .manual_timeout_minutes(config.scheduler.manual_timeout_minutes);

    let projects_file = config.resolved_projects_file();
    if projects_file.exists() {
        info!("Project registry: {}", projects_file.display());
        builder = builder.projects(Arc::new(FileProjectRegistry::new(projects_file)));
    }

    Ok(builder.build())
}

/// Run the scheduler and API until Ctrl-C.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting cc-launcher v{}", env!("CARGO_PKG_VERSION"));

    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    let scheduler = build_scheduler(&config).await?;
    let scheduled = scheduler.initialize().await?;
    info!("{} schedules active", scheduled);

    let server_config = ServerConfig::new(
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port),
    );
    let server = ApiServer::new(server_config, AppState::new(scheduler.clone()));

    let result = server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await;

    scheduler.shutdown();
    if !scheduler.wait_idle(SHUTDOWN_WAIT).await {
        warn!("Runs still in flight after {:?}", SHUTDOWN_WAIT);
    }
    info!("cc-launcher stopped");

    result
}
