//! HTTP server for the local API.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::create_router;
use crate::state::AppState;

/// Default API port.
pub const DEFAULT_PORT: u16 = 17321;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until the process is killed.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then drain open connections.
    pub async fn run_with_shutdown<F>(&self, signal: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());
        let listener = TcpListener::bind(self.addr()).await?;

        info!("API server listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use launcher_scheduler::JobScheduler;
    use launcher_store::MemoryJobStore;

    fn state() -> AppState {
        AppState::new(JobScheduler::builder(Arc::new(MemoryJobStore::new())).build())
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 17321);
    }

    #[test]
    fn test_server_addr() {
        let server = ApiServer::new(ServerConfig::new("0.0.0.0", 3000), state());
        assert_eq!(server.addr(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_server() {
        let server = ApiServer::new(ServerConfig::new("127.0.0.1", 0), state());
        let result = server.run_with_shutdown(async {}).await;
        assert!(result.is_ok());
    }
}
