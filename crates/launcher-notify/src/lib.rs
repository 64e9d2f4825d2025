//! # cc-launcher Notify
//!
//! [`Notifier`] backends: native desktop notifications, the tracing log, an
//! in-memory recorder and a no-op sink.

mod desktop;
mod log;
mod memory;

use std::sync::Arc;

use launcher_config::{NotificationBackend, NotificationConfig};
pub use launcher_protocols::Notifier;

pub use desktop::{DesktopNotifier, desktop_command};
pub use log::LogNotifier;
pub use memory::{MemoryNotifier, Notification};

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

/// Build the notifier selected by configuration.
pub fn from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    if !config.enabled {
        return Arc::new(NoopNotifier);
    }
    match config.backend {
        NotificationBackend::Desktop => Arc::new(DesktopNotifier::new(&config.app_name)),
        NotificationBackend::Log => Arc::new(LogNotifier),
        NotificationBackend::None => Arc::new(NoopNotifier),
    }
}
