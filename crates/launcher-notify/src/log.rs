//! Tracing-backed notifier.

use tracing::info;

use launcher_protocols::Notifier;

/// Writes notifications to the log instead of the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(target: "cc_launcher::notify", "[NOTIFY] {}: {}", title, body);
    }
}
