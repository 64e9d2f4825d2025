//! Recording notifier.

use parking_lot::Mutex;

use launcher_protocols::Notifier;

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Keeps every notification in memory, for tests and embedding UIs.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent.lock().push(Notification {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}
