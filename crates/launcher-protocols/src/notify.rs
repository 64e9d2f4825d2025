//! Notification protocol.

/// Fire-and-forget user notification surface.
///
/// Implementations must not block the caller and must swallow delivery
/// failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}
