//! User-visible notifications.

use crate::diagnostics::{Reporter, SharedSink};
use std::sync::Mutex;

const COMPONENT: &str = "roadmap_export::notify";

/// Presents export results to the user.
pub trait UserNotifier: Send + Sync {
    /// An export failed; `message` includes the error text.
    fn notify_error(&self, message: &str);

    /// An export finished.
    fn notify_success(&self, _message: &str) {}
}

/// Forwards notifications to diagnostics.
pub struct LogNotifier {
    reporter: Reporter,
}

impl LogNotifier {
    /// Report into `sink`.
    pub fn new(sink: SharedSink) -> Self {
        Self {
            reporter: Reporter::new(sink, COMPONENT),
        }
    }
}

impl UserNotifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        self.reporter.error(message);
    }

    fn notify_success(&self, message: &str) {
        self.reporter.info(message);
    }
}

/// Kind of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Failure
    Error,
    /// Success
    Success,
}

/// Records notifications in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    /// Nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications, in order.
    pub fn notifications(&self) -> Vec<(NotificationKind, String)> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Error messages only.
    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|(kind, _)| *kind == NotificationKind::Error)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, kind: NotificationKind, message: &str) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push((kind, message.to_string()));
        }
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.push(NotificationKind::Error, message);
    }

    fn notify_success(&self, message: &str) {
        self.push(NotificationKind::Success, message);
    }
}
