//! User-visible messages (the navigation "dialog").

use tracing::info;

/// Shows a short message to the user.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Logs messages; used when nothing else can display them.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        info!(message, "notification");
    }
}
