//! Utility functions and helpers.

use tokio::sync::mpsc;

/// Send a value through a channel, logging a warning if it fails.
///
/// This eliminates the repetitive pattern:
/// ```ignore
/// if let Err(e) = tx.send(value) {
///     tracing::warn!("Failed to send: {}", e);
/// }
/// ```
pub fn send_or_log<T>(tx: &mpsc::UnboundedSender<T>, value: T, context: &str) {
    if tx.send(value).is_err() {
        tracing::warn!("Failed to send {}: receiver closed", context);
    }
}
