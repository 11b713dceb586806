//! Completion feedback via desktop notification

use notify_rust::Notification;
use tracing::debug;

/// Fire the one-shot completion notification for a finished sequence.
///
/// Delivery is best effort: on systems without a notification daemon the
/// failure is logged at debug level and nothing else happens. The timer
/// never learns whether the notification was shown.
pub fn notify_sequence_complete(total_sets: u32) {
    tokio::task::spawn_blocking(move || {
        let body = if total_sets == 1 {
            "1 set completed".to_string()
        } else {
            format!("{} sets completed", total_sets)
        };
        if let Err(e) = Notification::new()
            .summary("Interval timer finished")
            .body(&body)
            .show()
        {
            debug!("Completion notification not delivered: {}", e);
        }
    });
}
