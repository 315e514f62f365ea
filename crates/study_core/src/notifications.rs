use serde::{Deserialize, Serialize};
use tracing::info;

use crate::timer::TimerCompletion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
}

impl NotificationRequest {
    pub fn for_completion(completion: &TimerCompletion) -> Self {
        let body = if completion.was_focus() {
            format!("Great work! Time for a {}.", completion.next.label().to_lowercase())
        } else {
            "Break's over. Ready to focus?".to_string()
        };
        Self {
            title: format!("{} complete", completion.finished),
            body,
        }
    }
}

/// Platform adapters (desktop notifications, a terminal bell) implement
/// this. Delivery is best-effort and never reported back.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: NotificationRequest);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: NotificationRequest) {
        info!(title = %notification.title, body = %notification.body, "notification");
    }
}
