//! Operator notification seam.
//!
//! One notification per completed inspection, after the record is stored.

use std::sync::Mutex;

use chariot_core::enums::{InspectionStatus, NotificationLevel};

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Emit the notification for `status`.
pub fn notify_status(notifier: &dyn Notifier, status: InspectionStatus) {
    notifier.notify(status.notification_level(), status.notification_message());
}

/// Forwards notifications to `tracing` at info/warn/error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Success => tracing::info!(%level, "{message}"),
            NotificationLevel::Warning => tracing::warn!(%level, "{message}"),
            NotificationLevel::Error => tracing::error!(%level, "{message}"),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<(NotificationLevel, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_level_and_message() {
        let recorder = RecordingNotifier::new();
        notify_status(&recorder, InspectionStatus::Critical);
        notify_status(&recorder, InspectionStatus::Ok);
        assert_eq!(
            recorder.events(),
            vec![
                (
                    NotificationLevel::Error,
                    "Critical defects detected: equipment out of service".to_string()
                ),
                (
                    NotificationLevel::Success,
                    "Inspection complete: equipment operational".to_string()
                ),
            ]
        );
    }
}
