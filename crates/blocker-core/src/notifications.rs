//! The persistent status notification.
//!
//! There is exactly one notification, identified by [`NOTIFICATION_ID`]. Every
//! update replaces its text; it is never dismissed while the blocker runs.

use serde::{Deserialize, Serialize};

use crate::capabilities::Notifier;
use crate::error::Result;
use crate::formatting::format_seconds;
use crate::models::NOTIFICATION_ID;

/// Title shown on the status notification.
pub const NOTIFICATION_TITLE: &str = "App Usage Tracker";

/// Text shown when monitoring starts and after every threshold breach.
pub const MONITORING_TEXT: &str = "Monitoring your app usage...";

/// Text for the running elapsed counter.
pub fn elapsed_text(seconds: u32) -> String {
    format!("Time in monitored app: {}", format_seconds(seconds))
}

/// Text shown after leaving a monitored app, carrying the retained value.
pub fn paused_text(seconds: u32) -> String {
    format!("Paused at {}", format_seconds(seconds))
}

// ── StatusNotification ────────────────────────────────────────────────────────

/// Content of the single ongoing status notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub id: u32,
    pub title: String,
    pub text: String,
    /// Ongoing notifications cannot be dismissed by the user.
    pub ongoing: bool,
}

impl StatusNotification {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            id: NOTIFICATION_ID,
            title: NOTIFICATION_TITLE.to_string(),
            text: text.into(),
            ongoing: true,
        }
    }

    pub fn monitoring() -> Self {
        Self::with_text(MONITORING_TEXT)
    }
}

impl Default for StatusNotification {
    fn default() -> Self {
        Self::monitoring()
    }
}

// ── LogNotifier ───────────────────────────────────────────────────────────────

/// Notifier that writes every update to the log.
///
/// The terminal UI renders the notification slot from the status snapshot,
/// so this is the default host implementation.
#[derive(Debug, Default)]
pub struct LogNotifier {
    last: Option<StatusNotification>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently posted notification, if any.
    pub fn last(&self) -> Option<&StatusNotification> {
        self.last.as_ref()
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: &StatusNotification) -> Result<()> {
        if self.last.as_ref() != Some(notification) {
            tracing::debug!(
                id = notification.id,
                title = %notification.title,
                text = %notification.text,
                "status notification updated"
            );
        }
        self.last = Some(notification.clone());
        Ok(())
    }
}
