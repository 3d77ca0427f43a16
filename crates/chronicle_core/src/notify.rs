//! User-facing notification boundary.
//!
//! # Invariants
//! - Notifications are fire-and-forget; nothing in core reads a result back.
//! - Each mutation kind and each rejection reason has its own title.

use log::{info, warn};
use std::sync::{Arc, Mutex};

pub const TITLE_CREATED: &str = "Note added successfully!";
pub const TITLE_EDITED: &str = "Note edited successfully!";
pub const TITLE_DELETED: &str = "Note deleted successfully!";
pub const TITLE_DATE_CLEARED: &str = "Notes for the day deleted successfully!";
pub const TITLE_EMPTY_TEXT: &str = "Note cannot be empty.";
pub const TITLE_NO_DATE: &str = "Please select a date first.";
pub const TITLE_NOT_FOUND: &str = "Note not found.";
pub const TITLE_SAVE_FAILED: &str = "Could not save notes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NotificationKind::Info,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NotificationKind::Error,
        }
    }
}

/// Presentation-side receiver of notifications.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Sink that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Info => {
                info!("event=notify module=notify kind=info title={:?}", notification.title)
            }
            NotificationKind::Error => {
                warn!("event=notify module=notify kind=error title={:?}", notification.title)
            }
        }
    }
}

/// Sink that keeps every notification; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received().pop()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
