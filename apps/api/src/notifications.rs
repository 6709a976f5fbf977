//! User-facing feedback events (upload finished, files rejected, analysis summary).
//!
//! Kept in a small ring buffer so `GET /api/v1/notifications` can show recent history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

const RECENT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    recent: Arc<Mutex<VecDeque<Notification>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY))),
        }
    }

    pub fn publish(&self, level: NotificationLevel, title: &str, description: impl Into<String>) {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title: title.to_string(),
            description: description.into(),
            created_at: Utc::now(),
        };

        match level {
            NotificationLevel::Error => warn!(title, description = %notification.description, "Notification"),
            _ => info!(title, description = %notification.description, "Notification"),
        }

        let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        if recent.len() == RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(notification);
    }

    /// Most recent first.
    pub fn recent(&self) -> Vec<Notification> {
        let recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_is_newest_first() {
        let notifier = Notifier::new();
        notifier.publish(NotificationLevel::Info, "first", "");
        notifier.publish(NotificationLevel::Success, "second", "");
        let recent = notifier.recent();
        assert_eq!(recent[0].title, "second");
        assert_eq!(recent[1].title, "first");
    }

    #[test]
    fn test_recent_is_bounded() {
        let notifier = Notifier::new();
        for i in 0..(RECENT_CAPACITY + 5) {
            notifier.publish(NotificationLevel::Info, "n", i.to_string());
        }
        let recent = notifier.recent();
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent[0].description, (RECENT_CAPACITY + 4).to_string());
    }
}
