//! In-portal notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NotificationId;
use crate::reconcile::Keyed;

/// Type tag used when the server sends none
pub const DEFAULT_NOTIFICATION_KIND: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Keyed for Notification {
    type Key = NotificationId;

    fn key(&self) -> NotificationId {
        self.id
    }
}
