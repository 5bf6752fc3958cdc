use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit trail entry for a single publish attempt.
///
/// Entries are append-only and reference the post by id only, so they outlive
/// both the sweep that created them and the post itself (hard-deleting a post
/// leaves its log entries behind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationLogEntry {
    pub id: Uuid,
    pub post_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub message: String,
}

impl PublicationLogEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(post_id: Uuid, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            timestamp: Utc::now(),
            status: status.into(),
            message: message.into(),
        }
    }
}
