use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Upper bound on post content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Target platform a post is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Facebook, Platform::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Twitter" => Ok(Platform::Twitter),
            "Facebook" => Ok(Platform::Facebook),
            "Instagram" => Ok(Platform::Instagram),
            other => Err(DomainError::Validation(format!(
                "Unknown platform: {other}"
            ))),
        }
    }
}

/// Publish lifecycle state of a post.
///
/// `Scheduled` posts with an elapsed schedule time are picked up by the sweep
/// engine and moved to `Published`, or to `Failed` when the transition cannot
/// be persisted. Both are terminal for the sweep's selection predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            other => Err(DomainError::Validation(format!("Unknown status: {other}"))),
        }
    }
}

/// Post entity - a piece of content scheduled for publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner: Uuid,
    pub content: String,
    pub platforms: Vec<Platform>,
    pub schedule_time: DateTime<Utc>,
    pub image_url: Option<String>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new scheduled post.
    pub fn new(
        owner: Uuid,
        content: String,
        platforms: Vec<Platform>,
        schedule_time: DateTime<Utc>,
        image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            content,
            platforms,
            schedule_time,
            image_url,
            status: PostStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate_content(content: &str) -> Result<(), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation(
                "Please add post content".to_string(),
            ));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(DomainError::Validation(format!(
                "Content cannot be more than {MAX_CONTENT_CHARS} characters"
            )));
        }
        Ok(())
    }

    pub fn validate_platforms(platforms: &[Platform]) -> Result<(), DomainError> {
        if platforms.is_empty() {
            return Err(DomainError::Validation(
                "Please select at least one platform".to_string(),
            ));
        }
        Ok(())
    }

    /// Schedule times must be strictly in the future, both at creation and at
    /// any update while the post is still editable.
    pub fn validate_schedule_time(
        schedule_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if schedule_time <= now {
            return Err(DomainError::Validation(
                "Schedule time must be in the future".to_string(),
            ));
        }
        Ok(())
    }

    /// Published posts are immutable; everything else may still be edited.
    pub fn is_editable(&self) -> bool {
        self.status != PostStatus::Published
    }
}
