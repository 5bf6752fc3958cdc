//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crosspost_core::domain::{Platform, Post, PostStatus};
use crosspost_core::ports::PostStats;
use crosspost_core::publish::SweepResult;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to create a post. Status is not accepted on the wire: new posts
/// always start out scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub platforms: Vec<Platform>,
    pub schedule_time: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request to update a post. Only supplied fields are changed; status is
/// owned by the publish lifecycle and cannot be set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub platforms: Option<Vec<Platform>>,
    pub schedule_time: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// A post as rendered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
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

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            owner: post.owner,
            content: post.content,
            platforms: post.platforms,
            schedule_time: post.schedule_time,
            image_url: post.image_url,
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Paginated post listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPostsResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<PostResponse>,
}

/// Per-platform post counts. All three keys are always present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformStats {
    pub twitter: u64,
    pub facebook: u64,
    pub instagram: u64,
}

/// Dashboard statistics payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: u64,
    pub scheduled_posts: u64,
    pub published_posts: u64,
    pub platform_stats: PlatformStats,
}

impl From<PostStats> for DashboardStats {
    fn from(stats: PostStats) -> Self {
        let mut platform_stats = PlatformStats::default();
        for (platform, count) in stats.per_platform {
            match platform {
                Platform::Twitter => platform_stats.twitter = count,
                Platform::Facebook => platform_stats.facebook = count,
                Platform::Instagram => platform_stats.instagram = count,
            }
        }
        Self {
            total_posts: stats.total,
            scheduled_posts: stats.scheduled,
            published_posts: stats.published,
            platform_stats,
        }
    }
}

/// Response payload of the externally triggered sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub success: bool,
    pub published_count: usize,
    pub failed_count: usize,
    pub total_considered: usize,
    pub summary_message: String,
}

impl From<SweepResult> for SweepResponse {
    fn from(result: SweepResult) -> Self {
        Self {
            success: true,
            published_count: result.published,
            failed_count: result.failed,
            total_considered: result.total,
            summary_message: result.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn dashboard_stats_zero_fill_missing_platforms() {
        let stats = PostStats {
            total: 3,
            scheduled: 1,
            published: 2,
            per_platform: BTreeMap::from([(Platform::Twitter, 2), (Platform::Facebook, 2)]),
        };

        let dto = DashboardStats::from(stats);

        assert_eq!(dto.platform_stats.twitter, 2);
        assert_eq!(dto.platform_stats.facebook, 2);
        assert_eq!(dto.platform_stats.instagram, 0);
    }
}
