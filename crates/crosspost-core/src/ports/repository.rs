use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Platform, Post, PostStatus, PublicationLogEntry, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// Insert and update are separate on purpose: callers always know whether the
/// entity exists, and an update of a missing row must surface as `NotFound`.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Filters applied to a post listing. All filters are combined with AND;
/// an empty `platforms` vector means "any platform".
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Exact status match.
    pub status: Option<PostStatus>,
    /// Match-any against the post's platform set.
    pub platforms: Vec<Platform>,
    /// Inclusive lower bound on schedule time.
    pub scheduled_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on schedule time.
    pub scheduled_until: Option<DateTime<Utc>>,
    /// Case-insensitive substring match against content.
    pub search: Option<String>,
}

/// One page of a listing request. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of pages needed for `total` items at this page size.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// A page of posts plus the total match count before pagination.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: u64,
}

/// Aggregate counts over a single owner's posts.
///
/// `per_platform` counts each platform tag a post carries, so a post targeting
/// two platforms contributes to two counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostStats {
    pub total: u64,
    pub scheduled: u64,
    pub published: u64,
    pub per_platform: BTreeMap<Platform, u64>,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts due for publication: status = scheduled and schedule time at
    /// or before `now`, ordered by creation time ascending.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Filtered, paginated listing of one owner's posts, newest first.
    async fn list(
        &self,
        owner: Uuid,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PostPage, RepoError>;

    /// Aggregate counts over one owner's posts.
    async fn stats(&self, owner: Uuid) -> Result<PostStats, RepoError>;

    /// The owner's next scheduled posts with schedule time at or after `now`,
    /// ascending by schedule time, capped at `limit`.
    async fn find_upcoming(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Publication log repository. The log is append-only: no update or delete.
#[async_trait]
pub trait PublicationLogRepository: Send + Sync {
    /// Append an entry to the log.
    async fn append(&self, entry: PublicationLogEntry) -> Result<PublicationLogEntry, RepoError>;

    /// All entries recorded for a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<PublicationLogEntry>, RepoError>;
}
