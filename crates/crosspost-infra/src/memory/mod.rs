//! In-memory repository implementations.
//!
//! Used as the fallback when no database is configured, and as fixtures in
//! handler tests. Data is lost on process restart. Filtering, ordering, and
//! aggregation mirror the Postgres repositories' query semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crosspost_core::domain::{Post, PostStatus, PublicationLogEntry, User};
use crosspost_core::error::RepoError;
use crosspost_core::ports::{
    BaseRepository, PageRequest, PostFilter, PostPage, PostRepository, PostStats,
    PublicationLogRepository, UserRepository,
};

#[cfg(test)]
mod tests;

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|u| u.email == entity.email) {
            return Err(RepoError::Constraint("email already registered".to_string()));
        }
        store.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(post: &Post, filter: &PostFilter) -> bool {
    if let Some(status) = filter.status {
        if post.status != status {
            return false;
        }
    }
    if !filter.platforms.is_empty()
        && !filter.platforms.iter().any(|p| post.platforms.contains(p))
    {
        return false;
    }
    if let Some(from) = filter.scheduled_from {
        if post.schedule_time < from {
            return false;
        }
    }
    if let Some(until) = filter.scheduled_until {
        if post.schedule_time > until {
            return false;
        }
    }
    if let Some(search) = filter.search.as_deref() {
        if !post
            .content
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let mut due: Vec<Post> = self
            .store
            .read()
            .await
            .values()
            .filter(|p| p.status == PostStatus::Scheduled && p.schedule_time <= now)
            .cloned()
            .collect();
        due.sort_by_key(|p| p.created_at);
        Ok(due)
    }

    async fn list(
        &self,
        owner: Uuid,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PostPage, RepoError> {
        let mut items: Vec<Post> = self
            .store
            .read()
            .await
            .values()
            .filter(|p| p.owner == owner && matches(p, filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(((page.page - 1) * page.limit) as usize)
            .take(page.limit as usize)
            .collect();

        Ok(PostPage { items, total })
    }

    async fn stats(&self, owner: Uuid) -> Result<PostStats, RepoError> {
        let store = self.store.read().await;
        let mut stats = PostStats::default();
        for post in store.values().filter(|p| p.owner == owner) {
            stats.total += 1;
            match post.status {
                PostStatus::Scheduled => stats.scheduled += 1,
                PostStatus::Published => stats.published += 1,
                _ => {}
            }
            for platform in &post.platforms {
                *stats.per_platform.entry(*platform).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    async fn find_upcoming(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let mut upcoming: Vec<Post> = self
            .store
            .read()
            .await
            .values()
            .filter(|p| {
                p.owner == owner && p.status == PostStatus::Scheduled && p.schedule_time >= now
            })
            .cloned()
            .collect();
        upcoming.sort_by_key(|p| p.schedule_time);
        upcoming.truncate(limit as usize);
        Ok(upcoming)
    }
}

/// In-memory publication log. Append-only, like its Postgres counterpart.
#[derive(Default)]
pub struct InMemoryPublicationLogRepository {
    entries: RwLock<Vec<PublicationLogEntry>>,
}

impl InMemoryPublicationLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublicationLogRepository for InMemoryPublicationLogRepository {
    async fn append(&self, entry: PublicationLogEntry) -> Result<PublicationLogEntry, RepoError> {
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<PublicationLogEntry>, RepoError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.post_id == post_id)
            .cloned()
            .collect())
    }
}
