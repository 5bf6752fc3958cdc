//! Publish-sweep engine.
//!
//! One sweep loads every due post (status = scheduled, schedule time elapsed),
//! transitions each to `published`, and records the outcome in the publication
//! log. Publication is simulated: the transition is the status flip itself.
//!
//! Sweeps are safe to run repeatedly and concurrently without double
//! publishing. The selection predicate only matches `scheduled` posts, so a
//! post already transitioned by an earlier (or racing) sweep is simply not
//! selected again. Two sweeps racing on the same post before either commits
//! may both attempt the transition; both converge to the same terminal status.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Post, PostStatus, PublicationLogEntry};
use crate::error::RepoError;
use crate::ports::{BaseRepository, PostRepository, PublicationLogRepository};

/// Aggregated outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Posts successfully transitioned to published.
    pub published: usize,
    /// Posts that could not be persisted and were marked failed instead.
    pub failed: usize,
    /// Total due posts considered by this sweep.
    pub total: usize,
    /// Human-readable summary.
    pub message: String,
}

impl SweepResult {
    fn empty() -> Self {
        Self {
            published: 0,
            failed: 0,
            total: 0,
            message: "No posts to publish".to_string(),
        }
    }
}

/// The sweep engine. Both trigger adapters (the in-process timer and the
/// externally invoked HTTP endpoint) call [`PostPublisher::run_sweep`] on a
/// shared instance; the engine itself holds no state beyond its repositories.
#[derive(Clone)]
pub struct PostPublisher {
    posts: Arc<dyn PostRepository>,
    logs: Arc<dyn PublicationLogRepository>,
}

impl PostPublisher {
    pub fn new(posts: Arc<dyn PostRepository>, logs: Arc<dyn PublicationLogRepository>) -> Self {
        Self { posts, logs }
    }

    /// Run one sweep over all currently due posts.
    ///
    /// Only a failure of the initial due-post query aborts the sweep and
    /// propagates to the caller. Per-post failures are recovered locally: the
    /// post is marked failed, a log entry records the cause, and the loop
    /// moves on to the next post.
    pub async fn run_sweep(&self) -> Result<SweepResult, RepoError> {
        tracing::debug!("checking for due posts");

        let due = self.posts.find_due(Utc::now()).await?;
        if due.is_empty() {
            return Ok(SweepResult::empty());
        }

        tracing::info!(count = due.len(), "found posts to publish");

        let total = due.len();
        let mut published = 0;
        let mut failed = 0;

        for post in due {
            match self.publish_one(&post).await {
                Ok(()) => {
                    tracing::info!(post_id = %post.id, "post published");
                    published += 1;
                }
                Err(err) => {
                    tracing::warn!(post_id = %post.id, %err, "failed to publish post");
                    self.record_failure(post, &err).await;
                    failed += 1;
                }
            }
        }

        Ok(SweepResult {
            published,
            failed,
            total,
            message: format!("Processed {total} posts"),
        })
    }

    async fn publish_one(&self, post: &Post) -> Result<(), RepoError> {
        let mut updated = post.clone();
        updated.status = PostStatus::Published;
        updated.updated_at = Utc::now();
        self.posts.update(updated).await?;

        let platforms = post
            .platforms
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.logs
            .append(PublicationLogEntry::new(
                post.id,
                "published",
                format!("Post successfully published to: {platforms}"),
            ))
            .await?;

        Ok(())
    }

    /// Best-effort fallback: mark the post failed and log the cause. Errors
    /// here are logged and swallowed so one bad post cannot abort the sweep.
    async fn record_failure(&self, mut post: Post, cause: &RepoError) {
        post.status = PostStatus::Failed;
        post.updated_at = Utc::now();
        let post_id = post.id;

        if let Err(err) = self.posts.update(post).await {
            tracing::error!(post_id = %post_id, %err, "could not mark post as failed");
        }

        let entry = PublicationLogEntry::new(post_id, "failed", format!("Failed to publish: {cause}"));
        if let Err(err) = self.logs.append(entry).await {
            tracing::error!(post_id = %post_id, %err, "could not append publication log entry");
        }
    }
}
