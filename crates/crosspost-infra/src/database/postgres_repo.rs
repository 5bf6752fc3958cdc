//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbConn, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use uuid::Uuid;

use crosspost_core::domain::{Platform, Post, PublicationLogEntry, User};
use crosspost_core::error::RepoError;
use crosspost_core::ports::{
    BaseRepository, PageRequest, PostFilter, PostPage, PostRepository, PostStats,
    PublicationLogRepository, UserRepository,
};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::publication_log::{self, Entity as LogEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::RecordNotUpdated => RepoError::NotFound,
        other => {
            let msg = other.to_string();
            if msg.contains("duplicate") || msg.contains("unique") {
                RepoError::Constraint(msg)
            } else {
                RepoError::Query(msg)
            }
        }
    }
}

/// Escape LIKE wildcards so user-supplied search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = entity.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = entity.into();
        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let active: post::ActiveModel = entity.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let active: post::ActiveModel = entity.into();
        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .filter(post::Column::ScheduleTime.lte(now))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list(
        &self,
        owner: Uuid,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PostPage, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::OwnerId.eq(owner));

        if let Some(status) = filter.status {
            query = query.filter(post::Column::Status.eq(post::Status::from(status)));
        }
        if !filter.platforms.is_empty() {
            // match-any: a post qualifies when its array carries one of the
            // requested platforms
            let mut any = Condition::any();
            for platform in &filter.platforms {
                any = any.add(Expr::cust_with_values(
                    "$1 = ANY(platforms)",
                    [platform.as_str().to_owned()],
                ));
            }
            query = query.filter(any);
        }
        if let Some(from) = filter.scheduled_from {
            query = query.filter(post::Column::ScheduleTime.gte(from));
        }
        if let Some(until) = filter.scheduled_until {
            query = query.filter(post::Column::ScheduleTime.lte(until));
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(Expr::cust_with_values("content ILIKE $1", [pattern]));
        }

        let paginator = query
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, page.limit);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(map_db_err)?;

        Ok(PostPage {
            items: models.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn stats(&self, owner: Uuid) -> Result<PostStats, RepoError> {
        let total = PostEntity::find()
            .filter(post::Column::OwnerId.eq(owner))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        let scheduled = PostEntity::find()
            .filter(post::Column::OwnerId.eq(owner))
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        let published = PostEntity::find()
            .filter(post::Column::OwnerId.eq(owner))
            .filter(post::Column::Status.eq(post::Status::Published))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        // one row per platform tag: a two-platform post counts twice
        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT p.platform AS platform, COUNT(*) AS posts \
                 FROM posts CROSS JOIN LATERAL unnest(posts.platforms) AS p(platform) \
                 WHERE posts.owner_id = $1 \
                 GROUP BY p.platform",
                [owner.into()],
            ))
            .await
            .map_err(map_db_err)?;

        let mut per_platform = std::collections::BTreeMap::new();
        for row in rows {
            let name: String = row.try_get("", "platform").map_err(map_db_err)?;
            let count: i64 = row.try_get("", "posts").map_err(map_db_err)?;
            if let Ok(platform) = name.parse::<Platform>() {
                per_platform.insert(platform, count as u64);
            }
        }

        Ok(PostStats {
            total,
            scheduled,
            published,
            per_platform,
        })
    }

    async fn find_upcoming(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::OwnerId.eq(owner))
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .filter(post::Column::ScheduleTime.gte(now))
            .order_by_asc(post::Column::ScheduleTime)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL publication log repository. Append-only by construction:
/// nothing in this type updates or deletes rows.
pub struct PostgresPublicationLogRepository {
    db: DbConn,
}

impl PostgresPublicationLogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PublicationLogRepository for PostgresPublicationLogRepository {
    async fn append(&self, entry: PublicationLogEntry) -> Result<PublicationLogEntry, RepoError> {
        let active: publication_log::ActiveModel = entry.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<PublicationLogEntry>, RepoError> {
        let models = LogEntity::find()
            .filter(publication_log::Column::PostId.eq(post_id))
            .order_by_asc(publication_log::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
