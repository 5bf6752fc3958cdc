use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use crosspost_core::domain::{Platform, Post, PostStatus, PublicationLogEntry};
use crosspost_core::ports::{BaseRepository, PostRepository, PublicationLogRepository};

use super::entity::{post, publication_log};
use super::postgres_repo::{PostgresPostRepository, PostgresPublicationLogRepository};

fn post_model(id: Uuid, status: post::Status) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        owner_id: Uuid::new_v4(),
        content: "mock content".to_owned(),
        platforms: vec!["Twitter".to_owned(), "Facebook".to_owned()],
        schedule_time: (now - TimeDelta::minutes(1)).into(),
        image_url: None,
        status,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn find_post_by_id_maps_the_model() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, post::Status::Scheduled)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Scheduled);
    assert_eq!(post.platforms, vec![Platform::Twitter, Platform::Facebook]);
}

#[tokio::test]
async fn find_by_id_returns_none_for_missing_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_due_preserves_query_order() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(first, post::Status::Scheduled),
            post_model(second, post::Status::Scheduled),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let due = repo.find_due(Utc::now()).await.unwrap();

    assert_eq!(due.len(), 2);
    assert_eq!(due[0].id, first);
    assert_eq!(due[1].id, second);
}

#[tokio::test]
async fn append_log_entry_round_trips() {
    let entry = PublicationLogEntry::new(Uuid::new_v4(), "published", "mock message");
    let model = publication_log::Model {
        id: entry.id,
        post_id: entry.post_id,
        timestamp: entry.timestamp.into(),
        status: entry.status.clone(),
        message: entry.message.clone(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPublicationLogRepository::new(db);

    let stored = repo.append(entry.clone()).await.unwrap();

    assert_eq!(stored.post_id, entry.post_id);
    assert_eq!(stored.status, "published");
}
