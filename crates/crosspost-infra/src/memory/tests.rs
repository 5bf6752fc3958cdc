use chrono::TimeDelta;

use crosspost_core::domain::Platform;

use super::*;

fn post_for(owner: Uuid, content: &str, platforms: Vec<Platform>, offset_min: i64) -> Post {
    let mut post = Post::new(
        owner,
        content.to_string(),
        platforms,
        Utc::now() + TimeDelta::minutes(offset_min),
        None,
    );
    // spread creation times so ordering assertions are deterministic
    post.created_at = Utc::now() + TimeDelta::milliseconds(offset_min);
    post.updated_at = post.created_at;
    post
}

async fn seeded_repo(owner: Uuid) -> InMemoryPostRepository {
    let repo = InMemoryPostRepository::new();
    repo.insert(post_for(owner, "twitter only", vec![Platform::Twitter], 10))
        .await
        .unwrap();
    repo.insert(post_for(
        owner,
        "twitter and facebook",
        vec![Platform::Twitter, Platform::Facebook],
        20,
    ))
    .await
    .unwrap();
    repo.insert(post_for(owner, "insta draft", vec![Platform::Instagram], 30))
        .await
        .unwrap();
    repo
}

#[tokio::test]
async fn list_is_scoped_to_the_owner() {
    let owner = Uuid::new_v4();
    let repo = seeded_repo(owner).await;
    repo.insert(post_for(
        Uuid::new_v4(),
        "someone else",
        vec![Platform::Twitter],
        5,
    ))
    .await
    .unwrap();

    let page = repo
        .list(owner, &PostFilter::default(), PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|p| p.owner == owner));
}

#[tokio::test]
async fn list_sorts_newest_first() {
    let owner = Uuid::new_v4();
    let repo = seeded_repo(owner).await;

    let page = repo
        .list(owner, &PostFilter::default(), PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.items[0].content, "insta draft");
    assert_eq!(page.items[2].content, "twitter only");
}

#[tokio::test]
async fn platform_filter_matches_any_tag() {
    let owner = Uuid::new_v4();
    let repo = seeded_repo(owner).await;

    let filter = PostFilter {
        platforms: vec![Platform::Facebook, Platform::Instagram],
        ..Default::default()
    };
    let page = repo
        .list(owner, &filter, PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|p| {
        p.platforms.contains(&Platform::Facebook) || p.platforms.contains(&Platform::Instagram)
    }));
}

#[tokio::test]
async fn status_and_platform_filters_combine_with_and() {
    let owner = Uuid::new_v4();
    let repo = InMemoryPostRepository::new();
    let mut published_insta = post_for(owner, "published insta", vec![Platform::Instagram], 1);
    published_insta.status = PostStatus::Published;
    repo.insert(published_insta).await.unwrap();
    repo.insert(post_for(
        owner,
        "scheduled insta",
        vec![Platform::Instagram],
        2,
    ))
    .await
    .unwrap();
    let mut published_twitter = post_for(owner, "published twitter", vec![Platform::Twitter], 3);
    published_twitter.status = PostStatus::Published;
    repo.insert(published_twitter).await.unwrap();

    let filter = PostFilter {
        status: Some(PostStatus::Published),
        platforms: vec![Platform::Instagram],
        ..Default::default()
    };
    let page = repo
        .list(owner, &filter, PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].content, "published insta");
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let owner = Uuid::new_v4();
    let repo = seeded_repo(owner).await;

    let filter = PostFilter {
        search: Some("TWITTER".to_string()),
        ..Default::default()
    };
    let page = repo
        .list(owner, &filter, PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn schedule_range_bounds_are_inclusive() {
    let owner = Uuid::new_v4();
    let repo = InMemoryPostRepository::new();
    let post = post_for(owner, "on the boundary", vec![Platform::Twitter], 0);
    let boundary = post.schedule_time;
    repo.insert(post).await.unwrap();

    let filter = PostFilter {
        scheduled_from: Some(boundary),
        scheduled_until: Some(boundary),
        ..Default::default()
    };
    let page = repo
        .list(owner, &filter, PageRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn pagination_slices_and_reports_totals() {
    let owner = Uuid::new_v4();
    let repo = InMemoryPostRepository::new();
    for i in 0..5 {
        repo.insert(post_for(owner, &format!("post {i}"), vec![Platform::Twitter], i))
            .await
            .unwrap();
    }

    let page = PageRequest::new(2, 2);
    let result = repo
        .list(owner, &PostFilter::default(), page)
        .await
        .unwrap();

    assert_eq!(result.total, 5);
    assert_eq!(result.items.len(), 2);
    assert_eq!(page.pages(result.total), 3);
}

#[tokio::test]
async fn stats_count_each_platform_tag_once_per_post() {
    let owner = Uuid::new_v4();
    let repo = InMemoryPostRepository::new();
    repo.insert(post_for(
        owner,
        "a",
        vec![Platform::Twitter, Platform::Facebook],
        1,
    ))
    .await
    .unwrap();
    repo.insert(post_for(
        owner,
        "b",
        vec![Platform::Twitter, Platform::Facebook],
        2,
    ))
    .await
    .unwrap();
    let mut published = post_for(owner, "c", vec![Platform::Instagram], 3);
    published.status = PostStatus::Published;
    repo.insert(published).await.unwrap();

    let stats = repo.stats(owner).await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.scheduled, 2);
    assert_eq!(stats.published, 1);
    assert_eq!(stats.per_platform.get(&Platform::Twitter), Some(&2));
    assert_eq!(stats.per_platform.get(&Platform::Facebook), Some(&2));
    assert_eq!(stats.per_platform.get(&Platform::Instagram), Some(&1));
}

#[tokio::test]
async fn upcoming_returns_next_scheduled_ascending_and_capped() {
    let owner = Uuid::new_v4();
    let repo = InMemoryPostRepository::new();
    for i in 1..=7 {
        repo.insert(post_for(owner, &format!("in {i} min"), vec![Platform::Twitter], i))
            .await
            .unwrap();
    }
    // already elapsed, must not show up
    repo.insert(post_for(owner, "past", vec![Platform::Twitter], -5))
        .await
        .unwrap();

    let upcoming = repo.find_upcoming(owner, Utc::now(), 5).await.unwrap();

    assert_eq!(upcoming.len(), 5);
    assert_eq!(upcoming[0].content, "in 1 min");
    assert!(upcoming.windows(2).all(|w| w[0].schedule_time <= w[1].schedule_time));
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.insert(User::new("a@example.com".to_string(), "hash".to_string()))
        .await
        .unwrap();

    let result = repo
        .insert(User::new("a@example.com".to_string(), "hash".to_string()))
        .await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn updating_a_missing_post_is_not_found() {
    let repo = InMemoryPostRepository::new();
    let ghost = post_for(Uuid::new_v4(), "ghost", vec![Platform::Twitter], 1);

    assert!(matches!(repo.update(ghost).await, Err(RepoError::NotFound)));
}
