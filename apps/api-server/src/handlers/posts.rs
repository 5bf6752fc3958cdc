//! Post CRUD handlers. Ownership is enforced on every non-create operation.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crosspost_core::domain::{Platform, Post, PostStatus};
use crosspost_core::ports::{BaseRepository, PageRequest, PostFilter, PostRepository};
use crosspost_shared::ApiResponse;
use crosspost_shared::dto::{
    CreatePostRequest, ListPostsResponse, Pagination, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    /// Comma-separated platform names.
    pub platforms: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
}

/// Parse a range bound that is either a full RFC 3339 timestamp or a bare
/// date. A bare end date is widened to the end of that day.
fn parse_date_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date: NaiveDate = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {raw}")))?;
    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    let naive = time.ok_or_else(|| AppError::BadRequest(format!("Invalid date: {raw}")))?;

    Ok(Utc.from_utc_datetime(&naive))
}

fn parse_filter(params: &ListPostsParams) -> Result<PostFilter, AppError> {
    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<PostStatus>())
        .transpose()?;

    let platforms = params
        .platforms
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<Platform>())
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    let scheduled_from = params
        .start_date
        .as_deref()
        .map(|raw| parse_date_bound(raw, false))
        .transpose()?;
    let scheduled_until = params
        .end_date
        .as_deref()
        .map(|raw| parse_date_bound(raw, true))
        .transpose()?;

    Ok(PostFilter {
        status,
        platforms,
        scheduled_from,
        scheduled_until,
        search: params.search.clone(),
    })
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
    params: web::Query<ListPostsParams>,
) -> AppResult<HttpResponse> {
    let filter = parse_filter(&params)?;
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let result = state.posts.list(identity.user_id, &filter, page).await?;

    let data: Vec<PostResponse> = result.items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ListPostsResponse {
        success: true,
        count: data.len(),
        pagination: Pagination {
            total: result.total,
            page: page.page,
            pages: page.pages(result.total),
        },
        data,
    }))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_owned_post(&state, *path, &identity).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse::from(post))))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    Post::validate_content(&req.content)?;
    Post::validate_platforms(&req.platforms)?;
    Post::validate_schedule_time(req.schedule_time, Utc::now())?;

    let post = Post::new(
        identity.user_id,
        req.content,
        req.platforms,
        req.schedule_time,
        req.image_url,
    );
    let saved = state.posts.insert(post).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(PostResponse::from(saved))))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut post = load_owned_post(&state, *path, &identity).await?;

    if !post.is_editable() {
        return Err(AppError::BadRequest(
            "Cannot edit a published post".to_string(),
        ));
    }

    if let Some(content) = req.content {
        Post::validate_content(&content)?;
        post.content = content;
    }
    if let Some(platforms) = req.platforms {
        Post::validate_platforms(&platforms)?;
        post.platforms = platforms;
    }
    if let Some(schedule_time) = req.schedule_time {
        Post::validate_schedule_time(schedule_time, Utc::now())?;
        post.schedule_time = schedule_time;
    }
    if let Some(image_url) = req.image_url {
        post.image_url = Some(image_url);
    }
    post.updated_at = Utc::now();

    let saved = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse::from(saved))))
}

/// DELETE /api/posts/{id} - hard delete; publication log entries referencing
/// the post are left in place.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_owned_post(&state, *path, &identity).await?;

    state.posts.delete(post.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({}))))
}

async fn load_owned_post(
    state: &AppState,
    id: Uuid,
    identity: &Identity,
) -> Result<Post, AppError> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.owner != identity.user_id {
        return Err(AppError::Unauthorized);
    }

    Ok(post)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};
    use chrono::TimeDelta;

    use crosspost_core::ports::{BaseRepository, TokenService};
    use crosspost_infra::{JwtConfig, JwtTokenService};

    use super::*;
    use crate::handlers::configure_routes;
    use crate::state::AppState;

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }))
    }

    fn bearer(tokens: &Arc<dyn TokenService>, user_id: Uuid) -> String {
        let token = tokens.generate_token(user_id, "owner@example.com").unwrap();
        format!("Bearer {token}")
    }

    macro_rules! test_app {
        ($state:expr, $tokens:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .app_data(web::Data::new($tokens.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn create_rejects_past_schedule_time() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", bearer(&tokens, Uuid::new_v4())))
            .set_json(serde_json::json!({
                "content": "too late",
                "platforms": ["Twitter"],
                "scheduleTime": Utc::now() - TimeDelta::minutes(1),
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn create_accepts_future_schedule_time() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", bearer(&tokens, Uuid::new_v4())))
            .set_json(serde_json::json!({
                "content": "hello world",
                "platforms": ["Twitter", "Facebook"],
                "scheduleTime": Utc::now() + TimeDelta::hours(1),
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "scheduled");
    }

    #[actix_web::test]
    async fn update_of_published_post_is_rejected() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let owner = Uuid::new_v4();
        let mut post = Post::new(
            owner,
            "already out".to_string(),
            vec![Platform::Twitter],
            Utc::now() + TimeDelta::hours(1),
            None,
        );
        post.status = PostStatus::Published;
        let post_id = post.id;
        state.posts.insert(post).await.unwrap();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header(("Authorization", bearer(&tokens, owner)))
            .set_json(serde_json::json!({"content": "rewritten"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn foreign_posts_are_unauthorized() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let post = Post::new(
            Uuid::new_v4(),
            "not yours".to_string(),
            vec![Platform::Twitter],
            Utc::now() + TimeDelta::hours(1),
            None,
        );
        let post_id = post.id;
        state.posts.insert(post).await.unwrap();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header(("Authorization", bearer(&tokens, Uuid::new_v4())))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn missing_posts_are_not_found() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", Uuid::new_v4()))
            .insert_header(("Authorization", bearer(&tokens, Uuid::new_v4())))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn list_filters_by_status_and_platform() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let owner = Uuid::new_v4();
        let mut published_insta = Post::new(
            owner,
            "published insta".to_string(),
            vec![Platform::Instagram],
            Utc::now() + TimeDelta::hours(1),
            None,
        );
        published_insta.status = PostStatus::Published;
        state.posts.insert(published_insta).await.unwrap();
        state
            .posts
            .insert(Post::new(
                owner,
                "scheduled insta".to_string(),
                vec![Platform::Instagram],
                Utc::now() + TimeDelta::hours(1),
                None,
            ))
            .await
            .unwrap();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri("/api/posts?status=published&platforms=Instagram")
            .insert_header(("Authorization", bearer(&tokens, owner)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["content"], "published insta");
    }

    #[actix_web::test]
    async fn requests_without_a_token_are_rejected() {
        let state = AppState::for_tests(None);
        let tokens = token_service();
        let app = test_app!(state, tokens);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[::core::prelude::v1::test]
    fn date_bounds_parse_bare_dates() {
        let from = parse_date_bound("2026-08-01", false).unwrap();
        let until = parse_date_bound("2026-08-01", true).unwrap();

        assert_eq!(from.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        assert_eq!(until.to_rfc3339(), "2026-08-01T23:59:59.999+00:00");
        assert!(parse_date_bound("not-a-date", true).is_err());
    }
}
