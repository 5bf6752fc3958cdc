//! Dashboard aggregate handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use crosspost_core::ports::PostRepository;
use crosspost_shared::dto::{DashboardStats, PostResponse};
use crosspost_shared::{ApiResponse, CollectionResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// How many upcoming posts the dashboard preview shows.
const UPCOMING_LIMIT: u64 = 5;

/// GET /api/dashboard/stats
pub async fn stats(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let stats = state.posts.stats(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(DashboardStats::from(stats))))
}

/// GET /api/dashboard/upcoming
pub async fn upcoming(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .find_upcoming(identity.user_id, Utc::now(), UPCOMING_LIMIT)
        .await?;

    let data: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(CollectionResponse::ok(data)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use chrono::TimeDelta;
    use uuid::Uuid;

    use crosspost_core::domain::{Platform, Post};
    use crosspost_core::ports::{BaseRepository, TokenService};
    use crosspost_infra::{JwtConfig, JwtTokenService};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_web::test]
    async fn stats_include_zeroed_platforms() {
        let state = AppState::for_tests(None);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }));
        let owner = Uuid::new_v4();
        for platforms in [
            vec![Platform::Twitter, Platform::Facebook],
            vec![Platform::Twitter, Platform::Facebook],
            vec![Platform::Instagram],
        ] {
            state
                .posts
                .insert(Post::new(
                    owner,
                    "content".to_string(),
                    platforms,
                    chrono::Utc::now() + TimeDelta::hours(1),
                    None,
                ))
                .await
                .unwrap();
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(tokens.clone()))
                .configure(configure_routes),
        )
        .await;

        let token = tokens.generate_token(owner, "owner@example.com").unwrap();
        let req = test::TestRequest::get()
            .uri("/api/dashboard/stats")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["totalPosts"], 3);
        assert_eq!(body["data"]["platformStats"]["Twitter"], 2);
        assert_eq!(body["data"]["platformStats"]["Facebook"], 2);
        assert_eq!(body["data"]["platformStats"]["Instagram"], 1);
    }
}
