//! Externally triggered sweep endpoint.
//!
//! Deployments whose hosting environment provides its own cron facility call
//! this instead of (or alongside) the in-process timer. Both paths run the
//! same sweep engine; the idempotent selection predicate makes overlapping
//! invocations safe.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use crosspost_shared::dto::SweepResponse;

use crate::state::AppState;

/// GET /api/cron/publish-posts
///
/// Guarded by a shared secret compared verbatim against the Authorization
/// header; the guard only engages when `CRON_SECRET` is configured.
pub async fn publish_posts(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(secret) = &state.cron_secret {
        let expected = format!("Bearer {secret}");
        let provided = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected.as_str()) {
            tracing::warn!("unauthorized cron trigger attempt");
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({"error": "Unauthorized"}));
        }
    }

    tracing::info!("external trigger: publishing scheduled posts");
    match state.publisher.run_sweep().await {
        Ok(result) => HttpResponse::Ok().json(SweepResponse::from(result)),
        Err(err) => {
            tracing::error!(%err, "externally triggered sweep failed");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": err.to_string()}))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use chrono::{TimeDelta, Utc};
    use uuid::Uuid;

    use crosspost_core::domain::{Platform, Post, PostStatus};
    use crosspost_core::ports::BaseRepository;

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_web::test]
    async fn wrong_secret_is_unauthorized() {
        let state = AppState::for_tests(Some("sweep-secret".to_string()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/cron/publish-posts")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unauthorized");
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized_when_secret_is_set() {
        let state = AppState::for_tests(Some("sweep-secret".to_string()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/cron/publish-posts")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn valid_secret_runs_the_sweep() {
        let state = AppState::for_tests(Some("sweep-secret".to_string()));
        let due = Post::new(
            Uuid::new_v4(),
            "due now".to_string(),
            vec![Platform::Twitter],
            Utc::now() - TimeDelta::minutes(1),
            None,
        );
        let due_id = due.id;
        state.posts.insert(due).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/cron/publish-posts")
            .insert_header(("Authorization", "Bearer sweep-secret"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["publishedCount"], 1);
        assert_eq!(body["failedCount"], 0);
        assert_eq!(body["totalConsidered"], 1);

        let post = state.posts.find_by_id(due_id).await.unwrap().unwrap();
        assert_eq!(post.status, PostStatus::Published);
    }

    #[actix_web::test]
    async fn empty_sweep_reports_no_posts() {
        let state = AppState::for_tests(None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/cron/publish-posts")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["totalConsidered"], 0);
        assert_eq!(body["summaryMessage"], "No posts to publish");
    }
}
