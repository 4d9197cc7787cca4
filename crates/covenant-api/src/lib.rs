//! # covenant-api — HTTP Surface for the Attestation Pipeline
//!
//! Assembles the stable contract (`POST /issue`, `GET /verify/{id}`), the
//! rule-management glue, and the health probe into a single Axum
//! application, with rate limiting ahead of authentication ahead of
//! database work (§5).
//!
//! ## API Surface
//!
//! | Path               | Module                | Auth             |
//! |---------------------|-----------------------|------------------|
//! | `POST /issue`       | [`routes::issue`]     | agent credential |
//! | `GET /verify/{id}`  | [`routes::verify`]    | public           |
//! | `POST /rules`       | [`routes::rules`]     | agent credential |
//! | `PATCH /rules/{id}` | [`routes::rules`]     | agent credential |
//! | `GET /health`       | [`routes::health`]    | public           |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → RateLimitMiddleware → AuthMiddleware (authenticated routes only)
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI 3.1 spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod batcher;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::middleware::rate_limit::{rate_limit_middleware, CoordinatorRateLimiter, RateLimitConfig};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// `rate_limit_config` sizes the per-credential and per-peer-address token
/// buckets (§5); health and verification stay outside the auth layer so
/// they remain reachable without a credential.
pub fn app(state: AppState, rate_limit_config: RateLimitConfig) -> Router {
    let limiter = CoordinatorRateLimiter::new(rate_limit_config);

    let public = Router::new()
        .merge(routes::verify::router())
        .merge(routes::health::router())
        .merge(openapi::router());

    let authenticated = Router::new()
        .merge(routes::issue::router())
        .merge(routes::rules::router())
        .layer(from_fn_with_state(state.clone(), auth::require_agent_credential));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(axum::Extension(limiter))
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            config: state::AppConfig::default(),
            db: sqlx::PgPool::connect_lazy("postgres://localhost/nonexistent").unwrap(),
            signing_key: None,
            encryption_key: None,
        }
    }

    #[tokio::test]
    async fn unauthenticated_issue_returns_401() {
        let router = app(test_state(), RateLimitConfig::default());
        let req = Request::builder()
            .method("POST")
            .uri("/issue")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"rule_id":"00000000-0000-0000-0000-000000000000","action_data":{}}"#))
            .unwrap();

        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn openapi_json_is_served_publicly() {
        let router = app(test_state(), RateLimitConfig::default());
        let req = Request::builder().uri("/openapi.json").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["paths"].is_object());
    }

    #[tokio::test]
    async fn health_check_fails_against_unreachable_database() {
        let router = app(test_state(), RateLimitConfig::default());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
