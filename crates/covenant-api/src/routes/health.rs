//! # Health Probe
//!
//! `GET /health` — storage connectivity check (§7: "Storage health check
//! surfaces as a 5xx on `/health`"). Crypto key availability is not part of
//! this check: a deployment with missing keys is still healthy, just unable
//! to issue (§7 degraded mode) — `/health` answers "is storage reachable",
//! not "can this deployment issue attestations".

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Health probe response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` when this body is returned; a failed check returns a
    /// 5xx error body instead.
    pub status: &'static str,
    /// Whether issuance is currently possible (signing + encryption keys
    /// both loaded).
    pub can_issue: bool,
}

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `GET /health` — round-trip the database and report issuance readiness.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Storage reachable", body = HealthResponse),
        (status = 500, description = "Storage unreachable"),
    ),
    tag = "health"
)]
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    crate::db::pool::ping(&state.db).await.map_err(AppError::from)?;

    Ok(Json(HealthResponse { status: "ok", can_issue: state.can_issue() }))
}
