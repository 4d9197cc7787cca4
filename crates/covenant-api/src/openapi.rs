//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec.
//! Serves at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the attestation pipeline's HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attestation Pipeline API",
        version = "0.1.0",
        description = "Issuance and public verification of signed, Merkle-batched attestations over agent-owned rules.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::issue::issue,
        crate::routes::verify::verify,
        crate::routes::rules::create_rule,
        crate::routes::rules::revise_rule,
        crate::routes::rules::archive_rule,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::routes::issue::IssueRequest,
        crate::routes::issue::IssueResponse,
        crate::routes::verify::VerifyResponse,
        crate::routes::rules::CreateRuleRequest,
        crate::routes::rules::ReviseRuleRequest,
        crate::routes::rules::RuleResponse,
        crate::routes::health::HealthResponse,
    )),
    tags(
        (name = "issue", description = "Attestation issuance"),
        (name = "verify", description = "Public attestation verification"),
        (name = "rules", description = "Rule registration and versioning"),
        (name = "health", description = "Storage health probe"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
