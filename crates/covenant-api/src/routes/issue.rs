//! # Attestation Issuance
//!
//! `POST /issue` — the one write path of the stable contract (§6). Every
//! request flows straight into [`coordinator::issue_attestation`]; this
//! module only shapes the request and response bodies.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::AgentIdentity;
use crate::coordinator;
use crate::error::AppError;
use crate::state::AppState;

/// Request body for `POST /issue`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequest {
    /// The rule to evaluate the action record against.
    pub rule_id: uuid::Uuid,
    /// The caller-supplied action record.
    pub action_data: Value,
}

/// Response body for a successful issuance.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueResponse {
    /// The new attestation's identifier.
    pub proof_id: String,
    /// Its public digest.
    pub proof_hash: String,
    /// Whether every condition held.
    pub rule_met: bool,
    /// Per-condition results, in rule order.
    pub evaluation: Value,
    /// Human-readable summary of the evaluation.
    pub summary: String,
    /// Unit cost charged.
    pub cost: f64,
    /// Always `false` at issue time — an attestation becomes on-chain only
    /// once the batcher anchors it.
    pub on_chain: bool,
    /// Path to the public verification view of this attestation.
    pub verify_url: String,
    /// Issue timestamp, ISO 8601 UTC.
    pub created_at: String,
}

/// Build the issuance router. Callers must apply [`crate::auth::require_agent_credential`]
/// ahead of this router — [`AgentIdentity`] is extracted from request extensions.
pub fn router() -> Router<AppState> {
    Router::new().route("/issue", post(issue))
}

/// `POST /issue` — evaluate a rule against an action record and persist a
/// signed attestation.
#[utoipa::path(
    post,
    path = "/issue",
    request_body = IssueRequest,
    responses(
        (status = 201, description = "Attestation issued", body = IssueResponse),
        (status = 401, description = "Missing or invalid agent credential"),
        (status = 403, description = "Rule owned by a different agent"),
        (status = 404, description = "Rule not found"),
        (status = 409, description = "Rule archived"),
        (status = 429, description = "Monthly quota exceeded or rate limited"),
    ),
    tag = "issue"
)]
async fn issue(
    State(state): State<AppState>,
    caller: AgentIdentity,
    Json(req): Json<IssueRequest>,
) -> Result<(axum::http::StatusCode, Json<IssueResponse>), AppError> {
    let rule_id = covenant_core::RuleId::from_uuid(req.rule_id);
    let issued = coordinator::issue_attestation(&state, caller, rule_id, req.action_data).await?;

    let body = IssueResponse {
        proof_id: issued.id.to_string(),
        proof_hash: issued.digest.to_hex(),
        rule_met: issued.met,
        evaluation: serde_json::to_value(&issued.evaluation.results)
            .map_err(|e| covenant_core::CoreError::Internal(e.to_string()))?,
        summary: issued.evaluation.summary,
        cost: issued.unit_cost,
        on_chain: false,
        verify_url: format!("/verify/{}", issued.id),
        created_at: issued.created_at.to_canonical_string(),
    };

    Ok((axum::http::StatusCode::CREATED, Json(body)))
}
