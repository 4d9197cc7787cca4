//! # Rule Registration
//!
//! Rule creation and versioning are glue around the core contract (§1) —
//! neither appears in §6's stable HTTP table — but some write path has to
//! exist for an agent to have anything to attest against. Modeled as an
//! authenticated sibling of `/issue` rather than part of the core.

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use covenant_core::{CoreError, RuleId};
use covenant_rules::validate_conditions;

use crate::auth::AgentIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Request body for `POST /rules`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRuleRequest {
    /// Human-readable rule name.
    pub name: String,
    /// Proposed condition list, validated against §4.1 before storage.
    pub conditions: Vec<Value>,
}

/// Request body for `PATCH /rules/{id}` — replaces the condition list with
/// a new version, recording the superseded version to history first.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviseRuleRequest {
    /// New rule name.
    pub name: String,
    /// New condition list, validated against §4.1 before storage.
    pub conditions: Vec<Value>,
}

/// Response body carrying a rule's identity and version.
#[derive(Debug, Serialize, ToSchema)]
pub struct RuleResponse {
    /// The rule's identifier, stable across versions.
    pub rule_id: String,
    /// The version now current.
    pub version: i32,
}

/// Build the rule management router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rules", post(create_rule))
        .route("/rules/:id", patch(revise_rule))
        .route("/rules/:id/archive", post(archive_rule))
}

/// `POST /rules` — register a new rule owned by the caller.
#[utoipa::path(
    post,
    path = "/rules",
    request_body = CreateRuleRequest,
    responses(
        (status = 201, description = "Rule created", body = RuleResponse),
        (status = 400, description = "Condition list failed validation"),
    ),
    tag = "rules"
)]
async fn create_rule(
    State(state): State<AppState>,
    caller: AgentIdentity,
    Json(req): Json<CreateRuleRequest>,
) -> Result<(axum::http::StatusCode, Json<RuleResponse>), AppError> {
    let conditions = validate_conditions(&req.conditions)?;

    let rule_id = RuleId::new();
    crate::db::rules::insert(&state.db, rule_id, caller.agent_id, &req.name, &conditions)
        .await
        .map_err(AppError::from)?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(RuleResponse { rule_id: rule_id.to_string(), version: 1 }),
    ))
}

/// `PATCH /rules/{id}` — supersede a rule's conditions with a new version.
/// The old version is preserved in rule history before the update lands.
#[utoipa::path(
    patch,
    path = "/rules/{id}",
    params(("id" = uuid::Uuid, Path, description = "Rule identifier")),
    request_body = ReviseRuleRequest,
    responses(
        (status = 200, description = "Rule revised", body = RuleResponse),
        (status = 403, description = "Rule owned by a different agent"),
        (status = 404, description = "Rule not found"),
    ),
    tag = "rules"
)]
async fn revise_rule(
    State(state): State<AppState>,
    caller: AgentIdentity,
    Path(rule_id): Path<RuleId>,
    Json(req): Json<ReviseRuleRequest>,
) -> Result<Json<RuleResponse>, AppError> {
    let conditions = validate_conditions(&req.conditions)?;

    let mut tx = state.db.begin().await.map_err(AppError::from)?;
    let existing = crate::db::rules::fetch_by_id(&mut *tx, rule_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Core(CoreError::NotFound(format!("rule {rule_id} not found"))))?;
    if existing.agent_id != caller.agent_id {
        return Err(AppError::Core(CoreError::Ownership(format!(
            "rule {rule_id} is owned by a different agent"
        ))));
    }

    crate::db::rule_history::record(&mut *tx, &existing)
        .await
        .map_err(AppError::from)?;
    let new_version = crate::db::rules::update_conditions(&mut *tx, rule_id, &req.name, &conditions)
        .await
        .map_err(AppError::from)?;
    tx.commit().await.map_err(AppError::from)?;

    Ok(Json(RuleResponse { rule_id: rule_id.to_string(), version: new_version }))
}

/// `POST /rules/{id}/archive` — retire a rule from future issuance without
/// deleting it; attestations that already reference it are unaffected.
#[utoipa::path(
    post,
    path = "/rules/{id}/archive",
    params(("id" = uuid::Uuid, Path, description = "Rule identifier")),
    responses(
        (status = 200, description = "Rule archived", body = RuleResponse),
        (status = 403, description = "Rule owned by a different agent"),
        (status = 404, description = "Rule not found"),
    ),
    tag = "rules"
)]
async fn archive_rule(
    State(state): State<AppState>,
    caller: AgentIdentity,
    Path(rule_id): Path<RuleId>,
) -> Result<Json<RuleResponse>, AppError> {
    let existing = crate::db::rules::fetch_by_id(&state.db, rule_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Core(CoreError::NotFound(format!("rule {rule_id} not found"))))?;
    if existing.agent_id != caller.agent_id {
        return Err(AppError::Core(CoreError::Ownership(format!(
            "rule {rule_id} is owned by a different agent"
        ))));
    }

    crate::db::rules::archive(&state.db, rule_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(RuleResponse { rule_id: rule_id.to_string(), version: existing.version }))
}
