//! # Public Attestation Verification
//!
//! `GET /verify/{id}` — public, no credential required (§4.6). Returns only
//! the fields a holder of the signing public key or the external ledger
//! could independently confirm; the encrypted signature never leaves
//! storage through this path.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use covenant_core::AttestationId;

use crate::error::AppError;
use crate::state::AppState;

/// Public view of one attestation.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// The attestation's identifier.
    pub proof_id: String,
    /// Its public digest.
    pub digest: String,
    /// Whether every condition held.
    pub met: bool,
    /// Per-condition results, as stored.
    pub evaluation: serde_json::Value,
    /// Human-readable summary.
    pub summary: String,
    /// External ledger transaction reference, once batched.
    pub ledger_tx_ref: Option<String>,
    /// Issue timestamp, as stored.
    pub issued_at: String,
}

/// Build the verification router.
pub fn router() -> Router<AppState> {
    Router::new().route("/verify/:id", get(verify))
}

/// `GET /verify/{id}` — return the public view of an attestation.
#[utoipa::path(
    get,
    path = "/verify/{id}",
    params(("id" = uuid::Uuid, Path, description = "Attestation identifier")),
    responses(
        (status = 200, description = "Public attestation view", body = VerifyResponse),
        (status = 404, description = "No such attestation"),
    ),
    tag = "verify"
)]
async fn verify(
    State(state): State<AppState>,
    Path(id): Path<AttestationId>,
) -> Result<Json<VerifyResponse>, AppError> {
    let record = crate::db::attestations::fetch_by_id(&state.db, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Core(covenant_core::CoreError::NotFound(format!("attestation {id} not found"))))?;

    Ok(Json(VerifyResponse {
        proof_id: record.id.to_string(),
        digest: record.digest.to_hex(),
        met: record.met,
        evaluation: record.evaluation,
        summary: record.summary,
        ledger_tx_ref: record.ledger_tx_ref,
        issued_at: record.issued_at.to_rfc3339(),
    }))
}
