//! # Agent Credential Authentication
//!
//! Authorization is glue around the core contract, not part of it — the
//! core only needs "a caller-identifying credential resolved upstream to an
//! agent and owning principal". This module is that resolution step: a
//! bearer credential of the form `{agent_id}:{secret}` is looked up against
//! the stored per-agent secret and turned into an [`AgentIdentity`].
//!
//! `GET /verify/{id}` needs none of this — it is public.

use axum::extract::{FromRequestParts, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use covenant_core::{AgentId, PrincipalId};

use crate::error::AppError;
use crate::state::AppState;

/// Identity of an authenticated agent, resolved from its credential and
/// injected into request extensions by [`require_agent_credential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentIdentity {
    /// The authenticated agent.
    pub agent_id: AgentId,
    /// The principal that owns this agent.
    pub principal_id: PrincipalId,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AgentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AgentIdentity>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Constant-time comparison of a provided secret against the stored one.
///
/// When lengths differ a dummy comparison still runs, so a mismatch never
/// leaks length through timing.
pub fn constant_time_secret_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Split a `Bearer` credential into its `{agent_id}:{secret}` parts.
pub fn parse_credential(header_value: &str) -> Result<(AgentId, &str), AppError> {
    let token = header_value.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
    let (agent_id_str, secret) = token.split_once(':').ok_or(AppError::Unauthorized)?;
    if secret.is_empty() {
        return Err(AppError::Unauthorized);
    }
    let agent_id: AgentId = agent_id_str.parse().map_err(|_| AppError::Unauthorized)?;
    Ok((agent_id, secret))
}

/// Middleware guarding `POST /issue`: resolves the bearer credential against
/// storage and injects an [`AgentIdentity`] into request extensions.
///
/// Agent lookup failures — unknown agent, wrong secret, suspended or
/// deleted agent — all collapse to the same 401 response; the taxonomy in
/// §7 of the core contract doesn't have an "unauthorized" code because
/// authentication never reaches the coordinator.
pub async fn require_agent_credential(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (agent_id, secret) = parse_credential(header_value)?;
    let agent = crate::db::agents::fetch_active(&state.db, agent_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !constant_time_secret_eq(secret, &agent.credential_secret) {
        tracing::warn!(agent_id = %agent_id, "authentication failed: wrong secret");
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AgentIdentity {
        agent_id: agent.id,
        principal_id: agent.principal_id,
    });
    Ok(next.run(request).await)
}
