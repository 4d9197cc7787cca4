//! # Agent Storage

use sqlx::PgExecutor;
use uuid::Uuid;

use covenant_core::{AgentId, PrincipalId};

/// Lifecycle state of an agent (§3 data model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Can issue attestations (subject to the coordinator's other checks).
    Active,
    /// Exists but cannot issue; surfaces as *state error*.
    Suspended,
    /// Tombstoned; treated as nonexistent for authentication and issuance.
    Deleted,
}

impl AgentState {
    fn from_db(s: &str) -> Self {
        match s {
            "suspended" => Self::Suspended,
            "deleted" => Self::Deleted,
            _ => Self::Active,
        }
    }

    fn as_db(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// An agent row, as seen by the credential resolver and the coordinator.
#[derive(Debug, Clone)]
pub struct Agent {
    /// The agent's identifier.
    pub id: AgentId,
    /// The principal that owns this agent.
    pub principal_id: PrincipalId,
    /// The shared secret half of its bearer credential.
    pub credential_secret: String,
    /// Lifecycle state.
    pub state: AgentState,
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: Uuid,
    principal_id: Uuid,
    credential_secret: String,
    state: String,
}

impl AgentRow {
    fn into_agent(self) -> Agent {
        Agent {
            id: AgentId::from_uuid(self.id),
            principal_id: PrincipalId::from_uuid(self.principal_id),
            credential_secret: self.credential_secret,
            state: AgentState::from_db(&self.state),
        }
    }
}

/// Fetch an agent by id, but only if it can currently authenticate.
/// Suspended and deleted agents are both reported as nonexistent here —
/// authentication has no *state error* category of its own, so either one
/// simply fails to resolve an identity and the caller sees *unauthorized*.
pub async fn fetch_active<'e, E>(executor: E, agent_id: AgentId) -> Result<Option<Agent>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, AgentRow>(
        "SELECT id, principal_id, credential_secret, state FROM agents WHERE id = $1",
    )
    .bind(agent_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    Ok(row
        .map(AgentRow::into_agent)
        .filter(|a| a.state == AgentState::Active))
}

/// Atomically increment an agent's sequence counter and return the new
/// value. Must run inside the coordinator's transaction — the new value
/// becomes the attestation's `nonce`.
pub async fn increment_sequence<'e, E>(executor: E, agent_id: AgentId) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let (sequence,): (i64,) = sqlx::query_as(
        "UPDATE agents SET sequence_counter = sequence_counter + 1 WHERE id = $1 RETURNING sequence_counter",
    )
    .bind(agent_id.as_uuid())
    .fetch_one(executor)
    .await?;

    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_state_round_trips_through_db_strings() {
        assert_eq!(AgentState::from_db("active"), AgentState::Active);
        assert_eq!(AgentState::from_db("suspended"), AgentState::Suspended);
        assert_eq!(AgentState::from_db("deleted"), AgentState::Deleted);
        assert_eq!(AgentState::Suspended.as_db(), "suspended");
    }

    #[test]
    fn unknown_db_string_defaults_to_active() {
        assert_eq!(AgentState::from_db("garbage"), AgentState::Active);
    }
}
