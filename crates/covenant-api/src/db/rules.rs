//! # Rule Storage

use sqlx::PgExecutor;
use uuid::Uuid;

use covenant_core::{AgentId, RuleId};
use covenant_rules::Condition;

/// Lifecycle state of a rule (§3 data model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// Eligible for attestation issuance.
    Active,
    /// Retained for history but no longer usable for new attestations.
    Archived,
}

impl RuleState {
    fn from_db(s: &str) -> Self {
        match s {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

/// A rule row as loaded by the coordinator for ownership, state, and
/// re-validation checks.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The rule's identifier.
    pub id: RuleId,
    /// The agent that owns this rule.
    pub agent_id: AgentId,
    /// Human-readable name.
    pub name: String,
    /// The flat conjunction of conditions, as stored.
    pub conditions: Vec<Condition>,
    /// Version, starting at 1.
    pub version: i32,
    /// Lifecycle state.
    pub state: RuleState,
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    agent_id: Uuid,
    name: String,
    conditions: serde_json::Value,
    version: i32,
    state: String,
}

impl RuleRow {
    fn into_rule(self) -> Result<Rule, serde_json::Error> {
        Ok(Rule {
            id: RuleId::from_uuid(self.id),
            agent_id: AgentId::from_uuid(self.agent_id),
            name: self.name,
            conditions: serde_json::from_value(self.conditions)?,
            version: self.version,
            state: RuleState::from_db(&self.state),
        })
    }
}

/// Fetch a rule by id.
pub async fn fetch_by_id<'e, E>(executor: E, rule_id: RuleId) -> Result<Option<Rule>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, RuleRow>(
        "SELECT id, agent_id, name, conditions, version, state FROM rules WHERE id = $1",
    )
    .bind(rule_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(RuleRow::into_rule)
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Insert a fresh rule at version 1, active.
pub async fn insert<'e, E>(
    executor: E,
    rule_id: RuleId,
    agent_id: AgentId,
    name: &str,
    conditions: &[Condition],
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let conditions_json = serde_json::to_value(conditions)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO rules (id, agent_id, name, conditions, version, state)
         VALUES ($1, $2, $3, $4, 1, 'active')",
    )
    .bind(rule_id.as_uuid())
    .bind(agent_id.as_uuid())
    .bind(name)
    .bind(conditions_json)
    .execute(executor)
    .await?;

    Ok(())
}

/// Replace a rule's name and conditions with a new version. Callers must
/// have already written the superseded version to rule history in the same
/// transaction — this function only ever moves a rule forward.
pub async fn update_conditions<'e, E>(
    executor: E,
    rule_id: RuleId,
    name: &str,
    conditions: &[Condition],
) -> Result<i32, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let conditions_json = serde_json::to_value(conditions)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let (version,): (i32,) = sqlx::query_as(
        "UPDATE rules SET name = $1, conditions = $2, version = version + 1
         WHERE id = $3 RETURNING version",
    )
    .bind(name)
    .bind(conditions_json)
    .bind(rule_id.as_uuid())
    .fetch_one(executor)
    .await?;

    Ok(version)
}

/// Archive a rule, removing it from future issuance eligibility without
/// deleting it — attestations already issued against it are unaffected.
pub async fn archive<'e, E>(executor: E, rule_id: RuleId) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE rules SET state = 'archived' WHERE id = $1")
        .bind(rule_id.as_uuid())
        .execute(executor)
        .await?;

    Ok(())
}
