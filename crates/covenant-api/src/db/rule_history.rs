//! # Rule History
//!
//! Append-only snapshots of superseded rule versions (§3). Written once per
//! edit, immediately before the live row is overwritten, inside the same
//! transaction — a crash between the two leaves the edit uncommitted
//! entirely rather than losing history.

use sqlx::PgExecutor;

use super::rules::Rule;

/// Record a rule's current version to history before it is superseded.
pub async fn record<'e, E>(executor: E, rule: &Rule) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let conditions_json = serde_json::to_value(&rule.conditions)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO rule_history (rule_id, version, name, conditions, recorded_at)
         VALUES ($1, $2, $3, $4, now())",
    )
    .bind(rule.id.as_uuid())
    .bind(rule.version)
    .bind(&rule.name)
    .bind(conditions_json)
    .execute(executor)
    .await?;

    Ok(())
}
