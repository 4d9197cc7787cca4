//! # Attestation Storage

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use covenant_core::{AgentId, AttestationId, BatchId, Digest, RuleId};
use covenant_rules::Evaluation;

/// A newly issued attestation, ready to persist inside the coordinator's
/// transaction. Everything here is produced before the insert — the
/// coordinator never partially constructs a row.
pub struct NewAttestation<'a> {
    /// Fresh identifier for this attestation.
    pub id: AttestationId,
    /// Owning agent.
    pub agent_id: AgentId,
    /// The rule evaluated.
    pub rule_id: RuleId,
    /// Sequence number allocated from the agent's counter.
    pub sequence_number: i64,
    /// The caller-supplied action record, retained verbatim.
    pub action_snapshot: &'a serde_json::Value,
    /// Per-condition evaluation results.
    pub evaluation: &'a Evaluation,
    /// The public digest.
    pub digest: Digest,
    /// The signature, already envelope-encrypted.
    pub encrypted_signature: &'a str,
    /// Unit cost charged at issue time.
    pub unit_cost: f64,
}

/// Insert a new attestation row. Must run inside the coordinator's
/// transaction; a digest collision aborts it via the unique constraint.
pub async fn insert<'e, E>(executor: E, attestation: &NewAttestation<'_>) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO attestations
         (id, agent_id, rule_id, sequence_number, action_snapshot, evaluation, met, summary,
          digest, encrypted_signature, unit_cost, issued_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(attestation.id.as_uuid())
    .bind(attestation.agent_id.as_uuid())
    .bind(attestation.rule_id.as_uuid())
    .bind(attestation.sequence_number)
    .bind(attestation.action_snapshot)
    .bind(serde_json::to_value(&attestation.evaluation.results).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
    .bind(attestation.evaluation.met)
    .bind(&attestation.evaluation.summary)
    .bind(attestation.digest.to_hex())
    .bind(attestation.encrypted_signature)
    .bind(attestation.unit_cost)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// A stored attestation, as reassembled from its row.
#[derive(Debug, Clone)]
pub struct AttestationRecord {
    /// Its identifier.
    pub id: AttestationId,
    /// Owning agent.
    pub agent_id: AgentId,
    /// The rule it was evaluated against.
    pub rule_id: RuleId,
    /// Sequence number at issue time.
    pub sequence_number: i64,
    /// Public digest.
    pub digest: Digest,
    /// Envelope-encrypted signature, never returned to callers directly.
    pub encrypted_signature: String,
    /// Whether every condition passed.
    pub met: bool,
    /// Human-readable summary.
    pub summary: String,
    /// Raw per-condition results, as JSON (decoded by callers that need typed access).
    pub evaluation: serde_json::Value,
    /// Unit cost charged at issue time.
    pub unit_cost: f64,
    /// Ledger transaction reference, once batched.
    pub ledger_tx_ref: Option<String>,
    /// Batch reference, once batched.
    pub batch_id: Option<BatchId>,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AttestationRow {
    id: Uuid,
    agent_id: Uuid,
    rule_id: Uuid,
    sequence_number: i64,
    digest: String,
    encrypted_signature: String,
    met: bool,
    summary: String,
    evaluation: serde_json::Value,
    unit_cost: f64,
    ledger_tx_ref: Option<String>,
    batch_id: Option<Uuid>,
    issued_at: DateTime<Utc>,
}

impl AttestationRow {
    fn into_record(self) -> Result<AttestationRecord, covenant_core::CoreError> {
        Ok(AttestationRecord {
            id: AttestationId::from_uuid(self.id),
            agent_id: AgentId::from_uuid(self.agent_id),
            rule_id: RuleId::from_uuid(self.rule_id),
            sequence_number: self.sequence_number,
            digest: Digest::from_hex(&self.digest)?,
            encrypted_signature: self.encrypted_signature,
            met: self.met,
            summary: self.summary,
            evaluation: self.evaluation,
            unit_cost: self.unit_cost,
            ledger_tx_ref: self.ledger_tx_ref,
            batch_id: self.batch_id.map(BatchId::from_uuid),
            issued_at: self.issued_at,
        })
    }
}

const COLUMNS: &str = "id, agent_id, rule_id, sequence_number, digest, encrypted_signature,
     met, summary, evaluation, unit_cost, ledger_tx_ref, batch_id, issued_at";

/// Fetch one attestation by id.
pub async fn fetch_by_id<'e, E>(executor: E, id: AttestationId) -> Result<Option<AttestationRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("SELECT {COLUMNS} FROM attestations WHERE id = $1");
    let row = sqlx::query_as::<_, AttestationRow>(&query)
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;

    row.map(AttestationRow::into_record)
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Fetch up to `limit` unbatched attestations, ordered by issue time
/// ascending with id as a tiebreak — the batcher's candidate set (§4.4).
pub async fn fetch_unbatched<'e, E>(executor: E, limit: i64) -> Result<Vec<AttestationRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "SELECT {COLUMNS} FROM attestations WHERE batch_id IS NULL ORDER BY issued_at ASC, id ASC LIMIT $1"
    );
    let rows = sqlx::query_as::<_, AttestationRow>(&query)
        .bind(limit)
        .fetch_all(executor)
        .await?;

    rows.into_iter()
        .map(AttestationRow::into_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Mark a set of attestations as batched. Only called after the external
/// ledger commit succeeds — a crashed batcher never calls this, leaving its
/// candidates re-batchable on the next cycle.
pub async fn mark_batched<'e, E>(
    executor: E,
    ids: &[AttestationId],
    batch_id: BatchId,
    ledger_tx_ref: &str,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let uuids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
    let result = sqlx::query(
        "UPDATE attestations SET batch_id = $1, ledger_tx_ref = $2 WHERE id = ANY($3)",
    )
    .bind(batch_id.as_uuid())
    .bind(ledger_tx_ref)
    .bind(&uuids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
