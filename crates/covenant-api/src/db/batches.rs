//! # Batch Storage

use chrono::Utc;
use sqlx::PgExecutor;

use covenant_core::{BatchId, Digest};

/// Insert a committed batch record. Called only after the external ledger
/// commit has already succeeded — there is no "pending batch" state.
pub async fn insert<'e, E>(
    executor: E,
    batch_id: BatchId,
    root_digest: Digest,
    leaf_count: i32,
    ledger_tx_ref: &str,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO batches (id, root_digest, leaf_count, ledger_tx_ref, committed_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(batch_id.as_uuid())
    .bind(root_digest.to_hex())
    .bind(leaf_count)
    .bind(ledger_tx_ref)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}
