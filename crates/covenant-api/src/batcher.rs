//! # Merkle Batcher
//!
//! Periodically scans unbatched attestations, builds a binary Merkle tree
//! over their digests, commits the root externally, and marks every
//! included attestation as batched — all inside one cycle, with no partial
//! progress on failure (§4.4).

use std::sync::Arc;
use std::time::Duration;

use covenant_core::{AttestationId, BatchId, Digest};
use covenant_merkle::Batch;

use crate::ledger::Ledger;
use crate::state::AppState;

/// Wall-clock budget for the external ledger call within a single cycle
/// (§5). An anchor that doesn't land within this deadline is abandoned —
/// the cycle fails, the atomic DB update never runs, and every candidate
/// stays unbatched for the next tick.
const ANCHOR_DEADLINE: Duration = Duration::from_secs(10);

/// One batcher cycle: fetch candidates, build the tree, commit, mark.
///
/// Returns the number of attestations batched, or `0` if there was nothing
/// to do or the cycle aborted. Every failure path leaves storage untouched
/// — a crashed, erroring, or timed-out cycle simply retries its candidates
/// next time.
pub async fn run_cycle(state: &AppState, ledger: &dyn Ledger) -> u64 {
    match try_run_cycle(state, ledger, ANCHOR_DEADLINE).await {
        Ok(count) => count,
        Err(reason) => {
            tracing::error!(reason = %reason, "batcher cycle failed; candidates remain unbatched");
            0
        }
    }
}

async fn try_run_cycle(state: &AppState, ledger: &dyn Ledger, deadline: Duration) -> Result<u64, String> {
    let candidates = crate::db::attestations::fetch_unbatched(&state.db, covenant_merkle::MAX_BATCH_SIZE as i64)
        .await
        .map_err(|e| e.to_string())?;

    if candidates.is_empty() {
        return Ok(0);
    }

    let ids: Vec<AttestationId> = candidates.iter().map(|a| a.id).collect();
    let digests: Vec<Digest> = candidates.iter().map(|a| a.digest).collect();

    let batch = Batch::build(digests.clone()).map_err(|e| e.to_string())?;
    let root = batch.root();

    let tx_ref = anchor_with_deadline(ledger, root, batch.leaf_count() as u32, &digests, deadline)
        .await
        .map_err(|e| e.to_string())?;

    let mut tx = state.db.begin().await.map_err(|e| e.to_string())?;
    let batch_id = BatchId::new();
    crate::db::batches::insert(&mut *tx, batch_id, root, batch.leaf_count() as i32, &tx_ref)
        .await
        .map_err(|e| e.to_string())?;
    crate::db::attestations::mark_batched(&mut *tx, &ids, batch_id, &tx_ref)
        .await
        .map_err(|e| e.to_string())?;
    tx.commit().await.map_err(|e| e.to_string())?;

    Ok(ids.len() as u64)
}

/// Anchor a batch externally, abandoning the call if it doesn't land within
/// `deadline`. A timeout is indistinguishable from any other anchor failure
/// to the caller — the cycle aborts and every candidate stays unbatched.
async fn anchor_with_deadline(
    ledger: &dyn Ledger,
    root: Digest,
    count: u32,
    leaves: &[Digest],
    deadline: Duration,
) -> Result<crate::ledger::LedgerTxRef, String> {
    tokio::time::timeout(deadline, ledger.anchor_batch(root, count, leaves))
        .await
        .map_err(|_| "ledger anchor call exceeded its deadline".to_string())?
        .map_err(|e| e.to_string())
}

/// Postgres advisory lock key guarding the batcher. Arbitrary but fixed —
/// every process in a deployment contends for the same key.
const BATCHER_LOCK_KEY: i64 = 0x6361_7474_6261_7463u64 as i64;

/// Try to take the deployment-wide batcher exclusion. Holds a dedicated pool
/// connection for as long as the lock is held; the advisory lock releases
/// automatically if that connection drops, so a crashed process never
/// wedges the lock for the deployment's lifetime.
async fn try_acquire_exclusion(pool: &sqlx::PgPool) -> Option<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    let mut conn = pool.acquire().await.ok()?;
    let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .bind(BATCHER_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
        .ok()?;
    if acquired {
        Some(conn)
    } else {
        None
    }
}

/// Spawn the periodic batcher task, gated on the deployment-wide advisory
/// exclusion (§5): at most one instance runs per database at a time. A
/// second process that loses the race logs and exits its task immediately
/// rather than contending for candidates it would only double-batch.
pub fn spawn(state: AppState, ledger: Arc<dyn Ledger>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let _lock_conn = match try_acquire_exclusion(&state.db).await {
            Some(conn) => conn,
            None => {
                tracing::info!("another batcher instance already holds the deployment lock; not starting");
                return;
            }
        };

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let batched = run_cycle(&state, ledger.as_ref()).await;
            if batched > 0 {
                tracing::info!(batched, "batcher cycle committed a batch");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    #[test]
    fn max_batch_size_matches_merkle_crate() {
        assert_eq!(covenant_merkle::MAX_BATCH_SIZE, 500);
    }

    struct SlowLedger;

    #[async_trait::async_trait]
    impl Ledger for SlowLedger {
        async fn anchor_batch(
            &self,
            _root: Digest,
            _count: u32,
            _leaves: &[Digest],
        ) -> Result<crate::ledger::LedgerTxRef, LedgerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("unreachable".to_string())
        }

        async fn lookup(&self, _digest: Digest) -> Result<bool, LedgerError> {
            Ok(false)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn anchor_deadline_abandons_a_hung_ledger() {
        let root = Digest::from_bytes([7u8; 32]);
        let result = anchor_with_deadline(&SlowLedger, root, 1, &[root], Duration::from_millis(50)).await;
        assert!(result.is_err());
    }
}
