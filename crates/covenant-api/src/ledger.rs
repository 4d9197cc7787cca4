//! # External Ledger Interface
//!
//! The core treats the ledger as an opaque collaborator (§6): two
//! operations, `anchor_batch` and `lookup`. A real deployment points this at
//! whatever append-only commitment store backs the deployment; this crate
//! ships a no-op stub so the batcher has something to call when no ledger
//! endpoint is configured.

use async_trait::async_trait;

use covenant_core::Digest;

/// A reference returned by the ledger on a successful anchor — opaque to
/// the core, stored verbatim against every attestation in the batch.
pub type LedgerTxRef = String;

/// Errors from the external ledger collaborator. Always maps to *external*
/// at the HTTP boundary; never partially succeeds.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger endpoint could not be reached.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),
    /// The ledger reached but rejected the call.
    #[error("ledger rejected commitment: {0}")]
    Rejected(String),
}

/// The external ledger contract the batcher depends on.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Anchor a batch's root and leaves externally, returning a transaction
    /// reference on success.
    async fn anchor_batch(
        &self,
        root: Digest,
        count: u32,
        leaves: &[Digest],
    ) -> Result<LedgerTxRef, LedgerError>;

    /// Check whether a digest has been committed, per an external holder's
    /// own bookkeeping. Not used by the core's own read path — offered for
    /// completeness of the contract in §6.
    async fn lookup(&self, digest: Digest) -> Result<bool, LedgerError>;
}

/// A ledger that accepts every batch immediately and fabricates a
/// deterministic-looking reference from the batch root. Used when no real
/// ledger endpoint is configured — attestations still get committed to the
/// local batch record, just without an external anchor worth trusting.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLedger;

#[async_trait]
impl Ledger for NullLedger {
    async fn anchor_batch(
        &self,
        root: Digest,
        _count: u32,
        _leaves: &[Digest],
    ) -> Result<LedgerTxRef, LedgerError> {
        Ok(format!("null-ledger:{}", root.to_hex()))
    }

    async fn lookup(&self, _digest: Digest) -> Result<bool, LedgerError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_ledger_always_anchors() {
        let ledger = NullLedger;
        let root = Digest::from_bytes([1u8; 32]);
        let tx_ref = ledger.anchor_batch(root, 3, &[root]).await.unwrap();
        assert!(tx_ref.contains(&root.to_hex()));
    }

    #[tokio::test]
    async fn null_ledger_lookup_is_always_false() {
        let ledger = NullLedger;
        assert!(!ledger.lookup(Digest::from_bytes([2u8; 32])).await.unwrap());
    }
}
