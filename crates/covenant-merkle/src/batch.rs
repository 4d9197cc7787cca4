//! # Batch Construction
//!
//! Wraps [`MerkleTree`] with the batching-specific invariants: at most 500
//! leaves, no duplicate leaves, and a fixed input order (issue time
//! ascending, ties broken by identifier — enforced by the caller before the
//! leaves reach this crate).

use std::collections::HashSet;

use covenant_core::Digest;

use crate::error::MerkleError;
use crate::tree::{InclusionProof, MerkleTree};

/// The maximum number of attestations a single batch may contain.
pub const MAX_BATCH_SIZE: usize = 500;

/// A committed Merkle batch: a tree built from an ordered list of
/// attestation digests, plus the metadata a caller persists alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    tree: MerkleTree,
}

impl Batch {
    /// Build a batch from an ordered digest list.
    ///
    /// Rejects an empty list, a list longer than [`MAX_BATCH_SIZE`], or a
    /// list containing the same digest twice.
    pub fn build(digests: Vec<Digest>) -> Result<Self, MerkleError> {
        if digests.is_empty() {
            return Err(MerkleError::EmptyBatch);
        }
        if digests.len() > MAX_BATCH_SIZE {
            return Err(MerkleError::BatchTooLarge {
                count: digests.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let mut seen = HashSet::with_capacity(digests.len());
        for digest in &digests {
            if !seen.insert(*digest) {
                return Err(MerkleError::DuplicateLeaf(digest.to_hex()));
            }
        }

        let tree = MerkleTree::build(digests)?;
        Ok(Self { tree })
    }

    /// The batch's Merkle root, recorded externally on successful commit.
    pub fn root(&self) -> Digest {
        self.tree.root()
    }

    /// The number of attestations in this batch.
    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    /// The leaves, in the order they were committed.
    pub fn leaves(&self) -> &[Digest] {
        self.tree.leaves()
    }

    /// Build the inclusion proof for the attestation at `index` in
    /// commit order.
    pub fn proof_for(&self, index: usize) -> Result<InclusionProof, MerkleError> {
        self.tree.proof_for(index)
    }

    /// Build the inclusion proof for a specific digest, if it is a leaf of
    /// this batch.
    pub fn proof_for_digest(&self, digest: &Digest) -> Result<InclusionProof, MerkleError> {
        let index = self
            .tree
            .leaves()
            .iter()
            .position(|leaf| leaf == digest)
            .ok_or_else(|| MerkleError::LeafNotFound(digest.to_hex()))?;
        self.tree.proof_for(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(byte: u8) -> Digest {
        Digest::from_bytes([byte; 32])
    }

    #[test]
    fn single_leaf_batch_builds() {
        let batch = Batch::build(vec![digest(1)]).unwrap();
        assert_eq!(batch.leaf_count(), 1);
        assert_eq!(batch.root(), digest(1));
    }

    #[test]
    fn rejects_empty_batch() {
        assert_eq!(Batch::build(vec![]), Err(MerkleError::EmptyBatch));
    }

    #[test]
    fn rejects_batch_over_max_size() {
        let digests: Vec<Digest> = (0..=MAX_BATCH_SIZE)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0..8].copy_from_slice(&(i as u64).to_be_bytes());
                Digest::from_bytes(bytes)
            })
            .collect();
        assert_eq!(
            Batch::build(digests),
            Err(MerkleError::BatchTooLarge {
                count: MAX_BATCH_SIZE + 1,
                max: MAX_BATCH_SIZE
            })
        );
    }

    #[test]
    fn accepts_batch_at_max_size() {
        let digests: Vec<Digest> = (0..MAX_BATCH_SIZE)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0..8].copy_from_slice(&(i as u64).to_be_bytes());
                Digest::from_bytes(bytes)
            })
            .collect();
        let batch = Batch::build(digests).unwrap();
        assert_eq!(batch.leaf_count(), MAX_BATCH_SIZE);
    }

    #[test]
    fn rejects_duplicate_leaves() {
        let result = Batch::build(vec![digest(1), digest(2), digest(1)]);
        assert!(matches!(result, Err(MerkleError::DuplicateLeaf(_))));
    }

    #[test]
    fn every_leaf_proof_verifies_against_the_root() {
        let digests: Vec<Digest> = (1..=7).map(digest).collect();
        let batch = Batch::build(digests.clone()).unwrap();
        for (i, d) in digests.iter().enumerate() {
            let proof = batch.proof_for(i).unwrap();
            assert_eq!(&proof.leaf, d);
            assert!(proof.verify(&batch.root()));
        }
    }

    #[test]
    fn proof_for_digest_finds_leaf_by_value() {
        let digests = vec![digest(1), digest(2), digest(3)];
        let batch = Batch::build(digests).unwrap();
        let proof = batch.proof_for_digest(&digest(2)).unwrap();
        assert!(proof.verify(&batch.root()));
    }

    #[test]
    fn proof_for_digest_not_in_batch_errors() {
        let batch = Batch::build(vec![digest(1), digest(2)]).unwrap();
        let result = batch.proof_for_digest(&digest(99));
        assert!(matches!(result, Err(MerkleError::LeafNotFound(_))));
    }

    #[test]
    fn leaves_preserve_commit_order() {
        let digests = vec![digest(5), digest(1), digest(3)];
        let batch = Batch::build(digests.clone()).unwrap();
        assert_eq!(batch.leaves(), digests.as_slice());
    }
}
