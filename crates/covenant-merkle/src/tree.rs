//! # Binary Merkle Tree
//!
//! A sort-pair-first binary Merkle tree, **not** a Merkle Mountain Range:
//! the tree is rebuilt from the full leaf set every time, rather than
//! maintained incrementally as an append-only forest.
//!
//! At each interior level, sibling pairs `(a, b)` are sorted by byte order
//! before being combined, so a verifier can reconstruct the root from a
//! leaf and its proof path without knowing the leaf's original position. An
//! odd node left over at the end of a level is promoted to the next level
//! **unchanged** — never duplicated.

use covenant_core::Digest;
use covenant_crypto::keccak256_raw;

use crate::error::MerkleError;

/// Combine two sibling digests into their parent, sorting the pair by byte
/// order first so the result does not depend on which side each came from.
fn combine(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a.as_bytes() <= b.as_bytes() { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[0..32].copy_from_slice(lo.as_bytes());
    buf[32..64].copy_from_slice(hi.as_bytes());
    Digest::from_bytes(keccak256_raw(&buf))
}

/// One step of an inclusion proof: combine with a sibling, or pass through
/// unchanged because this node had no sibling at this level (the odd-leaf
/// promotion case).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofStep {
    /// Combine the running digest with `sibling` (sort-pair-first).
    Sibling(Digest),
    /// No sibling at this level; the running digest passes through.
    Promoted,
}

/// An inclusion proof that a leaf belongs to a tree with a given root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    /// The leaf being proved.
    pub leaf: Digest,
    /// The sequence of combine steps from leaf to root, in level order.
    pub steps: Vec<ProofStep>,
}

impl InclusionProof {
    /// Reconstruct the root implied by this proof.
    pub fn reconstruct_root(&self) -> Digest {
        self.steps.iter().fold(self.leaf, |acc, step| match step {
            ProofStep::Sibling(sibling) => combine(&acc, sibling),
            ProofStep::Promoted => acc,
        })
    }

    /// Verify this proof reconstructs exactly `root`.
    pub fn verify(&self, root: &Digest) -> bool {
        &self.reconstruct_root() == root
    }
}

/// A binary Merkle tree built once from a fixed leaf set.
///
/// Every level is retained so that [`MerkleTree::proof_for`] can walk back
/// down from any leaf index.
#[derive(Debug, Clone, PartialEq)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from an ordered, non-empty leaf list.
    ///
    /// Leaf order is caller-determined (issue time ascending, ties broken by
    /// identifier, per the batcher's contract) and is preserved in
    /// `levels[0]`; the tree's shape does not depend on that order, only its
    /// proofs do.
    pub fn build(leaves: Vec<Digest>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyBatch);
        }

        let mut levels = vec![leaves];
        while levels.last().unwrap().len() > 1 {
            let current = levels.last().unwrap();
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            let mut pairs = current.chunks_exact(2);
            for pair in &mut pairs {
                next.push(combine(&pair[0], &pair[1]));
            }
            if let [odd] = pairs.remainder() {
                next.push(*odd);
            }
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// The tree's root digest. A single-leaf tree's root equals its leaf.
    pub fn root(&self) -> Digest {
        self.levels.last().unwrap()[0]
    }

    /// The leaves, in their original order.
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// Build an inclusion proof for the leaf at `index`.
    pub fn proof_for(&self, index: usize) -> Result<InclusionProof, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::LeafIndexOutOfRange { index, leaf_count });
        }

        let leaf = self.levels[0][index];
        let mut steps = Vec::new();
        let mut pos = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_pos = if pos % 2 == 0 { pos + 1 } else { pos - 1 };
            if pos % 2 == 0 && sibling_pos == level.len() {
                steps.push(ProofStep::Promoted);
            } else {
                steps.push(ProofStep::Sibling(level[sibling_pos]));
            }
            pos /= 2;
        }

        Ok(InclusionProof { leaf, steps })
    }
}
