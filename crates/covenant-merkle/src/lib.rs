#![deny(missing_docs)]
//! # covenant-merkle — Attestation Batch Trees
//!
//! A binary Merkle tree over attestation digests, with a sort-pair-first
//! interior combine rule and an odd-leaf-promoted-unchanged policy. This is
//! deliberately **not** a Merkle Mountain Range: the whole tree is rebuilt
//! from a fixed leaf set at batch time rather than maintained incrementally.

pub mod batch;
pub mod error;
pub mod tree;

pub use batch::{Batch, MAX_BATCH_SIZE};
pub use error::MerkleError;
pub use tree::{InclusionProof, MerkleTree, ProofStep};
