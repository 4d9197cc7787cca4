//! # Keccak-256 Hasher
//!
//! The pre-NIST Keccak-256 variant — *not* SHA3-256, which uses different
//! padding. This is the only hash function in the attestation pipeline: it
//! hashes the canonicalizer's output into an attestation's public identifier,
//! and the Merkle batcher reuses it for interior tree nodes.
//!
//! ## Security invariant
//!
//! [`keccak256`] accepts only `&CanonicalBytes`, never a raw `&[u8]`. A
//! caller cannot accidentally hash data that skipped canonicalization.
//! [`keccak256_raw`] is the escape hatch for the one other legitimate use —
//! hashing the 64-byte concatenation of two Merkle nodes, which is not a
//! canonicalizable JSON value.

use sha3::{Digest as _, Keccak256};

use covenant_core::Digest;
use covenant_core::CanonicalBytes;

/// Hash a canonical payload with Keccak-256.
pub fn keccak256(canonical: &CanonicalBytes) -> Digest {
    Digest::from_bytes(keccak256_raw(canonical.as_bytes()))
}

/// Hash raw bytes with Keccak-256.
///
/// Used by the Merkle batcher to hash the 64-byte concatenation of two
/// sorted node digests, which is not itself a canonicalizable value.
pub fn keccak256_raw(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn produces_32_bytes() {
        let canonical = CanonicalBytes::new(&json!({"a": 1})).unwrap();
        let digest = keccak256(&canonical);
        assert_eq!(digest.as_bytes().len(), 32);
    }

    #[test]
    fn is_deterministic() {
        let canonical = CanonicalBytes::new(&json!({"key": "value", "n": 42})).unwrap();
        assert_eq!(keccak256(&canonical), keccak256(&canonical));
    }

    #[test]
    fn different_inputs_differ() {
        let a = CanonicalBytes::new(&json!({"a": 1})).unwrap();
        let b = CanonicalBytes::new(&json!({"a": 2})).unwrap();
        assert_ne!(keccak256(&a), keccak256(&b));
    }

    /// Keccak-256 of the empty string is a fixed, well-known value distinct
    /// from SHA3-256's — this pins down that we use the pre-NIST padding.
    #[test]
    fn matches_known_keccak256_empty_vector() {
        let digest = keccak256_raw(b"");
        let expected = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(hex, expected);
    }

    #[test]
    fn raw_and_canonical_path_agree() {
        let canonical = CanonicalBytes::new(&json!({})).unwrap();
        assert_eq!(keccak256(&canonical).as_bytes(), &keccak256_raw(canonical.as_bytes()));
    }
}
