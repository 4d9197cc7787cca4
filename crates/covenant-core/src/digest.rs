//! # Attestation Digest
//!
//! Defines [`Digest`], the 32-byte identifier type shared by the hasher
//! (`covenant-crypto::keccak`) and the Merkle batcher (`covenant-merkle`).
//!
//! This crate does not compute digests itself — it has no cryptography
//! dependency. It only owns the *shape* of a digest: 32 raw bytes, rendered
//! as `0x` + 64 lowercase hex characters, with a constructor that accepts the
//! hasher's raw output and a parser for the hex form received at the API
//! boundary (e.g. a client citing a digest it expects a batch to contain).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A 32-byte Keccak-256 digest, rendered as `0x` + 64 lowercase hex chars.
///
/// This is the attestation's public identifier and the Merkle tree's leaf
/// and node type. There is exactly one hash algorithm in this system —
/// unlike a content-addressed store that might version algorithms, a
/// `Digest` carries no algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(#[serde(with = "hex_digest")] [u8; 32]);

impl Digest {
    /// Wrap a raw 32-byte hash output.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a digest from its `0x`-prefixed 64-hex-character form.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        if stripped.len() != 64 {
            return Err(CoreError::Validation(format!(
                "expected 64 hex chars for a digest, got {}",
                stripped.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&stripped[i * 2..i * 2 + 2], 16)
                .map_err(|_| CoreError::Validation(format!("invalid hex digest: {s}")))?;
        }
        Ok(Self(bytes))
    }

    /// Render as `0x` + 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hex {
    pub fn encode(bytes: [u8; 32]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", super::hex::encode(*bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let digest = super::Digest::from_hex(&s).map_err(serde::de::Error::custom)?;
        Ok(digest.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let bytes = [7u8; 32];
        let digest = Digest::from_bytes(bytes);
        let hex = digest.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        let parsed = Digest::from_hex(&hex).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn from_hex_accepts_without_prefix() {
        let bytes = [1u8; 32];
        let digest = Digest::from_bytes(bytes);
        let hex_no_prefix = digest.to_hex().trim_start_matches("0x").to_string();
        let parsed = Digest::from_hex(&hex_no_prefix).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Digest::from_hex("0xabcd").is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = format!("0x{}", "z".repeat(64));
        assert!(Digest::from_hex(&bad).is_err());
    }

    #[test]
    fn ordering_is_byte_order() {
        let a = Digest::from_bytes([0u8; 32]);
        let mut high = [0u8; 32];
        high[0] = 1;
        let b = Digest::from_bytes(high);
        assert!(a < b);
    }

    #[test]
    fn serde_roundtrip() {
        let digest = Digest::from_bytes([9u8; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }
}
