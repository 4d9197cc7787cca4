//! # secp256k1 Recoverable Signing
//!
//! ECDSA over secp256k1 with RFC 6979 deterministic nonces and low-S
//! canonical signatures, exported in the 65-byte compact `r‖s‖v` form used
//! by ledger-side signer-recovery operations.
//!
//! ## Security invariant
//!
//! [`SigningKey::sign`] takes a [`covenant_core::Digest`], never a raw
//! `&[u8]`. The digest is signed directly with no additional hashing — it
//! is already the output of [`crate::keccak::keccak256`].

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey as K256VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use covenant_core::Digest;

use crate::error::CryptoError;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_to_bytes(s: &str) -> Result<Vec<u8>, CryptoError> {
    let s = s.strip_prefix("0x").unwrap_or(s).trim();
    if s.len() % 2 != 0 {
        return Err(CryptoError::HexDecode(format!(
            "hex string has odd length: {}",
            s.len()
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| CryptoError::HexDecode(format!("invalid hex at position {i}: {e}")))
        })
        .collect()
}

/// A 65-byte compact secp256k1 signature: `r (32) ‖ s (32) ‖ v (1)`, with
/// `v ∈ {27, 28}` and `s` in the lower half of the curve order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSignature([u8; 65]);

impl CompactSignature {
    /// Construct from a raw 65-byte value.
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Construct from a slice, validating length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 65] = bytes
            .try_into()
            .map_err(|_| CryptoError::VerificationFailed(format!(
                "expected 65-byte compact signature, got {} bytes",
                bytes.len()
            )))?;
        Ok(Self(arr))
    }

    /// Access the raw 65 bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The `r` component.
    pub fn r(&self) -> &[u8] {
        &self.0[0..32]
    }

    /// The `s` component.
    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    /// The recovery byte, `27` or `28`.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Render as `0x` + 130 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", bytes_to_hex(&self.0))
    }

    /// Parse from the `0x` + 130-hex-character compact form.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(s)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for CompactSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CompactSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 signing (private) key, loaded once at process start.
///
/// Intentionally does not implement `Serialize` — private key material must
/// never be casually serialized.
pub struct SigningKey {
    inner: k256::ecdsa::SigningKey,
}

impl SigningKey {
    /// Construct from a 32-byte scalar.
    ///
    /// Fails if the bytes are not a valid nonzero scalar less than the curve
    /// order — the caller (process startup) is expected to refuse to start
    /// the signing component on this error, per the degraded-mode contract.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let inner = k256::ecdsa::SigningKey::from_bytes(bytes.into())
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parse from a hex-encoded scalar, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(s)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidSigningKey(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Self::from_bytes(&arr)
    }

    /// Generate a fresh scalar from the OS CSPRNG. Used by `covenant-cli`'s
    /// `keygen` subcommand.
    pub fn generate() -> Self {
        let inner = k256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
        Self { inner }
    }

    /// Render as a hex-encoded 32-byte scalar, for printing at keygen time.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.inner.to_bytes())
    }

    /// Derive the corresponding public verifying key.
    pub fn verifying_key(&self) -> K256VerifyingKey {
        *self.inner.verifying_key()
    }

    /// Sign a 32-byte digest, producing the 65-byte compact `r‖s‖v` signature.
    ///
    /// Uses RFC 6979 deterministic nonces. `k256` normalizes `s` to the
    /// lower half of the curve order and adjusts the recovery id to match,
    /// so the output is always canonical.
    pub fn sign(&self, digest: &Digest) -> Result<CompactSignature, CryptoError> {
        let (sig, recovery_id): (K256Signature, RecoveryId) = self
            .inner
            .sign_prehash(digest.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; 65];
        bytes[0..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(CompactSignature(bytes))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("public", &bytes_to_hex(&self.verifying_key().to_sec1_bytes()))
            .finish()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        let mut scalar_bytes: [u8; 32] = self.inner.to_bytes().into();
        scalar_bytes.zeroize();
    }
}

/// Recover the signer's public key from a compact signature and the digest
/// it was computed over, and verify that recovery succeeds.
///
/// Provided for completeness and testing; the core contract (§4.6) never
/// exposes a way to recover a caller's key — verification against the
/// digest is a ledger-side or external-holder concern.
pub fn recover(digest: &Digest, signature: &CompactSignature) -> Result<K256VerifyingKey, CryptoError> {
    let sig = K256Signature::from_slice(&signature.0[0..64])
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))?;
    let v = signature.v();
    if v != 27 && v != 28 {
        return Err(CryptoError::VerificationFailed(format!(
            "recovery byte must be 27 or 28, got {v}"
        )));
    }
    let recovery_id = RecoveryId::from_byte(v - 27)
        .ok_or_else(|| CryptoError::VerificationFailed("invalid recovery id".to_string()))?;
    K256VerifyingKey::recover_from_prehash(digest.as_bytes(), &sig, recovery_id)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        SigningKey::from_bytes(&[0x11u8; 32]).unwrap()
    }

    #[test]
    fn sign_produces_65_bytes_with_v_27_or_28() {
        let key = test_key();
        let digest = Digest::from_bytes([7u8; 32]);
        let sig = key.sign(&digest).unwrap();
        assert_eq!(sig.as_bytes().len(), 65);
        assert!(sig.v() == 27 || sig.v() == 28);
    }

    #[test]
    fn signing_is_deterministic() {
        let key = test_key();
        let digest = Digest::from_bytes([9u8; 32]);
        let a = key.sign(&digest).unwrap();
        let b = key.sign(&digest).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hex_roundtrip() {
        let key = test_key();
        let digest = Digest::from_bytes([1u8; 32]);
        let sig = key.sign(&digest).unwrap();
        let hex = sig.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 132);
        let parsed = CompactSignature::from_hex(&hex).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn recovered_key_matches_signer() {
        let key = test_key();
        let digest = Digest::from_bytes([3u8; 32]);
        let sig = key.sign(&digest).unwrap();
        let recovered = recover(&digest, &sig).unwrap();
        assert_eq!(recovered, key.verifying_key());
    }

    #[test]
    fn recover_rejects_bad_v() {
        let key = test_key();
        let digest = Digest::from_bytes([3u8; 32]);
        let mut sig = key.sign(&digest).unwrap();
        sig.0[64] = 5;
        assert!(recover(&digest, &sig).is_err());
    }

    #[test]
    fn different_digests_produce_different_signatures() {
        let key = test_key();
        let a = key.sign(&Digest::from_bytes([1u8; 32])).unwrap();
        let b = key.sign(&Digest::from_bytes([2u8; 32])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn from_hex_rejects_short_key() {
        assert!(SigningKey::from_hex("abcd").is_err());
    }

    #[test]
    fn from_bytes_rejects_zero_scalar() {
        assert!(SigningKey::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn signature_from_slice_wrong_length() {
        assert!(CompactSignature::from_slice(&[0u8; 64]).is_err());
    }

    #[test]
    fn signature_serde_roundtrip() {
        let key = test_key();
        let sig = key.sign(&Digest::from_bytes([4u8; 32])).unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        let back: CompactSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }

    #[test]
    fn debug_does_not_leak_private_scalar() {
        let key = test_key();
        let debug_str = format!("{key:?}");
        assert!(!debug_str.contains("1111111111111111111111111111111111111111111111111111111111111111"));
    }
}
