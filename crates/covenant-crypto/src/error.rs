//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `covenant-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations in the attestation pipeline.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The signing key material is not a valid scalar on the secp256k1 curve.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The encryption key is not 32 bytes.
    #[error("invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    /// secp256k1 signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// secp256k1 signature verification or recovery failed.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// Envelope ciphertext is malformed, has a wrong-length tag, or fails
    /// authentication. This always maps to the `integrity` taxonomy code.
    #[error("integrity violation: {0}")]
    Integrity(String),
}
