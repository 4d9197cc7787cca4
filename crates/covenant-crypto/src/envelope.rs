//! # Envelope Cipher
//!
//! AES-256-GCM at-rest encryption for signatures. Each call uses a fresh
//! random 96-bit nonce; the full ciphertext is authenticated with no
//! additional data. Stored form: `hex(iv):hex(tag):hex(ciphertext)`.
//!
//! ## Security invariant
//!
//! [`EncryptionKey`] never implements `Serialize` or `Debug` in a way that
//! prints key bytes, and is zeroized on drop.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::secp256k1::{bytes_to_hex, hex_to_bytes};

const TAG_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// A 256-bit AES-GCM key, loaded once at process start.
pub struct EncryptionKey {
    inner: Key<Aes256Gcm>,
}

impl EncryptionKey {
    /// Construct from 32 raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            inner: *Key::<Aes256Gcm>::from_slice(&bytes),
        }
    }

    /// Generate a fresh key from the OS CSPRNG. Used by `covenant-cli`'s
    /// `keygen` subcommand — never called by the server itself, which only
    /// loads keys configured ahead of time.
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        let bytes: [u8; 32] = key.as_slice().try_into().expect("AES-256 key is 32 bytes");
        Self::from_bytes(bytes)
    }

    /// Parse from a hex-encoded 32-byte key.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(s)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidEncryptionKey(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// Render as a hex-encoded 32-byte key, for printing at keygen time.
    /// Never called on a key loaded from the environment — only on one this
    /// process just generated.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(self.inner.as_slice())
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(&self.inner)
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey").field("bytes", &"<redacted>").finish()
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.inner.as_mut_slice().zeroize();
    }
}

/// Encrypt `plaintext` under `key`, returning `hex(iv):hex(tag):hex(ciphertext)`.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let combined = key
        .cipher()
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Integrity(format!("encryption failed: {e}")))?;

    if combined.len() < TAG_LEN {
        return Err(CryptoError::Integrity("ciphertext shorter than tag".into()));
    }
    let (body, tag) = combined.split_at(combined.len() - TAG_LEN);

    Ok(format!(
        "{}:{}:{}",
        bytes_to_hex(&nonce),
        bytes_to_hex(tag),
        bytes_to_hex(body),
    ))
}

/// Decrypt a `hex(iv):hex(tag):hex(ciphertext)` stored form, returning the
/// original plaintext.
///
/// Malformed framing, a wrong-length tag, or tag verification failure all
/// return [`CryptoError::Integrity`] — the single taxonomy code for every
/// failure mode of this function.
pub fn decrypt(key: &EncryptionKey, stored: &str) -> Result<Vec<u8>, CryptoError> {
    let parts: Vec<&str> = stored.split(':').collect();
    let [iv_hex, tag_hex, body_hex] = parts[..] else {
        return Err(CryptoError::Integrity(format!(
            "expected 3 colon-separated fields, got {}",
            parts.len()
        )));
    };

    let iv = hex_to_bytes(iv_hex).map_err(|e| CryptoError::Integrity(e.to_string()))?;
    let tag = hex_to_bytes(tag_hex).map_err(|e| CryptoError::Integrity(e.to_string()))?;
    let body = hex_to_bytes(body_hex).map_err(|e| CryptoError::Integrity(e.to_string()))?;

    if iv.len() != NONCE_LEN {
        return Err(CryptoError::Integrity(format!(
            "expected {NONCE_LEN}-byte nonce, got {}",
            iv.len()
        )));
    }
    if tag.len() != TAG_LEN {
        return Err(CryptoError::Integrity(format!(
            "expected {TAG_LEN}-byte tag, got {}",
            tag.len()
        )));
    }

    let nonce = Nonce::from_slice(&iv);
    let mut combined = body;
    combined.extend_from_slice(&tag);

    key.cipher()
        .decrypt(nonce, combined.as_ref())
        .map_err(|_| CryptoError::Integrity("authentication tag verification failed".into()))
}
