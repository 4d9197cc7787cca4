//! # covenant-crypto — Cryptographic Primitives for the Attestation Pipeline
//!
//! This crate provides the cryptographic building blocks used throughout
//! the workspace:
//!
//! - **Keccak-256** digest computation from
//!   [`CanonicalBytes`](covenant_core::CanonicalBytes), the pre-NIST variant
//!   used for attestation identifiers and Merkle interior nodes.
//! - **secp256k1** recoverable ECDSA signing, producing the 65-byte compact
//!   `r‖s‖v` form with RFC 6979 deterministic nonces and low-S canonical
//!   signatures.
//! - **AES-256-GCM** envelope encryption for signatures at rest.
//!
//! Every signing and hashing entry point accepts a typed value —
//! [`Digest`](covenant_core::Digest) or
//! [`CanonicalBytes`](covenant_core::CanonicalBytes) — never a raw byte
//! slice, so a caller cannot accidentally sign or hash data that bypassed
//! canonicalization.

pub mod envelope;
pub mod error;
pub mod keccak;
pub mod secp256k1;

pub use envelope::{decrypt, encrypt, EncryptionKey};
pub use error::CryptoError;
pub use keccak::{keccak256, keccak256_raw};
pub use secp256k1::{recover, CompactSignature, SigningKey};
