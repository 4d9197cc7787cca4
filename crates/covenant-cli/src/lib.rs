//! # covenant-cli — CLI Tool for the Attestation Pipeline
//!
//! Local, offline operations that don't require a running server:
//!
//! - `covenant keygen` — secp256k1 signing key / AES-256 encryption key
//!   generation.
//! - `covenant digest` — recompute the canonical bytes and Keccak-256 digest
//!   for a literal attestation payload, to cross-check a `/verify` response
//!   without trusting the server's own arithmetic.
//! - `covenant validate-rule` — validate a proposed condition list against
//!   the same rules the coordinator applies at registration time.

pub mod digest;
pub mod keygen;
pub mod validate_rule;
