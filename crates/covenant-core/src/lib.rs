#![deny(missing_docs)]

//! # covenant-core — Foundational Types for the Attestation Pipeline
//!
//! This crate defines the foundational types that every other crate in the
//! workspace depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//! In particular it has no cryptography dependency: hashing and signing live
//! in `covenant-crypto`, which depends on the [`digest::Digest`] type defined
//! here.
//!
//! ## Design principles
//!
//! 1. **Newtype wrappers for every identifier.** You cannot pass a
//!    [`ids::RuleId`] where an [`ids::AgentId`] is expected.
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** Every
//!    signed payload in the system flows through `CanonicalBytes::new()` or
//!    `CanonicalBytes::from_value()`, which sorts object keys at every depth
//!    and fixes floating-point formatting.
//! 3. **[`CoreError`] hierarchy.** Structured errors with `thiserror`, mapped
//!    one-to-one onto the error taxonomy at the HTTP boundary — no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod ids;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::Digest;
pub use error::{CanonicalizationError, CoreError};
pub use ids::{AgentId, AttestationId, BatchId, PrincipalId, RuleId};
pub use temporal::Timestamp;
