//! # Error Hierarchy
//!
//! Structured error types for the attestation pipeline, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`CoreError`] carries the taxonomy every collaborator crate maps its own
//! errors into: validation, ownership, state, quota, not-found, conflict,
//! integrity, external, internal. The HTTP boundary (`covenant-api`) maps
//! these one-to-one onto response codes; nothing above this type invents a
//! new category.

use thiserror::Error;

/// Top-level error type for the attestation pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed input: bad shape, bad type, out-of-range value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A rule or attestation is owned by a different agent than the caller.
    #[error("ownership mismatch: {0}")]
    Ownership(String),

    /// An entity exists but is in a state that forbids the requested operation
    /// (rule archived, agent suspended).
    #[error("state error: {0}")]
    State(String),

    /// The caller's quota is exhausted.
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent write lost a race: sequence-number or digest collision
    /// at commit time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Ciphertext tag mismatch, malformed envelope framing, or key material
    /// that fails a structural check.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// A required external collaborator (the ledger) is unreachable or
    /// rejected the call.
    #[error("external error: {0}")]
    External(String),

    /// Anything else, including a rule that fails re-validation at
    /// evaluation time ("rule corrupt").
    #[error("internal error: {0}")]
    Internal(String),

    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl CoreError {
    /// The stable machine-readable taxonomy code for this error.
    ///
    /// This is the string that crosses the HTTP boundary in the `code` field
    /// of an error body; it must never change for a given variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Ownership(_) => "ownership",
            Self::State(_) => "state",
            Self::Quota(_) => "quota",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Integrity(_) => "integrity",
            Self::External(_) => "external",
            Self::Internal(_) => "internal",
            Self::Canonicalization(_) => "internal",
        }
    }
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// A float value was NaN or infinite — it has no canonical decimal form.
    #[error("non-finite float cannot be canonicalized: {0}")]
    NonFiniteFloat(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable_per_variant() {
        assert_eq!(CoreError::Validation("x".into()).code(), "validation");
        assert_eq!(CoreError::Ownership("x".into()).code(), "ownership");
        assert_eq!(CoreError::State("x".into()).code(), "state");
        assert_eq!(CoreError::Quota("x".into()).code(), "quota");
        assert_eq!(CoreError::NotFound("x".into()).code(), "not_found");
        assert_eq!(CoreError::Conflict("x".into()).code(), "conflict");
        assert_eq!(CoreError::Integrity("x".into()).code(), "integrity");
        assert_eq!(CoreError::External("x".into()).code(), "external");
        assert_eq!(CoreError::Internal("x".into()).code(), "internal");
    }

    #[test]
    fn canonicalization_error_maps_to_internal() {
        let err = CoreError::from(CanonicalizationError::NonFiniteFloat(f64::NAN));
        assert_eq!(err.code(), "internal");
    }
}
