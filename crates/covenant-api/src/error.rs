//! # API Error Types
//!
//! Maps the taxonomy carried by [`covenant_core::CoreError`] (plus the
//! HTTP-boundary-only *rate limited* case) onto HTTP responses shaped
//! `{error, code, status}`. Internal errors never leak their detail to the
//! response body — only a correlation id and a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use covenant_core::CoreError;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// A taxonomy error from the core domain layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The caller exhausted their request budget before any database work ran.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Agent credential missing, malformed, or wrong. Authentication is glue
    /// around the core contract — the taxonomy it carries has no category for
    /// this because it never reaches the coordinator.
    #[error("unauthorized")]
    Unauthorized,

    /// secp256k1/AES failures surfaced from `covenant-crypto`.
    #[error("cryptographic error: {0}")]
    Crypto(#[from] covenant_crypto::CryptoError),

    /// Rule registration failed validation.
    #[error(transparent)]
    RuleValidation(#[from] covenant_rules::RuleValidationError),

    /// Merkle batch construction failed.
    #[error(transparent)]
    Merkle(#[from] covenant_merkle::MerkleError),

    /// Database access failed.
    #[error("storage error")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    status: u16,
}

impl AppError {
    /// The stable taxonomy code returned to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Crypto(_) => "integrity",
            Self::RuleValidation(_) => "validation",
            Self::Merkle(_) => "internal",
            Self::Storage(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self.code() {
            "validation" => StatusCode::BAD_REQUEST,
            "ownership" => StatusCode::FORBIDDEN,
            "state" => StatusCode::CONFLICT,
            "quota" => StatusCode::TOO_MANY_REQUESTS,
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "integrity" => StatusCode::INTERNAL_SERVER_ERROR,
            "external" => StatusCode::BAD_GATEWAY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message surfaced to the caller. Internal-category errors are
    /// replaced with a generic message and logged with a correlation id
    /// instead — never leaking keys, SQL text, or stack traces.
    fn public_message(&self) -> String {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let correlation_id = uuid::Uuid::new_v4();
            tracing::error!(correlation_id = %correlation_id, error = %self, "internal error");
            format!("internal error, reference {correlation_id}")
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = ErrorBody {
            error: self.public_message(),
            code,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_validation_maps_to_bad_request() {
        let err = AppError::Core(CoreError::Validation("bad field".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn core_ownership_maps_to_forbidden() {
        let err = AppError::Core(CoreError::Ownership("wrong agent".into()));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn core_quota_maps_to_too_many_requests() {
        let err = AppError::Core(CoreError::Quota("monthly limit reached".into()));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn core_not_found_maps_to_404() {
        let err = AppError::Core(CoreError::NotFound("rule".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn core_internal_message_is_generic_not_raw() {
        let err = AppError::Core(CoreError::Internal("leaked SQL: DROP TABLE".into()));
        let message = err.public_message();
        assert!(!message.contains("DROP TABLE"));
        assert!(message.starts_with("internal error"));
    }

    #[test]
    fn rate_limited_maps_to_429() {
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::RateLimited.code(), "rate_limited");
    }

    #[test]
    fn external_maps_to_bad_gateway() {
        let err = AppError::Core(CoreError::External("ledger unreachable".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized.code(), "unauthorized");
    }

    #[test]
    fn rule_validation_is_surfaced_as_validation() {
        let err: AppError = covenant_rules::RuleValidationError::EmptyConditionList.into();
        assert_eq!(err.code(), "validation");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
