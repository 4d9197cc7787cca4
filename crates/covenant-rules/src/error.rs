//! # Rule Engine Errors

use thiserror::Error;

/// A single registration-time violation. First failure wins; callers get one
/// human-readable message, not a list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    /// The condition list has no entries.
    #[error("condition list is empty")]
    EmptyConditionList,

    /// The condition list exceeds the maximum length.
    #[error("condition list has {count} conditions, maximum is {max}")]
    TooManyConditions {
        /// Number of conditions submitted.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A condition at the given index has no `field`.
    #[error("condition {index}: missing field")]
    MissingField {
        /// Zero-based index into the submitted condition list.
        index: usize,
    },

    /// A condition's `field` is not a non-empty string.
    #[error("condition {index}: field must be a non-empty string")]
    InvalidField {
        /// Zero-based index into the submitted condition list.
        index: usize,
    },

    /// A condition uses an operator outside the supported set.
    #[error("condition {index}: unknown operator {operator:?}")]
    UnknownOperator {
        /// Zero-based index into the submitted condition list.
        index: usize,
        /// The raw operator token that failed to parse.
        operator: String,
    },

    /// A condition has no `value`.
    #[error("condition {index}: missing value")]
    MissingValue {
        /// Zero-based index into the submitted condition list.
        index: usize,
    },

    /// `IN` / `NOT IN` was given a non-list value.
    #[error("condition {index}: {operator} requires a list value")]
    ValueNotList {
        /// Zero-based index into the submitted condition list.
        index: usize,
        /// The operator that required a list.
        operator: &'static str,
    },

    /// A comparison operator (`<`, `<=`, `>`, `>=`) was given a non-numeric value.
    #[error("condition {index}: {operator} requires a numeric value")]
    ValueNotNumeric {
        /// Zero-based index into the submitted condition list.
        index: usize,
        /// The operator that required a number.
        operator: &'static str,
    },
}

/// Errors from rule evaluation. Evaluation never raises on malformed input —
/// a well-validated condition list always evaluates to completion — so this
/// exists only for conditions that somehow reach evaluation unvalidated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleEvaluationError {
    /// The rule failed registration-time validation and cannot be evaluated.
    #[error("rule is corrupt: {0}")]
    Corrupt(#[from] RuleValidationError),
}
