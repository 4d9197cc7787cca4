#![deny(missing_docs)]
//! # covenant-rules — Flat-Conjunction Rule Engine
//!
//! A rule is an immutable, ordered list of conditions: no nesting, no
//! disjunction. A rule is met iff every condition holds.
//!
//! This crate has two entry points:
//!
//! - [`validate_conditions`] — registration-time validation. Accepts a
//!   proposed condition list and returns either the parsed conditions or the
//!   first violation found, in input order.
//! - [`evaluate`] — runtime evaluation. Accepts an already-validated
//!   condition list and an action record, and returns a per-condition
//!   breakdown plus an aggregate verdict. Evaluation never raises; a missing
//!   or null field simply fails its condition.

pub mod condition;
pub mod error;
pub mod evaluate;
pub mod validate;

pub use condition::{Condition, Operator, MAX_CONDITIONS};
pub use error::{RuleEvaluationError, RuleValidationError};
pub use evaluate::{evaluate, ConditionResult, Evaluation};
pub use validate::validate_conditions;
