//! # Registration-Time Validation
//!
//! Validates a proposed condition list before it is allowed to become part
//! of a rule. Returns the first violation found, in input order — never a
//! list of every violation.

use serde_json::Value;

use crate::condition::{Condition, Operator, MAX_CONDITIONS};
use crate::error::RuleValidationError;

/// Validate a proposed condition list, returning the parsed [`Condition`]s
/// on success or the first violation encountered.
///
/// Accepts `value`'s type freely for `=`, `!=`, and `CONTAINS` — those are
/// checked at evaluation time instead, per the runtime semantics.
pub fn validate_conditions(raw: &[Value]) -> Result<Vec<Condition>, RuleValidationError> {
    if raw.is_empty() {
        return Err(RuleValidationError::EmptyConditionList);
    }
    if raw.len() > MAX_CONDITIONS {
        return Err(RuleValidationError::TooManyConditions {
            count: raw.len(),
            max: MAX_CONDITIONS,
        });
    }

    raw.iter()
        .enumerate()
        .map(|(index, entry)| validate_one(index, entry))
        .collect()
}

fn validate_one(index: usize, entry: &Value) -> Result<Condition, RuleValidationError> {
    let field = entry
        .get("field")
        .ok_or(RuleValidationError::MissingField { index })?;
    let field = field
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or(RuleValidationError::InvalidField { index })?;

    let operator_token = entry
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| RuleValidationError::UnknownOperator {
            index,
            operator: entry
                .get("operator")
                .map(|v| v.to_string())
                .unwrap_or_default(),
        })?;
    let operator =
        Operator::parse(operator_token).ok_or_else(|| RuleValidationError::UnknownOperator {
            index,
            operator: operator_token.to_string(),
        })?;

    let value = entry
        .get("value")
        .cloned()
        .ok_or(RuleValidationError::MissingValue { index })?;

    if operator.is_list_membership() && !value.is_array() {
        return Err(RuleValidationError::ValueNotList {
            index,
            operator: operator.as_str(),
        });
    }
    if operator.is_numeric_comparison() && !value.is_number() {
        return Err(RuleValidationError::ValueNotNumeric {
            index,
            operator: operator.as_str(),
        });
    }

    Ok(Condition::new(field, operator, value))
}
