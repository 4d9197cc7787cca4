//! # Conditions
//!
//! A condition is a triple (`field`, `operator`, `value`). A rule is a flat
//! conjunction of conditions — no nesting, no disjunction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The maximum number of conditions a single rule may hold.
pub const MAX_CONDITIONS: usize = 20;

/// A comparison operator supported by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Strict equality.
    #[serde(rename = "=")]
    Eq,
    /// Strict inequality.
    #[serde(rename = "!=")]
    Ne,
    /// Less than, numeric.
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal, numeric.
    #[serde(rename = "<=")]
    Le,
    /// Greater than, numeric.
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal, numeric.
    #[serde(rename = ">=")]
    Ge,
    /// List membership.
    #[serde(rename = "IN")]
    In,
    /// List non-membership.
    #[serde(rename = "NOT IN")]
    NotIn,
    /// Substring containment.
    #[serde(rename = "CONTAINS")]
    Contains,
    /// Substring non-containment.
    #[serde(rename = "NOT CONTAINS")]
    NotContains,
}

impl Operator {
    /// Parse from the wire token, returning `None` for anything outside the
    /// supported set.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "IN" => Some(Self::In),
            "NOT IN" => Some(Self::NotIn),
            "CONTAINS" => Some(Self::Contains),
            "NOT CONTAINS" => Some(Self::NotContains),
            _ => None,
        }
    }

    /// The wire token for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT CONTAINS",
        }
    }

    /// Whether this operator requires a numeric comparison at evaluation time.
    pub fn is_numeric_comparison(&self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    /// Whether this operator requires a list value.
    pub fn is_list_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single condition: `field operator value`, checked against
/// `action_record[field]` at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// The key looked up in the action record.
    pub field: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The operand compared against `action_record[field]`.
    pub value: Value,
}

impl Condition {
    /// Construct a condition directly, bypassing registration-time validation.
    /// Callers that accept untrusted input should validate the containing
    /// list with [`crate::validate_conditions`] first.
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_through_as_str() {
        let all = [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
            Operator::In,
            Operator::NotIn,
            Operator::Contains,
            Operator::NotContains,
        ];
        for op in all {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
    }

    #[test]
    fn parse_rejects_unknown_token() {
        assert_eq!(Operator::parse("~="), None);
        assert_eq!(Operator::parse(""), None);
    }

    #[test]
    fn numeric_comparison_classification() {
        assert!(Operator::Lt.is_numeric_comparison());
        assert!(Operator::Ge.is_numeric_comparison());
        assert!(!Operator::Eq.is_numeric_comparison());
        assert!(!Operator::In.is_numeric_comparison());
    }

    #[test]
    fn list_membership_classification() {
        assert!(Operator::In.is_list_membership());
        assert!(Operator::NotIn.is_list_membership());
        assert!(!Operator::Contains.is_list_membership());
    }

    #[test]
    fn serde_uses_wire_tokens() {
        let json = serde_json::to_string(&Operator::NotIn).unwrap();
        assert_eq!(json, "\"NOT IN\"");
        let back: Operator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Operator::NotIn);
    }

    #[test]
    fn condition_serde_roundtrip() {
        let cond = Condition::new("slippage_pct", Operator::Le, serde_json::json!(0.5));
        let json = serde_json::to_string(&cond).unwrap();
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(cond, back);
    }
}
