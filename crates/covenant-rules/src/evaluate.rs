//! # Runtime Evaluation
//!
//! Evaluates a validated condition list against an action record. Evaluation
//! never raises — every condition produces a `pass`/`fail` result, including
//! conditions whose field is absent from the record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::{Condition, Operator};

/// The outcome of one condition against one action record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// The field that was checked.
    pub field: String,
    /// The operator that was applied.
    pub operator: Operator,
    /// The expected operand from the condition.
    pub expected: Value,
    /// The actual value found in the action record, or `null` if absent.
    pub actual: Value,
    /// Whether the condition held.
    pub pass: bool,
}

/// The aggregate outcome of evaluating a rule's full condition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Per-condition results, in rule order.
    pub results: Vec<ConditionResult>,
    /// Whether every condition passed. `false` for an empty condition list.
    pub met: bool,
    /// A human-readable summary, e.g. `"All 2 conditions passed"`.
    pub summary: String,
}

/// Evaluate a condition list against an action record.
///
/// An empty condition list always yields `met = false` — this guards
/// against a corrupt rule reaching evaluation; registration rejects empty
/// lists so this path should be unreachable in practice.
pub fn evaluate(conditions: &[Condition], action: &Value) -> Evaluation {
    if conditions.is_empty() {
        return Evaluation {
            results: Vec::new(),
            met: false,
            summary: "0 of 0 condition(s) failed".to_string(),
        };
    }

    let results: Vec<ConditionResult> = conditions
        .iter()
        .map(|condition| evaluate_one(condition, action))
        .collect();

    let total = results.len();
    let failed = results.iter().filter(|r| !r.pass).count();
    let met = failed == 0;
    let summary = if met {
        format!("All {total} condition(s) passed")
    } else {
        format!("{failed} of {total} condition(s) failed")
    };

    Evaluation { results, met, summary }
}

fn evaluate_one(condition: &Condition, action: &Value) -> ConditionResult {
    let actual = action
        .get(&condition.field)
        .cloned()
        .unwrap_or(Value::Null);

    let pass = if actual.is_null() {
        false
    } else {
        match condition.operator {
            Operator::Eq => actual == condition.value,
            Operator::Ne => actual != condition.value,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                compare_numeric(condition.operator, &actual, &condition.value)
            }
            Operator::In => condition
                .value
                .as_array()
                .is_some_and(|list| list.contains(&actual)),
            Operator::NotIn => condition
                .value
                .as_array()
                .is_some_and(|list| !list.contains(&actual)),
            Operator::Contains => string_contains(&actual, &condition.value, true),
            Operator::NotContains => string_contains(&actual, &condition.value, false),
        }
    };

    ConditionResult {
        field: condition.field.clone(),
        operator: condition.operator,
        expected: condition.value.clone(),
        actual,
        pass,
    }
}

fn compare_numeric(operator: Operator, actual: &Value, expected: &Value) -> bool {
    let (Some(actual), Some(expected)) = (as_f64(actual), as_f64(expected)) else {
        return false;
    };
    match operator {
        Operator::Lt => actual < expected,
        Operator::Le => actual <= expected,
        Operator::Gt => actual > expected,
        Operator::Ge => actual >= expected,
        _ => unreachable!("compare_numeric called with non-comparison operator"),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn string_contains(actual: &Value, expected: &Value, want_contains: bool) -> bool {
    let Some(actual) = actual.as_str() else {
        return false;
    };
    let needle = match expected {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    actual.contains(&needle) == want_contains
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(field: &str, op: Operator, value: Value) -> Condition {
        Condition::new(field, op, value)
    }

    #[test]
    fn happy_path_two_passes() {
        let conditions = vec![
            cond("slippage_pct", Operator::Le, json!(0.5)),
            cond("pool_tvl", Operator::Gt, json!(50000)),
        ];
        let action = json!({"slippage_pct": 0.38, "pool_tvl": 2100000});
        let eval = evaluate(&conditions, &action);
        assert!(eval.met);
        assert_eq!(eval.summary, "All 2 condition(s) passed");
        assert!(eval.results.iter().all(|r| r.pass));
    }

    #[test]
    fn one_condition_fails() {
        let conditions = vec![
            cond("slippage_pct", Operator::Le, json!(0.5)),
            cond("pool_tvl", Operator::Gt, json!(50000)),
        ];
        let action = json!({"slippage_pct": 0.8, "pool_tvl": 2100000});
        let eval = evaluate(&conditions, &action);
        assert!(!eval.met);
        assert_eq!(eval.summary, "1 of 2 condition(s) failed");
        assert!(!eval.results[0].pass);
        assert_eq!(eval.results[0].actual, json!(0.8));
        assert!(eval.results[1].pass);
    }

    #[test]
    fn missing_field_fails_with_null_actual() {
        let conditions = vec![cond("amount", Operator::Le, json!(10000))];
        let action = json!({});
        let eval = evaluate(&conditions, &action);
        assert!(!eval.met);
        assert_eq!(eval.results[0].actual, Value::Null);
        assert!(!eval.results[0].pass);
    }

    #[test]
    fn explicit_null_field_fails_same_as_absent() {
        let conditions = vec![cond("amount", Operator::Eq, json!(5))];
        let action = json!({"amount": null});
        let eval = evaluate(&conditions, &action);
        assert!(!eval.results[0].pass);
        assert_eq!(eval.results[0].actual, Value::Null);
    }

    #[test]
    fn empty_conditions_never_met() {
        let eval = evaluate(&[], &json!({}));
        assert!(!eval.met);
        assert!(eval.results.is_empty());
    }

    #[test]
    fn strict_equality_rejects_type_mismatch() {
        let conditions = vec![cond("amount", Operator::Eq, json!(1))];
        let action = json!({"amount": "1"});
        let eval = evaluate(&conditions, &action);
        assert!(!eval.results[0].pass);
    }

    #[test]
    fn not_equal_passes_on_type_mismatch() {
        let conditions = vec![cond("amount", Operator::Ne, json!(1))];
        let action = json!({"amount": "1"});
        let eval = evaluate(&conditions, &action);
        assert!(eval.results[0].pass);
    }

    #[test]
    fn in_operator_checks_membership() {
        let conditions = vec![cond("tier", Operator::In, json!(["gold", "platinum"]))];
        assert!(evaluate(&conditions, &json!({"tier": "gold"})).met);
        assert!(!evaluate(&conditions, &json!({"tier": "bronze"})).met);
    }

    #[test]
    fn not_in_operator_checks_non_membership() {
        let conditions = vec![cond("tier", Operator::NotIn, json!(["bronze"]))];
        assert!(evaluate(&conditions, &json!({"tier": "gold"})).met);
        assert!(!evaluate(&conditions, &json!({"tier": "bronze"})).met);
    }

    #[test]
    fn contains_checks_substring() {
        let conditions = vec![cond("notes", Operator::Contains, json!("urgent"))];
        assert!(evaluate(&conditions, &json!({"notes": "this is urgent work"})).met);
        assert!(!evaluate(&conditions, &json!({"notes": "routine"})).met);
    }

    #[test]
    fn not_contains_checks_substring_absence() {
        let conditions = vec![cond("notes", Operator::NotContains, json!("urgent"))];
        assert!(evaluate(&conditions, &json!({"notes": "routine"})).met);
        assert!(!evaluate(&conditions, &json!({"notes": "this is urgent work"})).met);
    }

    #[test]
    fn contains_fails_on_non_string_actual() {
        let conditions = vec![cond("notes", Operator::Contains, json!("5"))];
        assert!(!evaluate(&conditions, &json!({"notes": 5})).met);
    }

    #[test]
    fn numeric_comparison_coerces_numeric_string_actual() {
        let conditions = vec![cond("amount", Operator::Gt, json!(10))];
        let eval = evaluate(&conditions, &json!({"amount": "15"}));
        assert!(eval.results[0].pass);
    }

    #[test]
    fn numeric_comparison_fails_on_non_numeric_actual() {
        let conditions = vec![cond("amount", Operator::Gt, json!(10))];
        let eval = evaluate(&conditions, &json!({"amount": "not a number"}));
        assert!(!eval.results[0].pass);
    }

    #[test]
    fn boundary_equal_values_for_le_and_ge() {
        let le = vec![cond("x", Operator::Le, json!(10))];
        assert!(evaluate(&le, &json!({"x": 10})).met);
        let ge = vec![cond("x", Operator::Ge, json!(10))];
        assert!(evaluate(&ge, &json!({"x": 10})).met);
    }

    #[test]
    fn summary_counts_multiple_failures() {
        let conditions = vec![
            cond("a", Operator::Eq, json!(1)),
            cond("b", Operator::Eq, json!(2)),
            cond("c", Operator::Eq, json!(3)),
        ];
        let action = json!({"a": 1, "b": 99, "c": 99});
        let eval = evaluate(&conditions, &action);
        assert_eq!(eval.summary, "2 of 3 condition(s) failed");
    }
}
