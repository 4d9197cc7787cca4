//! # Attestation Coordinator
//!
//! The single-point contract of the system (§4.5): every attestation flows
//! through [`issue_attestation`]. One transaction, five preconditions
//! checked in order, then an atomic write. Any failure aborts the
//! transaction — the sequence counter is not consumed and nothing persists.

use serde::Serialize;
use serde_json::Value;

use covenant_core::{AttestationId, CanonicalBytes, CoreError, Digest, RuleId, Timestamp};
use covenant_rules::{evaluate, validate_conditions, Evaluation};

use crate::auth::AgentIdentity;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// The canonical payload signed for every attestation (§6). Field order in
/// the struct is irrelevant — [`CanonicalBytes`] sorts keys itself — but the
/// key set and types must never change without bumping `v`.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    v: u32,
    agent: String,
    rule: String,
    conditions: &'a [covenant_rules::Condition],
    action: &'a Value,
    eval: &'a [covenant_rules::ConditionResult],
    met: bool,
    nonce: i64,
    ts: i64,
}

/// Everything a successful issuance hands back to the HTTP boundary (§4.5
/// output contract). Deliberately omits the encrypted signature — only the
/// verify endpoint's public view and the issuer itself ever see that.
pub struct IssuedAttestation {
    /// Fresh identifier for this attestation.
    pub id: AttestationId,
    /// Public digest.
    pub digest: Digest,
    /// Whether every condition passed.
    pub met: bool,
    /// Per-condition results.
    pub evaluation: Evaluation,
    /// Unit cost charged.
    pub unit_cost: f64,
    /// Issue timestamp.
    pub created_at: Timestamp,
}

/// Issue one attestation for an authenticated agent.
pub async fn issue_attestation(
    state: &AppState,
    caller: AgentIdentity,
    rule_id: RuleId,
    action_data: Value,
) -> Result<IssuedAttestation, AppError> {
    let (signing_key, encryption_key) = match (&state.signing_key, &state.encryption_key) {
        (Some(sk), Some(ek)) => (sk, ek),
        _ => {
            return Err(AppError::Core(CoreError::Internal(
                "signing or encryption key not loaded; issuance disabled".to_string(),
            )))
        }
    };

    let mut tx = state.db.begin().await.map_err(AppError::from)?;

    // Precondition 1: quota headroom, checked under a row lock held for the
    // rest of the transaction.
    let has_quota = db::principals::lock_and_check_quota(&mut tx, caller.principal_id)
        .await
        .map_err(AppError::from)?;
    if !has_quota {
        return Err(AppError::Core(CoreError::Quota(format!(
            "principal {} is at its monthly issuance limit",
            caller.principal_id
        ))));
    }

    // Precondition 2: rule exists.
    let rule = db::rules::fetch_by_id(&mut *tx, rule_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Core(CoreError::NotFound(format!("rule {rule_id} not found"))))?;

    // Precondition 3: ownership.
    if rule.agent_id != caller.agent_id {
        return Err(AppError::Core(CoreError::Ownership(format!(
            "rule {} is owned by a different agent",
            rule.id
        ))));
    }

    // Precondition 4: rule state.
    if rule.state != db::rules::RuleState::Active {
        return Err(AppError::Core(CoreError::State(format!(
            "rule {} is archived",
            rule.id
        ))));
    }

    // Precondition 5: conditions still validate (defends against corrupt rows).
    let raw_conditions: Vec<Value> = rule
        .conditions
        .iter()
        .map(|c| serde_json::to_value(c).map_err(|e| CoreError::Internal(e.to_string())))
        .collect::<Result<_, _>>()?;
    validate_conditions(&raw_conditions).map_err(|e| {
        CoreError::Internal(format!("rule {} failed re-validation: {e}", rule.id))
    })?;

    // Atomic section.
    let sequence_number = db::agents::increment_sequence(&mut *tx, caller.agent_id)
        .await
        .map_err(AppError::from)?;

    let evaluation = evaluate(&rule.conditions, &action_data);
    let now = Timestamp::now();

    let payload = CanonicalPayload {
        v: 1,
        agent: caller.agent_id.to_string(),
        rule: rule.id.to_string(),
        conditions: &rule.conditions,
        action: &action_data,
        eval: &evaluation.results,
        met: evaluation.met,
        nonce: sequence_number,
        ts: now.as_unix_seconds(),
    };
    let canonical = CanonicalBytes::new(&payload).map_err(CoreError::from)?;
    let digest = covenant_crypto::keccak256(&canonical);

    let signature = signing_key.sign(&digest).map_err(AppError::from)?;
    let encrypted_signature =
        covenant_crypto::encrypt(encryption_key, signature.as_bytes()).map_err(AppError::from)?;

    let attestation_id = AttestationId::new();
    let new_attestation = db::attestations::NewAttestation {
        id: attestation_id,
        agent_id: caller.agent_id,
        rule_id: rule.id,
        sequence_number,
        action_snapshot: &action_data,
        evaluation: &evaluation,
        digest,
        encrypted_signature: &encrypted_signature,
        unit_cost: state.config.unit_cost,
    };
    db::attestations::insert(&mut *tx, &new_attestation)
        .await
        .map_err(AppError::from)?;

    db::principals::increment(&mut *tx, caller.principal_id)
        .await
        .map_err(AppError::from)?;

    tx.commit().await.map_err(AppError::from)?;

    Ok(IssuedAttestation {
        id: attestation_id,
        digest,
        met: evaluation.met,
        evaluation,
        unit_cost: state.config.unit_cost,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_rules::{Condition, Operator};
    use serde_json::json;

    #[test]
    fn canonical_payload_keys_are_sorted_and_stable() {
        let conditions = vec![Condition::new("amount", Operator::Le, json!(100))];
        let action = json!({"amount": 50});
        let evaluation = evaluate(&conditions, &action);
        let payload = CanonicalPayload {
            v: 1,
            agent: "agent-1".to_string(),
            rule: "rule-1".to_string(),
            conditions: &conditions,
            action: &action,
            eval: &evaluation.results,
            met: evaluation.met,
            nonce: 1,
            ts: 0,
        };
        let canonical = CanonicalBytes::new(&payload).unwrap();
        let text = std::str::from_utf8(canonical.as_bytes()).unwrap();
        let action_pos = text.find("\"action\"").unwrap();
        let agent_pos = text.find("\"agent\"").unwrap();
        assert!(agent_pos < action_pos, "keys must sort ascending by code point");
    }

    #[test]
    fn same_inputs_produce_identical_canonical_bytes() {
        let conditions = vec![Condition::new("x", Operator::Eq, json!(1))];
        let action = json!({"x": 1});
        let evaluation = evaluate(&conditions, &action);
        let make = || {
            CanonicalBytes::new(&CanonicalPayload {
                v: 1,
                agent: "a".to_string(),
                rule: "r".to_string(),
                conditions: &conditions,
                action: &action,
                eval: &evaluation.results,
                met: evaluation.met,
                nonce: 7,
                ts: 1_700_000_000,
            })
            .unwrap()
        };
        assert_eq!(make().as_bytes(), make().as_bytes());
    }
}
