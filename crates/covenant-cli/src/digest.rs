//! # Digest Subcommand
//!
//! Recomputes an attestation's canonical bytes and Keccak-256 digest from a
//! literal payload, offline. Lets a holder of a `/verify` response check the
//! server's arithmetic independently instead of trusting `proof_hash` as
//! given — the payload shape here must track `covenant-api::coordinator`'s
//! `CanonicalPayload` exactly, since the digest is only reproducible if both
//! sides canonicalize the identical field set.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use covenant_core::CanonicalBytes;
use covenant_rules::{Condition, ConditionResult};

/// The canonical payload shape, mirrored from the coordinator. `v` pins the
/// schema — a file recorded under a different payload version will not
/// reproduce that version's digest, by design.
#[derive(Debug, Serialize, Deserialize)]
struct RecomputeInput {
    v: u32,
    agent: String,
    rule: String,
    conditions: Vec<Condition>,
    action: Value,
    eval: Vec<ConditionResult>,
    met: bool,
    nonce: i64,
    ts: i64,
}

/// Arguments for the `covenant digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Path to a JSON file holding the canonical payload fields. Reads
    /// stdin when omitted.
    #[arg(value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// A digest to compare the recomputed one against. Exits nonzero on
    /// mismatch instead of just printing.
    #[arg(long)]
    pub expect: Option<String>,
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let raw = read_input(args.input.as_deref())?;
    let input: RecomputeInput =
        serde_json::from_str(&raw).context("payload is not valid JSON for the canonical schema")?;

    let canonical = CanonicalBytes::new(&input).context("payload contains a non-finite float")?;
    let digest = covenant_crypto::keccak256(&canonical);

    println!("{}", digest.to_hex());

    if let Some(expected) = &args.expect {
        let expected_digest =
            covenant_core::Digest::from_hex(expected).context("--expect is not a valid digest")?;
        if expected_digest != digest {
            eprintln!("mismatch: expected {expected}, computed {}", digest.to_hex());
            return Ok(1);
        }
    }

    Ok(0)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_rules::Operator;
    use serde_json::json;

    #[test]
    fn recompute_is_deterministic() {
        let conditions = vec![Condition::new("amount", Operator::Le, json!(100))];
        let action = json!({"amount": 50});
        let evaluation = covenant_rules::evaluate(&conditions, &action);

        let input = RecomputeInput {
            v: 1,
            agent: "agent-1".to_string(),
            rule: "rule-1".to_string(),
            conditions,
            action,
            eval: evaluation.results,
            met: evaluation.met,
            nonce: 7,
            ts: 1_700_000_000,
        };

        let first = CanonicalBytes::new(&input).unwrap();
        let second = CanonicalBytes::new(&input).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
