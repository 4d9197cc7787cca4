//! # Validate-Rule Subcommand
//!
//! Runs a proposed condition list through the same registration-time checks
//! `covenant-api` applies before a rule is ever stored, so a rule author can
//! catch a rejected condition list before round-tripping to a server.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use covenant_rules::validate_conditions;

/// Arguments for the `covenant validate-rule` subcommand.
#[derive(Args, Debug)]
pub struct ValidateRuleArgs {
    /// Path to a JSON file holding a `conditions` array. Reads stdin when
    /// omitted.
    #[arg(value_name = "PATH")]
    pub input: Option<PathBuf>,
}

/// Execute the validate-rule subcommand.
///
/// Returns exit code 0 when every condition is well-formed, 1 on the first
/// violation — matching [`validate_conditions`]'s own first-failure-wins
/// contract.
pub fn run_validate_rule(args: &ValidateRuleArgs) -> Result<u8> {
    let raw = read_input(args.input.as_deref())?;
    let raw_conditions: Vec<Value> =
        serde_json::from_str(&raw).context("input is not a JSON array of conditions")?;

    match validate_conditions(&raw_conditions) {
        Ok(conditions) => {
            println!("OK: {} condition(s) valid", conditions.len());
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
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
