//! # covenant CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Offline-only: no subcommand here opens a database connection or talks to
//! a running `covenant-api` instance.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covenant_cli::digest::{run_digest, DigestArgs};
use covenant_cli::keygen::{run_keygen, KeygenArgs};
use covenant_cli::validate_rule::{run_validate_rule, ValidateRuleArgs};

/// Attestation pipeline CLI.
///
/// Offline tooling for the attestation pipeline: key generation, canonical
/// digest recomputation, and rule validation.
#[derive(Parser, Debug)]
#[command(name = "covenant", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a secp256k1 signing key or an AES-256 encryption key.
    Keygen(KeygenArgs),

    /// Recompute the canonical digest for a literal attestation payload.
    Digest(DigestArgs),

    /// Validate a proposed condition list against registration-time rules.
    #[command(name = "validate-rule")]
    ValidateRule(ValidateRuleArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Digest(args) => run_digest(&args),
        Commands::ValidateRule(args) => run_validate_rule(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
