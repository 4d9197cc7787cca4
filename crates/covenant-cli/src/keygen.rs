//! # Keygen Subcommand
//!
//! Generates the two pieces of key material a deployment needs: the
//! secp256k1 signing scalar and the AES-256 envelope key. Both print as hex,
//! matching the `SIGNING_KEY`/`ENCRYPTION_KEY` environment variables
//! `covenant-api` reads at startup.

use anyhow::Result;
use clap::{Args, ValueEnum};

use covenant_crypto::{EncryptionKey, SigningKey};

/// Which kind of key to generate.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyKind {
    /// secp256k1 signing scalar.
    Signing,
    /// AES-256-GCM envelope key.
    Encryption,
}

/// Arguments for the `covenant keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Which key to generate.
    #[arg(value_enum)]
    pub kind: KeyKind,
}

/// Execute the keygen subcommand. Always prints to stdout — the caller is
/// expected to redirect into a secrets store, never a shell history file.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    match args.kind {
        KeyKind::Signing => {
            let key = SigningKey::generate();
            println!("{}", key.to_hex());
        }
        KeyKind::Encryption => {
            let key = EncryptionKey::generate();
            println!("{}", key.to_hex());
        }
    }
    Ok(0)
}
