//! Manage ENC(...) secret values (developer tooling).

use anyhow::Context;
use clap::Subcommand;
use rand::RngExt;
use secrecy::ExposeSecret;
use strata_config::{SecretHandle, SecretKeySource, encrypt_value};

#[derive(Subcommand)]
pub enum SecretCommand {
    /// Generate a new random master key (hex, for STRATA_SECRET_KEY)
    GenerateKey,

    /// Encrypt a plaintext into ENC(...) format
    Encrypt {
        /// Value to encrypt
        plaintext: String,
    },

    /// Decrypt an ENC(...) value back to plaintext
    Decrypt {
        /// An ENC(...) marker; anything else is echoed unchanged
        value: String,
    },
}

pub fn run(command: SecretCommand) -> anyhow::Result<()> {
    match command {
        SecretCommand::GenerateKey => {
            let mut key = [0u8; 32];
            rand::rng().fill(&mut key);
            println!("{}", hex::encode(key));
            eprintln!("Store this key securely (vault, secrets manager); it never expires.");
            Ok(())
        }
        SecretCommand::Encrypt { plaintext } => {
            let key = key_from_env()?;
            let marker = encrypt_value(&plaintext, &key)?;
            println!("{marker}");
            Ok(())
        }
        SecretCommand::Decrypt { value } => {
            let Some(handle) = SecretHandle::from_marker(&value, Some(key_from_env()?)) else {
                // Not a marker; pass through unchanged like any plain scalar.
                println!("{value}");
                return Ok(());
            };
            let plaintext = handle.reveal().context("failed to decrypt value")?;
            println!("{}", plaintext.expose_secret());
            Ok(())
        }
    }
}

fn key_from_env() -> anyhow::Result<SecretKeySource> {
    SecretKeySource::from_env().context(
        "no key material found: set STRATA_SECRET_KEY (hex) or STRATA_SECRET_PASSPHRASE",
    )
}
