//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).
//! - Does not implement any resolution logic.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "strata-cli")]
#[command(about = "Strata CLI - inspect merged hierarchical configuration", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  strata-cli dump --config-dir config --profile dev\n  strata-cli dump --config-dir config --profile prod --secrets\n  strata-cli dump --config-dir config --profile test --output-format json\n  strata-cli dump --config-dir config --profile dev --output out.yml\n  strata-cli secret generate-key\n  strata-cli secret encrypt 'hunter2'\n"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump the merged configuration for inspection/debugging
    Dump {
        /// Directory containing application.<ext> and optional profile overlays
        #[arg(long, env = "STRATA_CONFIG_DIR", value_name = "DIR")]
        config_dir: PathBuf,

        /// Active profile to load (dev, test, prod, etc.)
        #[arg(long, env = "STRATA_PROFILE")]
        profile: String,

        /// Config file format (yml, yaml, json, toml)
        #[arg(long, env = "STRATA_FORMAT")]
        format: Option<String>,

        /// Reveal decrypted secret values (UNSAFE!)
        #[arg(long)]
        secrets: bool,

        /// Write output to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Serialization format for the dumped tree
        #[arg(long, value_enum, default_value = "yaml")]
        output_format: OutputFormat,

        /// Fail when the base application file is missing
        #[arg(long)]
        require_base: bool,

        /// Fail when the profile overlay file is missing
        #[arg(long)]
        require_profile: bool,
    },

    /// Manage ENC(...) secret values
    Secret {
        #[command(subcommand)]
        command: commands::secret::SecretCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}
