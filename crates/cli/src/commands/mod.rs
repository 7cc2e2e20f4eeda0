//! CLI command implementations.

pub mod dump;
pub mod secret;

use crate::args::{Cli, Commands};

/// Dispatch the parsed CLI to its command implementation.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Dump {
            config_dir,
            profile,
            format,
            secrets,
            output,
            output_format,
            require_base,
            require_profile,
        } => dump::run(dump::DumpArgs {
            config_dir,
            profile,
            format,
            secrets,
            output,
            output_format,
            require_base,
            require_profile,
        }),
        Commands::Secret { command } => secret::run(command),
    }
}
