//! Dump the merged configuration as YAML or JSON.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use strata_config::{ConfigFormat, ConfigLoader, SecretRendering};

use crate::args::OutputFormat;

pub struct DumpArgs {
    pub config_dir: PathBuf,
    pub profile: String,
    pub format: Option<String>,
    pub secrets: bool,
    pub output: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub require_base: bool,
    pub require_profile: bool,
}

pub fn run(args: DumpArgs) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new()
        .with_config_dir(&args.config_dir)
        .with_profile(&args.profile)
        .require_base(args.require_base)
        .require_profile(args.require_profile);

    if let Some(ext) = &args.format {
        loader = loader.with_format(ConfigFormat::from_ext(ext)?);
    }

    let config = loader.load().context("failed to load configuration")?;
    tracing::debug!(
        profile = config.profile(),
        sources = config.sources().len(),
        "configuration resolved"
    );

    let mode = if args.secrets {
        SecretRendering::Reveal
    } else {
        SecretRendering::Redact
    };

    let mut rendered = Vec::new();
    match args.output_format {
        OutputFormat::Yaml => config
            .write_yaml(&mut rendered, mode)
            .context("failed to render configuration")?,
        OutputFormat::Json => {
            config
                .write_json(&mut rendered, mode)
                .context("failed to render configuration")?;
            rendered.push(b'\n');
        }
    }

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            file.write_all(&rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Config written to {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(&rendered)
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}
