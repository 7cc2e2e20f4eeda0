//! Format adapter for reading configuration files.
//!
//! Responsibilities:
//! - Select the active config format (yml, yaml, json, toml) once per load.
//! - Read a file into a tree plus its raw text.
//! - Expand `${NAME}` / `${NAME:default}` placeholders over the raw text
//!   before structural parsing, so expansions can affect parser-significant
//!   characters.
//!
//! Does NOT handle:
//! - Import resolution or merging (see `loader`).
//! - Secret wrapping (see `secret`).
//!
//! Invariants:
//! - A missing file is `Ok(None)`, never an error; strictness policy lives
//!   in the loader.
//! - All parse failures surface as `ConfigError::Parse` with the path and
//!   the underlying parser message attached.
//! - A document whose top level is not a mapping yields an empty tree.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::value::{Map, Value};

/// Placeholder pattern: `${NAME}` or `${NAME:default}`.
static ENV_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::([^}]+))?\}").expect("env placeholder pattern is valid")
});

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yml,
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Parse a format from an extension string, with or without a leading dot.
    pub fn from_ext(ext: &str) -> Result<Self, ConfigError> {
        match ext.trim_start_matches('.') {
            "yml" => Ok(ConfigFormat::Yml),
            "yaml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// File extension appended to import references that carry none.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yml => "yml",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
            ConfigFormat::Toml => "toml",
        }
    }
}

impl Default for ConfigFormat {
    fn default() -> Self {
        ConfigFormat::Yml
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Expand `${NAME}` / `${NAME:default}` placeholders against the process
/// environment. Unset variables without a default are left verbatim.
pub fn expand_env(text: &str) -> String {
    ENV_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => caps[0].to_string(),
                },
            }
        })
        .into_owned()
}

/// Read and parse a config file.
///
/// Returns `Ok(None)` when the file does not exist. Otherwise returns the
/// parsed tree together with the env-expanded raw text it was parsed from.
pub fn read_file(
    path: &Path,
    format: ConfigFormat,
) -> Result<Option<(Map, String)>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Strip a UTF-8 BOM if present; some editors insert one.
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw).to_string();
    let expanded = expand_env(&raw);

    let tree = parse_text(&expanded, format, path)?;
    Ok(Some((tree, expanded)))
}

fn parse_text(text: &str, format: ConfigFormat, path: &Path) -> Result<Map, ConfigError> {
    let value = match format {
        ConfigFormat::Yml | ConfigFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text)
            .map(Value::from)
            .map_err(|e| parse_error(path, e))?,
        ConfigFormat::Json => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str::<serde_json::Value>(text)
                    .map(Value::from)
                    .map_err(|e| parse_error(path, e))?
            }
        }
        ConfigFormat::Toml => toml::from_str::<toml::Value>(text)
            .map(Value::from)
            .map_err(|e| parse_error(path, e))?,
    };

    match value {
        Value::Mapping(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
