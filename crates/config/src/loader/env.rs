//! Environment variable handling for the loader.
//!
//! Responsibilities:
//! - Read the variables that supply loader defaults: config directory,
//!   active profile, and file format.
//! - Provide the shared empty/whitespace-filtering env reader.
//!
//! Does NOT handle:
//! - Placeholder interpolation inside file contents (see `format`).
//! - Secret key material (see `secret`).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed.

use std::path::PathBuf;

use crate::constants::{ENV_CONFIG_DIR, ENV_FORMAT, ENV_PROFILE};
use crate::error::ConfigError;
use crate::format::ConfigFormat;

/// Read an environment variable, returning None if unset, empty, or
/// whitespace-only. Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Default configuration directory from the environment, if any.
pub(crate) fn config_dir_from_env() -> Option<PathBuf> {
    env_var_or_none(ENV_CONFIG_DIR).map(PathBuf::from)
}

/// Active profile from the environment, if any.
pub(crate) fn profile_from_env() -> Option<String> {
    env_var_or_none(ENV_PROFILE)
}

/// Active format from the environment, if any. An unparseable value is an
/// error rather than a silent fallback.
pub(crate) fn format_from_env() -> Result<Option<ConfigFormat>, ConfigError> {
    match env_var_or_none(ENV_FORMAT) {
        Some(ext) => ConfigFormat::from_ext(&ext).map(Some),
        None => Ok(None),
    }
}
