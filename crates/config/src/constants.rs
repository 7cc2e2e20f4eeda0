//! Centralized constants for the strata workspace.
//!
//! This module contains reserved key names, environment variable names,
//! and default values used across the crate to avoid magic string
//! duplication.

/// Environment variable supplying the default configuration directory.
pub const ENV_CONFIG_DIR: &str = "STRATA_CONFIG_DIR";

/// Environment variable selecting the active profile when none is passed.
pub const ENV_PROFILE: &str = "STRATA_PROFILE";

/// Environment variable selecting the config file format (yml, yaml, json, toml).
pub const ENV_FORMAT: &str = "STRATA_FORMAT";

/// Environment variable supplying the hex-encoded 32-byte secret key.
pub const ENV_SECRET_KEY: &str = "STRATA_SECRET_KEY";

/// Environment variable supplying a passphrase for key derivation.
pub const ENV_SECRET_PASSPHRASE: &str = "STRATA_SECRET_PASSPHRASE";

/// File stem of the base configuration file (`application.<ext>`).
pub const BASE_STEM: &str = "application";

/// Reserved key holding a sequence of import references.
pub const IMPORTS_KEY: &str = "imports";

/// Flag key that silences merge warnings when set to `true` on either
/// side of a merge.
pub const SUPPRESS_KEY: &str = "suppress_config_merge_warnings";

/// Top-level key of the reserved metadata namespace (`strata._meta`).
pub const META_ROOT_KEY: &str = "strata";

/// Inner key of the reserved metadata namespace.
pub const META_KEY: &str = "_meta";

/// Profile used when none is configured anywhere.
pub const DEFAULT_PROFILE: &str = "default";

/// Prefix of the encrypted-value marker, `ENC(<token>)`.
pub const SECRET_MARKER_PREFIX: &str = "ENC(";

/// Placeholder emitted for secret values in redacted output.
pub const REDACTED_PLACEHOLDER: &str = "ENC(**REDACTED**)";
