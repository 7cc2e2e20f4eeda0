//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define the single error taxonomy surfaced by every part of the crate.
//!
//! Does NOT handle:
//! - Soft-warning cases (partial-override and missing-overlay notices),
//!   which are tracing events, not errors.
//!
//! Invariants:
//! - All error variants include context for debugging (paths, references,
//!   key paths).
//! - No lower-level parser or cipher error type leaks out of the crate.
//! - Secret-related variants never include ciphertext or plaintext.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and access.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine config directory: set STRATA_CONFIG_DIR or pass one explicitly")]
    ConfigDirUnavailable,

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Required config file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Circular import detected: {path}")]
    CircularImport { path: PathBuf },

    #[error(
        "Path traversal detected: import '{reference}' resolves to {resolved}, outside config directory {config_dir}"
    )]
    PathTraversal {
        reference: String,
        resolved: PathBuf,
        config_dir: PathBuf,
    },

    #[error("Key not found: {path}")]
    KeyNotFound { path: String },

    #[error("Decryption key unavailable or invalid: {detail}")]
    SecretKey { detail: String },

    #[error("Invalid secret token: {detail}")]
    SecretToken { detail: String },

    #[error("Encryption failed: {detail}")]
    SecretEncrypt { detail: String },

    #[error("Decryption failed: {detail}")]
    SecretDecrypt { detail: String },

    #[error("Failed to bind '{path}': {message}")]
    Bind { path: String, message: String },

    #[error("Failed to serialize configuration: {message}")]
    Serialize { message: String },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: std::io::ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
