//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish
//!   failure modes.
//! - Map `ConfigError` variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-3 are reserved for specific error categories.

use strata_config::ConfigError;

/// Structured exit codes for strata-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Load error - the configuration could not be resolved (missing or
    /// malformed files, circular imports, path traversal).
    LoadError = 2,

    /// Secret error - key material missing or decryption failed.
    SecretError = 3,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::ConfigDirUnavailable
            | ConfigError::UnsupportedFormat(_)
            | ConfigError::MissingFile { .. }
            | ConfigError::Io { .. }
            | ConfigError::Parse { .. }
            | ConfigError::CircularImport { .. }
            | ConfigError::PathTraversal { .. } => ExitCode::LoadError,

            ConfigError::SecretKey { .. }
            | ConfigError::SecretToken { .. }
            | ConfigError::SecretEncrypt { .. }
            | ConfigError::SecretDecrypt { .. } => ExitCode::SecretError,

            _ => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if the error is not a ConfigError.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(config_err);
            }
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::LoadError.as_i32(), 2);
        assert_eq!(ExitCode::SecretError.as_i32(), 3);
    }

    #[test]
    fn test_load_errors_map_to_load_exit_code() {
        let err = ConfigError::CircularImport {
            path: PathBuf::from("/cfg/a.yml"),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::LoadError);

        let err = ConfigError::MissingFile {
            path: PathBuf::from("/cfg/application.yml"),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::LoadError);
    }

    #[test]
    fn test_secret_errors_map_to_secret_exit_code() {
        let err = ConfigError::SecretDecrypt {
            detail: "authentication failed".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::SecretError);
    }

    #[test]
    fn test_anyhow_chain_is_searched() {
        let inner = ConfigError::PathTraversal {
            reference: "../../etc/passwd".to_string(),
            resolved: PathBuf::from("/etc/passwd"),
            config_dir: PathBuf::from("/cfg"),
        };
        let err = anyhow::Error::new(inner).context("while dumping config");
        assert_eq!(err.exit_code(), ExitCode::LoadError);
    }

    #[test]
    fn test_non_config_error_is_general() {
        let err = anyhow::anyhow!("something else entirely");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
