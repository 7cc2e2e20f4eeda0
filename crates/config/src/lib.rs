//! Hierarchical configuration loading for strata.
//!
//! This crate resolves a base file plus a profile overlay, recursively
//! expands `imports:` directives found anywhere in the tree, deep-merges
//! with overlay precedence, expands `${ENV}` placeholders in raw file
//! text, wraps `ENC(...)` values for lazy decryption, and records full
//! merge provenance (which files contributed, in what order, imported by
//! whom).

pub mod cache;
pub mod constants;
mod error;
pub mod facade;
pub mod format;
pub mod merge;
mod loader;
pub mod secret;
pub mod value;

pub use cache::ConfigCache;
pub use error::ConfigError;
pub use facade::Config;
pub use format::ConfigFormat;
pub use loader::{ConfigLoader, ImportEvent, env_var_or_none};
pub use secret::{Encryptor, SecretHandle, SecretKeySource, SecretRendering, encrypt_value};
pub use value::{Map, Value};
