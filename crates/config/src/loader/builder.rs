//! Configuration loader builder and pipeline.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for directory, profile,
//!   format, key source, and strictness policy.
//! - Drive one full resolution: base file, base imports, profile overlay,
//!   overlay imports, merge, profile normalization, metadata injection,
//!   secret wrapping.
//!
//! Does NOT handle:
//! - Tree walking and reference resolution (see `resolver`).
//! - File parsing (see `format`).
//!
//! Invariants:
//! - Builder values take precedence over environment variables.
//! - Pipeline order is fixed: base is fully expanded before the overlay is
//!   read, and the overlay is fully expanded before the final merge.
//! - Metadata is inserted with set-if-absent semantics; a user-authored
//!   value at a metadata path is never overwritten.
//! - `load_dotenv()` must be called explicitly; the `DOTENV_DISABLED`
//!   variable is checked before `dotenvy::dotenv()` is called.

use std::path::{Path, PathBuf};

use crate::constants::{BASE_STEM, DEFAULT_PROFILE, META_KEY, META_ROOT_KEY};
use crate::error::ConfigError;
use crate::facade::Config;
use crate::format::ConfigFormat;
use crate::merge::{deep_merge, suppress_flag};
use crate::secret::{SecretKeySource, wrap_secrets};
use crate::value::{Map, Value};

use super::env::{config_dir_from_env, format_from_env, profile_from_env};
use super::resolver::{ImportResolver, absolutize};
use super::trace::ImportEvent;

/// Builder for one configuration resolution.
pub struct ConfigLoader {
    config_dir: Option<PathBuf>,
    profile: Option<String>,
    format: Option<ConfigFormat>,
    key_source: Option<SecretKeySource>,
    require_base: bool,
    require_profile: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self {
            config_dir: None,
            profile: None,
            format: None,
            key_source: None,
            require_base: false,
            require_profile: false,
        }
    }

    /// Set the configuration directory. Falls back to `STRATA_CONFIG_DIR`.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Set the active profile. Falls back to `STRATA_PROFILE`, then
    /// `"default"`.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the file format. Falls back to `STRATA_FORMAT`, then yml.
    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the secret key source. Falls back to the key environment
    /// variables; without any, secrets stay wrapped but unrevealable.
    pub fn with_key_source(mut self, source: SecretKeySource) -> Self {
        self.key_source = Some(source);
        self
    }

    /// Make a missing base file fatal instead of an empty tree.
    pub fn require_base(mut self, required: bool) -> Self {
        self.require_base = required;
        self
    }

    /// Make a missing profile overlay fatal instead of a soft notice.
    pub fn require_profile(mut self, required: bool) -> Self {
        self.require_profile = required;
        self
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from a `.env` file if present.
    ///
    /// Missing `.env` files are silently ignored. Error messages never
    /// include raw `.env` line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Load, expand imports, merge, inject metadata, and wrap secrets.
    ///
    /// Pipeline order: base loaded, base's imports resolved, profile
    /// overlay loaded, overlay's imports resolved, base+overlay merged.
    pub fn load(self) -> Result<Config, ConfigError> {
        let config_dir = self
            .config_dir
            .clone()
            .or_else(config_dir_from_env)
            .ok_or(ConfigError::ConfigDirUnavailable)?;
        let config_dir = absolutize(&config_dir);

        let profile = self
            .profile
            .clone()
            .or_else(profile_from_env)
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let format = match self.format {
            Some(format) => format,
            None => format_from_env()?.unwrap_or_default(),
        };

        let key_source = self.key_source.clone().or_else(SecretKeySource::from_env);

        tracing::debug!(
            config_dir = %config_dir.display(),
            profile = %profile,
            format = %format,
            "loading configuration"
        );

        let mut resolver = ImportResolver::new(config_dir.clone(), format);

        // Base file.
        let base_path = config_dir.join(format!("{BASE_STEM}.{}", format.extension()));
        if self.require_base && !base_path.is_file() {
            return Err(ConfigError::MissingFile { path: base_path });
        }
        let mut base = resolver.load_file(&base_path)?;
        resolver.record(base_path.clone(), None, None, 0);

        let mut suppress = suppress_flag(&base);
        resolver.resolve_imports(&mut base, &base_path, 0, suppress)?;

        // Profile overlay.
        let overlay_name = format!("{BASE_STEM}-{profile}.{}", format.extension());
        let overlay_path = config_dir.join(&overlay_name);
        let overlay = if overlay_path.is_file() {
            let mut overlay = resolver.load_file(&overlay_path)?;
            resolver.record(
                overlay_path.clone(),
                Some(&base_path),
                Some(overlay_name),
                1,
            );

            suppress = suppress || suppress_flag(&overlay);
            resolver.resolve_imports(&mut overlay, &overlay_path, 1, suppress)?;
            overlay
        } else if self.require_profile {
            return Err(ConfigError::MissingFile { path: overlay_path });
        } else {
            if !suppress {
                tracing::warn!(
                    path = %overlay_path.display(),
                    "profile overlay not found, continuing with base only"
                );
            }
            Map::new()
        };

        deep_merge(&mut base, overlay, suppress);

        normalize_runtime_profile(&mut base, &profile);

        let (trace, sources) = resolver.into_parts();
        inject_metadata(&mut base, &profile, &sources, &trace);

        for (_key, value) in base.iter_mut() {
            wrap_secrets(value, key_source.as_ref());
        }

        Ok(Config::new(base, profile, sources, trace))
    }
}

/// Force `app.profile` to the active profile, regardless of what the files
/// themselves claim. If `app` exists as a non-mapping the user value is
/// left untouched.
fn normalize_runtime_profile(root: &mut Map, profile: &str) {
    if !root.contains_key("app") {
        root.insert("app", Value::Mapping(Map::new()));
    }
    let Some(Value::Mapping(app)) = root.get_mut("app") else {
        return;
    };
    app.insert("profile", Value::String(profile.to_string()));
}

/// Attach profile, sources, and the import trace under the reserved
/// metadata namespace without overwriting user-authored values.
fn inject_metadata(root: &mut Map, profile: &str, sources: &[PathBuf], trace: &[ImportEvent]) {
    if !root.contains_key(META_ROOT_KEY) {
        root.insert(META_ROOT_KEY, Value::Mapping(Map::new()));
    }
    let Some(Value::Mapping(namespace)) = root.get_mut(META_ROOT_KEY) else {
        return;
    };

    if !namespace.contains_key(META_KEY) {
        namespace.insert(META_KEY, Value::Mapping(Map::new()));
    }
    let Some(Value::Mapping(meta)) = namespace.get_mut(META_KEY) else {
        return;
    };

    if !meta.contains_key("profile") {
        meta.insert("profile", Value::String(profile.to_string()));
    }
    if !meta.contains_key("sources") {
        meta.insert(
            "sources",
            Value::Sequence(sources.iter().map(|path| path_value(path)).collect()),
        );
    }
    if !meta.contains_key("import_trace") {
        meta.insert(
            "import_trace",
            Value::Sequence(trace.iter().map(ImportEvent::to_value).collect()),
        );
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
