//! Read-only facade over a resolved configuration tree.
//!
//! Responsibilities:
//! - Dotted-path lookup with a defaulting accessor and a loud counterpart.
//! - Typed extraction into caller-defined structs via serde.
//! - Conversion to plain serde structures and serialized snapshots, with
//!   secrets redacted unless explicitly revealed.
//!
//! Does NOT handle:
//! - Loading or merging (see `loader`); a `Config` is immutable once built.
//!
//! Invariants:
//! - Default rendering redacts secrets; `Reveal` fails loudly when any
//!   contained secret cannot be decrypted, it never silently redacts.
//! - Provenance accessors reflect exactly what the load recorded.

use std::io::Write;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::loader::ImportEvent;
use crate::secret::SecretRendering;
use crate::value::{Map, Value};

/// A resolved, read-only configuration.
#[derive(Debug, Clone)]
pub struct Config {
    root: Map,
    profile: String,
    sources: Vec<PathBuf>,
    trace: Vec<ImportEvent>,
}

impl Config {
    pub(crate) fn new(
        root: Map,
        profile: String,
        sources: Vec<PathBuf>,
        trace: Vec<ImportEvent>,
    ) -> Self {
        Self {
            root,
            profile,
            sources,
            trace,
        }
    }

    /// The profile this configuration was resolved for.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Absolute paths of every file actually read, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// The full import trace recorded during the load.
    pub fn import_trace(&self) -> &[ImportEvent] {
        &self.trace
    }

    /// The underlying tree.
    pub fn root(&self) -> &Map {
        &self.root
    }

    /// Look up a dotted path, returning `None` if any segment is absent or
    /// a non-mapping is traversed.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.as_mapping()?.get(segment)?;
        }
        Some(value)
    }

    /// Like [`Config::get`], but absence is an error naming the path.
    pub fn try_get(&self, path: &str) -> Result<&Value, ConfigError> {
        self.get(path).ok_or_else(|| ConfigError::KeyNotFound {
            path: path.to_string(),
        })
    }

    /// String at a dotted path, if present and a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Boolean at a dotted path, if present and a boolean.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Integer at a dotted path, if present and an integer.
    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_int()
    }

    /// Extract the subtree at `path` into a typed struct.
    ///
    /// An empty path binds the whole tree. Secrets are revealed during
    /// binding, so an unrevealable secret inside the subtree is an error.
    pub fn bind<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = if path.is_empty() {
            self.to_json(SecretRendering::Reveal)?
        } else {
            self.try_get(path)?.to_json_value(SecretRendering::Reveal)?
        };
        serde_json::from_value(value).map_err(|e| ConfigError::Bind {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Render the whole tree as `serde_json::Value`.
    pub fn to_json(&self, mode: SecretRendering) -> Result<serde_json::Value, ConfigError> {
        let mut object = serde_json::Map::with_capacity(self.root.len());
        for (key, value) in self.root.iter() {
            object.insert(key.clone(), value.to_json_value(mode)?);
        }
        Ok(serde_json::Value::Object(object))
    }

    /// Render the whole tree as `serde_yaml::Value`.
    pub fn to_yaml(&self, mode: SecretRendering) -> Result<serde_yaml::Value, ConfigError> {
        let mut mapping = serde_yaml::Mapping::with_capacity(self.root.len());
        for (key, value) in self.root.iter() {
            mapping.insert(
                serde_yaml::Value::String(key.clone()),
                value.to_yaml_value(mode)?,
            );
        }
        Ok(serde_yaml::Value::Mapping(mapping))
    }

    /// Write a YAML snapshot to a sink. Redacted by default via `mode`.
    pub fn write_yaml<W: Write>(&self, writer: W, mode: SecretRendering) -> Result<(), ConfigError> {
        let rendered = self.to_yaml(mode)?;
        serde_yaml::to_writer(writer, &rendered).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }

    /// Write a pretty-printed JSON snapshot to a sink.
    pub fn write_json<W: Write>(&self, writer: W, mode: SecretRendering) -> Result<(), ConfigError> {
        let rendered = self.to_json(mode)?;
        serde_json::to_writer_pretty(writer, &rendered).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REDACTED_PLACEHOLDER;
    use crate::secret::{SecretKeySource, encrypt_value, wrap_secrets};
    use serde::Deserialize;

    fn tree(yaml: &str) -> Map {
        let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        match Value::from(parsed) {
            Value::Mapping(map) => map,
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    fn config(yaml: &str) -> Config {
        Config::new(tree(yaml), "test".to_string(), Vec::new(), Vec::new())
    }

    #[test]
    fn test_dotted_get() {
        let cfg = config("etl:\n  jobs:\n    root: /jobs\n");
        assert_eq!(cfg.get_str("etl.jobs.root"), Some("/jobs"));
        assert!(cfg.get("etl.jobs").unwrap().is_mapping());
    }

    #[test]
    fn test_missing_path_returns_none() {
        let cfg = config("a:\n  b: 1\n");
        assert!(cfg.get("a.b.c").is_none());
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn test_try_get_names_path() {
        let cfg = config("a: 1\n");
        match cfg.try_get("a.missing") {
            Err(ConfigError::KeyNotFound { path }) => assert_eq!(path, "a.missing"),
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_typed_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Server {
            host: String,
            port: u16,
            debug: bool,
        }

        let cfg = config("server:\n  host: localhost\n  port: 8080\n  debug: true\n");
        let server: Server = cfg.bind("server").unwrap();
        assert_eq!(
            server,
            Server {
                host: "localhost".to_string(),
                port: 8080,
                debug: true,
            }
        );
    }

    #[test]
    fn test_bind_failure_is_bind_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Server {
            port: u16,
        }

        let cfg = config("server:\n  port: not-a-number\n");
        assert!(matches!(
            cfg.bind::<Server>("server"),
            Err(ConfigError::Bind { .. })
        ));
    }

    #[test]
    fn test_rendering_redacts_by_default() {
        let key = SecretKeySource::Key([3u8; 32]);
        let marker = encrypt_value("s3cr3t", &key).unwrap();
        let mut root = tree(&format!("db:\n  password: \"{marker}\"\n"));
        for (_k, v) in root.iter_mut() {
            wrap_secrets(v, Some(&key));
        }
        let cfg = Config::new(root, "test".to_string(), Vec::new(), Vec::new());

        let rendered = cfg.to_json(SecretRendering::Redact).unwrap();
        assert_eq!(rendered["db"]["password"], REDACTED_PLACEHOLDER);

        let revealed = cfg.to_json(SecretRendering::Reveal).unwrap();
        assert_eq!(revealed["db"]["password"], "s3cr3t");
    }

    #[test]
    fn test_reveal_without_key_fails_loudly() {
        let key = SecretKeySource::Key([3u8; 32]);
        let marker = encrypt_value("s3cr3t", &key).unwrap();
        let mut root = tree(&format!("db:\n  password: \"{marker}\"\n"));
        for (_k, v) in root.iter_mut() {
            wrap_secrets(v, None);
        }
        let cfg = Config::new(root, "test".to_string(), Vec::new(), Vec::new());

        // Redaction still works without a key.
        assert!(cfg.to_json(SecretRendering::Redact).is_ok());
        // Reveal must error, not silently redact.
        assert!(matches!(
            cfg.to_json(SecretRendering::Reveal),
            Err(ConfigError::SecretKey { .. })
        ));
        let mut sink = Vec::new();
        assert!(cfg.write_yaml(&mut sink, SecretRendering::Reveal).is_err());
    }

    #[test]
    fn test_write_yaml_snapshot() {
        let cfg = config("a: 1\nb:\n  c: two\n");
        let mut sink = Vec::new();
        cfg.write_yaml(&mut sink, SecretRendering::Redact).unwrap();

        let written: serde_yaml::Value = serde_yaml::from_slice(&sink).unwrap();
        assert_eq!(written["a"], serde_yaml::Value::Number(1.into()));
        assert_eq!(written["b"]["c"], serde_yaml::Value::String("two".into()));
    }
}
