//! Tree value model for resolved configuration.
//!
//! Responsibilities:
//! - Define `Value`, the tagged variant over mappings, sequences, scalars,
//!   and secret handles, and `Map`, the insertion-ordered string-keyed
//!   mapping used for every tree node.
//! - Convert parsed `serde_yaml`/`serde_json`/`toml` documents into `Value`.
//! - Render `Value` back to plain serde structures with secrets either
//!   redacted or revealed.
//!
//! Does NOT handle:
//! - File reading or raw-text interpolation (see `format`).
//! - Merge semantics (see `merge`).
//!
//! Invariants:
//! - `Map` preserves insertion order; lookups are linear, which is fine for
//!   config-sized trees.
//! - Rendering never decrypts a secret unless explicitly asked to reveal.

use crate::constants::REDACTED_PLACEHOLDER;
use crate::error::ConfigError;
use crate::secret::{SecretHandle, SecretRendering};

/// A node in a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Map),
    Secret(SecretHandle),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_secret(&self) -> Option<&SecretHandle> {
        match self {
            Value::Secret(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Render this value as a plain `serde_json::Value`.
    ///
    /// Secrets are substituted with the redaction placeholder unless `mode`
    /// is [`SecretRendering::Reveal`], in which case decryption failures
    /// propagate rather than being silently redacted.
    pub fn to_json_value(&self, mode: SecretRendering) -> Result<serde_json::Value, ConfigError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json_value(mode))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (key, value) in map.iter() {
                    object.insert(key.clone(), value.to_json_value(mode)?);
                }
                serde_json::Value::Object(object)
            }
            Value::Secret(handle) => serde_json::Value::String(rendered_secret(handle, mode)?),
        })
    }

    /// Render this value as a plain `serde_yaml::Value`, with the same
    /// secret semantics as [`Value::to_json_value`].
    pub fn to_yaml_value(&self, mode: SecretRendering) -> Result<serde_yaml::Value, ConfigError> {
        Ok(match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Bool(b) => serde_yaml::Value::Bool(*b),
            Value::Int(i) => serde_yaml::Value::Number((*i).into()),
            Value::Float(f) => serde_yaml::Value::Number((*f).into()),
            Value::String(s) => serde_yaml::Value::String(s.clone()),
            Value::Sequence(items) => serde_yaml::Value::Sequence(
                items
                    .iter()
                    .map(|item| item.to_yaml_value(mode))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut mapping = serde_yaml::Mapping::with_capacity(map.len());
                for (key, value) in map.iter() {
                    mapping.insert(
                        serde_yaml::Value::String(key.clone()),
                        value.to_yaml_value(mode)?,
                    );
                }
                serde_yaml::Value::Mapping(mapping)
            }
            Value::Secret(handle) => serde_yaml::Value::String(rendered_secret(handle, mode)?),
        })
    }
}

fn rendered_secret(handle: &SecretHandle, mode: SecretRendering) -> Result<String, ConfigError> {
    match mode {
        SecretRendering::Redact => Ok(REDACTED_PLACEHOLDER.to_string()),
        SecretRendering::Reveal => {
            use secrecy::ExposeSecret;
            Ok(handle.reveal()?.expose_secret().to_string())
        }
    }
}

/// An insertion-ordered mapping from string keys to [`Value`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a key, replacing any existing value in place so the key keeps
    /// its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = Map::new();
                for (key, value) in mapping {
                    map.insert(yaml_key_to_string(key), Value::from(value));
                }
                Value::Mapping(map)
            }
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Stringify a YAML mapping key. Config keys are strings in practice; the
/// occasional numeric or boolean key is coerced to its scalar text.
fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => {
                let mut map = Map::new();
                for (key, value) in object {
                    map.insert(key, Value::from(value));
                }
                Value::Mapping(map)
            }
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => {
                let mut map = Map::new();
                for (key, value) in table {
                    map.insert(key, Value::from(value));
                }
                Value::Mapping(map)
            }
        }
    }
}
