//! Integration tests for configuration loading through the public API.
//!
//! These tests exercise the full pipeline the way library consumers drive
//! it: builder, load, facade access, rendering, and the cache.

use std::path::Path;
use std::sync::Arc;

use secrecy::ExposeSecret;
use strata_config::{
    ConfigCache, ConfigError, ConfigFormat, ConfigLoader, SecretKeySource, SecretRendering,
    encrypt_value,
};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
}

fn full_fixture(key: &SecretKeySource) -> TempDir {
    let dir = TempDir::new().unwrap();
    let marker = encrypt_value("db-password", key).unwrap();

    write_file(
        dir.path(),
        "application.yml",
        &format!(
            "app:\n  name: SprocketApp\n  profile: base\ndb:\n  host: localhost\n  password: \"{marker}\"\nimports:\n  - imports/jobs\n"
        ),
    );
    write_file(
        dir.path(),
        "imports/jobs.yml",
        "etl:\n  jobs:\n    root: /jobs/default\n    repositories:\n      inmemory:\n        class: InMemoryJobRepo\n        params:\n          x: 1\n",
    );
    write_file(
        dir.path(),
        "application-dev.yml",
        "app:\n  profile: dev\n  debug_mode: true\n",
    );
    dir
}

#[test]
fn test_full_pipeline_with_imports_profile_and_secrets() {
    let key = SecretKeySource::Key([5u8; 32]);
    let dir = full_fixture(&key);

    let cfg = ConfigLoader::new()
        .with_config_dir(dir.path())
        .with_profile("dev")
        .with_key_source(key)
        .load()
        .unwrap();

    // Base values survive, overlay overrides, imports fill structure.
    assert_eq!(cfg.get_str("app.name"), Some("SprocketApp"));
    assert_eq!(cfg.get_bool("app.debug_mode"), Some(true));
    assert_eq!(cfg.get_str("app.profile"), Some("dev"));
    assert_eq!(
        cfg.get_str("etl.jobs.repositories.inmemory.class"),
        Some("InMemoryJobRepo")
    );
    assert_eq!(cfg.get_int("etl.jobs.repositories.inmemory.params.x"), Some(1));

    // Secret is wrapped, lazily revealable, and redacted in output.
    let secret = cfg.get("db.password").unwrap().as_secret().unwrap();
    assert_eq!(secret.reveal().unwrap().expose_secret(), "db-password");

    let rendered = cfg.to_json(SecretRendering::Redact).unwrap();
    assert_eq!(rendered["db"]["password"], "ENC(**REDACTED**)");
    assert_eq!(rendered["db"]["host"], "localhost");

    // Provenance: base, import, overlay, in that order.
    let sources = cfg.sources();
    assert_eq!(sources.len(), 3);
    assert!(sources[0].ends_with("application.yml"));
    assert!(sources[1].ends_with("imports/jobs.yml"));
    assert!(sources[2].ends_with("application-dev.yml"));
    assert_eq!(cfg.import_trace().len(), 3);
}

#[test]
fn test_try_get_distinct_from_defaulting_get() {
    let key = SecretKeySource::Key([5u8; 32]);
    let dir = full_fixture(&key);

    let cfg = ConfigLoader::new()
        .with_config_dir(dir.path())
        .with_profile("dev")
        .load()
        .unwrap();

    assert!(cfg.get("nope.nothing").is_none());
    assert!(matches!(
        cfg.try_get("nope.nothing"),
        Err(ConfigError::KeyNotFound { .. })
    ));
}

#[test]
fn test_cache_returns_shared_instance() {
    let key = SecretKeySource::Key([5u8; 32]);
    let dir = full_fixture(&key);

    let cache = ConfigCache::new();
    let first = cache.get_or_load(dir.path(), "dev").unwrap();
    let second = cache.get_or_load(dir.path(), "dev").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let reloaded = cache.reload(dir.path(), "dev").unwrap();
    assert!(!Arc::ptr_eq(&first, &reloaded));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_reveal_rendering_fails_loudly_without_key() {
    let key = SecretKeySource::Key([5u8; 32]);
    let dir = full_fixture(&key);

    // Load without any key source: redaction fine, reveal errors.
    let cfg = ConfigLoader::new()
        .with_config_dir(dir.path())
        .with_profile("dev")
        .load()
        .unwrap();

    assert!(cfg.to_yaml(SecretRendering::Redact).is_ok());
    assert!(cfg.to_yaml(SecretRendering::Reveal).is_err());
}

#[test]
fn test_formats_are_uniform_per_load() {
    // A JSON load only sees .json files, including extensionless imports.
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "application.json",
        r#"{"imports": ["common"], "app": {"name": "json-app"}}"#,
    );
    write_file(dir.path(), "common.json", r#"{"common": true}"#);
    // A stray YAML file with the same stem must not be picked up.
    write_file(dir.path(), "common.yml", "common: false\n");

    let cfg = ConfigLoader::new()
        .with_config_dir(dir.path())
        .with_profile("dev")
        .with_format(ConfigFormat::Json)
        .load()
        .unwrap();

    assert_eq!(cfg.get_bool("common"), Some(true));
}

#[test]
fn test_yaml_snapshot_contains_metadata() {
    let key = SecretKeySource::Key([5u8; 32]);
    let dir = full_fixture(&key);

    let cfg = ConfigLoader::new()
        .with_config_dir(dir.path())
        .with_profile("dev")
        .load()
        .unwrap();

    let mut sink = Vec::new();
    cfg.write_yaml(&mut sink, SecretRendering::Redact).unwrap();
    let text = String::from_utf8(sink).unwrap();

    assert!(text.contains("strata:"));
    assert!(text.contains("_meta:"));
    assert!(text.contains("import_trace:"));
    assert!(text.contains("ENC(**REDACTED**)"));
    assert!(!text.contains("db-password"));
}
