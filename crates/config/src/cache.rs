//! Process-wide configuration cache.
//!
//! Responsibilities:
//! - Memoize resolved configurations keyed by (directory, profile).
//! - Guarantee exactly one resolution wins under concurrent first access.
//!
//! Does NOT handle:
//! - Resolution itself (delegated to `ConfigLoader`).
//! - File watching or invalidation; staleness is handled by explicit
//!   `reload`/`clear`.
//!
//! Invariants:
//! - The lock is held across the whole check-load-store sequence, so two
//!   racing threads never perform resolutions that silently diverge.
//! - `clear` is intended for test isolation, not production hot paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ConfigError;
use crate::facade::Config;
use crate::loader::ConfigLoader;

type CacheKey = (PathBuf, String);

/// An explicit, injectable cache of resolved configurations.
///
/// Construct one per process (or per test) and share it; there is no
/// global instance.
#[derive(Default)]
pub struct ConfigCache {
    entries: Mutex<HashMap<CacheKey, Arc<Config>>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached configuration for (directory, profile), resolving
    /// and storing it on first access.
    pub fn get_or_load(
        &self,
        config_dir: &Path,
        profile: &str,
    ) -> Result<Arc<Config>, ConfigError> {
        let key = Self::make_key(config_dir, profile);
        let mut entries = self.lock();

        if let Some(existing) = entries.get(&key) {
            return Ok(Arc::clone(existing));
        }

        let config = Arc::new(Self::resolve(config_dir, profile)?);
        entries.insert(key, Arc::clone(&config));
        Ok(config)
    }

    /// Resolve fresh and replace whatever was cached for this key.
    pub fn reload(&self, config_dir: &Path, profile: &str) -> Result<Arc<Config>, ConfigError> {
        let key = Self::make_key(config_dir, profile);
        let mut entries = self.lock();

        let config = Arc::new(Self::resolve(config_dir, profile)?);
        entries.insert(key, Arc::clone(&config));
        Ok(config)
    }

    /// Drop all cached entries unconditionally.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn resolve(config_dir: &Path, profile: &str) -> Result<Config, ConfigError> {
        ConfigLoader::new()
            .with_config_dir(config_dir)
            .with_profile(profile)
            .load()
    }

    fn make_key(config_dir: &Path, profile: &str) -> CacheKey {
        (crate::loader::absolutize(config_dir), profile.to_string())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Config>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_base(dir: &Path, body: &str) {
        fs::write(dir.join("application.yml"), body).unwrap();
    }

    #[test]
    fn test_get_or_load_caches() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "app:\n  name: cached\n");

        let cache = ConfigCache::new();
        let first = cache.get_or_load(dir.path(), "dev").unwrap();
        let second = cache.get_or_load(dir.path(), "dev").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_profiles_are_distinct_entries() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "app:\n  name: x\n");

        let cache = ConfigCache::new();
        cache.get_or_load(dir.path(), "dev").unwrap();
        cache.get_or_load(dir.path(), "prod").unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reload_replaces_entry() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "app:\n  name: before\n");

        let cache = ConfigCache::new();
        let first = cache.get_or_load(dir.path(), "dev").unwrap();
        assert_eq!(first.get_str("app.name"), Some("before"));

        write_base(dir.path(), "app:\n  name: after\n");
        // Cached entry is unaffected until an explicit reload.
        let cached = cache.get_or_load(dir.path(), "dev").unwrap();
        assert_eq!(cached.get_str("app.name"), Some("before"));

        let reloaded = cache.reload(dir.path(), "dev").unwrap();
        assert_eq!(reloaded.get_str("app.name"), Some("after"));
        assert!(!Arc::ptr_eq(&first, &reloaded));
    }

    #[test]
    fn test_clear_drops_everything() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "app:\n  name: x\n");

        let cache = ConfigCache::new();
        cache.get_or_load(dir.path(), "dev").unwrap();
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_first_access_resolves_once() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "app:\n  name: race\n");

        let cache = Arc::new(ConfigCache::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let path = dir.path().to_path_buf();
            handles.push(std::thread::spawn(move || {
                cache.get_or_load(&path, "dev").unwrap()
            }));
        }

        let configs: Vec<Arc<Config>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for config in &configs[1..] {
            assert!(Arc::ptr_eq(&configs[0], config));
        }
        assert_eq!(cache.len(), 1);
    }
}
