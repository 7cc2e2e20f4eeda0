//! Tests for the configuration loader.
//!
//! Responsibilities:
//! - Test the base + profile + imports pipeline end to end on temp dirs.
//! - Test import expansion, provenance recording, and the traversal
//!   boundary.
//!
//! Does NOT handle:
//! - Merge unit semantics (tested in `merge`).
//! - Cipher-level behavior (tested in `secret`).
//!
//! Invariants:
//! - Tests touching process environment use `serial_test` plus
//!   `global_test_lock()` to prevent cross-test pollution.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::Path;
use std::sync::Mutex;


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Write a config file under `dir`, creating parent directories for
/// references like `imports/common.yml`.
pub fn write_file(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
}
