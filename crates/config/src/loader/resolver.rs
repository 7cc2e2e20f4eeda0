//! Recursive import resolution, the core of the loader.
//!
//! Responsibilities:
//! - Walk every mapping node of a tree (including mappings nested inside
//!   sequences) looking for the reserved `imports` key.
//! - Resolve each reference against the config directory, enforcing the
//!   path-traversal boundary and the one-visit-per-load cycle rule.
//! - Expand imports depth-first and merge each fully-resolved tree into
//!   the exact node that declared it, then delete the directive.
//! - Record an `ImportEvent` per file, before the file is read, and keep
//!   the ordered list of files actually read.
//!
//! Does NOT handle:
//! - Base/profile sequencing or metadata injection (see `builder`).
//!
//! Invariants:
//! - The visited set is seeded fresh per load and never pruned, so a file
//!   reachable along two paths is reported as a circular import rather
//!   than silently merged twice.
//! - Imported content merges at the declaring node, never at the document
//!   root. Importing a file that mirrors its own mount point yields the
//!   literal nested shape; that is intended behavior.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::constants::IMPORTS_KEY;
use crate::error::ConfigError;
use crate::format::{self, ConfigFormat};
use crate::merge::deep_merge;
use crate::value::{Map, Value};

use super::trace::ImportEvent;

/// Tree-walking import resolver. One instance lives for exactly one load.
pub(crate) struct ImportResolver {
    config_dir: PathBuf,
    format: ConfigFormat,
    seen: HashSet<PathBuf>,
    trace: Vec<ImportEvent>,
    sources: Vec<PathBuf>,
    order: u64,
}

impl ImportResolver {
    /// `config_dir` must already be absolute and normalized.
    pub(crate) fn new(config_dir: PathBuf, format: ConfigFormat) -> Self {
        Self {
            config_dir,
            format,
            seen: HashSet::new(),
            trace: Vec::new(),
            sources: Vec::new(),
            order: 0,
        }
    }

    /// Append an event with the next value of the load-wide order counter.
    pub(crate) fn record(
        &mut self,
        file: PathBuf,
        imported_by: Option<&Path>,
        import_key: Option<String>,
        depth: u32,
    ) {
        self.trace.push(ImportEvent {
            file,
            imported_by: imported_by.map(Path::to_path_buf),
            import_key,
            depth,
            order: self.order,
        });
        self.order += 1;
    }

    /// Read a file through the format adapter. Missing files yield an
    /// empty tree; files actually read are appended to the sources list.
    pub(crate) fn load_file(&mut self, path: &Path) -> Result<Map, ConfigError> {
        match format::read_file(path, self.format)? {
            Some((tree, _raw)) => {
                self.sources.push(path.to_path_buf());
                Ok(tree)
            }
            None => Ok(Map::new()),
        }
    }

    /// Resolve an import reference to an absolute path inside the config
    /// directory, appending the active format's extension when the
    /// reference's basename carries none.
    pub(crate) fn resolve_reference(&self, reference: &str) -> Result<PathBuf, ConfigError> {
        let basename = Path::new(reference)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = if basename.contains('.') {
            reference.to_string()
        } else {
            format!("{reference}.{}", self.format.extension())
        };

        let resolved = normalize_path(&self.config_dir.join(&relative));
        if !resolved.starts_with(&self.config_dir) {
            return Err(ConfigError::PathTraversal {
                reference: relative,
                resolved,
                config_dir: self.config_dir.clone(),
            });
        }
        Ok(resolved)
    }

    /// Walk `node` and every descendant mapping, expanding `imports`
    /// directives in place.
    pub(crate) fn resolve_imports(
        &mut self,
        node: &mut Map,
        parent_file: &Path,
        depth: u32,
        suppress: bool,
    ) -> Result<(), ConfigError> {
        if let Some(directive) = node.remove(IMPORTS_KEY) {
            match directive {
                Value::Sequence(entries) => {
                    for entry in entries {
                        let Value::String(reference) = entry else {
                            tracing::warn!(
                                parent = %parent_file.display(),
                                "ignoring non-string entry in imports list"
                            );
                            continue;
                        };
                        self.import_one(node, &reference, parent_file, depth, suppress)?;
                    }
                }
                _ => {
                    tracing::warn!(
                        parent = %parent_file.display(),
                        "ignoring imports directive that is not a sequence"
                    );
                }
            }
        }

        // Recurse into child mappings, and into mappings inside sequences,
        // in document order. Content merged from imports above is walked
        // here as well.
        for (_key, value) in node.iter_mut() {
            match value {
                Value::Mapping(child) => {
                    self.resolve_imports(child, parent_file, depth, suppress)?;
                }
                Value::Sequence(items) => {
                    for item in items {
                        if let Value::Mapping(child) = item {
                            self.resolve_imports(child, parent_file, depth, suppress)?;
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Load one reference, expand its own imports depth-first, and merge
    /// the result into the declaring node.
    fn import_one(
        &mut self,
        node: &mut Map,
        reference: &str,
        parent_file: &Path,
        depth: u32,
        suppress: bool,
    ) -> Result<(), ConfigError> {
        let path = self.resolve_reference(reference)?;

        if !self.seen.insert(path.clone()) {
            return Err(ConfigError::CircularImport { path });
        }

        let import_depth = depth + 1;
        // Record before reading so the trace names the file even when the
        // read or a nested import fails.
        self.record(
            path.clone(),
            Some(parent_file),
            Some(reference.to_string()),
            import_depth,
        );

        let mut imported = self.load_file(&path)?;
        self.resolve_imports(&mut imported, &path, import_depth, suppress)?;
        deep_merge(node, imported, suppress);
        Ok(())
    }

    /// Consume the resolver, yielding the trace and the source list.
    pub(crate) fn into_parts(self) -> (Vec<ImportEvent>, Vec<PathBuf>) {
        (self.trace, self.sources)
    }
}

/// Lexically normalize a path: collapse `.` and `..` without touching the
/// filesystem, so references to files that do not exist yet still resolve.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Turn a path absolute and normalized, preferring the real filesystem view
/// when the path exists.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) if path.is_absolute() => normalize_path(path),
        Err(_) => {
            let cwd = std::env::current_dir().unwrap_or_default();
            normalize_path(&cwd.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize_path(Path::new("/cfg/imports/../common.yml")),
            PathBuf::from("/cfg/common.yml")
        );
        assert_eq!(
            normalize_path(Path::new("/cfg/./a/./b")),
            PathBuf::from("/cfg/a/b")
        );
        // Popping past the root stays at the root.
        assert_eq!(
            normalize_path(Path::new("/cfg/../../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_reference_resolution_appends_extension() {
        let resolver = ImportResolver::new(PathBuf::from("/cfg"), ConfigFormat::Yml);

        assert_eq!(
            resolver.resolve_reference("imports/common").unwrap(),
            PathBuf::from("/cfg/imports/common.yml")
        );
        assert_eq!(
            resolver.resolve_reference("imports/common.yaml").unwrap(),
            PathBuf::from("/cfg/imports/common.yaml")
        );
    }

    #[test]
    fn test_reference_outside_config_dir_is_rejected() {
        let resolver = ImportResolver::new(PathBuf::from("/cfg"), ConfigFormat::Yml);

        let err = resolver.resolve_reference("../../etc/passwd").unwrap_err();
        match err {
            ConfigError::PathTraversal { resolved, .. } => {
                assert_eq!(resolved, PathBuf::from("/etc/passwd"));
            }
            other => panic!("expected PathTraversal, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_escape_is_rejected() {
        let resolver = ImportResolver::new(PathBuf::from("/cfg"), ConfigFormat::Yml);
        assert!(matches!(
            resolver.resolve_reference("../sibling/app.yml"),
            Err(ConfigError::PathTraversal { .. })
        ));
    }
}
