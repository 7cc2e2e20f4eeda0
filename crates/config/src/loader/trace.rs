//! Structured provenance for one load.
//!
//! Responsibilities:
//! - Define `ImportEvent`, the immutable record of one file entering the
//!   resolution, and its rendering into the metadata tree.
//!
//! Invariants:
//! - `order` values are assigned from a single monotonic counter per load,
//!   so sorting by `order` reconstructs the exact visitation sequence.
//! - Events are recorded before their file is read, so trace entries exist
//!   even when a failure occurs downstream.

use std::path::PathBuf;

use crate::value::{Map, Value};

/// One file entering the resolution: who imported it, under which literal
/// reference, at what depth, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportEvent {
    /// Absolute path of the file.
    pub file: PathBuf,
    /// Absolute path of the file whose directive pulled this one in, or
    /// `None` for the root.
    pub imported_by: Option<PathBuf>,
    /// The reference string exactly as written, or `None` for the root.
    pub import_key: Option<String>,
    /// Nesting depth; the root is 0.
    pub depth: u32,
    /// Position in the load's total order.
    pub order: u64,
}

impl ImportEvent {
    /// Render the event as a tree node for the metadata namespace.
    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("file", Value::String(path_string(&self.file)));
        map.insert(
            "imported_by",
            match &self.imported_by {
                Some(path) => Value::String(path_string(path)),
                None => Value::Null,
            },
        );
        map.insert(
            "import_key",
            match &self.import_key {
                Some(key) => Value::String(key.clone()),
                None => Value::Null,
            },
        );
        map.insert("depth", Value::Int(i64::from(self.depth)));
        map.insert("order", Value::Int(self.order as i64));
        Value::Mapping(map)
    }
}

fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_rendering() {
        let event = ImportEvent {
            file: PathBuf::from("/cfg/imports/common.yml"),
            imported_by: Some(PathBuf::from("/cfg/application.yml")),
            import_key: Some("imports/common".to_string()),
            depth: 1,
            order: 2,
        };

        let value = event.to_value();
        let map = value.as_mapping().unwrap();
        assert_eq!(
            map.get("file").unwrap().as_str(),
            Some("/cfg/imports/common.yml")
        );
        assert_eq!(
            map.get("imported_by").unwrap().as_str(),
            Some("/cfg/application.yml")
        );
        assert_eq!(
            map.get("import_key").unwrap().as_str(),
            Some("imports/common")
        );
        assert_eq!(map.get("depth").unwrap().as_int(), Some(1));
        assert_eq!(map.get("order").unwrap().as_int(), Some(2));
    }

    #[test]
    fn test_root_event_has_null_parent_fields() {
        let event = ImportEvent {
            file: PathBuf::from("/cfg/application.yml"),
            imported_by: None,
            import_key: None,
            depth: 0,
            order: 0,
        };

        let value = event.to_value();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("imported_by"), Some(&Value::Null));
        assert_eq!(map.get("import_key"), Some(&Value::Null));
    }
}
