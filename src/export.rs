//! JSON export

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Write `records` to `path` as one pretty-printed UTF-8 JSON array.
///
/// Missing parent directories are created.
pub fn write_json_array<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;

    info!(records = records.len(), path = %path.display(), "exported records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use serde_json::{json, Value};

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("classifieds-export-{}", std::process::id()));
        let path = dir.join("nested").join("out.json");

        let mut record = Record::new();
        record.insert("id".to_string(), json!("111"));
        record.insert("title".to_string(), json!("Café près du parc"));

        write_json_array(&[record], &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {"));
        assert!(written.contains("Café près du parc"));

        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, json!([{"id": "111", "title": "Café près du parc"}]));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_empty_array() {
        let dir = std::env::temp_dir().join(format!("classifieds-export-empty-{}", std::process::id()));
        let path = dir.join("empty.json");

        write_json_array::<Record>(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        fs::remove_dir_all(&dir).unwrap();
    }
}
