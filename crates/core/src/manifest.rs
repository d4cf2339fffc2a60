//! Pipeline manifest handling.
//!
//! The RAG server reads its source-folder binding from a YAML manifest
//! (typically `app.yaml`). When the operator selects a different patient
//! folder, only the `object_id` field is rewritten in place; the rest of
//! the file belongs to the server and is preserved byte-for-byte.

use regex::Regex;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Matches the `object_id` line, capturing the key prefix.
const OBJECT_ID_PATTERN: &str = r"(object_id:\s*)([^\n]+)";

fn object_id_regex() -> AppResult<Regex> {
    Regex::new(OBJECT_ID_PATTERN)
        .map_err(|e| AppError::Config(format!("Invalid manifest pattern: {}", e)))
}

/// Read the target-folder identifier from the manifest.
///
/// Returns `None` when the manifest has no `object_id` field.
pub fn read_object_id(path: &Path) -> AppResult<Option<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read manifest {:?}: {}", path, e)))?;

    let re = object_id_regex()?;
    Ok(re
        .captures(&contents)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim().to_string()))
}

/// Rewrite the manifest's `object_id` field in place.
///
/// Fails when the manifest has no `object_id` line rather than appending
/// one: the field's position in the document is owned by the server config.
pub fn set_object_id(path: &Path, folder_id: &str) -> AppResult<()> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read manifest {:?}: {}", path, e)))?;

    let re = object_id_regex()?;
    if !re.is_match(&contents) {
        return Err(AppError::Config(format!(
            "Manifest {:?} has no object_id field",
            path
        )));
    }

    let updated = re.replace_all(&contents, format!("${{1}}{}", folder_id));

    std::fs::write(path, updated.as_bytes())
        .map_err(|e| AppError::Config(format!("Failed to write manifest {:?}: {}", path, e)))?;

    tracing::info!("Manifest {:?} now targets folder {}", path, folder_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = "\
$sources: !pw.io.gdrive.read\n\
  object_id: old-folder-id\n\
  service_user_credentials_file: credentials.json\n\
  with_metadata: true\n";

    fn manifest_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_object_id() {
        let file = manifest_file(MANIFEST);
        let id = read_object_id(file.path()).unwrap();
        assert_eq!(id, Some("old-folder-id".to_string()));
    }

    #[test]
    fn test_read_object_id_missing() {
        let file = manifest_file("host: 0.0.0.0\nport: 8000\n");
        assert_eq!(read_object_id(file.path()).unwrap(), None);
    }

    #[test]
    fn test_set_object_id_rewrites_only_that_line() {
        let file = manifest_file(MANIFEST);
        set_object_id(file.path(), "new-folder-id").unwrap();

        let updated = std::fs::read_to_string(file.path()).unwrap();
        assert!(updated.contains("object_id: new-folder-id"));
        assert!(!updated.contains("old-folder-id"));
        // Everything else is untouched
        assert!(updated.contains("service_user_credentials_file: credentials.json"));
        assert!(updated.contains("with_metadata: true"));
        assert!(updated.starts_with("$sources: !pw.io.gdrive.read"));
    }

    #[test]
    fn test_set_object_id_requires_field() {
        let file = manifest_file("host: 0.0.0.0\n");
        assert!(set_object_id(file.path(), "x").is_err());
    }
}
