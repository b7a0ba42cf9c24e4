//! Document metadata and the views built from it.
//!
//! Stored documents carry a free-form JSON metadata object. Ingest always
//! writes `filename`, `created_at` and `directory`, but records written by
//! older tools may lack any of them, so every reader goes through
//! [`metadata_str`] and falls back to the defaults below.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Per-document metadata as persisted by the vector store.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key holding the source filename
pub const KEY_FILENAME: &str = "filename";

/// Metadata key holding the logical directory
pub const KEY_DIRECTORY: &str = "directory";

/// Metadata key holding the ingest timestamp
pub const KEY_CREATED_AT: &str = "created_at";

/// Filename reported for records without one
pub const UNKNOWN_FILENAME: &str = "(unknown)";

/// Directory assigned on ingest and reported for records without one
pub const DEFAULT_DIRECTORY: &str = "/";

/// Timestamp reported for records without one
pub const DEFAULT_CREATED_AT: &str = "-";

/// Read a string metadata field, if present and a string.
pub fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(|v| v.as_str())
}

/// ISO-8601 ingest timestamp with second precision (e.g. `2024-05-01T10:20:30Z`).
pub fn ingest_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// One row of the file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    pub directory: String,
    pub created_at: String,
    pub doc_id: String,
}

impl FileEntry {
    /// Build a listing row from a document id and its metadata, applying defaults.
    pub fn from_metadata(doc_id: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            filename: metadata_str(metadata, KEY_FILENAME)
                .unwrap_or(UNKNOWN_FILENAME)
                .to_string(),
            directory: metadata_str(metadata, KEY_DIRECTORY)
                .unwrap_or(DEFAULT_DIRECTORY)
                .to_string(),
            created_at: metadata_str(metadata, KEY_CREATED_AT)
                .unwrap_or(DEFAULT_CREATED_AT)
                .to_string(),
            doc_id: doc_id.into(),
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// 1-based rank, best first
    pub rank: usize,
    pub filename: String,
    /// Similarity in (0, 1], rounded to 4 decimals
    pub score: f64,
    /// Full stored text of the document
    pub document: String,
    pub created_at: Option<String>,
}

/// Request to move one document to another logical directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUpdate {
    pub doc_id: String,
    pub new_directory: String,
}

impl DirectoryUpdate {
    pub fn new(doc_id: impl Into<String>, new_directory: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            new_directory: new_directory.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_file_entry_full_metadata() {
        let meta = metadata(json!({
            "filename": "a.txt",
            "directory": "/reports",
            "created_at": "2024-05-01T10:20:30Z",
        }));
        let entry = FileEntry::from_metadata("doc_3", &meta);
        assert_eq!(entry.filename, "a.txt");
        assert_eq!(entry.directory, "/reports");
        assert_eq!(entry.created_at, "2024-05-01T10:20:30Z");
        assert_eq!(entry.doc_id, "doc_3");
    }

    #[test]
    fn test_file_entry_legacy_record_defaults() {
        let entry = FileEntry::from_metadata("doc_0", &Metadata::new());
        assert_eq!(entry.filename, UNKNOWN_FILENAME);
        assert_eq!(entry.directory, DEFAULT_DIRECTORY);
        assert_eq!(entry.created_at, DEFAULT_CREATED_AT);
    }

    #[test]
    fn test_non_string_field_uses_default() {
        let meta = metadata(json!({ "filename": 42 }));
        let entry = FileEntry::from_metadata("doc_1", &meta);
        assert_eq!(entry.filename, UNKNOWN_FILENAME);
    }

    #[test]
    fn test_ingest_timestamp_format() {
        let ts = ingest_timestamp();
        assert_eq!(ts.len(), "2024-05-01T10:20:30Z".len());
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
