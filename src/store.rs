//! Read-only access to catalog metadata, the live roster and monthly roster
//! snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::Document;

pub const CATALOG_COLLECTION: &str = "catalog";
pub const STUDENTS_COLLECTION: &str = "catalog/global/students";
pub const SNAPSHOT_COLLECTION: &str = "roster_records";
pub const ACTIVE_STATUS: &str = "active";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a JSON object")]
    Shape { path: PathBuf },
}

/// Capabilities the report needs from the document store.
pub trait CatalogStore: Send + Sync {
    /// `catalog/{classNo}-{DIV}`.
    fn catalog_document(&self, class_division: &str) -> Result<Option<Document>, StoreError>;
    /// Students with `status == "active"` and a matching `classDivision`, in
    /// store order.
    fn active_students(&self, class_division: &str) -> Result<Vec<Document>, StoreError>;
    /// `roster_records/{classNo}-{DIV}_{YYYY}-{MM}`.
    fn roster_record(&self, record_id: &str) -> Result<Option<Document>, StoreError>;
}

fn is_active_in(doc: &Document, class_division: &str) -> bool {
    doc.get("status").and_then(Value::as_str) == Some(ACTIVE_STATUS)
        && doc.get("classDivision").and_then(Value::as_str) == Some(class_division)
}

/// In-memory store, mainly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    catalogs: BTreeMap<String, Document>,
    students: Vec<Document>,
    records: BTreeMap<String, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, class_division: &str, doc: Document) -> Self {
        self.catalogs.insert(class_division.to_string(), doc);
        self
    }

    pub fn with_student(mut self, doc: Document) -> Self {
        self.students.push(doc);
        self
    }

    pub fn with_roster_record(mut self, record_id: &str, doc: Document) -> Self {
        self.records.insert(record_id.to_string(), doc);
        self
    }
}

impl CatalogStore for MemoryStore {
    fn catalog_document(&self, class_division: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.catalogs.get(class_division).cloned())
    }

    fn active_students(&self, class_division: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .students
            .iter()
            .filter(|d| is_active_in(d, class_division))
            .cloned()
            .collect())
    }

    fn roster_record(&self, record_id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.records.get(record_id).cloned())
    }
}

/// Documents exported as JSON files under a root directory:
///
/// ```text
/// {root}/catalog/{classNo}-{DIV}.json
/// {root}/catalog/global/students/*.json
/// {root}/roster_records/{id}.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{}.json", id))
    }

    fn read_document(path: &Path) -> Result<Option<Document>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(doc) => Ok(Some(doc)),
            _ => Err(StoreError::Shape {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl CatalogStore for JsonDirStore {
    fn catalog_document(&self, class_division: &str) -> Result<Option<Document>, StoreError> {
        Self::read_document(&self.document_path(CATALOG_COLLECTION, class_division))
    }

    fn active_students(&self, class_division: &str) -> Result<Vec<Document>, StoreError> {
        let dir = self.root.join(STUDENTS_COLLECTION);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let io_err = |source| StoreError::Io {
            path: dir.clone(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut students = Vec::new();
        for path in paths {
            if let Some(doc) = Self::read_document(&path)? {
                if is_active_in(&doc, class_division) {
                    students.push(doc);
                }
            }
        }
        Ok(students)
    }

    fn roster_record(&self, record_id: &str) -> Result<Option<Document>, StoreError> {
        Self::read_document(&self.document_path(SNAPSHOT_COLLECTION, record_id))
    }
}
