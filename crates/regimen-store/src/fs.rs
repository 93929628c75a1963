//! Filesystem-backed document store
//!
//! Each document is a JSON file; each collection is a directory:
//!
//! ```text
//! <root>/courses/p1.json                      -> courses/p1
//! <root>/courses/p1/modules/m1.json           -> courses/p1/modules/m1
//! <root>/courses/p1/modules/                  -> courses/p1/modules
//! ```
//!
//! Useful for exports of a hosted database, fixtures, and the CLI.

use crate::document::{order_documents, Document};
use crate::error::StoreError;
use crate::paths::{CollectionPath, DocPath};
use crate::DocumentStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, segments: &[String]) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in segments {
            dir.push(segment);
        }
        dir
    }

    fn file_for(&self, path: &DocPath) -> PathBuf {
        let segments = path.segments();
        let (parents, last) = segments.split_at(segments.len().saturating_sub(1));
        let name = last.first().map(String::as_str).unwrap_or_default();
        self.dir_for(parents).join(format!("{name}.json"))
    }

    async fn read_document(
        &self,
        file: &Path,
        id: &str,
        path: String,
    ) -> Result<Option<Document>, StoreError> {
        let contents = match tokio::fs::read_to_string(file).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let value = serde_json::from_str(&contents).map_err(|source| StoreError::Decode {
            path: path.clone(),
            source,
        })?;
        Document::from_value(id, path, value).map(Some)
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn get_doc(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let file = self.file_for(path);
        tracing::trace!(path = %path, file = %file.display(), "reading document");
        self.read_document(&file, path.id(), path.to_string()).await
    }

    async fn get_ordered_collection(
        &self,
        path: &CollectionPath,
        order_by: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let dir = self.dir_for(path.segments());
        let collection = path.to_string();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: collection,
                    source,
                })
            }
        };

        let mut documents = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(StoreError::Io {
                        path: collection,
                        source,
                    })
                }
            };
            let file = entry.path();
            if file.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(id) = file.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                tracing::debug!(file = %file.display(), "skipping non-utf8 document name");
                continue;
            };
            let doc_path = format!("{collection}/{id}");
            if let Some(document) = self.read_document(&file, &id, doc_path).await? {
                documents.push(document);
            }
        }

        tracing::trace!(path = %path, count = documents.len(), "scanned collection");
        Ok(order_documents(documents, order_by))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, body: serde_json::Value) {
        let file = root.join(rel);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, serde_json::to_string(&body).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn reads_documents_and_collections() {
        let dir = tempdir().unwrap();
        write(dir.path(), "courses/p1.json", json!({ "title": "Strength" }));
        write(dir.path(), "courses/p1/modules/b.json", json!({ "order": 1 }));
        write(dir.path(), "courses/p1/modules/a.json", json!({ "order": 0 }));
        write(dir.path(), "courses/p1/modules/notes.txt", json!("ignored"));

        let store = FsStore::new(dir.path());

        let program = store
            .get_doc(&DocPath::parse("courses/p1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(program.id, "p1");
        assert_eq!(program.field("title"), Some(&json!("Strength")));

        let modules = store
            .get_ordered_collection(&CollectionPath::parse("courses/p1/modules").unwrap(), "order")
            .await
            .unwrap();
        let ids: Vec<&str> = modules.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(modules[1].path, "courses/p1/modules/b");
    }

    #[tokio::test]
    async fn missing_paths_are_empty_not_errors() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(store
            .get_doc(&DocPath::parse("courses/nope").unwrap())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .get_ordered_collection(&CollectionPath::parse("courses/nope/modules").unwrap(), "order")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("courses")).unwrap();
        std::fs::write(dir.path().join("courses/bad.json"), "{ nope").unwrap();

        let err = FsStore::new(dir.path())
            .get_doc(&DocPath::parse("courses/bad").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
