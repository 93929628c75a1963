//! In-memory document store with read fault injection.

use crate::document::{order_documents, Document};
use crate::error::StoreError;
use crate::paths::{CollectionPath, DocPath};
use crate::DocumentStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Documents keyed by their full path string.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Map<String, Value>>>,
    failing: RwLock<BTreeSet<String>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &DocPath, body: Value) -> Result<(), StoreError> {
        let key = path.to_string();
        match body {
            Value::Object(map) => {
                self.docs.write().insert(key, map);
                Ok(())
            }
            _ => Err(StoreError::NotAnObject { path: key }),
        }
    }

    /// `insert` with a `a/b/c/d` path string.
    pub fn put(&self, path: &str, body: Value) -> Result<(), StoreError> {
        self.insert(&DocPath::parse(path)?, body)
    }

    pub fn remove(&self, path: &DocPath) -> bool {
        self.docs.write().remove(&path.to_string()).is_some()
    }

    /// Every later read of exactly `path` (document or collection) fails
    /// with a transport error.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.failing.write().insert(path.into());
    }

    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    /// Number of reads served so far, failed ones included.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn check(&self, path: &str) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.failing.read().contains(path) {
            return Err(StoreError::transport(path, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_doc(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let key = path.to_string();
        self.check(&key)?;
        Ok(self
            .docs
            .read()
            .get(&key)
            .map(|data| Document::new(path.id(), key.clone(), data.clone())))
    }

    async fn get_ordered_collection(
        &self,
        path: &CollectionPath,
        order_by: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let key = path.to_string();
        self.check(&key)?;
        let prefix = format!("{key}/");

        let documents: Vec<Document> = self
            .docs
            .read()
            .range(prefix.clone()..)
            .take_while(|(doc_path, _)| doc_path.starts_with(&prefix))
            .filter_map(|(doc_path, data)| {
                let id = &doc_path[prefix.len()..];
                (!id.contains('/')).then(|| Document::new(id, doc_path.clone(), data.clone()))
            })
            .collect();

        Ok(order_documents(documents, order_by))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn collection_scan_skips_nested_documents() {
        let store = MemoryStore::new();
        store.put("courses/p1/modules/m2", json!({ "order": 1 })).unwrap();
        store.put("courses/p1/modules/m1", json!({ "order": 0 })).unwrap();
        store
            .put("courses/p1/modules/m1/sessions/s1", json!({ "order": 0 }))
            .unwrap();
        store.put("courses/p10/modules/x", json!({ "order": 0 })).unwrap();

        let modules = store
            .get_ordered_collection(&CollectionPath::parse("courses/p1/modules").unwrap(), "order")
            .await
            .unwrap();

        let ids: Vec<&str> = modules.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(modules[0].path, "courses/p1/modules/m1");
    }

    #[tokio::test]
    async fn injected_failure_only_hits_that_path() {
        let store = MemoryStore::new();
        store.put("a/1", json!({ "v": 1 })).unwrap();
        store.put("a/2", json!({ "v": 2 })).unwrap();
        store.fail_path("a/1");

        let err = store.get_doc(&DocPath::parse("a/1").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));

        let ok = store.get_doc(&DocPath::parse("a/2").unwrap()).await.unwrap();
        assert_eq!(ok.unwrap().field("v"), Some(&json!(2)));
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let store = MemoryStore::new();
        let doc = store.get_doc(&DocPath::parse("a/404").unwrap()).await.unwrap();
        assert!(doc.is_none());
    }
}
