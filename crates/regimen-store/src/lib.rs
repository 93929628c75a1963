//! Regimen Store: the document store adapter
//!
//! The resolver only needs two read operations over a hierarchical document
//! namespace: point reads and ordered collection scans. [`DocumentStore`] is
//! that contract; [`MemoryStore`] and [`FsStore`] implement it, and hosted
//! databases plug in behind the same trait.
//!
//! Nothing here writes. A missing document is `Ok(None)`; `Err` is reserved
//! for transport, IO and decode failures.

pub mod document;
pub mod error;
pub mod fs;
pub mod memory;
pub mod paths;

pub use document::{compare_values, order_documents, Document};
pub use error::StoreError;
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use paths::{CollectionPath, DocPath, StoreLayout};

use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// Store Interface
// ============================================================================

/// Read access to a hierarchical document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `Ok(None)` when the document does not exist.
    async fn get_doc(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// All documents directly under `path`, ascending by `order_by`.
    ///
    /// Documents without the `order_by` field are not returned.
    async fn get_ordered_collection(
        &self,
        path: &CollectionPath,
        order_by: &str,
    ) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn get_doc(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        (**self).get_doc(path).await
    }

    async fn get_ordered_collection(
        &self,
        path: &CollectionPath,
        order_by: &str,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).get_ordered_collection(path, order_by).await
    }
}
