//! Store reads shared by the resolvers.

use crate::error::ResolveError;
use crate::Resolver;
use futures::future::join_all;
use regimen_model::{
    Exercise, LibraryModule, LibraryRef, LibrarySession, ResolutionGap, Resolved, SetRecord,
};
use regimen_store::{CollectionPath, DocPath, Document, DocumentStore, StoreError};
use serde::de::DeserializeOwned;

impl<S: DocumentStore> Resolver<S> {
    async fn fetch_ref<T: DeserializeOwned>(
        &self,
        id: &str,
        path: &DocPath,
    ) -> Result<LibraryRef<T>, ResolveError> {
        match self.store.get_doc(path).await? {
            Some(doc) => Ok(LibraryRef::resolved(id, doc.decode::<T>()?)),
            None => Ok(LibraryRef::not_found(id)),
        }
    }

    pub(crate) async fn fetch_library_module(
        &self,
        creator_id: &str,
        module_id: &str,
    ) -> Result<LibraryRef<LibraryModule>, ResolveError> {
        let path = self.layout.library_module(creator_id, module_id)?;
        self.fetch_ref(module_id, &path).await
    }

    pub(crate) async fn fetch_library_session(
        &self,
        creator_id: &str,
        session_id: &str,
    ) -> Result<LibraryRef<LibrarySession>, ResolveError> {
        let path = self.layout.library_session(creator_id, session_id)?;
        self.fetch_ref(session_id, &path).await
    }

    /// Ordered exercises of a session, each with its ordered sets.
    ///
    /// A failed exercises scan is an error. A failed sets scan only empties
    /// that exercise's sets and records a gap.
    pub(crate) async fn fetch_exercises(
        &self,
        exercises: &CollectionPath,
    ) -> Result<Resolved<Vec<Exercise>>, ResolveError> {
        let docs = self
            .store
            .get_ordered_collection(exercises, &self.config.order_field)
            .await?;
        tracing::debug!(path = %exercises, count = docs.len(), "fetching sets");

        let loaded = join_all(docs.iter().map(|doc| self.fetch_exercise(exercises, doc))).await;

        let mut result = Resolved::complete(Vec::with_capacity(loaded.len()));
        for exercise in loaded {
            let exercise = result.absorb(exercise?);
            result.value.push(exercise);
        }
        Ok(result)
    }

    async fn fetch_exercise(
        &self,
        exercises: &CollectionPath,
        doc: &Document,
    ) -> Result<Resolved<Exercise>, ResolveError> {
        let mut exercise: Exercise = doc.decode()?;
        let sets_path = self.layout.sets_of(exercises, &doc.id)?;

        match self.fetch_sets(&sets_path).await {
            Ok(sets) => {
                exercise.sets = sets;
                Ok(Resolved::complete(exercise))
            }
            Err(error) => {
                tracing::warn!(
                    path = %sets_path,
                    exercise_id = %doc.id,
                    error = %error,
                    "sets unavailable, continuing without them"
                );
                exercise.sets = Vec::new();
                let gap = ResolutionGap::SetsUnavailable {
                    path: sets_path.to_string(),
                    exercise_id: doc.id.clone(),
                    reason: error.to_string(),
                };
                Ok(Resolved::with_gaps(exercise, vec![gap]))
            }
        }
    }

    async fn fetch_sets(&self, sets: &CollectionPath) -> Result<Vec<SetRecord>, StoreError> {
        self.store
            .get_ordered_collection(sets, &self.config.order_field)
            .await?
            .iter()
            .map(Document::decode::<SetRecord>)
            .collect()
    }
}
