use regimen_store::StoreError;

/// Fatal resolution failures.
///
/// Anything that only degrades the result is reported as a
/// [`regimen_model::ResolutionGap`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Library module {module_id} not found in library of {creator_id}")]
    ModuleNotFound {
        creator_id: String,
        module_id: String,
    },
    #[error("Library session {session_id} not found in library of {creator_id}")]
    SessionNotFound {
        creator_id: String,
        session_id: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
