//! Store errors.

/// Failures reading from a document store.
///
/// A document that does not exist is not an error: reads return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid path segment {segment:?} in {path:?}")]
    InvalidPath { path: String, segment: String },
    #[error("Transport error reading {path}: {message}")]
    Transport { path: String, message: String },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Document at {path} is not a JSON object")]
    NotAnObject { path: String },
}

impl StoreError {
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Transport {
            path: path.into(),
            message: message.into(),
        }
    }
}
