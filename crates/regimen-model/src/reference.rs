//! References into a creator library.

use serde::{Deserialize, Serialize};

/// A library id together with what it resolved to at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRef<T> {
    pub id: String,
    pub target: RefTarget<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RefTarget<T> {
    Resolved(T),
    NotFound,
}

impl<T> LibraryRef<T> {
    pub fn resolved(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            target: RefTarget::Resolved(value),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: RefTarget::NotFound,
        }
    }

    /// Dangling references become `err(id)`.
    pub fn require<E>(self, err: impl FnOnce(String) -> E) -> Result<T, E> {
        match self.target {
            RefTarget::Resolved(value) => Ok(value),
            RefTarget::NotFound => Err(err(self.id)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LibraryRef<U> {
        LibraryRef {
            id: self.id,
            target: match self.target {
                RefTarget::Resolved(value) => RefTarget::Resolved(f(value)),
                RefTarget::NotFound => RefTarget::NotFound,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_dangling_id() {
        let dangling: LibraryRef<u64> = LibraryRef::not_found("m9");
        assert_eq!(dangling.require(|id| format!("missing {id}")), Err("missing m9".to_string()));

        let found = LibraryRef::resolved("m1", 3u64);
        assert_eq!(found.target, RefTarget::Resolved(3));
        assert_eq!(found.map(|v| v + 1).require(|_| ()), Ok(4));
    }
}
