//! Canonical store paths
//!
//! All resolver reads go through [`StoreLayout`]; no path strings are built
//! anywhere else.
//!
//! ```text
//! creator_libraries/{creator}/
//! ├── modules/{module}
//! └── sessions/{session}
//!     └── exercises/{exercise}
//!         └── sets/{set}
//! courses/{program}
//! └── modules/{module}
//!     └── sessions/{session}
//!         ├── overrides/data          (legacy program override)
//!         └── exercises/{exercise}
//!             └── sets/{set}
//! client_programs/{user}_{program}
//! ```

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Typed Paths
// ============================================================================

fn check_segment(path: &str, segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains('/') {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    Ok(())
}

/// Path to a single document: `collection/id(/collection/id)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    segments: Vec<String>,
}

/// Path to a collection: `collection(/id/collection)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub fn root(name: &str) -> Result<Self, StoreError> {
        check_segment(name, name)?;
        Ok(Self {
            segments: vec![name.to_string()],
        })
    }

    pub fn doc(&self, id: &str) -> Result<DocPath, StoreError> {
        check_segment(&self.to_string(), id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Ok(DocPath { segments })
    }

    /// Parses `a/b/c`; the segment count must be odd.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments = parse_segments(path)?;
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
                segment: segments.last().cloned().unwrap_or_default(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl DocPath {
    pub fn collection(&self, name: &str) -> Result<CollectionPath, StoreError> {
        check_segment(&self.to_string(), name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(CollectionPath { segments })
    }

    /// Parses `a/b`; the segment count must be even.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments = parse_segments(path)?;
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
                segment: segments.last().cloned().unwrap_or_default(),
            });
        }
        Ok(Self { segments })
    }

    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

fn parse_segments(path: &str) -> Result<Vec<String>, StoreError> {
    let segments: Vec<String> = path.split('/').map(str::to_string).collect();
    for segment in &segments {
        check_segment(path, segment)?;
    }
    Ok(segments)
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

// ============================================================================
// Store Layout
// ============================================================================

/// Collection names of the document namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLayout {
    pub libraries: String,
    pub programs: String,
    pub client_programs: String,
    pub modules: String,
    pub sessions: String,
    pub exercises: String,
    pub sets: String,
    /// Legacy program session override: `{overrides}/{overrides_doc}`.
    pub overrides: String,
    pub overrides_doc: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            libraries: "creator_libraries".to_string(),
            programs: "courses".to_string(),
            client_programs: "client_programs".to_string(),
            modules: "modules".to_string(),
            sessions: "sessions".to_string(),
            exercises: "exercises".to_string(),
            sets: "sets".to_string(),
            overrides: "overrides".to_string(),
            overrides_doc: "data".to_string(),
        }
    }
}

impl StoreLayout {
    fn library(&self, creator_id: &str) -> Result<DocPath, StoreError> {
        CollectionPath::root(&self.libraries)?.doc(creator_id)
    }

    pub fn library_module(&self, creator_id: &str, module_id: &str) -> Result<DocPath, StoreError> {
        self.library(creator_id)?
            .collection(&self.modules)?
            .doc(module_id)
    }

    pub fn library_session(
        &self,
        creator_id: &str,
        session_id: &str,
    ) -> Result<DocPath, StoreError> {
        self.library(creator_id)?
            .collection(&self.sessions)?
            .doc(session_id)
    }

    pub fn library_exercises(
        &self,
        creator_id: &str,
        session_id: &str,
    ) -> Result<CollectionPath, StoreError> {
        self.library_session(creator_id, session_id)?
            .collection(&self.exercises)
    }

    pub fn program(&self, program_id: &str) -> Result<DocPath, StoreError> {
        CollectionPath::root(&self.programs)?.doc(program_id)
    }

    pub fn program_modules(&self, program_id: &str) -> Result<CollectionPath, StoreError> {
        self.program(program_id)?.collection(&self.modules)
    }

    pub fn program_sessions(
        &self,
        program_id: &str,
        module_id: &str,
    ) -> Result<CollectionPath, StoreError> {
        self.program_modules(program_id)?
            .doc(module_id)?
            .collection(&self.sessions)
    }

    pub fn program_session(
        &self,
        program_id: &str,
        module_id: &str,
        session_id: &str,
    ) -> Result<DocPath, StoreError> {
        self.program_sessions(program_id, module_id)?.doc(session_id)
    }

    pub fn program_session_overrides(
        &self,
        program_id: &str,
        module_id: &str,
        session_id: &str,
    ) -> Result<DocPath, StoreError> {
        self.program_session(program_id, module_id, session_id)?
            .collection(&self.overrides)?
            .doc(&self.overrides_doc)
    }

    /// Exercises collection under any session document.
    pub fn exercises_of(&self, session: &DocPath) -> Result<CollectionPath, StoreError> {
        session.collection(&self.exercises)
    }

    /// Sets collection under an exercise of `exercises`.
    pub fn sets_of(
        &self,
        exercises: &CollectionPath,
        exercise_id: &str,
    ) -> Result<CollectionPath, StoreError> {
        exercises.doc(exercise_id)?.collection(&self.sets)
    }

    /// `client_programs/{user}_{program}`
    pub fn client_program(&self, user_id: &str, program_id: &str) -> Result<DocPath, StoreError> {
        let root = CollectionPath::root(&self.client_programs)?;
        check_segment(&root.to_string(), user_id)?;
        check_segment(&root.to_string(), program_id)?;
        root.doc(&format!("{user_id}_{program_id}"))
    }
}
