//! Resolution output
//!
//! The resolved program has the same shape as the stored template, with
//! every library reference expanded and every override tier applied.
//! [`Resolved`] carries the best-effort result together with the degraded
//! pieces that had to be left out.

use crate::fields::Fields;
use crate::library::{Exercise, LibrarySession};
use serde::{Deserialize, Serialize};

// ============================================================================
// Resolved Documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProgram {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub modules: Vec<ResolvedModule>,
    #[serde(flatten)]
    pub extra: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedModule {
    /// Program module id for modules coming out of a program; library id
    /// while still library-only.
    #[serde(default)]
    pub id: String,
    #[serde(
        rename = "libraryModuleRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub library_module_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default)]
    pub sessions: Vec<ResolvedSession>,
    #[serde(flatten)]
    pub extra: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSession {
    #[serde(default)]
    pub id: String,
    #[serde(
        rename = "librarySessionRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub library_session_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ResolvedSession {
    /// Library body before any override tier is applied.
    pub fn from_library(session: LibrarySession, exercises: Vec<Exercise>) -> Self {
        Self {
            id: session.id,
            library_session_ref: None,
            title: session.title,
            description: session.description,
            image_url: session.image_url,
            order: session.order,
            version: Some(session.version),
            exercises,
            extra: session.extra,
        }
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

impl ResolvedModule {
    pub fn session(&self, id: &str) -> Option<&ResolvedSession> {
        self.sessions.iter().find(|s| s.id == id)
    }
}

impl ResolvedProgram {
    pub fn module(&self, id: &str) -> Option<&ResolvedModule> {
        self.modules.iter().find(|m| m.id == id)
    }
}

// ============================================================================
// Gaps & Outcome
// ============================================================================

/// A degraded piece of a resolution: something optional that could not be
/// fetched and was left out of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionGap {
    /// The client override document could not be read; no client tier applied.
    ClientOverridesUnavailable { path: String, reason: String },
    /// The program has no creator id, so library modules were not expanded.
    LibraryResolutionSkipped { path: String },
    /// A library session inside a module failed to resolve and was dropped.
    SessionDropped {
        path: String,
        library_module_id: String,
        reason: String,
    },
    /// The sets of one exercise could not be read; the exercise has no sets.
    SetsUnavailable {
        path: String,
        exercise_id: String,
        reason: String,
    },
    /// The legacy program-level session override could not be read.
    ProgramOverridesUnavailable { path: String, reason: String },
}

impl ResolutionGap {
    /// Store path of the missing piece.
    pub fn path(&self) -> &str {
        match self {
            ResolutionGap::ClientOverridesUnavailable { path, .. }
            | ResolutionGap::LibraryResolutionSkipped { path }
            | ResolutionGap::SessionDropped { path, .. }
            | ResolutionGap::SetsUnavailable { path, .. }
            | ResolutionGap::ProgramOverridesUnavailable { path, .. } => path,
        }
    }
}

/// Whether a resolution came back whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    Resolved,
    ResolvedWithGaps(&'a [ResolutionGap]),
}

/// A resolved value plus the gaps collected while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub gaps: Vec<ResolutionGap>,
}

impl<T> Resolved<T> {
    pub fn complete(value: T) -> Self {
        Self {
            value,
            gaps: Vec::new(),
        }
    }

    pub fn with_gaps(value: T, gaps: Vec<ResolutionGap>) -> Self {
        Self { value, gaps }
    }

    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn outcome(&self) -> Outcome<'_> {
        if self.gaps.is_empty() {
            Outcome::Resolved
        } else {
            Outcome::ResolvedWithGaps(&self.gaps)
        }
    }

    pub fn missing_paths(&self) -> Vec<&str> {
        self.gaps.iter().map(ResolutionGap::path).collect()
    }

    pub fn push_gap(&mut self, gap: ResolutionGap) {
        self.gaps.push(gap);
    }

    /// Move `child`'s gaps into `self` and hand back its value.
    pub fn absorb<U>(&mut self, child: Resolved<U>) -> U {
        self.gaps.extend(child.gaps);
        child.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            gaps: self.gaps,
        }
    }

    pub fn into_parts(self) -> (T, Vec<ResolutionGap>) {
        (self.value, self.gaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_collects_child_gaps() {
        let mut parent = Resolved::complete(Vec::<u32>::new());
        let child = Resolved::with_gaps(
            7u32,
            vec![ResolutionGap::SetsUnavailable {
                path: "creator_libraries/c/sessions/s/exercises/e/sets".into(),
                exercise_id: "e".into(),
                reason: "timeout".into(),
            }],
        );

        let value = parent.absorb(child);
        parent.value.push(value);

        assert_eq!(parent.value, vec![7]);
        assert!(matches!(parent.outcome(), Outcome::ResolvedWithGaps(g) if g.len() == 1));
        assert_eq!(
            parent.missing_paths(),
            vec!["creator_libraries/c/sessions/s/exercises/e/sets"]
        );
    }

    #[test]
    fn gap_serializes_with_kind_tag() {
        let gap = ResolutionGap::LibraryResolutionSkipped {
            path: "courses/p1".into(),
        };
        assert_eq!(
            serde_json::to_value(&gap).unwrap(),
            serde_json::json!({ "kind": "library_resolution_skipped", "path": "courses/p1" })
        );
    }
}
