//! Program (course) templates
//!
//! A program module is either *library-backed* (it carries
//! `libraryModuleRef`) or *standalone* (all content lives on the program).
//! Program sessions double as partial overrides for library sessions and as
//! full session bodies for standalone modules.

use crate::client::ClientSessionOverride;
use crate::fields::{FieldOverride, Fields};
use crate::library::Exercise;
use serde::{Deserialize, Serialize};

/// `courses/{program}` together with its modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramTemplate {
    #[serde(default)]
    pub id: String,
    /// Owner of the library this program draws from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub modules: Vec<ProgramModule>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ProgramTemplate {
    /// Creator id, treating an empty string as missing.
    pub fn creator(&self) -> Option<&str> {
        self.creator_id.as_deref().filter(|c| !c.is_empty())
    }
}

/// `courses/{program}/modules/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramModule {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(
        rename = "libraryModuleRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub library_module_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` when the template did not inline its sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<ProgramSession>>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ProgramModule {
    pub fn library_ref(&self) -> Option<&str> {
        self.library_module_ref
            .as_deref()
            .filter(|r| !r.is_empty())
    }

    pub fn is_library_backed(&self) -> bool {
        self.library_ref().is_some()
    }

    pub fn sessions(&self) -> &[ProgramSession] {
        self.sessions.as_deref().unwrap_or_default()
    }
}

/// A session under a program module: a partial override of a library
/// session, or a complete standalone session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "librarySessionRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub library_session_ref: Option<String>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub title: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub description: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub image_url: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub order: FieldOverride<Option<i64>>,
    /// In-document override block. Preferred over the legacy
    /// `overrides/data` sub-document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<SessionOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ProgramSession {
    /// Identity used when merging tiers: own id first, library ref second.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.library_session_ref.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn library_ref(&self) -> Option<&str> {
        self.library_session_ref
            .as_deref()
            .filter(|r| !r.is_empty())
    }
}

/// Program-level session override, either in-document (`overrides`) or the
/// legacy `.../sessions/{id}/overrides/data` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOverride {
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub title: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub description: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub image_url: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub order: FieldOverride<Option<i64>>,
}

impl SessionOverride {
    /// Scalar fields a program session sets on itself.
    pub fn from_program_session(session: &ProgramSession) -> Self {
        Self {
            title: session.title.clone(),
            description: session.description.clone(),
            image_url: session.image_url.clone(),
            order: session.order.clone(),
        }
    }

    pub fn from_client_session(session: &ClientSessionOverride) -> Self {
        Self {
            title: session.title.clone(),
            description: session.description.clone(),
            image_url: session.image_url.clone(),
            order: session.order.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_unset()
            && self.description.is_unset()
            && self.image_url.is_unset()
            && self.order.is_unset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_without_ref_is_standalone() {
        let module: ProgramModule = serde_json::from_value(json!({
            "id": "pm1",
            "libraryModuleRef": "",
            "title": "Warmup",
        }))
        .unwrap();

        assert!(!module.is_library_backed());
        assert!(module.sessions().is_empty());
        assert!(module.sessions.is_none());
    }

    #[test]
    fn session_key_prefers_own_id() {
        let session: ProgramSession = serde_json::from_value(json!({
            "id": "ps1",
            "librarySessionRef": "ls1",
        }))
        .unwrap();
        assert_eq!(session.key(), Some("ps1"));

        let by_ref: ProgramSession =
            serde_json::from_value(json!({ "librarySessionRef": "ls1" })).unwrap();
        assert_eq!(by_ref.key(), Some("ls1"));
    }

    #[test]
    fn session_override_tracks_explicit_null() {
        let ov: SessionOverride =
            serde_json::from_value(json!({ "title": "Heavy", "image_url": null })).unwrap();

        assert_eq!(ov.title, FieldOverride::Set(Some("Heavy".to_string())));
        assert_eq!(ov.image_url, FieldOverride::Set(None));
        assert!(ov.description.is_unset());
    }
}
