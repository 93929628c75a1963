//! Per-user client overrides
//!
//! One document per `(user, program)` pair at
//! `client_programs/{user}_{program}`. Every map here is keyed by the id of
//! an entity that already exists in the resolved program; keys that match
//! nothing are ignored, never materialized.

use crate::fields::{FieldOverride, Fields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProgramOverrides {
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub title: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub description: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub image_url: FieldOverride<Option<String>>,
    /// Keyed by program module id (not the library module ref).
    #[serde(default)]
    pub modules: BTreeMap<String, ClientModuleOverride>,
}

impl ClientProgramOverrides {
    pub fn module(&self, program_module_id: &str) -> Option<&ClientModuleOverride> {
        self.modules.get(program_module_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientModuleOverride {
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub title: FieldOverride<Option<String>>,
    #[serde(default)]
    pub sessions: BTreeMap<String, ClientSessionOverride>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ClientModuleOverride {
    pub fn session(&self, session_id: &str) -> Option<&ClientSessionOverride> {
        self.sessions.get(session_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSessionOverride {
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub title: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub description: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub image_url: FieldOverride<Option<String>>,
    #[serde(default, skip_serializing_if = "FieldOverride::is_unset")]
    pub order: FieldOverride<Option<i64>>,
    #[serde(default)]
    pub exercises: BTreeMap<String, ClientExerciseOverride>,
}

/// Shallow field patch for one exercise, plus patches for its sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientExerciseOverride {
    #[serde(default)]
    pub sets: BTreeMap<String, Fields>,
    #[serde(flatten)]
    pub fields: Fields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_override_document() {
        let doc: ClientProgramOverrides = serde_json::from_value(json!({
            "modules": {
                "pm1": {
                    "title": "My week 1",
                    "sessions": {
                        "s1": {
                            "description": "",
                            "exercises": {
                                "e1": { "notes": "knees out", "sets": { "set1": { "reps": 8 } } }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();

        let module = doc.module("pm1").unwrap();
        assert_eq!(module.title, FieldOverride::Set(Some("My week 1".into())));

        let session = module.session("s1").unwrap();
        assert_eq!(session.description, FieldOverride::Set(Some(String::new())));

        let exercise = &session.exercises["e1"];
        assert_eq!(exercise.fields["notes"], json!("knees out"));
        assert_eq!(exercise.sets["set1"]["reps"], json!(8));
        assert!(!exercise.fields.contains_key("sets"));
    }

    #[test]
    fn empty_document_has_no_overrides() {
        let doc: ClientProgramOverrides = serde_json::from_value(json!({})).unwrap();
        assert!(doc.modules.is_empty());
        assert!(doc.title.is_unset());
    }
}
