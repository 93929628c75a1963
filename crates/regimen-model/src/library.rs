//! Creator library documents
//!
//! Library content is authored once and referenced from many programs.
//! Modules and sessions carry a `version` counter that authoring flows bump
//! on every edit; exercises and sets are opaque leaf records.

use crate::fields::Fields;
use serde::{Deserialize, Serialize};

/// `creator_libraries/{creator}/modules/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryModule {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Ordered library session ids.
    #[serde(rename = "sessionRefs", default)]
    pub session_refs: Vec<String>,
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub extra: Fields,
}

/// `creator_libraries/{creator}/sessions/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySession {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub extra: Fields,
}

/// An exercise inside a session. `sets` is a sub-collection in storage and is
/// filled in during resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
    #[serde(flatten)]
    pub fields: Fields,
}

/// Leaf record (reps, weight, rest...). The resolver never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Exercise {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            sets: Vec::new(),
            fields,
        }
    }
}

impl SetRecord {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}
