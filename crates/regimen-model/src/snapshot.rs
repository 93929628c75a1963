//! Library version snapshots and drift reports
//!
//! A [`VersionSnapshot`] records the `version` counter of every library
//! module and session a program referenced when it was resolved. The caller
//! persists it and later asks whether anything moved; the answer is a
//! [`DriftReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{ modules: { id: version }, sessions: { id: version } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    #[serde(default)]
    pub modules: BTreeMap<String, u64>,
    #[serde(default)]
    pub sessions: BTreeMap<String, u64>,
}

impl VersionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.sessions.is_empty()
    }
}

/// Comparison result for a single library id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VersionStatus {
    Unchanged,
    Changed { old_version: u64, new_version: u64 },
    /// The current version could not be read.
    Unknown { stored_version: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleVersionChange {
    pub module_id: String,
    pub old_version: u64,
    pub new_version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVersionChange {
    pub session_id: String,
    pub old_version: u64,
    pub new_version: u64,
}

/// Outcome of re-checking a snapshot against the live library.
///
/// `needs_update` only reflects versions that were read and differ; ids that
/// could not be read are listed in `unknown_*` so callers can decide to force
/// a re-sync anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub needs_update: bool,
    pub changed_modules: Vec<ModuleVersionChange>,
    pub changed_sessions: Vec<SessionVersionChange>,
    #[serde(default)]
    pub unknown_modules: Vec<String>,
    #[serde(default)]
    pub unknown_sessions: Vec<String>,
}

impl DriftReport {
    pub fn record_module(&mut self, module_id: &str, status: VersionStatus) {
        match status {
            VersionStatus::Unchanged => {}
            VersionStatus::Changed {
                old_version,
                new_version,
            } => {
                self.needs_update = true;
                self.changed_modules.push(ModuleVersionChange {
                    module_id: module_id.to_string(),
                    old_version,
                    new_version,
                });
            }
            VersionStatus::Unknown { .. } => self.unknown_modules.push(module_id.to_string()),
        }
    }

    pub fn record_session(&mut self, session_id: &str, status: VersionStatus) {
        match status {
            VersionStatus::Unchanged => {}
            VersionStatus::Changed {
                old_version,
                new_version,
            } => {
                self.needs_update = true;
                self.changed_sessions.push(SessionVersionChange {
                    session_id: session_id.to_string(),
                    old_version,
                    new_version,
                });
            }
            VersionStatus::Unknown { .. } => self.unknown_sessions.push(session_id.to_string()),
        }
    }

    pub fn has_unknown(&self) -> bool {
        !self.unknown_modules.is_empty() || !self.unknown_sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_uses_wire_field_names() {
        let mut report = DriftReport::default();
        report.record_module(
            "M1",
            VersionStatus::Changed {
                old_version: 3,
                new_version: 4,
            },
        );

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "needsUpdate": true,
                "changedModules": [{ "moduleId": "M1", "oldVersion": 3, "newVersion": 4 }],
                "changedSessions": [],
                "unknownModules": [],
                "unknownSessions": [],
            })
        );
    }

    #[test]
    fn unknown_does_not_flag_update() {
        let mut report = DriftReport::default();
        report.record_session("S1", VersionStatus::Unknown { stored_version: 2 });
        report.record_module("M1", VersionStatus::Unchanged);

        assert!(!report.needs_update);
        assert!(report.has_unknown());
        assert_eq!(report.unknown_sessions, vec!["S1"]);
    }

    #[test]
    fn snapshot_tolerates_missing_maps() {
        let snapshot: VersionSnapshot = serde_json::from_value(json!({ "modules": { "M1": 3 } })).unwrap();
        assert_eq!(snapshot.modules["M1"], 3);
        assert!(snapshot.sessions.is_empty());
    }
}
