//! Version Snapshot & Drift Detector
//!
//! Every library module and session carries a `version` counter. A snapshot
//! records the counters a program was resolved against; a later drift check
//! re-reads them and reports what moved.

use crate::Resolver;
use futures::future::join_all;
use regimen_model::{
    DriftReport, ProgramModule, ResolvedModule, VersionSnapshot, VersionStatus,
};
use regimen_store::{DocPath, DocumentStore, StoreError};
use serde::Deserialize;
use std::collections::BTreeSet;

/// The counter, plus a module's session list; library documents are
/// otherwise opaque here.
#[derive(Deserialize)]
struct Versioned {
    #[serde(default)]
    version: u64,
    #[serde(rename = "sessionRefs", default)]
    session_refs: Vec<String>,
}

/// Anything that can point into a creator library.
pub trait LibraryRefs {
    fn library_module_ref(&self) -> Option<&str>;
    fn library_session_refs(&self) -> Vec<&str>;
}

impl LibraryRefs for ProgramModule {
    fn library_module_ref(&self) -> Option<&str> {
        self.library_ref()
    }

    fn library_session_refs(&self) -> Vec<&str> {
        self.sessions()
            .iter()
            .filter_map(|session| session.library_ref())
            .collect()
    }
}

impl LibraryRefs for ResolvedModule {
    fn library_module_ref(&self) -> Option<&str> {
        self.library_module_ref.as_deref().filter(|r| !r.is_empty())
    }

    fn library_session_refs(&self) -> Vec<&str> {
        self.sessions
            .iter()
            .filter_map(|session| session.library_session_ref.as_deref())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Module,
    Session,
}

impl<S: DocumentStore> Resolver<S> {
    async fn read_versioned(
        &self,
        creator_id: &str,
        kind: Kind,
        id: &str,
    ) -> Result<Option<Versioned>, StoreError> {
        let path: DocPath = match kind {
            Kind::Module => self.layout.library_module(creator_id, id)?,
            Kind::Session => self.layout.library_session(creator_id, id)?,
        };
        match self.store.get_doc(&path).await? {
            Some(doc) => Ok(Some(doc.decode::<Versioned>()?)),
            None => Ok(None),
        }
    }

    async fn current_version(
        &self,
        creator_id: &str,
        kind: Kind,
        id: &str,
    ) -> Result<Option<u64>, StoreError> {
        Ok(self
            .read_versioned(creator_id, kind, id)
            .await?
            .map(|entry| entry.version))
    }

    /// Records the current `version` of every library module and session
    /// the given modules reference.
    ///
    /// Sessions are collected from every module, library-backed or not, and
    /// from the `sessionRefs` of each referenced library module. Each id is
    /// read once. Ids that are missing or cannot be read are left out of the
    /// snapshot.
    #[tracing::instrument(skip(self, modules), fields(modules = modules.len()))]
    pub async fn extract_library_versions<M: LibraryRefs>(
        &self,
        creator_id: &str,
        modules: &[M],
    ) -> VersionSnapshot {
        let mut module_ids = BTreeSet::new();
        let mut session_ids = BTreeSet::new();
        for module in modules {
            if let Some(module_ref) = module.library_module_ref() {
                module_ids.insert(module_ref);
            }
            session_ids.extend(module.library_session_refs().into_iter().map(str::to_string));
        }

        let mut snapshot = VersionSnapshot::default();
        let library_modules = join_all(module_ids.iter().map(|id| async move {
            (*id, self.read_versioned(creator_id, Kind::Module, id).await)
        }))
        .await;
        for (id, entry) in library_modules {
            let Some(entry) = recordable(id, entry) else {
                continue;
            };
            snapshot.modules.insert(id.to_string(), entry.version);
            session_ids.extend(entry.session_refs.into_iter().filter(|r| !r.is_empty()));
        }

        let library_sessions = join_all(session_ids.iter().map(|id| async move {
            (id.as_str(), self.read_versioned(creator_id, Kind::Session, id).await)
        }))
        .await;
        for (id, entry) in library_sessions {
            if let Some(entry) = recordable(id, entry) {
                snapshot.sessions.insert(id.to_string(), entry.version);
            }
        }
        snapshot
    }

    /// Compares a stored snapshot against the live library.
    ///
    /// Ids whose current version cannot be read are reported as unknown, not
    /// as unchanged, and do not set `needs_update`.
    #[tracing::instrument(skip(self, stored))]
    pub async fn check_library_versions_changed(
        &self,
        creator_id: &str,
        stored: &VersionSnapshot,
    ) -> DriftReport {
        let lookups = stored
            .modules
            .iter()
            .map(|(id, version)| (Kind::Module, id.as_str(), *version))
            .chain(
                stored
                    .sessions
                    .iter()
                    .map(|(id, version)| (Kind::Session, id.as_str(), *version)),
            );
        let statuses = join_all(lookups.map(|(kind, id, stored_version)| async move {
            let status = match self.current_version(creator_id, kind, id).await {
                Ok(Some(current)) if current == stored_version => VersionStatus::Unchanged,
                Ok(Some(current)) => VersionStatus::Changed {
                    old_version: stored_version,
                    new_version: current,
                },
                Ok(None) => {
                    tracing::warn!(id = %id, "library document missing, version unknown");
                    VersionStatus::Unknown { stored_version }
                }
                Err(error) => {
                    tracing::warn!(id = %id, error = %error, "version lookup failed, version unknown");
                    VersionStatus::Unknown { stored_version }
                }
            };
            (kind, id, status)
        }))
        .await;

        let mut report = DriftReport::default();
        for (kind, id, status) in statuses {
            match kind {
                Kind::Module => report.record_module(id, status),
                Kind::Session => report.record_session(id, status),
            }
        }
        tracing::debug!(
            needs_update = report.needs_update,
            unknown = report.unknown_modules.len() + report.unknown_sessions.len(),
            "drift check complete"
        );
        report
    }
}

fn recordable(id: &str, entry: Result<Option<Versioned>, StoreError>) -> Option<Versioned> {
    match entry {
        Ok(Some(entry)) => Some(entry),
        Ok(None) => {
            tracing::warn!(id = %id, "library document missing, not recorded");
            None
        }
        Err(error) => {
            tracing::warn!(id = %id, error = %error, "version lookup failed, not recorded");
            None
        }
    }
}
