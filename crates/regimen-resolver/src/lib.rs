//! Regimen Resolver: library → program → client override resolution
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        RESOLUTION PIPELINE                           │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  load_program_template ──► resolve_client_program                    │
//! │                               │                                      │
//! │                               ├─ client overrides (degradable)       │
//! │                               └─ per module (parallel)               │
//! │                                    │                                 │
//! │                 library-backed ────┼──── standalone                  │
//! │                       │            │          │                      │
//! │          resolve_library_module    │   merge_module_overrides        │
//! │                       │            │          (program as base)      │
//! │          resolve_library_session ×N (parallel, droppable)            │
//! │                       │                                              │
//! │          exercises + sets (sets degradable)                          │
//! │                                                                      │
//! │  extract_library_versions ──► VersionSnapshot                        │
//! │  check_library_versions_changed ──► DriftReport                      │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fatal failures surface as [`ResolveError`]; everything else is collected
//! as [`regimen_model::ResolutionGap`]s on the returned
//! [`regimen_model::Resolved`] value.

pub mod config;
pub mod error;
mod fetch;
pub mod merge;
mod module;
mod program;
mod session;
mod template;
mod versions;

pub use config::{RegimenConfig, ResolverConfig};
pub use error::ResolveError;
pub use merge::{
    apply_exercise_overrides, apply_session_overrides, merge_module_overrides,
    merge_program_overrides,
};
pub use module::{ModuleOverrides, ModuleScope};
pub use session::SessionScope;
pub use versions::LibraryRefs;

use regimen_store::{DocumentStore, StoreLayout};

/// Resolution entry point bound to one document store.
///
/// All operations are read-only and safe to run concurrently.
#[derive(Debug, Clone)]
pub struct Resolver<S> {
    store: S,
    layout: StoreLayout,
    config: ResolverConfig,
}

impl<S: DocumentStore> Resolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RegimenConfig::default())
    }

    pub fn with_config(store: S, config: RegimenConfig) -> Self {
        Self {
            store,
            layout: config.layout,
            config: config.resolver,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
