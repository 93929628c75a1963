//! Regimen Model: the document shapes behind program resolution
//!
//! A program (course) is assembled from three tiers of content:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    CONTENT TIERS                                 │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────────┐    │
//! │  │   Library   │──►│   Program   │──►│  Client (per user)   │    │
//! │  │ (versioned) │   │  overrides  │   │      overrides       │    │
//! │  └─────────────┘   └─────────────┘   └──────────────────────┘    │
//! │     modules           may add            may only modify         │
//! │     sessions          sessions           existing entities       │
//! │     exercises                                                    │
//! │     sets                                                         │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate only describes the data. Fetching lives in `regimen-store`,
//! merging and drift detection in `regimen-resolver`.

pub mod client;
pub mod fields;
pub mod library;
pub mod program;
pub mod reference;
pub mod resolved;
pub mod snapshot;

pub use client::{
    ClientExerciseOverride, ClientModuleOverride, ClientProgramOverrides, ClientSessionOverride,
};
pub use fields::{merge_fields, precedence, FieldOverride, Fields, Presence, ScalarField, Truthiness};
pub use library::{Exercise, LibraryModule, LibrarySession, SetRecord};
pub use program::{ProgramModule, ProgramSession, ProgramTemplate, SessionOverride};
pub use reference::{LibraryRef, RefTarget};
pub use resolved::{
    Outcome, ResolutionGap, Resolved, ResolvedModule, ResolvedProgram, ResolvedSession,
};
pub use snapshot::{
    DriftReport, ModuleVersionChange, SessionVersionChange, VersionSnapshot, VersionStatus,
};
