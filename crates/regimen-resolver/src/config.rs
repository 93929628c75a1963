//! Resolver configuration.

use regimen_store::StoreLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Field every ordered collection scan sorts by.
    pub order_field: String,
    /// Read `.../sessions/{id}/overrides/data` when a program session has no
    /// in-document `overrides` block.
    pub legacy_program_overrides: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            order_field: "order".to_string(),
            legacy_program_overrides: true,
        }
    }
}

/// Everything needed to point a resolver at a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimenConfig {
    pub layout: StoreLayout,
    pub resolver: ResolverConfig,
}

impl RegimenConfig {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }
}
