//! Schema sources for SchemaParity
//!
//! This module names the three schema descriptions and loads their raw text.

pub mod loader;

use std::fmt;

pub use loader::{load_sources, SourceSet};

/// One of the three independently authored schema descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Declarative sync rules, the comparison baseline
    SyncRules,
    /// Client-side schema
    ClientSchema,
    /// Backend schema types
    BackendSchema,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::SyncRules,
        SourceKind::ClientSchema,
        SourceKind::BackendSchema,
    ];

    /// Sources compared against the sync-rule baseline
    pub const TARGETS: [SourceKind; 2] = [SourceKind::ClientSchema, SourceKind::BackendSchema];

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::SyncRules => "sync rules",
            SourceKind::ClientSchema => "client schema",
            SourceKind::BackendSchema => "backend schema",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
