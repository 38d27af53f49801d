//! Schema module for SchemaParity
//!
//! This module handles schema extraction, name reconciliation and comparison.

pub mod diff;
pub mod extractor;
pub mod reconciler;
pub mod types;

// Re-export key types
pub use diff::{ComparisonOutcome, SchemaDiff, TableComparison, TargetComparison};
pub use extractor::{
    extract_all, BackendSchemaExtractor, ClientSchemaExtractor, SchemaExtractor,
    SyncRulesExtractor,
};
pub use reconciler::{MatchTier, NameReconciler, ResolvedTable};
pub use types::{ExtractedSchemas, SchemaMap};
