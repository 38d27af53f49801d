//! Schema extraction
//!
//! Each source dialect has an extractor turning raw text into a
//! [`SchemaMap`]. Malformed declarations are skipped, never reported.

pub mod backend_schema;
pub mod client_schema;
pub mod scanner;
pub mod sync_rules;

pub use backend_schema::BackendSchemaExtractor;
pub use client_schema::ClientSchemaExtractor;
pub use sync_rules::SyncRulesExtractor;

use crate::config::ExtractionConfig;
use crate::schema::types::{ExtractedSchemas, SchemaMap};
use crate::sources::{SourceKind, SourceSet};

/// Extracts tables and their columns from one source dialect
pub trait SchemaExtractor {
    /// The source this extractor reads
    fn source_kind(&self) -> SourceKind;

    /// Parse raw source text into a schema map
    fn extract(&self, text: &str) -> SchemaMap;
}

/// Extractor for the given source
pub fn extractor_for(kind: SourceKind, config: &ExtractionConfig) -> Box<dyn SchemaExtractor> {
    match kind {
        SourceKind::SyncRules => Box::new(SyncRulesExtractor::new()),
        SourceKind::ClientSchema => Box::new(ClientSchemaExtractor::new(
            config.client_column_types.clone(),
        )),
        SourceKind::BackendSchema => Box::new(BackendSchemaExtractor::new()),
    }
}

/// Run all three extractors over the loaded sources
pub fn extract_all(sources: &SourceSet, config: &ExtractionConfig) -> ExtractedSchemas {
    let extract = |kind: SourceKind| {
        let map = extractor_for(kind, config).extract(sources.text(kind));
        tracing::info!(source = %kind, tables = map.table_count(), "Extracted tables");
        map
    };

    ExtractedSchemas::new(
        extract(SourceKind::SyncRules),
        extract(SourceKind::ClientSchema),
        extract(SourceKind::BackendSchema),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_for_matches_kind() {
        let config = ExtractionConfig::default();
        for kind in SourceKind::ALL {
            assert_eq!(extractor_for(kind, &config).source_kind(), kind);
        }
    }

    #[test]
    fn test_extract_all_routes_each_source() {
        let sources = SourceSet::new(
            "- SELECT id\n  FROM products\n",
            "const products = new Table({ id: column.text });",
            "products: { Row: { id: string } }",
        );
        let schemas = extract_all(&sources, &ExtractionConfig::default());

        assert!(schemas.sync_rules.contains("products"));
        assert!(schemas.client_schema.contains("products"));
        assert!(schemas.backend_schema.contains("products"));
    }
}
