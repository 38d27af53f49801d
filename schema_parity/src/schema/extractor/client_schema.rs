//! Client-schema extraction
//!
//! Each table is declared as a constant holding a `Table` whose first
//! argument maps column identifiers to column types:
//!
//! ```typescript
//! const OrderItems = new Table({
//!   id: column.text,
//!   quantity: column.integer,
//! }, { indexes: { order: ['order_id'] } });
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::extractor::scanner::{top_level, BraceMap};
use crate::schema::extractor::SchemaExtractor;
use crate::schema::types::SchemaMap;
use crate::sources::SourceKind;
use crate::utils::naming::to_snake_case;

static TABLE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+(\w+)\s*=\s*new\s+Table\s*\(\s*\{")
        .expect("valid table declaration regex")
});

static COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*:\s*column\.(\w+)").expect("valid column regex"));

/// Extractor for the client-side schema source
#[derive(Debug, Clone, Default)]
pub struct ClientSchemaExtractor {
    column_types: Option<Vec<String>>,
}

impl ClientSchemaExtractor {
    /// Create an extractor; `column_types` restricts the recognized
    /// `column.<type>` descriptors, `None` accepts any
    pub fn new(column_types: Option<Vec<String>>) -> Self {
        Self { column_types }
    }

    fn is_recognized(&self, column_type: &str) -> bool {
        match &self.column_types {
            Some(types) => types.iter().any(|t| t == column_type),
            None => true,
        }
    }
}

impl SchemaExtractor for ClientSchemaExtractor {
    fn source_kind(&self) -> SourceKind {
        SourceKind::ClientSchema
    }

    fn extract(&self, text: &str) -> SchemaMap {
        let braces = BraceMap::new(text);
        let mut tables = SchemaMap::new();

        for caps in TABLE_DECLARATION.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let open = whole.end() - 1;
            if !braces.is_code(whole.start()) {
                continue;
            }
            let Some(body) = braces.body(open) else {
                tracing::debug!(table = name.as_str(), "Skipping unterminated table declaration");
                continue;
            };

            let fields = top_level(body);
            let columns: Vec<String> = COLUMN
                .captures_iter(&fields)
                .filter(|col| self.is_recognized(&col[2]))
                .map(|col| col[1].to_string())
                .collect();

            let declared = name.as_str();
            tracing::debug!(table = declared, columns = columns.len(), "Extracted client table");

            let snake = to_snake_case(declared);
            tables.insert(declared, columns.clone());
            if snake != declared {
                tables.insert_alias(snake, columns);
            }
        }

        tables
    }
}
