//! Backend-schema extraction
//!
//! Backend types map each table name to an object whose `Row` field is the
//! shape of a selected row:
//!
//! ```typescript
//! Tables: {
//!   products: {
//!     Row: { id: string; name: string | null; tags: string[] | null }
//!     Insert: { ... }
//!   }
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::extractor::scanner::{top_level, BraceMap};
use crate::schema::extractor::SchemaExtractor;
use crate::schema::types::SchemaMap;
use crate::sources::SourceKind;

static OBJECT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*:\s*\{").expect("valid object key regex"));

static ROW_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bRow\s*:\s*\{").expect("valid Row regex"));

static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\w+)\??\s*:\s*(?:(?:string|number|boolean|Json)\b|\w+\s*\|\s*null\b|\w+\s*\[\](?:\s*\|\s*null\b)?)",
    )
    .expect("valid column regex")
});

/// Extractor for backend row-type declarations
#[derive(Debug, Clone, Default)]
pub struct BackendSchemaExtractor;

impl BackendSchemaExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaExtractor for BackendSchemaExtractor {
    fn source_kind(&self) -> SourceKind {
        SourceKind::BackendSchema
    }

    fn extract(&self, text: &str) -> SchemaMap {
        let braces = BraceMap::new(text);
        let mut tables = SchemaMap::new();

        for caps in OBJECT_KEY.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !braces.is_code(whole.start()) {
                continue;
            }
            let open = whole.end() - 1;
            let Some(body) = braces.body(open) else {
                continue;
            };

            // Only a Row field directly inside this object marks a table.
            let fields = top_level(body);
            let Some(row) = ROW_FIELD.find(&fields) else {
                continue;
            };
            let row_open = open + 1 + row.end() - 1;
            let Some(row_body) = braces.body(row_open) else {
                continue;
            };

            let row_fields = top_level(row_body);
            let columns: Vec<String> = COLUMN
                .captures_iter(&row_fields)
                .map(|col| col[1].to_string())
                .collect();

            tracing::debug!(table = name.as_str(), columns = columns.len(), "Extracted backend table");
            tables.insert(name.as_str(), columns);
        }

        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TYPES: &str = r#"export type Json = string | number | boolean | null | { [key: string]: Json | undefined } | Json[]

export type Database = {
  public: {
    Tables: {
      products: {
        Row: {
          id: string
          name: string | null
          price: number
          tags: string[] | null
          metadata: Json | null
          status: Database["public"]["Enums"]["product_status"]
        }
        Insert: {
          id?: string
          name?: string | null
        }
        Relationships: []
      }
      order_items: {
        Row: {
          id: string
          quantity: number
          is_gift: boolean
        }
        Insert: {
          id?: string
        }
      }
    }
    Enums: {
      product_status: "active" | "archived"
    }
  }
}
"#;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_row_columns_per_table() {
        let map = BackendSchemaExtractor::new().extract(TYPES);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["products", "order_items"]);
        assert_eq!(
            map.get("products").unwrap(),
            cols(&["id", "name", "price", "tags", "metadata"]).as_slice()
        );
        assert_eq!(
            map.get("order_items").unwrap(),
            cols(&["id", "quantity", "is_gift"]).as_slice()
        );
    }

    #[test]
    fn test_enclosing_namespaces_are_not_tables() {
        let map = BackendSchemaExtractor::new().extract(TYPES);
        assert!(!map.contains("public"));
        assert!(!map.contains("Tables"));
        assert!(!map.contains("Row"));
    }

    #[test]
    fn test_nested_shape_in_row_does_not_truncate() {
        let map = BackendSchemaExtractor::new().extract(
            "events: { Row: { id: string; payload: { kind: string }; created_at: string } }",
        );

        assert_eq!(map.get("events").unwrap(), cols(&["id", "created_at"]).as_slice());
    }

    #[test]
    fn test_semicolon_separated_row() {
        let map = BackendSchemaExtractor::new()
            .extract("customers: { Row: { CustomerId: string; email: string | null; }; }");

        assert_eq!(map.get("customers").unwrap(), cols(&["CustomerId", "email"]).as_slice());
    }

    #[test]
    fn test_object_without_row_is_skipped() {
        let map = BackendSchemaExtractor::new().extract("settings: { Insert: { id: string } }");
        assert!(map.is_empty());
    }
}
