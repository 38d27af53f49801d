//! Type definitions for extracted schemas

use indexmap::{IndexMap, IndexSet};

use crate::sources::SourceKind;

/// Table name to ordered column names, as extracted from one source
///
/// Insertion order is kept for stable output; comparison itself is
/// set-based. Alias entries resolve to the same columns as the table they
/// were derived from and are not counted as declared tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    tables: IndexMap<String, Vec<String>>,
    aliases: IndexSet<String>,
}

impl SchemaMap {
    /// Create a new empty schema map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing any earlier definition under the same name
    pub fn insert(&mut self, table: impl Into<String>, columns: Vec<String>) {
        let table = table.into();
        self.aliases.shift_remove(&table);
        self.tables.insert(table, columns);
    }

    /// Insert a lookup alias for a table's columns
    ///
    /// A declared table with the same name always takes precedence.
    pub fn insert_alias(&mut self, alias: impl Into<String>, columns: Vec<String>) {
        let alias = alias.into();
        if self.tables.contains_key(&alias) && !self.aliases.contains(&alias) {
            return;
        }
        self.aliases.insert(alias.clone());
        self.tables.insert(alias, columns);
    }

    pub fn get(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// All lookup keys, aliases included, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Declared tables with their columns, in insertion order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .iter()
            .filter(|(name, _)| !self.aliases.contains(*name))
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    pub fn is_alias(&self, key: &str) -> bool {
        self.aliases.contains(key)
    }

    /// Number of declared tables
    pub fn table_count(&self) -> usize {
        self.tables.len() - self.aliases.len()
    }

    /// Number of lookup keys, aliases included
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// The three extracted schemas of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSchemas {
    pub sync_rules: SchemaMap,
    pub client_schema: SchemaMap,
    pub backend_schema: SchemaMap,
}

impl ExtractedSchemas {
    pub fn new(sync_rules: SchemaMap, client_schema: SchemaMap, backend_schema: SchemaMap) -> Self {
        Self {
            sync_rules,
            client_schema,
            backend_schema,
        }
    }

    pub fn get(&self, kind: SourceKind) -> &SchemaMap {
        match kind {
            SourceKind::SyncRules => &self.sync_rules,
            SourceKind::ClientSchema => &self.client_schema,
            SourceKind::BackendSchema => &self.backend_schema,
        }
    }
}
