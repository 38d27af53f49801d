//! Name reconciliation
//!
//! Sources name the same table differently (`order_items`, `OrderItems`,
//! `orderItems`). Lookups try progressively looser matches and the first
//! tier that finds a key wins.

use std::fmt;

use crate::schema::types::SchemaMap;
use crate::utils::naming::{normalize_name, strip_underscores};

/// How a table name was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    UnderscoreInsensitive,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Exact => f.write_str("exact"),
            MatchTier::CaseInsensitive => f.write_str("case-insensitive"),
            MatchTier::UnderscoreInsensitive => f.write_str("underscore-insensitive"),
        }
    }
}

/// A table name resolved in a candidate schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTable<'a> {
    pub name: &'a str,
    pub columns: &'a [String],
    pub tier: MatchTier,
}

/// Resolves names across naming conventions
#[derive(Debug, Clone, Copy, Default)]
pub struct NameReconciler;

impl NameReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Find the key of `candidates` that best matches `table`
    pub fn resolve_table<'a>(&self, table: &str, candidates: &'a SchemaMap) -> Option<ResolvedTable<'a>> {
        let found = |name: &'a str, tier: MatchTier| {
            candidates.get(name).map(|columns| ResolvedTable { name, columns, tier })
        };

        if let Some(name) = candidates.keys().find(|&key| key == table) {
            return found(name, MatchTier::Exact);
        }

        let lowered = normalize_name(table);
        if let Some(name) = candidates.keys().find(|key| normalize_name(key) == lowered) {
            return found(name, MatchTier::CaseInsensitive);
        }

        // Case is folded here too, so `OrderItems` meets `order_items`.
        let stripped = strip_underscores(&lowered);
        candidates
            .keys()
            .find(|key| strip_underscores(&normalize_name(key)) == stripped)
            .and_then(|name| found(name, MatchTier::UnderscoreInsensitive))
    }

    /// Find the column of `candidates` matching `column`, ignoring case
    pub fn resolve_column<'a>(&self, column: &str, candidates: &'a [String]) -> Option<&'a str> {
        let lowered = normalize_name(column);
        candidates
            .iter()
            .find(|candidate| normalize_name(candidate) == lowered)
            .map(String::as_str)
    }
}
