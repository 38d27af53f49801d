//! Sync-rule extraction
//!
//! Sync rules are a sequence of `SELECT` blocks. Column lines follow the
//! block start and a `FROM <table>` line closes the block:
//!
//! ```yaml
//! data:
//!   - SELECT
//!       id,
//!       name, # display name
//!       price
//!     FROM products
//! ```
//!
//! Column expressions may contain keywords and commas inside parentheses or
//! quotes (`EXTRACT(EPOCH FROM created_at) AS created_epoch`); only the
//! top-level text of a line is treated as structure.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::schema::extractor::SchemaExtractor;
use crate::schema::types::SchemaMap;
use crate::sources::SourceKind;
use crate::utils::naming::is_identifier;

static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:-\s*)?SELECT\b(.*)$").expect("valid block start regex"));

static FROM_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFROM\b(?:\s+(\w+))?").expect("valid FROM regex"));

static FROM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^FROM\b(?:\s+(\w+))?").expect("valid FROM line regex"));

static WHERE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^WHERE\b").expect("valid WHERE regex"));

static ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+AS\s+").expect("valid alias regex"));

/// Extractor for declarative sync-rule files
#[derive(Debug, Clone, Default)]
pub struct SyncRulesExtractor;

impl SyncRulesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaExtractor for SyncRulesExtractor {
    fn source_kind(&self) -> SourceKind {
        SourceKind::SyncRules
    }

    fn extract(&self, text: &str) -> SchemaMap {
        let mut tables = SchemaMap::new();
        let mut pending: Option<Block> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            let (column_text, from) = if let Some(caps) = BLOCK_START.captures(line) {
                if let Some(block) = pending.take() {
                    tracing::debug!(
                        start_line = block.start_line,
                        "Discarding SELECT block without FROM"
                    );
                }
                pending = Some(Block::new(line_no));
                let rest = strip_comment(caps.get(1).map_or("", |m| m.as_str()));
                (rest, top_level_from(rest))
            } else {
                if pending.is_none() || line.is_empty() || is_comment(line) || WHERE_LINE.is_match(line)
                {
                    continue;
                }
                let text = strip_comment(line);
                (text, FROM_LINE.captures(text))
            };

            let Some(block) = pending.as_mut() else {
                continue;
            };

            match from {
                Some(caps) => {
                    let (columns, _) = column_text.split_at(caps.get(0).map_or(0, |m| m.start()));
                    block.push(columns);

                    let block = pending.take().unwrap_or_default();
                    match caps.get(1) {
                        Some(table) => {
                            let columns = block.columns();
                            tracing::debug!(
                                table = table.as_str(),
                                columns = columns.len(),
                                line = line_no,
                                "Extracted sync rule"
                            );
                            tables.insert(table.as_str(), columns);
                        }
                        None => tracing::debug!(
                            start_line = block.start_line,
                            "Discarding SELECT block with no table after FROM"
                        ),
                    }
                }
                None => block.push(column_text),
            }
        }

        if let Some(block) = pending {
            tracing::debug!(
                start_line = block.start_line,
                "Discarding SELECT block without FROM at end of input"
            );
        }

        tables
    }
}

/// A SELECT block whose FROM has not been seen yet
#[derive(Debug, Default)]
struct Block {
    start_line: usize,
    lines: Vec<String>,
}

impl Block {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.lines.push(text.to_string());
        }
    }

    /// Split the collected text on top-level commas and line breaks
    ///
    /// A line break inside an open parenthesis continues the fragment.
    fn columns(&self) -> Vec<String> {
        let mut fragments = Vec::new();
        let mut current = String::new();
        let mut nesting = Nesting::default();

        for line in &self.lines {
            for c in line.chars() {
                if nesting.step(c) && c == ',' {
                    fragments.push(std::mem::take(&mut current));
                } else {
                    current.push(c);
                }
            }
            nesting.quote = None;
            if nesting.depth == 0 {
                fragments.push(std::mem::take(&mut current));
            } else {
                current.push(' ');
            }
        }
        fragments.push(current);

        fragments.iter().filter_map(|f| clean_column(f)).collect()
    }
}

/// Parenthesis and quote tracking over a line of column text
#[derive(Debug, Default)]
struct Nesting {
    depth: usize,
    quote: Option<char>,
}

impl Nesting {
    /// Advance past `c`; true when `c` is outside every quote and parenthesis
    fn step(&mut self, c: char) -> bool {
        if let Some(quote) = self.quote {
            if c == quote {
                self.quote = None;
            }
            return false;
        }
        match c {
            '\'' | '"' | '`' => {
                self.quote = Some(c);
                false
            }
            '(' => {
                self.depth += 1;
                false
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }
}

/// First `FROM` keyword in `text` that is not inside parentheses or quotes
fn top_level_from(text: &str) -> Option<Captures<'_>> {
    let mut nesting = Nesting::default();
    let mut scanned = 0;

    FROM_CLAUSE.captures_iter(text).find(|caps| {
        let start = caps.get(0).map_or(0, |m| m.start());
        for c in text[scanned..start].chars() {
            nesting.step(c);
        }
        scanned = start;
        nesting.depth == 0 && nesting.quote.is_none()
    })
}

fn is_comment(text: &str) -> bool {
    text.starts_with('#') || text.starts_with("--")
}

/// Cut a trailing `#` or `--` comment from a line, ignoring markers in quotes
fn strip_comment(line: &str) -> &str {
    let mut nesting = Nesting::default();
    for (index, c) in line.char_indices() {
        if nesting.quote.is_none() && is_comment(&line[index..]) {
            return &line[..index];
        }
        nesting.step(c);
    }
    line
}

/// Reduce a comma-separated fragment to a bare column identifier
fn clean_column(fragment: &str) -> Option<String> {
    let fragment = fragment.trim();
    if fragment.is_empty() || is_comment(fragment) {
        return None;
    }

    let name = ALIAS.split(fragment).last().unwrap_or(fragment).trim();
    let name = name.rsplit('.').next().unwrap_or(name);
    let name = name.trim_matches(|c| c == '"' || c == '`' || c == '\'');

    if is_identifier(name) {
        Some(name.to_string())
    } else {
        tracing::debug!(fragment, "Skipping non-identifier column fragment");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> SchemaMap {
        SyncRulesExtractor::new().extract(text)
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_multiline_block() {
        let map = extract(
            "bucket_definitions:\n  global:\n    data:\n      - SELECT\n          id,\n          name,\n          price\n        FROM products\n",
        );

        assert_eq!(map.table_count(), 1);
        assert_eq!(map.get("products").unwrap(), cols(&["id", "name", "price"]).as_slice());
    }

    #[test]
    fn test_comments_and_where_lines_are_skipped() {
        let map = extract(
            "- SELECT\n    id, # primary key\n    # legacy_code,\n    -- old_total,\n\n    total -- grand total\n  FROM orders\n  WHERE owner_id = bucket.user_id\n",
        );

        assert_eq!(map.get("orders").unwrap(), cols(&["id", "total"]).as_slice());
    }

    #[test]
    fn test_several_columns_per_line_are_split() {
        let map = extract("- SELECT\n    id, name,   price,\n    stock\n  FROM products\n");
        assert_eq!(
            map.get("products").unwrap(),
            cols(&["id", "name", "price", "stock"]).as_slice()
        );
    }

    #[test]
    fn test_block_without_from_is_discarded() {
        let map = extract("- SELECT\n    id,\n    name\n");
        assert!(map.is_empty());
    }

    #[test]
    fn test_new_block_discards_pending_block() {
        let map = extract("- SELECT\n    id\n- SELECT\n    code\n  FROM regions\n");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["regions"]);
        assert_eq!(map.get("regions").unwrap(), cols(&["code"]).as_slice());
    }

    #[test]
    fn test_duplicate_table_last_write_wins() {
        let map = extract("- SELECT\n    id\n  FROM orders\n- SELECT\n    id, total\n  FROM orders\n");

        assert_eq!(map.table_count(), 1);
        assert_eq!(map.get("orders").unwrap(), cols(&["id", "total"]).as_slice());
    }

    #[test]
    fn test_single_line_select() {
        let map = extract("  - SELECT id, name FROM customers WHERE active = true\n");
        assert_eq!(map.get("customers").unwrap(), cols(&["id", "name"]).as_slice());
    }

    #[test]
    fn test_columns_on_select_line_are_kept() {
        let map = extract("- SELECT id,\n    name\n  FROM customers\n");
        assert_eq!(map.get("customers").unwrap(), cols(&["id", "name"]).as_slice());
    }

    #[test]
    fn test_aliases_and_qualifiers_are_reduced() {
        let map = extract(
            "- SELECT\n    products.id,\n    p.name AS title,\n    \"price\",\n    *\n  FROM products\n",
        );
        assert_eq!(
            map.get("products").unwrap(),
            cols(&["id", "title", "price"]).as_slice()
        );
    }

    #[test]
    fn test_from_without_table_discards_block() {
        let map = extract("- SELECT\n    id\n  FROM\n  orders\n");
        assert!(map.is_empty());
    }

    #[test]
    fn test_column_names_starting_with_from_are_not_clauses() {
        let map = extract("- SELECT\n    id,\n    from_date\n  FROM bookings\n");
        assert_eq!(map.get("bookings").unwrap(), cols(&["id", "from_date"]).as_slice());
    }

    #[test]
    fn test_lines_outside_blocks_are_ignored() {
        let map = extract("bucket_definitions:\n  by_user:\n    parameters: SELECT request.user_id() as user_id\n");
        assert!(map.is_empty());
    }

    #[test]
    fn test_table_is_first_identifier_after_from() {
        let map = extract("- SELECT\n    id\n  FROM orders o\n");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["orders"]);
    }

    #[test]
    fn test_from_inside_function_call_does_not_close_block() {
        let map = extract(
            "- SELECT\n    id,\n    EXTRACT(EPOCH FROM created_at) AS created_epoch,\n    name\n  FROM events\n",
        );

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["events"]);
        assert_eq!(
            map.get("events").unwrap(),
            cols(&["id", "created_epoch", "name"]).as_slice()
        );
    }

    #[test]
    fn test_commas_inside_calls_do_not_split_columns() {
        let map = extract(
            "- SELECT\n    id,\n    json_extract(data, '$.x') AS x,\n    COALESCE(nick, name, 'n/a') AS display_name\n  FROM profiles\n",
        );

        assert_eq!(
            map.get("profiles").unwrap(),
            cols(&["id", "x", "display_name"]).as_slice()
        );
    }

    #[test]
    fn test_expression_without_alias_is_dropped() {
        let map = extract("- SELECT\n    id,\n    lower(email),\n    total\n  FROM orders\n");
        assert_eq!(map.get("orders").unwrap(), cols(&["id", "total"]).as_slice());
    }

    #[test]
    fn test_expression_spanning_lines_is_one_column() {
        let map = extract(
            "- SELECT\n    id,\n    json_extract(\n      data,\n      '$.tags'\n    ) AS tags\n  FROM posts\n",
        );
        assert_eq!(map.get("posts").unwrap(), cols(&["id", "tags"]).as_slice());
    }

    #[test]
    fn test_single_line_select_ignores_from_in_call() {
        let map = extract("- SELECT id, EXTRACT(YEAR FROM placed_at) AS year FROM orders\n");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["orders"]);
        assert_eq!(map.get("orders").unwrap(), cols(&["id", "year"]).as_slice());
    }

    #[test]
    fn test_comment_markers_in_quotes_are_kept() {
        let map = extract("- SELECT\n    json_extract(data, '$.a#b') AS tag, # note\n    id\n  FROM posts\n");
        assert_eq!(map.get("posts").unwrap(), cols(&["tag", "id"]).as_slice());
    }
}
