//! Naming utilities for SchemaParity
//!
//! This module provides the name normalisations used when comparing
//! identifiers across sources.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Normalise a table or column name for comparison
///
/// Two names are considered equal iff their normalised forms are equal.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Convert a declared identifier to snake_case
///
/// An underscore is inserted before every uppercase letter that is not the
/// first character, then the whole name is lower-cased.
pub fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);

    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }

    snake
}

/// Remove every underscore from a name
pub fn strip_underscores(name: &str) -> String {
    name.replace('_', "")
}

/// Check whether a token is a bare identifier
pub fn is_identifier(token: &str) -> bool {
    IDENTIFIER.is_match(token)
}
