//! Utilities for SchemaParity
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{is_identifier, normalize_name, strip_underscores, to_snake_case};
