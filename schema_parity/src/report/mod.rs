//! Comparison report
//!
//! A report is built fresh for every run. Issues are blocking mismatches,
//! warnings are non-blocking extras and matches are tables consistent across
//! all three sources.

pub mod builder;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::types::ExtractedSchemas;
use crate::sources::SourceKind;

pub use builder::{build_report, ReportBuilder};

/// Title of the persisted report
pub const REPORT_TITLE: &str = "Sync rules / client schema / backend schema compatibility report";

const RULE_WIDTH: usize = 80;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Issue,
    Warning,
}

/// What a finding is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// The baseline table does not exist in the source
    MissingTable,
    /// Baseline columns absent from the source
    MissingColumns(Vec<String>),
    /// Source columns absent from the baseline
    ExtraColumns(Vec<String>),
}

/// A single issue or warning about one table in one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub table: String,
    pub source: SourceKind,
    pub kind: FindingKind,
}

impl Finding {
    pub fn new(table: impl Into<String>, source: SourceKind, kind: FindingKind) -> Self {
        Self {
            table: table.into(),
            source,
            kind,
        }
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            FindingKind::MissingTable | FindingKind::MissingColumns(_) => Severity::Issue,
            FindingKind::ExtraColumns(_) => Severity::Warning,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FindingKind::MissingTable => {
                write!(f, "Table '{}' is missing from {}", self.table, self.source)
            }
            FindingKind::MissingColumns(columns) => write!(
                f,
                "Columns missing from {} for table '{}': {}",
                self.source,
                self.table,
                columns.join(", ")
            ),
            FindingKind::ExtraColumns(columns) => write!(
                f,
                "Extra columns in {} for table '{}': {}",
                self.source,
                self.table,
                columns.join(", ")
            ),
        }
    }
}

/// Declared table counts per source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub sync_rules: usize,
    pub client_schema: usize,
    pub backend_schema: usize,
}

impl SourceCounts {
    pub fn from_schemas(schemas: &ExtractedSchemas) -> Self {
        Self {
            sync_rules: schemas.sync_rules.table_count(),
            client_schema: schemas.client_schema.table_count(),
            backend_schema: schemas.backend_schema.table_count(),
        }
    }

    pub fn get(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::SyncRules => self.sync_rules,
            SourceKind::ClientSchema => self.client_schema,
            SourceKind::BackendSchema => self.backend_schema,
        }
    }
}

/// Aggregated comparison results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub counts: SourceCounts,
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub matches: Vec<String>,
}

impl Report {
    /// Create a new empty report
    pub fn new(counts: SourceCounts) -> Self {
        Self {
            generated_at: Utc::now(),
            counts,
            issues: Vec::new(),
            warnings: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Add a finding to the issues or warnings, by severity
    pub fn add_finding(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Issue => self.issues.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub fn add_match(&mut self, table: impl Into<String>) {
        self.matches.push(table.into());
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// No issues and no warnings
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.warnings.is_empty()
    }

    /// Final summary section of the console transcript
    pub fn render_summary(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = format!("{rule}\nFinal report\n{rule}\n");
        self.write_sections(&mut out);
        if self.is_clean() {
            out.push_str("\nEverything matches! No problems found.\n");
        }
        out
    }

    /// Full text of the persisted report
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{REPORT_TITLE}\n{}\nGenerated at: {}\n\n",
            "=".repeat(RULE_WIDTH),
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        for kind in SourceKind::ALL {
            out.push_str(&format!("Tables in {}: {}\n", kind, self.counts.get(kind)));
        }
        self.write_sections(&mut out);
        out
    }

    /// Save to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text()).map_err(|source| Error::ReportWriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_sections(&self, out: &mut String) {
        // Writing into a String cannot fail.
        if !self.issues.is_empty() {
            let _ = writeln!(out, "\nIssues ({}):", self.issues.len());
            for issue in &self.issues {
                let _ = writeln!(out, "   {issue}");
            }
        }
        if !self.warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings ({}):", self.warnings.len());
            for warning in &self.warnings {
                let _ = writeln!(out, "   {warning}");
            }
        }
        if !self.matches.is_empty() {
            let _ = writeln!(out, "\nMatched tables ({}):", self.matches.len());
            for table in &self.matches {
                let _ = writeln!(out, "   - {table}");
            }
        }
    }
}
