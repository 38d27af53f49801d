//! SchemaParity: checks that sync rules, a client-side schema and a backend
//! schema describe the same tables and columns
//!
//! The sync rules are the baseline. Every table they select is looked up in
//! the client and backend schemas, naming differences are reconciled, and
//! the column sets are compared into a report of issues, warnings and
//! matched tables.

pub mod config;
pub mod error;
pub mod report;
pub mod schema;
pub mod sources;
pub mod utils;

use std::io::Write;
use std::path::{Path, PathBuf};

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use report::{Finding, FindingKind, Report, ReportBuilder, Severity};
pub use schema::diff::{ComparisonOutcome, SchemaDiff};
pub use schema::extractor::SchemaExtractor;
pub use schema::types::{ExtractedSchemas, SchemaMap};
pub use sources::{SourceKind, SourceSet};

/// Initialize SchemaParity with the specified configuration file
pub fn init(config_path: impl AsRef<Path>) -> Result<ParityChecker> {
    let config = config::load_from_file(config_path)?;
    Ok(ParityChecker::new(config))
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: Report,
    pub report_path: PathBuf,
    /// Whether the report file was written
    pub report_saved: bool,
}

impl RunSummary {
    /// Whether the run should be reported as failed in strict mode
    pub fn fails_strict(&self) -> bool {
        self.report.has_issues()
    }
}

/// The main entry point for running a comparison
pub struct ParityChecker {
    config: Config,
}

impl ParityChecker {
    /// Create a new checker from configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the three configured sources
    pub fn load_sources(&self) -> Result<SourceSet> {
        sources::load_sources(&self.config.sources)
    }

    /// Extract schema maps from loaded source text
    pub fn extract(&self, sources: &SourceSet) -> ExtractedSchemas {
        schema::extractor::extract_all(sources, &self.config.extraction)
    }

    /// Compare the extracted schemas against the sync-rule baseline
    pub fn compare(&self, schemas: &ExtractedSchemas) -> SchemaDiff {
        SchemaDiff::generate(schemas)
    }

    /// Compare already loaded sources, writing the transcript to `out`
    ///
    /// Nothing is persisted.
    pub fn check_sources<W: Write>(&self, sources: &SourceSet, out: W) -> Result<Report> {
        let schemas = self.extract(sources);
        let diff = self.compare(&schemas);
        Ok(report::build_report(&schemas, &diff, out)?)
    }

    /// Complete workflow: load, extract, compare, report and persist
    ///
    /// Unreadable sources abort the run. Failing to write the report file is
    /// logged and noted in the transcript, and the run still completes.
    pub fn run<W: Write>(&self, mut out: W) -> Result<RunSummary> {
        let sources = self.load_sources()?;

        writeln!(out, "Starting analysis...\n")?;
        let report = self.check_sources(&sources, &mut out)?;

        let report_path = self.config.report_path();
        let report_saved = match report.save_to_file(&report_path) {
            Ok(()) => {
                tracing::info!(path = %report_path.display(), "Report saved");
                writeln!(out, "\nReport saved to: {}", report_path.display())?;
                true
            }
            Err(err) if err.is_recoverable() => {
                tracing::error!(error = %err, "Could not save report");
                writeln!(out, "\nCould not save report: {}", err)?;
                false
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            issues = report.issues.len(),
            warnings = report.warnings.len(),
            matches = report.matches.len(),
            "Comparison finished"
        );

        Ok(RunSummary {
            report,
            report_path,
            report_saved,
        })
    }
}
