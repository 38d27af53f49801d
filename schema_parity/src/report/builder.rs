//! Report building and console transcript

use std::io::{self, Write};

use crate::report::{Finding, FindingKind, Report, SourceCounts};
use crate::schema::diff::{SchemaDiff, TableComparison, TargetComparison};
use crate::schema::reconciler::MatchTier;
use crate::schema::types::ExtractedSchemas;
use crate::sources::SourceKind;

/// Aggregates table comparisons into a [`Report`] while writing a
/// table-by-table transcript
pub struct ReportBuilder<W: Write> {
    out: W,
    report: Report,
}

impl<W: Write> ReportBuilder<W> {
    pub fn new(schemas: &ExtractedSchemas, out: W) -> Self {
        Self {
            out,
            report: Report::new(SourceCounts::from_schemas(schemas)),
        }
    }

    /// Write the extraction statistics
    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "Statistics:")?;
        for kind in SourceKind::ALL {
            writeln!(self.out, "   - {}: {} tables", kind, self.report.counts.get(kind))?;
        }
        self.out.flush()
    }

    /// Record one table's comparison and write its section
    pub fn record(&mut self, table: &TableComparison) -> io::Result<()> {
        writeln!(self.out, "\nTable: {}", table.table)?;
        writeln!(
            self.out,
            "   Columns in {}: {}",
            SourceKind::SyncRules,
            table.baseline_columns.len()
        )?;

        for target in &table.targets {
            let findings = findings_for(&table.table, target.source, target);

            match (&target.resolved_name, target.tier) {
                (Some(name), Some(MatchTier::Exact)) if name == &table.table => {
                    writeln!(self.out, "   Found in {}", target.source)?;
                }
                (Some(name), tier) => {
                    let tier = tier.map(|t| format!(" ({} match)", t)).unwrap_or_default();
                    writeln!(self.out, "   Found in {} as '{}'{}", target.source, name, tier)?;
                }
                (None, _) => {}
            }

            for finding in findings {
                let marker = match finding.kind {
                    FindingKind::ExtraColumns(_) => "WARNING",
                    _ => "ISSUE",
                };
                writeln!(self.out, "   {}: {}", marker, finding)?;
                tracing::debug!(table = %table.table, source = %target.source, "{}", finding);
                self.report.add_finding(finding);
            }

            if target.is_present() {
                writeln!(
                    self.out,
                    "   Columns in {}: {}",
                    target.source, target.column_count
                )?;
            }
        }

        if table.is_match() {
            writeln!(self.out, "   Fully matched")?;
            self.report.add_match(table.table.as_str());
        }

        self.out.flush()
    }

    /// Write the aggregated summary
    pub fn write_summary(&mut self) -> io::Result<()> {
        write!(self.out, "\n\n{}", self.report.render_summary())?;
        self.out.flush()
    }

    /// Access the transcript writer
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn finish(self) -> Report {
        self.report
    }
}

fn findings_for(
    table: &str,
    source: SourceKind,
    target: &TargetComparison,
) -> Vec<Finding> {
    if !target.is_present() {
        return vec![Finding::new(table, source, FindingKind::MissingTable)];
    }

    let mut findings = Vec::new();
    if !target.missing.is_empty() {
        findings.push(Finding::new(
            table,
            source,
            FindingKind::MissingColumns(target.missing.clone()),
        ));
    }
    if !target.extra.is_empty() {
        findings.push(Finding::new(
            table,
            source,
            FindingKind::ExtraColumns(target.extra.clone()),
        ));
    }
    findings
}

/// Build the full report for a diff, writing the transcript to `out`
pub fn build_report<W: Write>(
    schemas: &ExtractedSchemas,
    diff: &SchemaDiff,
    out: W,
) -> io::Result<Report> {
    let mut builder = ReportBuilder::new(schemas, out);
    builder.write_header()?;
    for table in &diff.tables {
        builder.record(table)?;
    }
    builder.write_summary()?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::SchemaMap;
    use pretty_assertions::assert_eq;

    fn map(tables: &[(&str, &[&str])]) -> SchemaMap {
        let mut map = SchemaMap::new();
        for (name, cols) in tables {
            map.insert(*name, cols.iter().map(|c| c.to_string()).collect());
        }
        map
    }

    fn products_scenario() -> ExtractedSchemas {
        ExtractedSchemas::new(
            map(&[("products", &["id", "name", "price"])]),
            map(&[("Products", &["id", "name", "price", "stock"])]),
            map(&[("products", &["id", "name"])]),
        )
    }

    #[test]
    fn test_products_scenario() {
        let schemas = products_scenario();
        let diff = SchemaDiff::generate(&schemas);
        let mut transcript = Vec::new();
        let report = build_report(&schemas, &diff, &mut transcript).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].kind,
            FindingKind::ExtraColumns(vec!["stock".to_string()])
        );
        assert_eq!(report.warnings[0].source, SourceKind::ClientSchema);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(
            report.issues[0].kind,
            FindingKind::MissingColumns(vec!["price".to_string()])
        );
        assert_eq!(report.issues[0].source, SourceKind::BackendSchema);
        assert!(report.matches.is_empty());

        let transcript = String::from_utf8(transcript).unwrap();
        assert!(transcript.contains("Table: products"));
        assert!(transcript.contains("Found in client schema as 'Products' (case-insensitive match)"));
        assert!(transcript.contains("WARNING: Extra columns in client schema for table 'products': stock"));
        assert!(transcript.contains("ISSUE: Columns missing from backend schema for table 'products': price"));
        assert!(!transcript.contains("Fully matched"));
        assert!(!transcript.contains("Everything matches!"));
    }

    #[test]
    fn test_absent_table_yields_two_issues() {
        let schemas = ExtractedSchemas::new(
            map(&[("orders", &["id", "total"])]),
            SchemaMap::new(),
            SchemaMap::new(),
        );
        let diff = SchemaDiff::generate(&schemas);
        let report = build_report(&schemas, &diff, io::sink()).unwrap();

        assert_eq!(report.issues.len(), 2);
        assert!(report
            .issues
            .iter()
            .all(|issue| issue.kind == FindingKind::MissingTable && issue.table == "orders"));
        assert!(report.warnings.is_empty());
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_matched_table_is_listed() {
        let schemas = ExtractedSchemas::new(
            map(&[("customers", &["CustomerId", "email"])]),
            map(&[("customers", &["customerid", "Email"])]),
            map(&[("customers", &["customerId", "email"])]),
        );
        let diff = SchemaDiff::generate(&schemas);
        let mut transcript = Vec::new();
        let report = build_report(&schemas, &diff, &mut transcript).unwrap();

        assert_eq!(report.matches, vec!["customers".to_string()]);
        assert!(report.issues.is_empty());
        assert!(report.warnings.is_empty());
        let transcript = String::from_utf8(transcript).unwrap();
        assert!(transcript.contains("Fully matched"));
        assert!(transcript.contains("Everything matches! No problems found."));
    }

    #[test]
    fn test_header_lists_declared_table_counts() {
        let mut client = SchemaMap::new();
        client.insert("OrderItems", vec!["id".to_string()]);
        client.insert_alias("order_items", vec!["id".to_string()]);
        let schemas = ExtractedSchemas::new(SchemaMap::new(), client, SchemaMap::new());

        let mut builder = ReportBuilder::new(&schemas, Vec::new());
        builder.write_header().unwrap();
        let transcript = String::from_utf8(builder.writer().clone()).unwrap();

        assert!(transcript.contains("   - client schema: 1 tables"));
        assert!(transcript.contains("   - sync rules: 0 tables"));
    }
}
