//! Schema comparison
//!
//! Compares the client and backend schemas against the sync-rule baseline.
//! Only baseline tables are visited: tables the sync rules never reference
//! are not part of the sync contract.

use indexmap::IndexSet;

use crate::schema::reconciler::{MatchTier, NameReconciler};
use crate::schema::types::ExtractedSchemas;
use crate::sources::SourceKind;
use crate::utils::naming::normalize_name;

/// Classification of one baseline table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// Present in every source with pairwise equal column sets
    MatchedExactly,
    /// Present in every source, but column sets differ somewhere
    PresentWithDifferences,
    /// Not found in the listed target sources
    AbsentFromSource(Vec<SourceKind>),
}

/// Result of comparing one baseline table against one target source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetComparison {
    pub source: SourceKind,
    /// Key the table resolved to in the target, if any
    pub resolved_name: Option<String>,
    pub tier: Option<MatchTier>,
    /// Baseline columns the target lacks, in baseline order
    pub missing: Vec<String>,
    /// Target columns the baseline lacks, in target order
    pub extra: Vec<String>,
    pub column_count: usize,
}

impl TargetComparison {
    fn absent(source: SourceKind) -> Self {
        Self {
            source,
            resolved_name: None,
            tier: None,
            missing: Vec::new(),
            extra: Vec::new(),
            column_count: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.resolved_name.is_some()
    }

    /// Present with the same normalised column set as the baseline
    pub fn is_consistent(&self) -> bool {
        self.is_present() && self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Comparison of one baseline table against all targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableComparison {
    pub table: String,
    pub baseline_columns: Vec<String>,
    pub targets: Vec<TargetComparison>,
    pub outcome: ComparisonOutcome,
}

impl TableComparison {
    pub fn target(&self, source: SourceKind) -> Option<&TargetComparison> {
        self.targets.iter().find(|t| t.source == source)
    }

    pub fn is_match(&self) -> bool {
        self.outcome == ComparisonOutcome::MatchedExactly
    }
}

/// Per-table comparison results, in baseline order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    pub tables: Vec<TableComparison>,
}

impl SchemaDiff {
    /// Compare every baseline table against the client and backend schemas
    pub fn generate(schemas: &ExtractedSchemas) -> Self {
        let reconciler = NameReconciler::new();

        let tables = schemas
            .sync_rules
            .tables()
            .map(|(table, baseline)| compare_table(&reconciler, schemas, table, baseline))
            .collect();

        Self { tables }
    }

    pub fn matched(&self) -> impl Iterator<Item = &TableComparison> {
        self.tables.iter().filter(|t| t.is_match())
    }

    /// Check if every baseline table matched exactly
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(TableComparison::is_match)
    }
}

fn compare_table(
    reconciler: &NameReconciler,
    schemas: &ExtractedSchemas,
    table: &str,
    baseline: &[String],
) -> TableComparison {
    let targets: Vec<TargetComparison> = SourceKind::TARGETS
        .iter()
        .map(|&source| {
            let Some(resolved) = reconciler.resolve_table(table, schemas.get(source)) else {
                tracing::debug!(table, source = %source, "Table not found in target");
                return TargetComparison::absent(source);
            };
            tracing::debug!(
                table,
                source = %source,
                resolved = resolved.name,
                tier = %resolved.tier,
                "Resolved table"
            );

            let missing = unique(baseline)
                .into_iter()
                .filter(|col| reconciler.resolve_column(col, resolved.columns).is_none())
                .collect();
            let extra = unique(resolved.columns)
                .into_iter()
                .filter(|col| reconciler.resolve_column(col, baseline).is_none())
                .collect();

            TargetComparison {
                source,
                resolved_name: Some(resolved.name.to_string()),
                tier: Some(resolved.tier),
                missing,
                extra,
                column_count: resolved.columns.len(),
            }
        })
        .collect();

    let absent: Vec<SourceKind> = targets
        .iter()
        .filter(|t| !t.is_present())
        .map(|t| t.source)
        .collect();

    let outcome = if !absent.is_empty() {
        ComparisonOutcome::AbsentFromSource(absent)
    } else if targets.iter().all(TargetComparison::is_consistent) {
        ComparisonOutcome::MatchedExactly
    } else {
        ComparisonOutcome::PresentWithDifferences
    };

    TableComparison {
        table: table.to_string(),
        baseline_columns: baseline.to_vec(),
        targets,
        outcome,
    }
}

/// First spelling of each distinct normalised column name
fn unique(columns: &[String]) -> Vec<String> {
    let mut seen = IndexSet::new();
    columns
        .iter()
        .filter(|col| seen.insert(normalize_name(col)))
        .cloned()
        .collect()
}
