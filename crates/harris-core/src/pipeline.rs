//! End-to-end analysis of one site: build, validate, layer, group.

use crate::diagnostics::{Analysis, Severity};
use crate::error::HarrisError;
use crate::graph::StratigraphicGraph;
use crate::layout::{MatrixLayout, MatrixLayoutEngine};
use crate::period::{PeriodGrouper, PeriodGrouping, PeriodLookup};
use crate::store::UnitSource;
use crate::unit::UnitRecord;
use crate::validate::{GraphValidator, ValidationReport};
use serde::Serialize;

/// Everything computed for one site
#[derive(Debug, Clone)]
pub struct MatrixAnalysis {
    /// The relationship graph
    pub graph: StratigraphicGraph,
    /// Structural findings
    pub report: ValidationReport,
    /// Reduced edges and layers
    pub layout: MatrixLayout,
    /// Chronological buckets
    pub periods: PeriodGrouping,
}

/// Counts describing one analysed site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    /// Site identifier
    pub site: String,
    /// Units loaded
    pub units: usize,
    /// Relationships recorded
    pub relationships: usize,
    /// Edges in the rendered matrix
    pub rendered_edges: usize,
    /// Ordering edges dropped by reduction
    pub redundant_edges: usize,
    /// Ordering edges excluded from layering
    pub excluded_edges: usize,
    /// Number of layers
    pub layers: usize,
    /// Number of period buckets
    pub periods: usize,
    /// No cycles and no paradoxes
    pub valid: bool,
    /// Cycles found
    pub cycles: usize,
    /// Paradoxes found
    pub paradoxes: usize,
    /// Orphaned units
    pub orphans: usize,
    /// Diagnostics at info level
    pub infos: usize,
    /// Diagnostics at warning level
    pub warnings: usize,
    /// Diagnostics at error level
    pub errors: usize,
}

impl Analysis<MatrixAnalysis> {
    /// Summarise the analysis
    #[must_use]
    pub fn summary(&self) -> SiteSummary {
        let a = &self.value;
        SiteSummary {
            site: a.graph.site().to_string(),
            units: a.graph.node_count(),
            relationships: a.graph.edge_count(),
            rendered_edges: a.layout.edges.len(),
            redundant_edges: a.layout.redundant.len(),
            excluded_edges: a.layout.excluded.len(),
            layers: a.layout.layer_count(),
            periods: a.periods.len(),
            valid: a.report.valid,
            cycles: a.report.cycles.len(),
            paradoxes: a.report.paradoxes.len(),
            orphans: a.report.orphans.len(),
            infos: self.count(Severity::Info),
            warnings: self.count(Severity::Warning),
            errors: self.count(Severity::Error),
        }
    }
}

/// Run every stage over a site's records.
///
/// Fails only on fatal conditions; everything else is in the diagnostics.
pub fn analyze<I>(records: I, lookup: &PeriodLookup) -> Result<Analysis<MatrixAnalysis>, HarrisError>
where
    I: IntoIterator<Item = UnitRecord>,
{
    let Analysis {
        value: graph,
        mut diagnostics,
    } = StratigraphicGraph::build(records)?;

    let report = GraphValidator::new().validate(&graph);

    let layout = MatrixLayoutEngine::new().reduce_and_layer(&graph)?;
    diagnostics.extend(layout.diagnostics);

    let periods = PeriodGrouper::new().group(&graph, lookup);
    diagnostics.extend(periods.diagnostics);

    tracing::debug!(
        site = graph.site(),
        valid = report.valid,
        diagnostics = diagnostics.len(),
        "analysed site"
    );
    Ok(Analysis::new(
        MatrixAnalysis {
            graph,
            report,
            layout: layout.value,
            periods: periods.value,
        },
        diagnostics,
    ))
}

/// Fetch a site from a store and analyse it
pub fn analyze_site(
    source: &dyn UnitSource,
    site: &str,
) -> Result<Analysis<MatrixAnalysis>, HarrisError> {
    let records = source.site_units(site)?;
    let lookup = source.periodization(site)?;
    analyze(records, &lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn summary_counts_every_stage() {
        let store = InMemoryStore::new()
            .with_units(
                "S",
                [
                    UnitRecord::new("S", "1").with_period("1", "1"),
                    UnitRecord::new("S", "2")
                        .with_relationships("Covers 1, Covers 9")
                        .with_period("1", "1"),
                    UnitRecord::new("S", "3"),
                ],
            )
            .with_periodization("S", PeriodLookup::new().with("1", "1", "Roman"));

        let analysis = analyze_site(&store, "S").unwrap();
        let summary = analysis.summary();
        assert_eq!(summary.units, 3);
        assert_eq!(summary.relationships, 1);
        assert_eq!(summary.layers, 2);
        assert_eq!(summary.periods, 2);
        assert_eq!(summary.orphans, 1);
        assert!(summary.valid);
        // dangling 9
        assert_eq!(summary.warnings, 1);
    }

    #[test]
    fn unknown_site_is_fatal() {
        let err = analyze_site(&InMemoryStore::new(), "S").unwrap_err();
        assert!(matches!(err, HarrisError::Store(_)));
    }
}
