//! End-to-end scenarios over the whole core pipeline.

use harris_core::{
    analyze, parser, validate, DiagnosticKind, PeriodLookup, RelationKind, StratigraphicGraph,
    UnitId, UnitRecord, UNDATED_LABEL,
};
use harris_test_utils::{analyze_excavation, analyze_units, build_graph, records};
use pretty_assertions::assert_eq;

fn ids(list: &[&str]) -> Vec<UnitId> {
    list.iter().map(|s| UnitId::from(*s)).collect()
}

#[test]
fn covers_then_cuts_builds_three_layers() {
    let analysis = analyze_units(&[("A", ""), ("B", "Covers A"), ("C", "Cuts B")]);
    let a = &analysis.value;

    assert!(a.graph.has_edge("B", "A", RelationKind::Covers));
    assert!(a.graph.has_edge("C", "B", RelationKind::Cuts));
    assert_eq!(a.graph.edge_count(), 2);
    assert!(a.report.cycles.is_empty());
    assert_eq!(a.layout.layer_of("A").unwrap(), 0);
    assert_eq!(a.layout.layer_of("B").unwrap(), 1);
    assert_eq!(a.layout.layer_of("C").unwrap(), 2);
}

#[test]
fn explicit_reciprocals_reduce_to_one_edge() {
    let built = StratigraphicGraph::build(records(&[("X", "Covers Y"), ("Y", "Covered by X")])).unwrap();
    assert_eq!(built.value.edge_count(), 2);
    assert_eq!(built.of_kind(DiagnosticKind::MissingReciprocal).count(), 0);

    let analysis = analyze_units(&[("X", "Covers Y"), ("Y", "Covered by X")]);
    let edges = &analysis.value.layout.edges;
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("X", "Y"));
}

#[test]
fn mutual_covers_is_exactly_one_paradox() {
    let report = validate(&build_graph(&[("P", "Covers Q"), ("Q", "Covers P")]));
    assert_eq!(report.paradoxes.len(), 1);
    assert_eq!(report.paradoxes[0].first, UnitId::from("P"));
    assert_eq!(report.paradoxes[0].second, UnitId::from("Q"));
    assert!(!report.valid);
}

#[test]
fn repeated_clause_parses_once() {
    let out = parser::parse("Covers 2, Covers 2");
    assert_eq!(out.relations.len(), 1);
    assert_eq!(out.relations[0].kind, RelationKind::Covers);
    assert_eq!(out.relations[0].target, UnitId::from("2"));
}

#[test]
fn unmatched_phase_falls_back_to_undated() {
    let lookup = PeriodLookup::new().with("1", "1", "Roman");
    let analysis = analyze([UnitRecord::new("S", "U").with_period("1", "2")], &lookup).unwrap();
    assert_eq!(analysis.value.periods.label_of("U"), Some(UNDATED_LABEL));
}

#[test]
fn three_unit_ring_is_one_cycle() {
    let report = validate(&build_graph(&[("A", "Covers B"), ("B", "Covers C"), ("C", "Covers A")]));
    assert_eq!(report.cycles.len(), 1);
    let cycle = &report.cycles[0];
    let start = cycle.iter().position(|u| u.as_str() == "A").unwrap();
    let rotated: Vec<UnitId> = cycle[start..].iter().chain(&cycle[..start]).cloned().collect();
    assert_eq!(rotated, ids(&["A", "B", "C"]));
    assert!(!report.valid);
}

#[test]
fn excavation_fixture_analyses_cleanly() {
    let analysis = analyze_excavation();
    let a = &analysis.value;

    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
    assert!(a.report.valid);
    assert_eq!(a.report.orphans, ids(&["7"]));

    let layers: Vec<(&str, usize)> = a
        .layout
        .layers()
        .iter()
        .map(|(id, l)| (id.as_str(), *l))
        .collect();
    assert_eq!(
        layers,
        [("1", 3), ("2", 2), ("3", 1), ("4", 1), ("5", 0), ("6", 0), ("7", 0)]
    );
    assert_eq!(a.layout.edges.len(), 6);
    assert!(a.layout.redundant.is_empty());

    let labels: Vec<&str> = a.periods.buckets().iter().map(|b| b.label.as_str()).collect();
    assert_eq!(
        labels,
        ["Roman, first phase", "Roman, second phase", "Medieval", UNDATED_LABEL]
    );

    let summary = analysis.summary();
    assert_eq!(summary.units, 7);
    assert_eq!(summary.layers, 4);
    assert_eq!(summary.periods, 4);
}

#[test]
fn contradictory_site_still_completes() {
    let analysis = analyze_units(&[
        ("A", "Covers B"),
        ("B", "Covers C"),
        ("C", "Covers A"),
        ("D", "Covers A, Covers Z, Covers D"),
    ]);
    assert!(!analysis.value.report.valid);
    assert_eq!(analysis.value.layout.excluded.len(), 3);
    assert_eq!(analysis.of_kind(DiagnosticKind::DanglingRelationship).count(), 1);
    assert_eq!(analysis.of_kind(DiagnosticKind::SelfLoop).count(), 1);
    assert_eq!(analysis.summary().errors, 1);
}
