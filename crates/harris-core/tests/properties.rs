use harris_core::{
    parser, reduce_and_layer, validate, DiagnosticKind, RelationKind, StratigraphicGraph,
    UnitRecord,
};
use harris_test_utils::{assert_layered, assert_reduced, SITE};
use proptest::prelude::*;
use std::collections::HashSet;

/// `(source, target, kind)` triples over `n` units; targets may point past the last unit
fn site_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, usize)>)> {
    (1..12usize).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec((0..n, 0..n + 3, 0..RelationKind::ALL.len()), 0..30),
        )
    })
}

fn site_records(n: usize, relations: &[(usize, usize, usize)]) -> Vec<UnitRecord> {
    (0..n)
        .map(|unit| {
            let text = relations
                .iter()
                .filter(|(source, _, _)| *source == unit)
                .map(|(_, target, kind)| format!("{} {}", RelationKind::ALL[*kind], target))
                .collect::<Vec<_>>()
                .join(", ");
            UnitRecord::new(SITE, unit.to_string()).with_relationships(text)
        })
        .collect()
}

/// Kinds whose source unit is the later one
const LATER_KINDS: [RelationKind; 4] = [
    RelationKind::Covers,
    RelationKind::Cuts,
    RelationKind::Fills,
    RelationKind::RestsOn,
];

/// Alphanumeric unit ids, connector words included
fn unit_id() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Za-z][A-Za-z0-9]{0,3}",
        1 => proptest::sample::select(vec!["e", "E", "and", "And"]).prop_map(String::from),
    ]
}

/// Ids that parse back as themselves when named as a lone target
fn usable_ids(ids: HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids
        .into_iter()
        .filter(|id| {
            let out = parser::parse(&format!("Covers {id}"));
            out.is_clean() && out.relations.len() == 1 && out.relations[0].target.as_str() == id
        })
        .collect();
    ids.sort();
    ids
}

proptest! {
    #[test]
    fn prop_parser_is_idempotent(raw in "[A-Za-z0-9 ,;?\\[\\]']{0,60}") {
        prop_assert_eq!(parser::parse(&raw), parser::parse(&raw));
    }

    #[test]
    fn prop_parser_deduplicates(
        clauses in proptest::collection::vec((0..RelationKind::ALL.len(), 0..5usize), 0..20)
    ) {
        let raw = clauses
            .iter()
            .map(|(kind, target)| format!("{} {target}", RelationKind::ALL[*kind]))
            .collect::<Vec<_>>()
            .join(", ");
        let out = parser::parse(&raw);

        let expected: HashSet<(RelationKind, String)> = clauses
            .iter()
            .map(|(kind, target)| (RelationKind::ALL[*kind], target.to_string()))
            .collect();
        let parsed: Vec<(RelationKind, String)> = out
            .relations
            .iter()
            .map(|r| (r.kind, r.target.to_string()))
            .collect();

        prop_assert_eq!(parsed.len(), expected.len());
        prop_assert_eq!(parsed.into_iter().collect::<HashSet<_>>(), expected);
        prop_assert!(out.relations.iter().all(|r| RelationKind::ALL.contains(&r.kind)));
    }

    #[test]
    fn prop_dangling_targets_never_become_edges((n, relations) in site_strategy()) {
        let built = StratigraphicGraph::build(site_records(n, &relations)).unwrap();

        let dangling: HashSet<(usize, usize, usize)> = relations
            .iter()
            .copied()
            .filter(|(_, target, _)| *target >= n)
            .collect();
        prop_assert!(built.value.edges().all(|e| e.target.as_str().parse::<usize>().unwrap() < n));
        prop_assert_eq!(
            built.of_kind(DiagnosticKind::DanglingRelationship).count(),
            dangling.len()
        );
    }

    #[test]
    fn prop_layout_is_reduced_and_layered((n, relations) in site_strategy()) {
        let graph = StratigraphicGraph::build(site_records(n, &relations)).unwrap().value;
        let layout = reduce_and_layer(&graph).unwrap().value;

        assert_reduced(&layout);
        assert_layered(&layout);
        prop_assert_eq!(layout.layers().len(), graph.node_count());
    }

    #[test]
    fn prop_layout_is_deterministic((n, relations) in site_strategy()) {
        let graph = StratigraphicGraph::build(site_records(n, &relations)).unwrap().value;
        prop_assert_eq!(reduce_and_layer(&graph).unwrap().value, reduce_and_layer(&graph).unwrap().value);
    }

    #[test]
    fn prop_disjoint_rings_are_all_found(rings in 1..6usize, size in 3..6usize) {
        let relations: Vec<(usize, usize, usize)> = (0..rings)
            .flat_map(|r| {
                (0..size).map(move |i| (r * size + i, r * size + (i + 1) % size, 0))
            })
            .collect();
        let graph = StratigraphicGraph::build(site_records(rings * size, &relations)).unwrap().value;
        let report = validate(&graph);
        prop_assert_eq!(report.cycles.len(), rings);
        prop_assert!(!report.valid);
    }

    #[test]
    fn prop_named_rings_are_all_found(
        ids in proptest::collection::hash_set(unit_id(), 3..24),
        kinds in proptest::collection::vec(proptest::sample::select(LATER_KINDS.to_vec()), 24),
    ) {
        let ids = usable_ids(ids);
        let rings = ids.len() / 3;
        prop_assume!(rings > 0);

        let records: Vec<UnitRecord> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let record = UnitRecord::new(SITE, id.as_str());
                if i >= rings * 3 {
                    return record;
                }
                let next = &ids[(i / 3) * 3 + (i + 1) % 3];
                record.with_relationships(format!("{} {next}", kinds[i]))
            })
            .collect();
        let built = StratigraphicGraph::build(records).unwrap();
        prop_assert_eq!(built.value.edge_count(), rings * 3);

        let report = validate(&built.value);
        prop_assert_eq!(report.cycles.len(), rings);
        prop_assert!(report.cycles.iter().all(|cycle| cycle.len() == 3));
        prop_assert!(report.paradoxes.is_empty());
        prop_assert!(!report.valid);
    }

    #[test]
    fn prop_opposed_claims_are_one_paradox(
        ids in proptest::collection::hash_set(unit_id(), 2..6),
        first in proptest::sample::select(LATER_KINDS.to_vec()),
        second in proptest::sample::select(LATER_KINDS.to_vec()),
    ) {
        let ids = usable_ids(ids);
        prop_assume!(ids.len() >= 2);
        let (a, b) = (&ids[0], &ids[1]);

        let graph = StratigraphicGraph::build([
            UnitRecord::new(SITE, a.as_str()).with_relationships(format!("{first} {b}")),
            UnitRecord::new(SITE, b.as_str()).with_relationships(format!("{second} {a}")),
        ])
        .unwrap()
        .value;
        let report = validate(&graph);

        prop_assert_eq!(report.paradoxes.len(), 1);
        prop_assert_eq!(&report.paradoxes[0].kinds, &vec![first, second]);
        prop_assert!(report.cycles.is_empty());
        prop_assert!(!report.valid);
    }
}
