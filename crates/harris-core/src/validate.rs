//! Graph validation
//!
//! Structural findings about a built [`StratigraphicGraph`]. The validator
//! never mutates the graph and never fails: it always returns a complete
//! [`ValidationReport`].
//!
//! - **Cycles**: ordering claims that lead back to their starting unit,
//!   directly or through units declared contemporaneous
//! - **Paradoxes**: mutually exclusive claims between the same two units
//! - **Orphans**: units with no relations at all (informational)
//! - **Missing reciprocals**: relations the target did not record back
//!
//! `valid` depends on cycles and paradoxes only.

use crate::graph::{contemporaneity_classes, OrderingClaim, Relationship, StratigraphicGraph};
use crate::kind::RelationKind;
use crate::unit::UnitId;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Two units with mutually exclusive claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paradox {
    /// Unit loaded first
    pub first: UnitId,
    /// Unit loaded second
    pub second: UnitId,
    /// Conflicting kinds as recorded, ordering claims first
    pub kinds: Vec<RelationKind>,
}

/// Result of validating a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// No cycles and no paradoxes
    pub valid: bool,
    /// Each cycle from its entry point around to the unit before it
    pub cycles: Vec<Vec<UnitId>>,
    /// Contradictory unit pairs
    pub paradoxes: Vec<Paradox>,
    /// Units without incident relations
    pub orphans: Vec<UnitId>,
    /// Relations lacking the inverse on the target
    pub missing_reciprocals: Vec<Relationship>,
}

impl ValidationReport {
    /// True when nothing at all was found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.valid && self.orphans.is_empty() && self.missing_reciprocals.is_empty()
    }
}

/// Stateless validator
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphValidator;

impl GraphValidator {
    /// Create a validator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a graph
    #[must_use]
    pub fn validate(&self, graph: &StratigraphicGraph) -> ValidationReport {
        let (ordering, symmetric) = graph.claims();
        let n = graph.node_count();

        // later -> earlier
        let mut adjacency = vec![Vec::new(); n];
        for claim in &ordering {
            adjacency[claim.later].push(claim.earlier);
        }

        let classes = contemporaneity_classes(n, &symmetric);
        let mut cycles: Vec<Vec<usize>> = find_cycles(&adjacency)
            .into_iter()
            .filter(|cycle| cycle.len() > 2)
            .collect();
        cycles.extend(class_cycles(&ordering, &classes));
        let cycles: Vec<Vec<UnitId>> = cycles
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|p| graph.unit_at(p).id.clone()).collect())
            .collect();

        let mut class_kind: HashMap<usize, RelationKind> = HashMap::new();
        for claim in &symmetric {
            class_kind.entry(classes[claim.a]).or_insert(claim.kind);
        }

        let mut pairs: IndexMap<(usize, usize), PairClaims> = IndexMap::new();
        for claim in &ordering {
            let key = (claim.later.min(claim.earlier), claim.later.max(claim.earlier));
            let entry = pairs.entry(key).or_default();
            if claim.later == key.0 {
                entry.forward.get_or_insert(claim.recorded);
            } else {
                entry.backward.get_or_insert(claim.recorded);
            }
        }
        for claim in &symmetric {
            let key = (claim.a.min(claim.b), claim.a.max(claim.b));
            if let Some(entry) = pairs.get_mut(&key) {
                entry.symmetric.get_or_insert(claim.kind);
            }
        }
        pairs.sort_keys();

        let paradoxes: Vec<Paradox> = pairs
            .iter()
            .filter_map(|(&(a, b), claims)| {
                let contemporary = claims.symmetric.or_else(|| {
                    if classes[a] == classes[b] {
                        class_kind.get(&classes[a]).copied()
                    } else {
                        None
                    }
                });
                let opposed = claims.forward.is_some() && claims.backward.is_some();
                if !opposed && contemporary.is_none() {
                    return None;
                }
                let kinds = [claims.forward, claims.backward, contemporary]
                    .into_iter()
                    .flatten()
                    .collect();
                Some(Paradox {
                    first: graph.unit_at(a).id.clone(),
                    second: graph.unit_at(b).id.clone(),
                    kinds,
                })
            })
            .collect();

        let orphans: Vec<UnitId> = graph
            .nodes()
            .filter(|u| graph.degree(u.id.as_str()) == 0)
            .map(|u| u.id.clone())
            .collect();

        let missing_reciprocals: Vec<Relationship> =
            graph.missing_reciprocals().into_iter().cloned().collect();

        let valid = cycles.is_empty() && paradoxes.is_empty();
        if !valid {
            tracing::warn!(
                site = graph.site(),
                cycles = cycles.len(),
                paradoxes = paradoxes.len(),
                "stratigraphic sequence is contradictory"
            );
        }
        tracing::debug!(
            site = graph.site(),
            orphans = orphans.len(),
            missing_reciprocals = missing_reciprocals.len(),
            "validated graph"
        );

        ValidationReport {
            valid,
            cycles,
            paradoxes,
            orphans,
            missing_reciprocals,
        }
    }
}

/// Validate with a default validator
#[must_use]
pub fn validate(graph: &StratigraphicGraph) -> ValidationReport {
    GraphValidator::new().validate(graph)
}

/// Cycles that only close through contemporaneity links.
///
/// Ordering claims are lifted onto contemporaneity classes; a cycle among
/// classes that passes through a class of two or more units is reported as
/// the unit sequence that realises it, symmetric hops included. Cycles among
/// single-unit classes are the unit-level cycles and paradoxes already found.
fn class_cycles(ordering: &[OrderingClaim], classes: &[usize]) -> Vec<Vec<usize>> {
    let mut size = vec![0usize; classes.len()];
    for &class in classes {
        size[class] += 1;
    }

    let mut adjacency = vec![Vec::new(); classes.len()];
    let mut witness: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    for claim in ordering {
        let (from, to) = (classes[claim.later], classes[claim.earlier]);
        if from != to && !witness.contains_key(&(from, to)) {
            witness.insert((from, to), (claim.later, claim.earlier));
            adjacency[from].push(to);
        }
    }

    find_cycles(&adjacency)
        .into_iter()
        .filter(|cycle| cycle.iter().any(|&class| size[class] > 1))
        .filter_map(|cycle| {
            let mut units: Vec<usize> = Vec::new();
            let mut through_link = false;
            for (i, &from) in cycle.iter().enumerate() {
                let to = cycle[(i + 1) % cycle.len()];
                let (later, earlier) = witness[&(from, to)];
                match units.last() {
                    Some(&last) if last == later => {}
                    Some(_) => {
                        through_link = true;
                        units.push(later);
                    }
                    None => units.push(later),
                }
                units.push(earlier);
            }
            if units.last() == units.first() {
                units.pop();
            } else {
                through_link = true;
            }
            through_link.then_some(units)
        })
        .collect()
}

#[derive(Debug, Default)]
struct PairClaims {
    /// Lower position claimed later
    forward: Option<RelationKind>,
    /// Higher position claimed later
    backward: Option<RelationKind>,
    symmetric: Option<RelationKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first cycle search over an adjacency list.
///
/// Every node is used as a root unless already visited, so independent
/// cycles are all found. Each back-edge into the active stack yields the
/// stack slice from the re-entered node to the current one. Rotations of an
/// already reported cycle are dropped. All bookkeeping is local to the call.
pub(crate) fn find_cycles(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; adjacency.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut cycles = Vec::new();

    for root in 0..adjacency.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&next) = adjacency[node].get(frame.1) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[next] {
                Mark::Unvisited => {
                    marks[next] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::OnStack => {
                    if let Some(start) = stack.iter().position(|&(n, _)| n == next) {
                        let cycle: Vec<usize> = stack[start..].iter().map(|&(n, _)| n).collect();
                        if seen.insert(rotate_to_min(&cycle)) {
                            cycles.push(cycle);
                        }
                    }
                }
                Mark::Done => {}
            }
        }
    }
    cycles
}

fn rotate_to_min(cycle: &[usize]) -> Vec<usize> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, n)| *n)
        .map_or(0, |(i, _)| i);
    cycle[pivot..].iter().chain(&cycle[..pivot]).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitRecord;
    use pretty_assertions::assert_eq;

    fn graph(records: &[(&str, &str)]) -> StratigraphicGraph {
        StratigraphicGraph::build(
            records
                .iter()
                .map(|(id, rel)| UnitRecord::new("S", *id).with_relationships(*rel)),
        )
        .unwrap()
        .value
    }

    fn ids(list: &[&str]) -> Vec<UnitId> {
        list.iter().map(|s| UnitId::from(*s)).collect()
    }

    #[test]
    fn simple_sequence_is_valid() {
        let report = validate(&graph(&[("A", ""), ("B", "Covers A"), ("C", "Cuts B")]));
        assert!(report.valid);
        assert!(report.cycles.is_empty());
        assert!(report.orphans.is_empty());
        assert_eq!(report.missing_reciprocals.len(), 2);
    }

    #[test]
    fn three_unit_cycle_is_reported_once() {
        let report = validate(&graph(&[("A", "Covers B"), ("B", "Covers C"), ("C", "Covers A")]));
        assert_eq!(report.cycles, vec![ids(&["A", "B", "C"])]);
        assert!(report.paradoxes.is_empty());
        assert!(!report.valid);
    }

    #[test]
    fn disjoint_cycles_are_all_reported() {
        let report = validate(&graph(&[
            ("A", "Covers B"),
            ("B", "Covers C"),
            ("C", "Covers A"),
            ("D", "Cuts E"),
            ("E", "Cuts F"),
            ("F", "Cuts D"),
            ("G", "Covers A"),
        ]));
        assert_eq!(report.cycles.len(), 2);
    }

    #[test]
    fn mutual_covers_is_one_paradox() {
        let report = validate(&graph(&[("P", "Covers Q"), ("Q", "Covers P")]));
        assert_eq!(
            report.paradoxes,
            vec![Paradox {
                first: UnitId::from("P"),
                second: UnitId::from("Q"),
                kinds: vec![RelationKind::Covers, RelationKind::Covers],
            }]
        );
        assert!(report.cycles.is_empty());
        assert!(!report.valid);
    }

    #[test]
    fn explicit_reciprocal_is_not_a_paradox() {
        let report = validate(&graph(&[("X", "Covers Y"), ("Y", "Covered by X")]));
        assert!(report.valid);
        assert!(report.missing_reciprocals.is_empty());
    }

    #[test]
    fn ordering_inside_equality_class_is_a_paradox() {
        let report = validate(&graph(&[
            ("A", "Equals B, Covers C"),
            ("B", "Equals A, Equals C"),
            ("C", "Equals B"),
        ]));
        assert_eq!(report.paradoxes.len(), 1);
        assert_eq!(report.paradoxes[0].kinds, vec![RelationKind::Covers, RelationKind::Equals]);
    }

    #[test]
    fn equals_pair_alone_is_valid() {
        let report = validate(&graph(&[("A", "Equals B"), ("B", "Equals A")]));
        assert!(report.is_clean());
    }

    #[test]
    fn orphans_are_informational() {
        let report = validate(&graph(&[("A", ""), ("B", "Covers C"), ("C", "Covered by B")]));
        assert_eq!(report.orphans, ids(&["A"]));
        assert!(report.valid);
        assert!(!report.is_clean());
    }

    #[test]
    fn cycle_through_equality_invalidates() {
        let report = validate(&graph(&[("A", "Equals B"), ("B", "Covers C"), ("C", "Covers A")]));
        assert!(!report.valid);
        assert_eq!(report.cycles, vec![ids(&["B", "C", "A"])]);
        assert!(report.paradoxes.is_empty());
    }

    #[test]
    fn cycle_through_bonding_invalidates() {
        let report = validate(&graph(&[
            ("W1", "Bonds to W2"),
            ("W2", "Covers L"),
            ("L", "Cuts F"),
            ("F", "Fills W1"),
        ]));
        assert!(!report.valid);
        assert_eq!(report.cycles, vec![ids(&["W2", "L", "F", "W1"])]);
    }

    #[test]
    fn plain_cycle_with_contemporary_member_is_reported_once() {
        let report = validate(&graph(&[
            ("A", "Covers B, Equals D"),
            ("B", "Covers C"),
            ("C", "Covers A"),
            ("D", ""),
        ]));
        assert_eq!(report.cycles, vec![ids(&["A", "B", "C"])]);
    }

    #[test]
    fn ordering_across_classes_without_loop_is_valid() {
        let report = validate(&graph(&[("A", "Equals B"), ("B", "Covers C"), ("C", "")]));
        assert!(report.valid);
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn paradox_with_different_kinds() {
        let report = validate(&graph(&[("A", "Covers B"), ("B", "Cuts A")]));
        assert_eq!(
            report.paradoxes,
            vec![Paradox {
                first: UnitId::from("A"),
                second: UnitId::from("B"),
                kinds: vec![RelationKind::Covers, RelationKind::Cuts],
            }]
        );
        assert!(report.cycles.is_empty());
        assert!(!report.valid);
    }

    #[test]
    fn search_is_restartable() {
        let adjacency = vec![vec![1], vec![2], vec![0]];
        assert_eq!(find_cycles(&adjacency), find_cycles(&adjacency));
        assert_eq!(find_cycles(&adjacency), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn rotations_are_reported_once() {
        // two back-edges into the same ring
        let adjacency = vec![vec![1], vec![2], vec![0, 1]];
        let cycles = find_cycles(&adjacency);
        assert_eq!(cycles, vec![vec![0, 1, 2], vec![1, 2]]);
    }
}
