//! Stratigraphic graph
//!
//! Nodes are [`Unit`]s, edges are typed [`Relationship`]s exactly as recorded
//! (source = the unit whose field named the relation). Construction never
//! fails on bad relations: self-loops and dangling targets are rejected with
//! a diagnostic, missing reciprocals are recorded but the edge is kept.

use crate::diagnostics::{Analysis, Diagnostic, DiagnosticKind, Location};
use crate::error::{HarrisError, RecordError};
use crate::kind::{Certainty, Orientation, RelationKind};
use crate::parser::RelationshipParser;
use crate::unit::{Unit, UnitId, UnitRecord};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashSet;

/// A recorded, directed, typed relation between two loaded units
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relationship {
    /// Unit whose field recorded the relation
    pub source: UnitId,
    /// Related unit
    pub target: UnitId,
    /// Kind as recorded
    pub kind: RelationKind,
    /// Certainty as recorded
    pub certainty: Certainty,
}

/// A recorded relation restated in canonical direction: `later` lies above `earlier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderingClaim {
    pub(crate) later: usize,
    pub(crate) earlier: usize,
    /// Canonical kind (source-later form)
    pub(crate) kind: RelationKind,
    /// Kind as recorded on the edge
    pub(crate) recorded: RelationKind,
    pub(crate) certainty: Certainty,
}

/// A symmetric relation between two node positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SymmetricClaim {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) kind: RelationKind,
    pub(crate) certainty: Certainty,
}

/// Stratigraphic relationship graph of one site
#[derive(Debug, Clone, Default)]
pub struct StratigraphicGraph {
    site: String,
    inner: DiGraph<Unit, Relationship>,
    index: IndexMap<UnitId, NodeIndex>,
}

impl StratigraphicGraph {
    /// Build a graph from storage records.
    ///
    /// Fails only on records that cannot be units at all. All records must
    /// belong to the same site.
    pub fn build<I>(records: I) -> Result<Analysis<Self>, HarrisError>
    where
        I: IntoIterator<Item = UnitRecord>,
    {
        let mut units = Vec::new();
        let mut diagnostics = Vec::new();
        let mut site: Option<String> = None;

        for (index, record) in records.into_iter().enumerate() {
            let (unit, diagnostic) = Unit::from_record(record, index)?;
            match &site {
                None => site = Some(unit.site.clone()),
                Some(expected) if *expected != unit.site => {
                    return Err(RecordError::SiteMismatch {
                        index,
                        expected: expected.clone(),
                        found: unit.site,
                    }
                    .into());
                }
                Some(_) => {}
            }
            diagnostics.extend(diagnostic);
            units.push(unit);
        }

        let mut graph = Self::from_units(site.unwrap_or_default(), units);
        diagnostics.append(&mut graph.diagnostics);
        Ok(Analysis::new(graph.value, diagnostics))
    }

    /// Build a graph from already converted units
    pub fn from_units(site: impl Into<String>, units: Vec<Unit>) -> Analysis<Self> {
        let mut graph = Self {
            site: site.into(),
            inner: DiGraph::new(),
            index: IndexMap::new(),
        };
        let mut diagnostics = Vec::new();

        for unit in units {
            if graph.index.contains_key(&unit.id) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateUnit,
                    Location::unit(&unit.id),
                    format!("unit {} recorded more than once, later record ignored", unit.id),
                ));
                continue;
            }
            let id = unit.id.clone();
            let node = graph.inner.add_node(unit);
            graph.index.insert(id, node);
        }

        let parser = RelationshipParser::new();
        let nodes: Vec<NodeIndex> = graph.index.values().copied().collect();
        for node in nodes {
            let source = graph.inner[node].id.clone();
            let outcome = parser.parse(&graph.inner[node].relationships);
            diagnostics.extend(outcome.diagnostics.into_iter().map(|mut d| {
                d.location = d.location.within(&source);
                d
            }));

            for relation in outcome.relations {
                if relation.target == source {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::SelfLoop,
                        Location::relation(&source, relation.target.as_str()),
                        format!("unit {source} {} itself, relation rejected", relation.kind),
                    ));
                    continue;
                }
                let Some(&target) = graph.index.get(&relation.target) else {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DanglingRelationship,
                        Location::relation(&source, relation.target.as_str()),
                        format!(
                            "unit {source} {} unit {}, which is not loaded",
                            relation.kind, relation.target
                        ),
                    ));
                    continue;
                };
                graph.inner.add_edge(
                    node,
                    target,
                    Relationship {
                        source: source.clone(),
                        target: relation.target,
                        kind: relation.kind,
                        certainty: relation.certainty,
                    },
                );
            }
        }

        diagnostics.extend(graph.missing_reciprocals().into_iter().map(|rel| {
            Diagnostic::new(
                DiagnosticKind::MissingReciprocal,
                Location::relation(&rel.source, rel.target.as_str()),
                format!(
                    "{} {} {}, but {} does not record '{}'",
                    rel.source,
                    rel.kind,
                    rel.target,
                    rel.target,
                    rel.kind.inverse()
                ),
            )
        }));

        tracing::debug!(
            site = %graph.site,
            units = graph.node_count(),
            relationships = graph.edge_count(),
            diagnostics = diagnostics.len(),
            "built stratigraphic graph"
        );
        Analysis::new(graph, diagnostics)
    }

    /// Site identifier
    #[inline]
    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Units in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.index.values().map(move |&n| &self.inner[n])
    }

    /// Relationships grouped by source, insertion order within source
    pub fn edges(&self) -> impl Iterator<Item = &Relationship> + '_ {
        self.inner.edge_references().map(|e| e.weight())
    }

    /// Number of units
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of relationships
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Look up a unit
    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.index.get(id).map(|&n| &self.inner[n])
    }

    /// True if the unit is loaded
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// True if `source` records `kind` towards `target`
    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str, kind: RelationKind) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => self
                .inner
                .edges_connecting(s, t)
                .any(|e| e.weight().kind == kind),
            _ => false,
        }
    }

    /// Number of incident relationships (in + out)
    #[must_use]
    pub fn degree(&self, id: &str) -> usize {
        self.index.get(id).map_or(0, |&n| {
            self.inner.edges_directed(n, Direction::Outgoing).count()
                + self.inner.edges_directed(n, Direction::Incoming).count()
        })
    }

    /// Relationships whose target does not record the inverse kind back
    #[must_use]
    pub fn missing_reciprocals(&self) -> Vec<&Relationship> {
        let recorded: HashSet<(NodeIndex, NodeIndex, RelationKind)> = self
            .inner
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight().kind))
            .collect();
        self.inner
            .edge_references()
            .filter(|e| !recorded.contains(&(e.target(), e.source(), e.weight().kind.inverse())))
            .map(|e| e.weight())
            .collect()
    }

    /// Unit at an insertion-order position
    pub(crate) fn unit_at(&self, position: usize) -> &Unit {
        &self.inner[self.index[position]]
    }

    /// Every relation restated canonically, deduplicated.
    ///
    /// Ordering claims are keyed by `(later, earlier)`: an explicit reciprocal
    /// pair collapses into one claim. Symmetric claims are keyed by the
    /// unordered pair. First-seen order is preserved; a claim is certain if
    /// any of its recordings is.
    pub(crate) fn claims(&self) -> (Vec<OrderingClaim>, Vec<SymmetricClaim>) {
        let mut ordering: IndexMap<(usize, usize), OrderingClaim> = IndexMap::new();
        let mut symmetric: IndexMap<(usize, usize), SymmetricClaim> = IndexMap::new();

        for edge in self.inner.edge_references() {
            let rel = edge.weight();
            // nodes are never removed, so indices are insertion positions
            let (s, t) = (edge.source().index(), edge.target().index());
            match rel.kind.orientation() {
                Orientation::Symmetric => {
                    let key = (s.min(t), s.max(t));
                    let claim = symmetric.entry(key).or_insert(SymmetricClaim {
                        a: s,
                        b: t,
                        kind: rel.kind,
                        certainty: rel.certainty,
                    });
                    claim.certainty = claim.certainty.min(rel.certainty);
                }
                orientation => {
                    let (later, earlier) = if orientation == Orientation::SourceLater {
                        (s, t)
                    } else {
                        (t, s)
                    };
                    let claim = ordering.entry((later, earlier)).or_insert(OrderingClaim {
                        later,
                        earlier,
                        kind: rel.kind.canonical(),
                        recorded: rel.kind,
                        certainty: rel.certainty,
                    });
                    claim.certainty = claim.certainty.min(rel.certainty);
                }
            }
        }

        (ordering.into_values().collect(), symmetric.into_values().collect())
    }
}

/// Contemporaneity classes: units joined by symmetric claims.
///
/// Returns the class root of every position; the root is the smallest
/// position in the class.
pub(crate) fn contemporaneity_classes(len: usize, symmetric: &[SymmetricClaim]) -> Vec<usize> {
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut parent: Vec<usize> = (0..len).collect();
    for claim in symmetric {
        let (a, b) = (find(&mut parent, claim.a), find(&mut parent, claim.b));
        if a != b {
            let (root, child) = (a.min(b), a.max(b));
            parent[child] = root;
        }
    }
    (0..len).map(|x| find(&mut parent, x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn site(records: &[(&str, &str)]) -> Analysis<StratigraphicGraph> {
        StratigraphicGraph::build(
            records
                .iter()
                .map(|(id, rel)| UnitRecord::new("S", *id).with_relationships(*rel)),
        )
        .unwrap()
    }

    #[test]
    fn builds_edges_from_relationship_text() {
        let built = site(&[("A", ""), ("B", "Covers A"), ("C", "Cuts B")]);
        let graph = &built.value;
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge("B", "A", RelationKind::Covers));
        assert!(graph.has_edge("C", "B", RelationKind::Cuts));
        let ids: Vec<_> = graph.nodes().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn self_loop_is_rejected_as_error() {
        let built = site(&[("A", "Covers A")]);
        assert_eq!(built.value.edge_count(), 0);
        assert_eq!(built.of_kind(DiagnosticKind::SelfLoop).count(), 1);
        assert_eq!(built.count(Severity::Error), 1);
    }

    #[test]
    fn dangling_target_is_rejected_once() {
        let built = site(&[("A", "Covers Z, Covers B"), ("B", "Covered by A")]);
        assert_eq!(built.value.edge_count(), 2);
        assert!(!built.value.edges().any(|e| e.target.as_str() == "Z"));
        assert_eq!(built.of_kind(DiagnosticKind::DanglingRelationship).count(), 1);
        assert_eq!(built.of_kind(DiagnosticKind::MissingReciprocal).count(), 0);
    }

    #[test]
    fn missing_reciprocal_keeps_edge() {
        let built = site(&[("X", "Covers Y"), ("Y", "")]);
        assert_eq!(built.value.edge_count(), 1);
        let missing: Vec<_> = built.of_kind(DiagnosticKind::MissingReciprocal).collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].message.contains("covered by"));
    }

    #[test]
    fn edges_are_grouped_by_source() {
        let built = site(&[("A", "Covers C, Covers B"), ("B", "Covers C"), ("C", "")]);
        let pairs: Vec<_> = built
            .value
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, [("A", "C"), ("A", "B"), ("B", "C")]);
    }

    #[test]
    fn duplicate_unit_is_reported_and_skipped() {
        let built = site(&[("A", ""), ("A", "Covers B"), ("B", "")]);
        assert_eq!(built.value.node_count(), 2);
        assert_eq!(built.value.edge_count(), 0);
        assert_eq!(built.of_kind(DiagnosticKind::DuplicateUnit).count(), 1);
    }

    #[test]
    fn mixed_sites_are_fatal() {
        let err = StratigraphicGraph::build([UnitRecord::new("S", "1"), UnitRecord::new("T", "2")])
            .unwrap_err();
        assert!(matches!(err, HarrisError::Record(RecordError::SiteMismatch { index: 1, .. })));
    }

    #[test]
    fn reciprocal_pair_collapses_to_one_claim() {
        let built = site(&[("X", "Covers Y"), ("Y", "Covered by X")]);
        let (ordering, symmetric) = built.value.claims();
        assert_eq!(ordering.len(), 1);
        assert!(symmetric.is_empty());
        assert_eq!((ordering[0].later, ordering[0].earlier), (0, 1));
        assert_eq!(ordering[0].kind, RelationKind::Covers);
    }

    #[test]
    fn claim_positions_follow_insertion_order() {
        let built = site(&[("A", ""), ("A", "Covers C"), ("B", "Covered by C"), ("C", "")]);
        let (ordering, _) = built.value.claims();
        assert_eq!(ordering.len(), 1);
        assert_eq!((ordering[0].later, ordering[0].earlier), (2, 1));
        assert_eq!(built.value.unit_at(2).id.as_str(), "C");
    }

    #[test]
    fn symmetric_claims_merge_classes() {
        let built = site(&[("A", "Equals B"), ("B", ""), ("C", "Bonds to B"), ("D", "")]);
        let (_, symmetric) = built.value.claims();
        assert_eq!(contemporaneity_classes(4, &symmetric), [0, 0, 0, 3]);
    }
}
