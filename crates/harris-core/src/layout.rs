//! Matrix layout: transitive reduction and layering
//!
//! Works on the canonical ordering claims of a graph (source = later unit):
//!
//! 1. Units joined by symmetric relations form contemporaneity classes and
//!    share one layer.
//! 2. Ordering claims inside a class, or on a cycle of the class graph, are
//!    excluded from the rendered set and returned separately.
//! 3. The remaining claims form a DAG; a direct claim implied by a longer
//!    chain is dropped (transitive reduction).
//! 4. Layers are longest-path depths from the earliest units: a class with
//!    no earlier class gets layer 0, every other class one more than its
//!    deepest earlier class.
//!
//! So for every rendered ordering edge `layer(source) > layer(target)`, and
//! for every rendered symmetric edge the two layers are equal.

use crate::diagnostics::{Analysis, Diagnostic, DiagnosticKind, Location};
use crate::error::InvariantViolation;
use crate::graph::{contemporaneity_classes, OrderingClaim, StratigraphicGraph};
use crate::kind::{Certainty, RelationKind};
use crate::unit::UnitId;
use indexmap::IndexMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// An edge of the rendered matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatrixEdge {
    /// Later unit for ordering edges
    pub source: UnitId,
    /// Earlier unit for ordering edges
    pub target: UnitId,
    /// Canonical kind
    pub kind: RelationKind,
    /// Certainty
    pub certainty: Certainty,
}

impl MatrixEdge {
    /// True unless the kind is symmetric
    #[inline]
    #[must_use]
    pub fn is_ordering(&self) -> bool {
        !self.kind.is_symmetric()
    }
}

/// Why an ordering edge was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Lies on a cycle
    Cycle,
    /// Joins two units recorded as contemporary
    Contemporaneous,
}

/// An ordering edge excluded from layering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedEdge {
    /// The edge
    pub edge: MatrixEdge,
    /// Why it was excluded
    pub reason: ExclusionReason,
}

/// Reduced edges and layer assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixLayout {
    /// Rendered edges: surviving ordering edges then symmetric edges
    pub edges: Vec<MatrixEdge>,
    /// Ordering edges dropped by transitive reduction
    pub redundant: Vec<MatrixEdge>,
    /// Ordering edges excluded before reduction
    pub excluded: Vec<ExcludedEdge>,
    layers: IndexMap<UnitId, usize>,
}

impl MatrixLayout {
    /// Layer of a unit
    pub fn layer_of(&self, unit: &str) -> Result<usize, InvariantViolation> {
        self.layers
            .get(unit)
            .copied()
            .ok_or_else(|| InvariantViolation::MissingLayer(UnitId::new(unit)))
    }

    /// Every unit with its layer, in graph insertion order
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &IndexMap<UnitId, usize> {
        &self.layers
    }

    /// Number of layers
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.values().max().map_or(0, |max| max + 1)
    }

    /// Units in one layer, in insertion order
    pub fn units_in_layer(&self, layer: usize) -> impl Iterator<Item = &UnitId> + '_ {
        self.layers
            .iter()
            .filter(move |(_, &l)| l == layer)
            .map(|(id, _)| id)
    }
}

/// Stateless layout engine
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixLayoutEngine;

impl MatrixLayoutEngine {
    /// Create an engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reduce the ordering edges and assign layers
    pub fn reduce_and_layer(
        &self,
        graph: &StratigraphicGraph,
    ) -> Result<Analysis<MatrixLayout>, InvariantViolation> {
        let (ordering, symmetric) = graph.claims();
        let n = graph.node_count();
        let classes = contemporaneity_classes(n, &symmetric);
        let edge = |claim: &OrderingClaim| MatrixEdge {
            source: graph.unit_at(claim.later).id.clone(),
            target: graph.unit_at(claim.earlier).id.clone(),
            kind: claim.kind,
            certainty: claim.certainty,
        };

        // class graph, earlier -> later
        let mut class_graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for &class in &classes {
            class_graph.add_node(class);
        }

        let mut excluded = Vec::new();
        let mut kept: Vec<&OrderingClaim> = Vec::new();
        for claim in &ordering {
            let (later, earlier) = (classes[claim.later], classes[claim.earlier]);
            if later == earlier {
                excluded.push(ExcludedEdge {
                    edge: edge(claim),
                    reason: ExclusionReason::Contemporaneous,
                });
            } else {
                class_graph.add_edge(earlier, later, ());
                kept.push(claim);
            }
        }

        let mut component: HashMap<usize, usize> = HashMap::new();
        for (i, scc) in tarjan_scc(&class_graph).into_iter().enumerate() {
            if scc.len() > 1 {
                component.extend(scc.into_iter().map(|class| (class, i)));
            }
        }
        kept.retain(|claim| {
            let (later, earlier) = (classes[claim.later], classes[claim.earlier]);
            match (component.get(&later), component.get(&earlier)) {
                (Some(a), Some(b)) if a == b => {
                    class_graph.remove_edge(earlier, later);
                    excluded.push(ExcludedEdge {
                        edge: edge(*claim),
                        reason: ExclusionReason::Cycle,
                    });
                    false
                }
                _ => true,
            }
        });

        // unit working graph, later -> earlier
        let mut working: DiGraphMap<usize, ()> = DiGraphMap::new();
        for position in 0..n {
            working.add_node(position);
        }
        for claim in &kept {
            working.add_edge(claim.later, claim.earlier, ());
        }
        let redundant: HashSet<(usize, usize)> =
            transitive_reduction(graph, &mut working)?.into_iter().collect();

        let layers = longest_path_layers(graph, &classes, &class_graph)?;

        let mut edges = Vec::new();
        let mut dropped = Vec::new();
        for claim in kept {
            if working.contains_edge(claim.later, claim.earlier) {
                edges.push(edge(claim));
            } else if redundant.contains(&(claim.later, claim.earlier)) {
                dropped.push(edge(claim));
            }
        }
        edges.extend(symmetric.iter().map(|claim| MatrixEdge {
            source: graph.unit_at(claim.a).id.clone(),
            target: graph.unit_at(claim.b).id.clone(),
            kind: claim.kind,
            certainty: claim.certainty,
        }));

        let diagnostics: Vec<Diagnostic> = excluded
            .iter()
            .map(|ex| {
                let why = match ex.reason {
                    ExclusionReason::Cycle => "lies on a cycle",
                    ExclusionReason::Contemporaneous => "joins contemporary units",
                };
                Diagnostic::new(
                    DiagnosticKind::ExcludedEdge,
                    Location::relation(&ex.edge.source, ex.edge.target.as_str()),
                    format!(
                        "{} {} {} {why}, left out of the matrix",
                        ex.edge.source, ex.edge.kind, ex.edge.target
                    ),
                )
            })
            .collect();
        if !excluded.is_empty() {
            tracing::warn!(
                site = graph.site(),
                excluded = excluded.len(),
                "ordering edges excluded from layering"
            );
        }

        let layout = MatrixLayout {
            edges,
            redundant: dropped,
            excluded,
            layers,
        };
        tracing::debug!(
            site = graph.site(),
            edges = layout.edges.len(),
            redundant = layout.redundant.len(),
            layers = layout.layer_count(),
            "reduced and layered matrix"
        );
        Ok(Analysis::new(layout, diagnostics))
    }
}

/// Reduce and layer with a default engine
pub fn reduce_and_layer(
    graph: &StratigraphicGraph,
) -> Result<Analysis<MatrixLayout>, InvariantViolation> {
    MatrixLayoutEngine::new().reduce_and_layer(graph)
}

/// Remove every edge implied by a longer path. `working` must be acyclic.
///
/// Descendant sets are built earliest-first in one topological pass; an
/// edge `u -> v` is redundant when `v` descends from another successor of `u`.
fn transitive_reduction(
    graph: &StratigraphicGraph,
    working: &mut DiGraphMap<usize, ()>,
) -> Result<Vec<(usize, usize)>, InvariantViolation> {
    let order = toposort(&*working, None).map_err(|cycle| {
        InvariantViolation::CyclicWorkingGraph(graph.unit_at(cycle.node_id()).id.clone())
    })?;

    let mut descendants: Vec<HashSet<usize>> = vec![HashSet::new(); graph.node_count()];
    let mut redundant = Vec::new();

    for &node in order.iter().rev() {
        let successors: Vec<usize> = working.neighbors(node).collect();
        let mut reach = HashSet::new();
        for &next in &successors {
            reach.insert(next);
            reach.extend(descendants[next].iter().copied());
        }
        for &next in &successors {
            if successors
                .iter()
                .any(|&other| other != next && descendants[other].contains(&next))
            {
                redundant.push((node, next));
            }
        }
        descendants[node] = reach;
    }

    for &(from, to) in &redundant {
        if working.remove_edge(from, to).is_none() {
            return Err(InvariantViolation::UnknownEdge {
                from: graph.unit_at(from).id.clone(),
                to: graph.unit_at(to).id.clone(),
            });
        }
    }
    Ok(redundant)
}

/// Longest-path layers over the acyclic class graph (earlier -> later)
fn longest_path_layers(
    graph: &StratigraphicGraph,
    classes: &[usize],
    class_graph: &DiGraphMap<usize, ()>,
) -> Result<IndexMap<UnitId, usize>, InvariantViolation> {
    let order = toposort(class_graph, None).map_err(|cycle| {
        InvariantViolation::CyclicWorkingGraph(graph.unit_at(cycle.node_id()).id.clone())
    })?;

    let mut class_layer: HashMap<usize, usize> = HashMap::with_capacity(order.len());
    for class in order {
        let layer = class_graph
            .neighbors_directed(class, Direction::Incoming)
            .filter_map(|earlier| class_layer.get(&earlier))
            .map(|l| l + 1)
            .max()
            .unwrap_or(0);
        class_layer.insert(class, layer);
    }

    classes
        .iter()
        .enumerate()
        .map(|(position, class)| {
            let id = graph.unit_at(position).id.clone();
            match class_layer.get(class) {
                Some(&layer) => Ok((id, layer)),
                None => Err(InvariantViolation::MissingLayer(id)),
            }
        })
        .collect()
}
