//! Testing utilities for the Harris Matrix workspace
//!
//! Shared record builders, canned sites and assertions.

#![allow(missing_docs)]

use harris_core::{
    analyze, Analysis, InMemoryStore, MatrixAnalysis, MatrixLayout, PeriodLookup,
    StratigraphicGraph, UnitRecord,
};

pub const SITE: &str = "Test Site";

/// Records for `(unit, relationships)` pairs on [`SITE`]
pub fn records(units: &[(&str, &str)]) -> Vec<UnitRecord> {
    units
        .iter()
        .map(|(unit, rel)| UnitRecord::new(SITE, *unit).with_relationships(*rel))
        .collect()
}

/// Records for `(unit, relationships, period, phase)` tuples on [`SITE`]
pub fn dated_records(units: &[(&str, &str, &str, &str)]) -> Vec<UnitRecord> {
    units
        .iter()
        .map(|(unit, rel, period, phase)| {
            UnitRecord::new(SITE, *unit)
                .with_relationships(*rel)
                .with_period(*period, *phase)
        })
        .collect()
}

pub fn build_graph(units: &[(&str, &str)]) -> StratigraphicGraph {
    StratigraphicGraph::build(records(units)).unwrap().value
}

pub fn analyze_units(units: &[(&str, &str)]) -> Analysis<MatrixAnalysis> {
    analyze(records(units), &PeriodLookup::new()).unwrap()
}

/// A small excavation: two periods, a cut and its fill, a wall bonded to a floor,
/// one undated unit.
pub fn excavation() -> (Vec<UnitRecord>, PeriodLookup) {
    let units = vec![
        UnitRecord::new(SITE, "1")
            .with_relationships("Copre 2, 3")
            .with_period("2", "1")
            .with_interpretation("topsoil"),
        UnitRecord::new(SITE, "2")
            .with_relationships("Coperto da 1; Riempie 4")
            .with_period("2", "1")
            .with_interpretation("pit fill"),
        UnitRecord::new(SITE, "3")
            .with_relationships("Coperto da 1, Copre 5")
            .with_period("1", "2")
            .with_area("A"),
        UnitRecord::new(SITE, "4")
            .with_relationships("Riempito da 2, Taglia 5")
            .with_period("1", "2")
            .with_interpretation("pit cut"),
        UnitRecord::new(SITE, "5")
            .with_relationships("Coperto da 3, Tagliato da 4, Si lega a 6")
            .with_period("1", "1")
            .with_kind("USM")
            .with_interpretation("wall"),
        UnitRecord::new(SITE, "6")
            .with_relationships("Si lega a 5")
            .with_period("1", "1")
            .with_area("B")
            .with_interpretation("floor"),
        UnitRecord::new(SITE, "7").with_interpretation("spoil heap"),
    ];
    let lookup = PeriodLookup::new()
        .with("1", "1", "Roman, first phase")
        .with("1", "2", "Roman, second phase")
        .with("2", "1", "Medieval");
    (units, lookup)
}

pub fn excavation_store() -> InMemoryStore {
    let (units, lookup) = excavation();
    InMemoryStore::new()
        .with_units(SITE, units)
        .with_periodization(SITE, lookup)
}

pub fn analyze_excavation() -> Analysis<MatrixAnalysis> {
    let (units, lookup) = excavation();
    analyze(units, &lookup).unwrap()
}

/// Assert no rendered edge is implied by a longer rendered path
pub fn assert_reduced(layout: &MatrixLayout) {
    let ordering: Vec<(&str, &str)> = layout
        .edges
        .iter()
        .filter(|e| e.is_ordering())
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();

    for &(from, to) in &ordering {
        let mut stack: Vec<&str> = ordering
            .iter()
            .filter(|&&(s, t)| s == from && t != to)
            .map(|&(_, t)| t)
            .collect();
        let mut seen = std::collections::HashSet::new();
        while let Some(node) = stack.pop() {
            assert_ne!(node, to, "edge {from} -> {to} is implied by a longer path");
            if seen.insert(node) {
                stack.extend(ordering.iter().filter(|&&(s, _)| s == node).map(|&(_, t)| t));
            }
        }
    }
}

/// Assert ordering edges go down in layer and symmetric edges stay level
pub fn assert_layered(layout: &MatrixLayout) {
    for edge in &layout.edges {
        let source = layout.layer_of(edge.source.as_str()).unwrap();
        let target = layout.layer_of(edge.target.as_str()).unwrap();
        if edge.is_ordering() {
            assert!(
                source > target,
                "{} (layer {source}) {} {} (layer {target})",
                edge.source,
                edge.kind,
                edge.target
            );
        } else {
            assert_eq!(source, target, "{} {} {}", edge.source, edge.kind, edge.target);
        }
    }
}
