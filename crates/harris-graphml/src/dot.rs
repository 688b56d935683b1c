//! GraphViz DOT rendering of a laid-out matrix
//!
//! A quick-look alternative to the yEd document: one `rank=same` group per
//! layer, latest layer first, reduced edges only.

use crate::style::{node_style, EdgeStyleMap};
use harris_core::{Certainty, MatrixLayout, StratigraphicGraph};
use std::fmt::Write;

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render the reduced matrix as a DOT digraph
#[must_use]
pub fn render_dot(graph: &StratigraphicGraph, layout: &MatrixLayout, styles: &EdgeStyleMap) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "digraph {} {{", quote(graph.site()));
    out.push_str("  rankdir=TB;\n");
    out.push_str("  node [shape=box, style=filled, fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n\n");

    for unit in graph.nodes() {
        let style = node_style(unit.kind);
        let _ = writeln!(
            out,
            "  {} [label={}, fillcolor=\"{}\"];",
            quote(unit.id.as_str()),
            quote(unit.id.as_str()),
            style.fill
        );
    }
    out.push('\n');

    for layer in (0..layout.layer_count()).rev() {
        let members: Vec<String> = layout.units_in_layer(layer).map(|u| quote(u.as_str())).collect();
        if members.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {{ rank=same; {}; }}", members.join("; "));
    }
    out.push('\n');

    for edge in &layout.edges {
        let style = styles.style(edge.kind);
        let line = if edge.certainty == Certainty::Uncertain {
            "dotted"
        } else {
            style.line.as_dot()
        };
        let _ = write!(
            out,
            "  {} -> {} [label={}, color=\"{}\", style={}",
            quote(edge.source.as_str()),
            quote(edge.target.as_str()),
            quote(edge.kind.label()),
            style.color,
            line
        );
        if !style.arrow {
            out.push_str(", dir=none");
        }
        out.push_str("];\n");
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_core::{analyze, PeriodLookup, UnitRecord};

    fn render(records: Vec<UnitRecord>) -> String {
        let a = analyze(records, &PeriodLookup::new()).unwrap().value;
        render_dot(&a.graph, &a.layout, &EdgeStyleMap::new())
    }

    #[test]
    fn layers_become_rank_groups_latest_first() {
        let dot = render(vec![
            UnitRecord::new("S", "1"),
            UnitRecord::new("S", "2").with_relationships("Covers 1"),
            UnitRecord::new("S", "3").with_relationships("Cuts 2"),
        ]);
        let top = dot.find("{ rank=same; \"3\"; }").unwrap();
        let bottom = dot.find("{ rank=same; \"1\"; }").unwrap();
        assert!(top < bottom);
        assert!(dot.contains("\"3\" -> \"2\" [label=\"cuts\", color=\"#C0392B\", style=dashed];"));
    }

    #[test]
    fn symmetric_edges_have_no_direction() {
        let dot = render(vec![
            UnitRecord::new("S", "1"),
            UnitRecord::new("S", "2").with_relationships("Equals 1"),
        ]);
        assert!(dot.contains("dir=none"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(quote("a \"b\"\\"), "\"a \\\"b\\\"\\\\\"");
    }
}
