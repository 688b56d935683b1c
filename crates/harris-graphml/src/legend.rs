//! Legend document: one sample edge per relation kind

use crate::config::LayoutStyle;
use crate::error::ExportError;
use crate::serializer::{render_document, DocumentModel, EdgeModel, NodeModel};
use crate::style::{node_style, EdgeStyleMap};
use harris_core::UnitKind;

/// Legend title
pub const LEGEND_TITLE: &str = "Legenda";

/// Build the legend model
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn legend_model(styles: &EdgeStyleMap, style: &LayoutStyle) -> DocumentModel {
    let row_height = style.node_height + style.vertical_spacing;
    let target_x = style.node_width * 2.0 + style.horizontal_spacing * 3.0;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (i, entry) in styles.legend().into_iter().enumerate() {
        let y = i as f64 * row_height;
        let node = |n: usize, label: String, x: f64| NodeModel {
            id: format!("n{n}"),
            label,
            description: String::new(),
            row: None,
            x,
            y,
            width: style.node_width * 2.0,
            height: style.node_height,
            style: node_style(UnitKind::Layer),
        };
        nodes.push(node(2 * i, entry.kind.to_string(), 0.0));
        nodes.push(node(2 * i + 1, entry.kind.inverse().to_string(), target_x));
        edges.push(EdgeModel {
            id: format!("e{i}"),
            source: format!("n{}", 2 * i),
            target: format!("n{}", 2 * i + 1),
            description: entry.kind.to_string(),
            style: entry.style,
        });
    }

    DocumentModel {
        description: LEGEND_TITLE.to_string(),
        table: None,
        nodes,
        edges,
    }
}

/// Render the legend as its own GraphML document
pub fn serialize_legend(styles: &EdgeStyleMap, style: &LayoutStyle) -> Result<String, ExportError> {
    render_document(&legend_model(styles, style), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_core::RelationKind;

    #[test]
    fn one_edge_per_kind() {
        let model = legend_model(&EdgeStyleMap::new(), &LayoutStyle::default());
        assert_eq!(model.edges.len(), RelationKind::ALL.len());
        assert_eq!(model.nodes.len(), 2 * RelationKind::ALL.len());
        assert_eq!(model.nodes[0].label, "covers");
        assert_eq!(model.nodes[1].label, "covered by");
    }

    #[test]
    fn legend_document_is_graphml() {
        let xml = serialize_legend(&EdgeStyleMap::new(), &LayoutStyle::default()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<y:Arrows source=\"none\" target=\"standard\"/>"));
        assert!(xml.contains("<y:Arrows source=\"none\" target=\"none\"/>"));
        assert!(!xml.contains("y:TableNode"));
    }
}
