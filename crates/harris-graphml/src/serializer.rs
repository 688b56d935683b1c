//! yEd GraphML serializer
//!
//! Serialization is one pure pass: the complete node/edge/label model is
//! built first ([`DocumentModel`]), then written once. Identical input gives
//! byte-identical output.
//!
//! Document layout (yEd dialect):
//!
//! ```text
//! graphml
//! ├── key d0..d11
//! ├── graph G (edgedefault="directed")
//! │   ├── node n0 (yfiles.foldertype="group", y:TableNode)   [when grouped]
//! │   │   └── graph n0:
//! │   │       └── node n0::n<i> (y:ShapeNode)
//! │   └── edge e<i> (y:PolyLineEdge)
//! └── data d7 (y:Resources)
//! ```
//!
//! Row labels use `y:RowNodeLabelModel`; each node also carries its row label
//! under [`ROW_KEY`].

use crate::config::{ExportOptions, GroupingMode, HarrisConfig, LayoutStyle};
use crate::error::ExportError;
use crate::style::{node_style, EdgeStyle, EdgeStyleMap, NodeStyle};
use crate::xml::{num, XmlWriter};
use harris_core::{
    Certainty, InvariantViolation, MatrixLayout, PeriodGrouping, StratigraphicGraph, Unit, UnitId,
};
use std::collections::{BTreeSet, HashMap};

/// Node description key
pub const NODE_DESCRIPTION_KEY: &str = "d5";
/// Node graphics key
pub const NODE_GRAPHICS_KEY: &str = "d6";
/// Edge description key
pub const EDGE_DESCRIPTION_KEY: &str = "d9";
/// Edge graphics key
pub const EDGE_GRAPHICS_KEY: &str = "d10";
/// Row assignment key: the label of the row holding the node
pub const ROW_KEY: &str = "d11";
/// Column label for units without an area
pub const NO_AREA_LABEL: &str = "Area non definita";

const GRAPH_DESCRIPTION_KEY: &str = "d0";
const RESOURCES_KEY: &str = "d7";

const NAMESPACES: [(&str, &str); 8] = [
    ("xmlns", "http://graphml.graphdrawing.org/xmlns"),
    ("xmlns:java", "http://www.yworks.com/xml/yfiles-common/1.0/java"),
    ("xmlns:sys", "http://www.yworks.com/xml/yfiles-common/markup/primitives/2.0"),
    ("xmlns:x", "http://www.yworks.com/xml/yfiles-common/markup/2.0"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xmlns:y", "http://www.yworks.com/xml/graphml"),
    ("xmlns:yed", "http://www.yworks.com/xml/yed/3"),
    (
        "xsi:schemaLocation",
        "http://graphml.graphdrawing.org/xmlns http://www.yworks.com/xml/schema/graphml/1.1/ygraphml.xsd",
    ),
];

/// `(id, for, attr.name, yfiles.type)`; empty means absent
const KEYS: [(&str, &str, &str, &str); 12] = [
    (GRAPH_DESCRIPTION_KEY, "graph", "Description", ""),
    ("d1", "port", "", "portgraphics"),
    ("d2", "port", "", "portgeometry"),
    ("d3", "port", "", "portuserdata"),
    ("d4", "node", "url", ""),
    (NODE_DESCRIPTION_KEY, "node", "description", ""),
    (NODE_GRAPHICS_KEY, "node", "", "nodegraphics"),
    (RESOURCES_KEY, "graphml", "", "resources"),
    ("d8", "edge", "url", ""),
    (EDGE_DESCRIPTION_KEY, "edge", "description", ""),
    (EDGE_GRAPHICS_KEY, "edge", "", "edgegraphics"),
    (ROW_KEY, "node", "row", ""),
];

const TABLE_ID: &str = "n0";

/// A visual node, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NodeModel {
    /// Document id
    pub id: String,
    /// Label text
    pub label: String,
    /// Description data
    pub description: String,
    /// Row label when inside a table
    pub row: Option<String>,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Shape and fill
    pub style: NodeStyle,
}

/// A visual edge, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeModel {
    /// Document id
    pub id: String,
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Description data
    pub description: String,
    /// Line style
    pub style: EdgeStyle,
}

/// A table row or column
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// `row_<i>` / `column_<i>`
    pub id: String,
    /// Header label, empty for an unlabeled lane
    pub label: String,
    /// Height of a row, width of a column
    pub size: f64,
}

/// The swimlane table
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    /// Table title
    pub title: String,
    /// Total width
    pub width: f64,
    /// Total height
    pub height: f64,
    /// Rows, top to bottom
    pub rows: Vec<Lane>,
    /// Columns, left to right
    pub columns: Vec<Lane>,
}

/// Everything the writer needs
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    /// Graph description
    pub description: String,
    /// Swimlane table, if grouping
    pub table: Option<TableModel>,
    /// Nodes, in unit insertion order
    pub nodes: Vec<NodeModel>,
    /// Edges, in layout order
    pub edges: Vec<EdgeModel>,
}

/// Row and column assignment of every unit
struct Lanes {
    rows: Vec<String>,
    columns: Vec<String>,
    row_of: Vec<usize>,
    column_of: Vec<usize>,
}

/// yEd GraphML serializer
#[derive(Debug, Clone, Default)]
pub struct GraphMLSerializer {
    options: ExportOptions,
    style: LayoutStyle,
    edge_styles: EdgeStyleMap,
}

impl GraphMLSerializer {
    /// Serializer with explicit options and style
    #[must_use]
    pub fn new(options: ExportOptions, style: LayoutStyle) -> Self {
        Self {
            options,
            style,
            edge_styles: EdgeStyleMap::default(),
        }
    }

    /// Serializer from a configuration file
    #[must_use]
    pub fn from_config(config: &HarrisConfig) -> Self {
        Self::new(config.export, config.style.clone())
    }

    /// With a custom edge style table
    #[must_use]
    pub fn with_edge_styles(mut self, edge_styles: EdgeStyleMap) -> Self {
        self.edge_styles = edge_styles;
        self
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Render a graph to a GraphML document
    pub fn serialize(
        &self,
        graph: &StratigraphicGraph,
        layout: &MatrixLayout,
        periods: &PeriodGrouping,
    ) -> Result<String, ExportError> {
        let model = self.build_model(graph, layout, periods)?;
        render_document(&model, &self.style)
    }

    /// Build the document model without writing it
    #[allow(clippy::cast_precision_loss)]
    pub fn build_model(
        &self,
        graph: &StratigraphicGraph,
        layout: &MatrixLayout,
        periods: &PeriodGrouping,
    ) -> Result<DocumentModel, ExportError> {
        let units: Vec<&Unit> = graph.nodes().collect();
        let layers = units
            .iter()
            .map(|u| layout.layer_of(u.id.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let table = self.options.uses_table();
        let lanes = if table {
            self.lanes(&units, periods)?
        } else {
            Lanes {
                rows: vec![String::new()],
                columns: vec![String::new()],
                row_of: vec![0; units.len()],
                column_of: vec![0; units.len()],
            }
        };

        let s = &self.style;
        let cell_w = s.node_width + s.horizontal_spacing;
        let cell_h = s.node_height + s.vertical_spacing;

        // distinct layers per row, latest first
        let mut row_layers: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); lanes.rows.len()];
        for (i, &layer) in layers.iter().enumerate() {
            row_layers[lanes.row_of[i]].insert(layer);
        }

        let mut filled: HashMap<(usize, usize, usize), usize> = HashMap::new();
        let mut slot = vec![0; units.len()];
        let mut column_slots = vec![1usize; lanes.columns.len()];
        for (i, &layer) in layers.iter().enumerate() {
            let count = filled
                .entry((lanes.row_of[i], lanes.column_of[i], layer))
                .or_insert(0);
            slot[i] = *count;
            *count += 1;
            let widest = &mut column_slots[lanes.column_of[i]];
            *widest = (*widest).max(*count);
        }

        let column_widths: Vec<f64> = column_slots
            .iter()
            .map(|&k| k as f64 * cell_w + s.horizontal_spacing)
            .collect();
        let row_heights: Vec<f64> = row_layers
            .iter()
            .map(|l| l.len().max(1) as f64 * cell_h + s.vertical_spacing)
            .collect();

        let labeled_columns = table && self.options.grouping_mode == GroupingMode::PeriodArea;
        let left = if table { s.row_header_width } else { 0.0 };
        let top = match (table, labeled_columns) {
            (false, _) => 0.0,
            (true, false) => s.title_height,
            (true, true) => s.title_height + s.column_header_height,
        };
        let column_offsets = offsets(left, &column_widths);
        let row_offsets = offsets(top, &row_heights);

        let mut node_ids: HashMap<&str, String> = HashMap::with_capacity(units.len());
        let mut nodes = Vec::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let (row, column) = (lanes.row_of[i], lanes.column_of[i]);
            let level = row_layers[row]
                .iter()
                .rev()
                .position(|&l| l == layers[i])
                .unwrap_or(0);
            let id = if table {
                format!("{TABLE_ID}::n{i}")
            } else {
                format!("n{i}")
            };
            node_ids.insert(unit.id.as_str(), id.clone());
            nodes.push(NodeModel {
                id,
                label: self.label(unit),
                description: unit.short_definition().to_string(),
                row: table.then(|| lanes.rows[row].clone()),
                x: column_offsets[column] + s.horizontal_spacing + slot[i] as f64 * cell_w,
                y: row_offsets[row] + s.vertical_spacing + level as f64 * cell_h,
                width: s.node_width,
                height: s.node_height,
                style: node_style(unit.kind),
            });
        }

        let edges = layout
            .edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                let lookup = |id: &UnitId| {
                    node_ids
                        .get(id.as_str())
                        .cloned()
                        .ok_or_else(|| InvariantViolation::UnknownUnit(id.clone()))
                };
                let uncertain = if edge.certainty == Certainty::Uncertain { "?" } else { "" };
                Ok(EdgeModel {
                    id: format!("e{i}"),
                    source: lookup(&edge.source)?,
                    target: lookup(&edge.target)?,
                    description: format!("{}{uncertain}", edge.kind),
                    style: self.edge_styles.style(edge.kind).clone(),
                })
            })
            .collect::<Result<Vec<_>, InvariantViolation>>()?;

        let table = table.then(|| {
            let lane = |prefix: &str, labels: &[String], sizes: &[f64], labeled: bool| {
                labels
                    .iter()
                    .zip(sizes)
                    .enumerate()
                    .map(|(i, (label, &size))| Lane {
                        id: format!("{prefix}_{i}"),
                        label: if labeled { label.clone() } else { String::new() },
                        size,
                    })
                    .collect::<Vec<_>>()
            };
            TableModel {
                title: s.table_title.clone(),
                width: left + column_widths.iter().sum::<f64>(),
                height: top + row_heights.iter().sum::<f64>(),
                rows: lane("row", &lanes.rows, &row_heights, true),
                columns: lane("column", &lanes.columns, &column_widths, labeled_columns),
            }
        });

        Ok(DocumentModel {
            description: graph.site().to_string(),
            table,
            nodes,
            edges,
        })
    }

    fn label(&self, unit: &Unit) -> String {
        if !self.options.use_extended_labels {
            return unit.id.to_string();
        }
        let mut lines = vec![format!("{} {}", unit.kind.code(), unit.id)];
        let short = unit.short_definition();
        if !short.is_empty() {
            lines.push(short.to_string());
        }
        let code = unit.chronology.code();
        if !code.is_empty() {
            lines.push(code);
        }
        lines.join("\n")
    }

    fn lanes(&self, units: &[&Unit], periods: &PeriodGrouping) -> Result<Lanes, ExportError> {
        let areas: BTreeSet<&str> = units
            .iter()
            .map(|u| u.area.as_str())
            .filter(|a| !a.is_empty())
            .collect();
        let has_blank = units.iter().any(|u| u.area.is_empty());
        let mut area_labels: Vec<String> = areas.iter().map(|a| format!("Area {a}")).collect();
        if has_blank {
            area_labels.push(NO_AREA_LABEL.to_string());
        }
        let area_index = |area: &str| {
            if area.is_empty() {
                area_labels.len() - 1
            } else {
                areas.iter().position(|a| *a == area).unwrap_or(0)
            }
        };
        let area_of: Vec<usize> = units.iter().map(|u| area_index(u.area.as_str())).collect();

        let mode = self.options.grouping_mode;
        let (rows, row_of) = if mode.groups_by_period() {
            let rows: Vec<String> = periods
                .ordered(self.options.reverse_epochs)
                .map(|b| b.label.clone())
                .collect();
            let index: HashMap<&str, usize> = rows
                .iter()
                .enumerate()
                .map(|(i, label)| (label.as_str(), i))
                .collect();
            let row_of = units
                .iter()
                .map(|u| {
                    periods
                        .label_of(u.id.as_str())
                        .and_then(|label| index.get(label).copied())
                        .ok_or_else(|| InvariantViolation::UnknownUnit(u.id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            (rows, row_of)
        } else {
            (area_labels.clone(), area_of.clone())
        };

        let (columns, column_of) = if mode == GroupingMode::PeriodArea {
            (area_labels, area_of)
        } else {
            (vec![String::new()], vec![0; units.len()])
        };

        Ok(Lanes {
            rows,
            columns,
            row_of,
            column_of,
        })
    }
}

fn offsets(start: f64, sizes: &[f64]) -> Vec<f64> {
    sizes
        .iter()
        .scan(start, |acc, size| {
            let at = *acc;
            *acc += size;
            Some(at)
        })
        .collect()
}

/// Write a document model as yEd GraphML
pub fn render_document(model: &DocumentModel, style: &LayoutStyle) -> Result<String, ExportError> {
    let mut xml = XmlWriter::new();
    xml.declaration()?;
    xml.start("graphml", &NAMESPACES)?;

    for (id, target, name, yfiles) in KEYS {
        let mut attrs = Vec::with_capacity(4);
        if !name.is_empty() {
            attrs.push(("attr.name", name));
            attrs.push(("attr.type", "string"));
        }
        attrs.push(("for", target));
        attrs.push(("id", id));
        if !yfiles.is_empty() {
            attrs.push(("yfiles.type", yfiles));
        }
        xml.empty("key", &attrs)?;
    }

    xml.start("graph", &[("edgedefault", "directed"), ("id", "G")])?;
    xml.text_element("data", &[("key", GRAPH_DESCRIPTION_KEY)], &model.description)?;

    match &model.table {
        Some(table) => {
            xml.start("node", &[("id", TABLE_ID), ("yfiles.foldertype", "group")])?;
            xml.start("data", &[("key", NODE_GRAPHICS_KEY)])?;
            write_table(&mut xml, table, style)?;
            xml.end("data")?;
            let inner = format!("{TABLE_ID}:");
            xml.start("graph", &[("edgedefault", "directed"), ("id", inner.as_str())])?;
            for node in &model.nodes {
                write_node(&mut xml, node, style)?;
            }
            xml.end("graph")?;
            xml.end("node")?;
        }
        None => {
            for node in &model.nodes {
                write_node(&mut xml, node, style)?;
            }
        }
    }

    for edge in &model.edges {
        write_edge(&mut xml, edge)?;
    }
    xml.end("graph")?;

    xml.start("data", &[("key", RESOURCES_KEY)])?;
    xml.empty("y:Resources", &[])?;
    xml.end("data")?;
    xml.end("graphml")?;
    xml.finish()
}

fn write_node(xml: &mut XmlWriter, node: &NodeModel, style: &LayoutStyle) -> Result<(), ExportError> {
    xml.start("node", &[("id", node.id.as_str())])?;
    xml.text_element("data", &[("key", NODE_DESCRIPTION_KEY)], &node.description)?;
    if let Some(row) = &node.row {
        xml.text_element("data", &[("key", ROW_KEY)], row)?;
    }
    xml.start("data", &[("key", NODE_GRAPHICS_KEY)])?;
    xml.start("y:ShapeNode", &[])?;
    xml.empty(
        "y:Geometry",
        &[
            ("height", num(node.height).as_str()),
            ("width", num(node.width).as_str()),
            ("x", num(node.x).as_str()),
            ("y", num(node.y).as_str()),
        ],
    )?;
    xml.empty("y:Fill", &[("color", node.style.fill), ("transparent", "false")])?;
    xml.empty(
        "y:BorderStyle",
        &[
            ("color", "#000000"),
            ("raised", "false"),
            ("type", node.style.border.as_yed()),
            ("width", "1.0"),
        ],
    )?;
    let font_size = style.font_size.to_string();
    xml.text_element(
        "y:NodeLabel",
        &[
            ("alignment", "center"),
            ("autoSizePolicy", "content"),
            ("fontFamily", "Dialog"),
            ("fontSize", font_size.as_str()),
            ("fontStyle", "plain"),
            ("hasBackgroundColor", "false"),
            ("hasLineColor", "false"),
            ("horizontalTextPosition", "center"),
            ("iconTextGap", "4"),
            ("modelName", "internal"),
            ("modelPosition", "c"),
            ("textColor", "#000000"),
            ("verticalTextPosition", "bottom"),
            ("visible", "true"),
            ("xml:space", "preserve"),
        ],
        &node.label,
    )?;
    xml.empty("y:Shape", &[("type", node.style.shape)])?;
    xml.end("y:ShapeNode")?;
    xml.end("data")?;
    xml.end("node")
}

fn write_edge(xml: &mut XmlWriter, edge: &EdgeModel) -> Result<(), ExportError> {
    xml.start(
        "edge",
        &[
            ("id", edge.id.as_str()),
            ("source", edge.source.as_str()),
            ("target", edge.target.as_str()),
        ],
    )?;
    xml.text_element("data", &[("key", EDGE_DESCRIPTION_KEY)], &edge.description)?;
    xml.start("data", &[("key", EDGE_GRAPHICS_KEY)])?;
    xml.start("y:PolyLineEdge", &[])?;
    xml.empty(
        "y:Path",
        &[("sx", "0.0"), ("sy", "0.0"), ("tx", "0.0"), ("ty", "0.0")],
    )?;
    let width = edge.style.width();
    xml.empty(
        "y:LineStyle",
        &[
            ("color", edge.style.color.as_str()),
            ("type", edge.style.line.as_yed()),
            ("width", width.as_str()),
        ],
    )?;
    xml.empty(
        "y:Arrows",
        &[("source", "none"), ("target", edge.style.yed_arrow())],
    )?;
    xml.empty("y:BendStyle", &[("smoothed", "false")])?;
    xml.end("y:PolyLineEdge")?;
    xml.end("data")?;
    xml.end("edge")
}

fn write_table(xml: &mut XmlWriter, table: &TableModel, style: &LayoutStyle) -> Result<(), ExportError> {
    let header_font = style.header_font_size.to_string();
    let row_inset = num(style.row_header_width);
    let labeled_columns = table.columns.iter().any(|c| !c.label.is_empty());
    let column_inset = if labeled_columns {
        num(style.column_header_height)
    } else {
        num(0.0)
    };

    xml.start("y:TableNode", &[("configuration", "YED_TABLE_NODE")])?;
    xml.empty(
        "y:Geometry",
        &[
            ("height", num(table.height).as_str()),
            ("width", num(table.width).as_str()),
            ("x", "0.0"),
            ("y", "0.0"),
        ],
    )?;
    xml.empty(
        "y:Fill",
        &[("color", "#ECF5FF"), ("color2", "#0042F440"), ("transparent", "false")],
    )?;
    xml.empty(
        "y:BorderStyle",
        &[("color", "#000000"), ("type", "line"), ("width", "1.0")],
    )?;
    xml.text_element(
        "y:NodeLabel",
        &[
            ("alignment", "center"),
            ("autoSizePolicy", "content"),
            ("fontFamily", "Dialog"),
            ("fontSize", header_font.as_str()),
            ("fontStyle", "bold"),
            ("hasBackgroundColor", "false"),
            ("hasLineColor", "false"),
            ("horizontalTextPosition", "center"),
            ("iconTextGap", "4"),
            ("modelName", "internal"),
            ("modelPosition", "t"),
            ("textColor", "#000000"),
            ("verticalTextPosition", "bottom"),
            ("visible", "true"),
            ("xml:space", "preserve"),
        ],
        &table.title,
    )?;

    for row in &table.rows {
        write_lane_label(xml, &header_font, &row.label, LaneKind::Row, &row.id)?;
    }
    for column in table.columns.iter().filter(|c| !c.label.is_empty()) {
        write_lane_label(xml, &header_font, &column.label, LaneKind::Column, &column.id)?;
    }

    xml.start("y:StyleProperties", &[])?;
    for property in [
        "y.view.tabular.TableNodePainter.ALTERNATE_ROW_STYLE",
        "y.view.tabular.TableNodePainter.ALTERNATE_COLUMN_STYLE",
    ] {
        xml.empty(
            "y:Property",
            &[("class", "java.lang.Boolean"), ("name", property), ("value", "false")],
        )?;
    }
    xml.end("y:StyleProperties")?;
    xml.empty(
        "y:State",
        &[
            ("autoResize", "true"),
            ("closed", "false"),
            ("closedHeight", "80.0"),
            ("closedWidth", "100.0"),
        ],
    )?;
    for name in ["y:Insets", "y:BorderInsets"] {
        xml.empty(
            name,
            &[
                ("bottom", "0"),
                ("bottomF", "0.0"),
                ("left", "0"),
                ("leftF", "0.0"),
                ("right", "0"),
                ("rightF", "0.0"),
                ("top", "0"),
                ("topF", "0.0"),
            ],
        )?;
    }

    xml.start(
        "y:Table",
        &[
            ("autoResizeTable", "true"),
            ("defaultColumnWidth", "120.0"),
            ("defaultMinimumColumnWidth", "80.0"),
            ("defaultMinimumRowHeight", "50.0"),
            ("defaultRowHeight", "80.0"),
        ],
    )?;
    let insets = |top: &str, left: &str| {
        [("bottom", "0.0"), ("left", left), ("right", "0.0"), ("top", top)]
            .map(|(k, v)| (k, v.to_string()))
    };
    let title = num(style.title_height);
    for (name, values) in [
        ("y:DefaultColumnInsets", insets(column_inset.as_str(), "0.0")),
        ("y:DefaultRowInsets", insets("0.0", row_inset.as_str())),
        ("y:Insets", insets(title.as_str(), "0.0")),
    ] {
        let attrs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
        xml.empty(name, &attrs)?;
    }

    xml.start("y:Columns", &[])?;
    for column in &table.columns {
        xml.start(
            "y:Column",
            &[
                ("id", column.id.as_str()),
                ("minimumWidth", "80.0"),
                ("width", num(column.size).as_str()),
            ],
        )?;
        xml.empty(
            "y:Insets",
            &[("bottom", "0.0"), ("left", "0.0"), ("right", "0.0"), ("top", column_inset.as_str())],
        )?;
        xml.end("y:Column")?;
    }
    xml.end("y:Columns")?;

    xml.start("y:Rows", &[])?;
    for row in &table.rows {
        xml.start(
            "y:Row",
            &[
                ("height", num(row.size).as_str()),
                ("id", row.id.as_str()),
                ("minimumHeight", "50.0"),
            ],
        )?;
        xml.empty(
            "y:Insets",
            &[("bottom", "0.0"), ("left", row_inset.as_str()), ("right", "0.0"), ("top", "0.0")],
        )?;
        xml.end("y:Row")?;
    }
    xml.end("y:Rows")?;
    xml.end("y:Table")?;
    xml.end("y:TableNode")
}

#[derive(Clone, Copy)]
enum LaneKind {
    Row,
    Column,
}

fn write_lane_label(
    xml: &mut XmlWriter,
    font_size: &str,
    label: &str,
    kind: LaneKind,
    lane_id: &str,
) -> Result<(), ExportError> {
    let rotation = match kind {
        LaneKind::Row => "270.0",
        LaneKind::Column => "0.0",
    };
    xml.start(
        "y:NodeLabel",
        &[
            ("alignment", "center"),
            ("autoSizePolicy", "content"),
            ("backgroundColor", "#EBEBEB"),
            ("fontFamily", "Dialog"),
            ("fontSize", font_size),
            ("fontStyle", "plain"),
            ("hasLineColor", "false"),
            ("horizontalTextPosition", "center"),
            ("iconTextGap", "4"),
            ("modelName", "custom"),
            ("rotationAngle", rotation),
            ("textColor", "#000000"),
            ("verticalTextPosition", "bottom"),
            ("visible", "true"),
            ("xml:space", "preserve"),
        ],
    )?;
    xml.text(label)?;
    xml.start("y:LabelModel", &[])?;
    match kind {
        LaneKind::Row => xml.empty("y:RowNodeLabelModel", &[("offset", "3.0")])?,
        LaneKind::Column => xml.empty("y:ColumnNodeLabelModel", &[("offset", "3.0")])?,
    }
    xml.end("y:LabelModel")?;
    xml.start("y:ModelParameter", &[])?;
    match kind {
        LaneKind::Row => xml.empty(
            "y:RowNodeLabelModelParameter",
            &[("horizontalPosition", "0.0"), ("id", lane_id), ("inside", "true")],
        )?,
        LaneKind::Column => xml.empty(
            "y:ColumnNodeLabelModelParameter",
            &[("id", lane_id), ("inside", "true"), ("verticalPosition", "0.0")],
        )?,
    }
    xml.end("y:ModelParameter")?;
    xml.end("y:NodeLabel")
}
