//! Visual styles
//!
//! Edge styles are keyed by [`RelationFamily`], so a kind and its inverse
//! always look the same and the mapping follows the one keyword table.
//! Ordering families get an arrow, symmetric ones none, cuts are dashed.

use harris_core::{RelationFamily, RelationKind, UnitKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// yEd line type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// Solid
    Line,
    /// Dashed
    Dashed,
    /// Dotted
    Dotted,
}

impl LineType {
    /// yEd attribute value
    #[must_use]
    pub fn as_yed(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }

    /// DOT `style` value
    #[must_use]
    pub fn as_dot(self) -> &'static str {
        match self {
            Self::Line => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// How one family of edges is drawn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeStyle {
    /// `#RRGGBB`
    pub color: String,
    /// Line type
    pub line: LineType,
    /// Arrowhead at the target (the earlier unit)
    pub arrow: bool,
    /// Line width in tenths of a point
    pub width_tenths: u32,
}

impl EdgeStyle {
    fn new(color: &str, line: LineType, arrow: bool) -> Self {
        Self {
            color: color.to_string(),
            line,
            arrow,
            width_tenths: 10,
        }
    }

    /// yEd target arrow name
    #[must_use]
    pub fn yed_arrow(&self) -> &'static str {
        if self.arrow {
            "standard"
        } else {
            "none"
        }
    }

    /// Width as a yEd attribute value
    #[must_use]
    pub fn width(&self) -> String {
        format!("{}.{}", self.width_tenths / 10, self.width_tenths % 10)
    }
}

/// One legend row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Relation kind
    pub kind: RelationKind,
    /// Its family
    pub family: RelationFamily,
    /// Style applied
    pub style: EdgeStyle,
}

/// Family → style table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeStyleMap {
    styles: BTreeMap<RelationFamily, EdgeStyle>,
}

impl Default for EdgeStyleMap {
    fn default() -> Self {
        let styles = [
            (RelationFamily::Superposition, EdgeStyle::new("#000000", LineType::Line, true)),
            (RelationFamily::Cut, EdgeStyle::new("#C0392B", LineType::Dashed, true)),
            (RelationFamily::Fill, EdgeStyle::new("#1F5FA8", LineType::Line, true)),
            (RelationFamily::Abutment, EdgeStyle::new("#2E7D32", LineType::Line, true)),
            (RelationFamily::Equivalence, EdgeStyle::new("#6D6D6D", LineType::Line, false)),
            (RelationFamily::Bond, EdgeStyle::new("#8E5A2B", LineType::Dotted, false)),
        ];
        Self {
            styles: styles.into_iter().collect(),
        }
    }
}

impl EdgeStyleMap {
    /// Default table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the style of a family
    #[must_use]
    pub fn with_style(mut self, family: RelationFamily, style: EdgeStyle) -> Self {
        self.styles.insert(family, style);
        self
    }

    /// Style for a kind
    #[must_use]
    pub fn style(&self, kind: RelationKind) -> &EdgeStyle {
        // every family is present: built from the full table and only ever overwritten
        &self.styles[&kind.family()]
    }

    /// Style for every kind, in kind order
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        RelationKind::ALL
            .into_iter()
            .map(|kind| LegendEntry {
                kind,
                family: kind.family(),
                style: self.style(kind).clone(),
            })
            .collect()
    }
}

/// How one unit kind is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    /// yEd shape
    pub shape: &'static str,
    /// Fill colour
    pub fill: &'static str,
    /// Border line type
    pub border: LineType,
}

/// Node style for a unit kind
#[must_use]
pub fn node_style(kind: UnitKind) -> NodeStyle {
    let (shape, fill, border) = match kind {
        UnitKind::Layer => ("rectangle", "#FFFFFF", LineType::Line),
        UnitKind::Masonry => ("rectangle", "#E8D5B7", LineType::Line),
        UnitKind::Virtual => ("roundrectangle", "#F2F2F2", LineType::Dashed),
        UnitKind::Documentary => ("octagon", "#FFF6D5", LineType::Line),
        UnitKind::SpecialFind => ("ellipse", "#FFE0E0", LineType::Line),
        UnitKind::Aggregation => ("hexagon", "#E0F0FF", LineType::Line),
        UnitKind::Extraction => ("trapezoid", "#EDE7F6", LineType::Dotted),
    };
    NodeStyle {
        shape,
        fill,
        border,
    }
}
