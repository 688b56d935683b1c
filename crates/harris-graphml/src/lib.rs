//! Harris Matrix export
//!
//! Turns an analysed site into a yEd GraphML document:
//! - Nodes placed by layer, latest at the top
//! - Period (or area) swimlanes as a yEd table node
//! - Edge styles per relation family, with a separate legend document
//! - Byte-identical output for identical input
//!
//! A GraphViz DOT preview and a GraphML reader for checking exported files
//! are included.
//!
//! # Example
//!
//! ```rust
//! use harris_core::{analyze, PeriodLookup, UnitRecord};
//! use harris_graphml::{export_graphml, inspect, HarrisConfig};
//!
//! let records = vec![
//!     UnitRecord::new("Pompeii", "1").with_period("1", "1"),
//!     UnitRecord::new("Pompeii", "2").with_relationships("Covers 1"),
//! ];
//! let lookup = PeriodLookup::new().with("1", "1", "Roman");
//! let analysis = analyze(records, &lookup).unwrap();
//!
//! let xml = export_graphml(&analysis.value, &HarrisConfig::new()).unwrap();
//! let report = inspect(&xml).unwrap();
//! assert_eq!(report.nodes, 2);
//! assert_eq!(report.rows, ["Roman", "Non datato"]);
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod dot;
pub mod error;
pub mod export;
pub mod inspect;
pub mod legend;
pub mod serializer;
pub mod style;
mod xml;

pub use config::{ExportOptions, GroupingMode, HarrisConfig, LayoutStyle};
pub use dot::render_dot;
pub use error::ExportError;
pub use export::{export_graphml, export_site, write_document};
pub use inspect::{inspect, InspectReport};
pub use legend::{legend_model, serialize_legend, LEGEND_TITLE};
pub use serializer::{
    render_document, DocumentModel, EdgeModel, GraphMLSerializer, Lane, NodeModel, TableModel,
    EDGE_DESCRIPTION_KEY,
    EDGE_GRAPHICS_KEY, NODE_DESCRIPTION_KEY, NODE_GRAPHICS_KEY, NO_AREA_LABEL, ROW_KEY,
};
pub use style::{node_style, EdgeStyle, EdgeStyleMap, LegendEntry, LineType, NodeStyle};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for exporting matrices
    pub use crate::{
        export_graphml, export_site, ExportError, ExportOptions, GraphMLSerializer, GroupingMode,
        HarrisConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
