//! Harris Matrix core
//!
//! Builds the stratigraphic relationship graph of an excavation site and
//! prepares it for drawing:
//! - Parses free-text relationship fields into typed relations
//! - Builds the unit graph, rejecting self-loops and dangling targets
//! - Validates it (cycles, paradoxes, orphans, missing reciprocals)
//! - Reduces redundant edges and assigns layers
//! - Groups units into chronological buckets
//!
//! Recoverable findings never abort: they travel as [`Diagnostic`]s next to
//! the result in an [`Analysis`]. Only fatal conditions are [`HarrisError`]s.
//!
//! # Example
//!
//! ```rust
//! use harris_core::{analyze, PeriodLookup, UnitRecord};
//!
//! let records = vec![
//!     UnitRecord::new("Pompeii", "1"),
//!     UnitRecord::new("Pompeii", "2").with_relationships("Covers 1"),
//!     UnitRecord::new("Pompeii", "3").with_relationships("Cuts 2"),
//! ];
//! let analysis = analyze(records, &PeriodLookup::new()).unwrap();
//!
//! assert!(analysis.value.report.valid);
//! assert_eq!(analysis.value.layout.layer_of("3").unwrap(), 2);
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod kind;
pub mod layout;
pub mod parser;
pub mod period;
pub mod pipeline;
pub mod store;
pub mod unit;
pub mod validate;

pub use diagnostics::{Analysis, Diagnostic, DiagnosticKind, Location, Severity};
pub use error::{HarrisError, InvariantViolation, ParseError, RecordError, StoreError};
pub use graph::{Relationship, StratigraphicGraph};
pub use kind::{Certainty, Orientation, RelationFamily, RelationKind, UnitKind};
pub use layout::{
    reduce_and_layer, ExcludedEdge, ExclusionReason, MatrixEdge, MatrixLayout, MatrixLayoutEngine,
};
pub use parser::{ParseOutcome, ParsedRelation, RelationshipParser};
pub use period::{
    PeriodBucket, PeriodEntry, PeriodGrouper, PeriodGrouping, PeriodLookup, SortKey,
    SORT_SENTINEL, UNDATED_LABEL,
};
pub use pipeline::{analyze, analyze_site, MatrixAnalysis, SiteSummary};
pub use store::{FileStore, FixtureDocument, FixtureFormat, InMemoryStore, SiteFixture, UnitSource};
pub use unit::{Chronology, Unit, UnitId, UnitRecord};
pub use validate::{validate, GraphValidator, Paradox, ValidationReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Harris Matrix core
    pub use crate::{
        analyze, Analysis, Diagnostic, HarrisError, MatrixAnalysis, MatrixLayout, PeriodGrouping,
        PeriodLookup, RelationKind, StratigraphicGraph, UnitId, UnitRecord, UnitSource,
        ValidationReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
