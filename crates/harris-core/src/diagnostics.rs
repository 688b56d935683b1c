//! Recoverable findings collected alongside successful results.

use crate::unit::UnitId;
use serde::Serialize;
use std::fmt;

/// How serious a finding is. Never blocks the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Info,
    /// Data-quality problem worth showing
    Warning,
    /// Input rejected (the offending relation was not added)
    Error,
}

/// Classification of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Clause starts with no known relationship keyword
    UnknownKeyword,
    /// Target text is not a usable unit identifier
    MalformedTarget,
    /// Same (kind, target) repeated within one field
    DuplicateClause,
    /// Target does not name a unit known to the parser
    UnresolvedTarget,
    /// Relation to a unit not loaded in the graph
    DanglingRelationship,
    /// Relation from a unit to itself
    SelfLoop,
    /// Target did not record the inverse relation
    MissingReciprocal,
    /// Two records share one unit number
    DuplicateUnit,
    /// Unit kind code outside the vocabulary
    UnknownUnitKind,
    /// (period, phase) missing from the periodization
    Undated,
    /// Ordering edge left out of the rendered set
    ExcludedEdge,
}

impl DiagnosticKind {
    /// Default severity for this kind
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::SelfLoop => Severity::Error,
            Self::DuplicateClause | Self::MissingReciprocal | Self::Undated => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// Where a finding applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum Location {
    /// Whole graph
    Graph,
    /// A single unit
    Unit {
        /// Unit id
        unit: UnitId,
    },
    /// A relation between two units
    Relation {
        /// Source unit
        source: UnitId,
        /// Target text or unit
        target: String,
    },
    /// A raw relationship field not yet tied to a unit
    Field,
}

impl Location {
    /// Location of a unit
    #[inline]
    pub fn unit(unit: &UnitId) -> Self {
        Self::Unit { unit: unit.clone() }
    }

    /// Location of a relation
    #[inline]
    pub fn relation(source: &UnitId, target: impl Into<String>) -> Self {
        Self::Relation {
            source: source.clone(),
            target: target.into(),
        }
    }

    /// Attach a unit to a field-level location
    #[must_use]
    pub fn within(self, unit: &UnitId) -> Self {
        match self {
            Self::Field | Self::Graph => Self::unit(unit),
            other => other,
        }
    }
}

/// A recoverable finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Classification
    pub kind: DiagnosticKind,
    /// Severity
    pub severity: Severity,
    /// Scope of the finding
    pub location: Location,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity
    pub fn new(kind: DiagnosticKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            location,
            message: message.into(),
        }
    }

    /// Override severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.location {
            Location::Graph | Location::Field => write!(f, "{severity}: {}", self.message),
            Location::Unit { unit } => write!(f, "{severity} [{unit}]: {}", self.message),
            Location::Relation { source, target } => {
                write!(f, "{severity} [{source} -> {target}]: {}", self.message)
            }
        }
    }
}

/// Successful result carrying the diagnostics collected on the way
#[derive(Debug, Clone)]
pub struct Analysis<T> {
    /// The produced value
    pub value: T,
    /// Findings, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Analysis<T> {
    /// Wrap a value with diagnostics
    #[inline]
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Transform the value, keeping the diagnostics
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        Analysis {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Number of diagnostics at a given severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_defaults_to_error() {
        let d = Diagnostic::new(
            DiagnosticKind::SelfLoop,
            Location::relation(&UnitId::from("4"), "4"),
            "unit relates to itself",
        );
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.to_string(), "error [4 -> 4]: unit relates to itself");
    }

    #[test]
    fn field_location_is_attached_to_unit() {
        let loc = Location::Field.within(&UnitId::from("12"));
        assert_eq!(loc, Location::unit(&UnitId::from("12")));
    }

    #[test]
    fn analysis_counts_by_severity() {
        let analysis = Analysis::new(
            (),
            vec![
                Diagnostic::new(DiagnosticKind::Undated, Location::Graph, "a"),
                Diagnostic::new(DiagnosticKind::UnknownKeyword, Location::Field, "b"),
                Diagnostic::new(DiagnosticKind::MalformedTarget, Location::Field, "c"),
            ],
        );
        assert_eq!(analysis.count(Severity::Info), 1);
        assert_eq!(analysis.count(Severity::Warning), 2);
        assert_eq!(analysis.of_kind(DiagnosticKind::UnknownKeyword).count(), 1);
    }
}
