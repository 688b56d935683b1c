//! Error types for the Harris Matrix core
//!
//! Only fatal conditions live here:
//! - Relationship text that is not text at all (encoding)
//! - Storage records that cannot become a unit
//! - Storage collaborator failures
//! - Engine invariant violations
//!
//! Everything recoverable is a [`Diagnostic`](crate::diagnostics::Diagnostic).

use crate::unit::UnitId;
use std::path::PathBuf;

/// Fatal relationship parser failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input bytes are not valid UTF-8
    #[error("relationship text is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Encoding {
        /// Length of the valid prefix
        valid_up_to: usize,
    },
}

/// A storage record that cannot be turned into a unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Unit number missing or blank
    #[error("record #{index} of site '{site}' has no unit number")]
    EmptyUnitNumber {
        /// Site of the record
        site: String,
        /// Position in the input sequence
        index: usize,
    },

    /// Site identifier missing or blank
    #[error("record #{index} has no site identifier")]
    EmptySite {
        /// Position in the input sequence
        index: usize,
    },

    /// Record belongs to a different site than the one being analysed
    #[error("record #{index} belongs to site '{found}', expected '{expected}'")]
    SiteMismatch {
        /// Position in the input sequence
        index: usize,
        /// Site being analysed
        expected: String,
        /// Site on the record
        found: String,
    },
}

/// Storage collaborator failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the backing file failed
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backing document is structurally corrupt
    #[error("cannot decode {path}: {message}")]
    Decode {
        /// File being decoded
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// File extension not recognised
    #[error("unsupported fixture format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Site not present in the store
    #[error("unknown site: '{0}'")]
    UnknownSite(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create decode error for path
    pub fn decode_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Engine bug: the algorithms saw a state they must never produce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A node finished layering without a layer
    #[error("unit {0} has no layer assignment after layering")]
    MissingLayer(UnitId),

    /// Reduction referenced an edge absent from the working graph
    #[error("reduction referenced edge {from} -> {to} not present in the working graph")]
    UnknownEdge {
        /// Edge source
        from: UnitId,
        /// Edge target
        to: UnitId,
    },

    /// The working graph still had a cycle after cyclic edges were excluded
    #[error("working graph is cyclic at unit {0} after cycle exclusion")]
    CyclicWorkingGraph(UnitId),

    /// An id was looked up that is not a node of the graph
    #[error("unit {0} is not a node of the graph")]
    UnknownUnit(UnitId),
}

/// Main error type for the Harris Matrix core
#[derive(Debug, thiserror::Error)]
pub enum HarrisError {
    /// Relationship parsing failed fatally
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Malformed unit record
    #[error("malformed record: {0}")]
    Record(#[from] RecordError),

    /// Storage collaborator failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal invariant violated
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl HarrisError {
    /// True when the error indicates a bug in the engine itself
    #[inline]
    #[must_use]
    pub fn is_engine_bug(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// True when the caller's input (records, fixture) is at fault
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Record(_) | Self::Store(StoreError::Decode { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violation_is_engine_bug() {
        let err: HarrisError = InvariantViolation::MissingLayer(UnitId::from("7")).into();
        assert!(err.is_engine_bug());
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("unit 7"));
    }

    #[test]
    fn record_error_is_input_error() {
        let err: HarrisError = RecordError::EmptySite { index: 3 }.into();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("#3"));
    }
}
