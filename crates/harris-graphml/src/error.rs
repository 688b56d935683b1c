//! Export errors

use harris_core::{HarrisError, InvariantViolation};
use std::path::PathBuf;

/// Fatal export failure
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The XML writer rejected an event
    #[error("xml write failed: {0}")]
    Xml(String),

    /// The document could not be read back
    #[error("xml read failed at byte {position}: {message}")]
    Read {
        /// Byte offset in the document
        position: u64,
        /// Reader message
        message: String,
    },

    /// Writing the document failed
    #[error("io error writing {path}: {source}")]
    Io {
        /// Destination
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("invalid configuration {path}: {message}")]
    Config {
        /// Configuration file, empty for in-memory text
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// Layout asked about a unit it never saw
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// The analysis itself failed
    #[error(transparent)]
    Core(#[from] HarrisError),
}

impl ExportError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error indicates a bug in the engine itself
    #[must_use]
    pub fn is_engine_bug(&self) -> bool {
        match self {
            Self::Invariant(_) | Self::Xml(_) => true,
            Self::Core(e) => e.is_engine_bug(),
            _ => false,
        }
    }
}
