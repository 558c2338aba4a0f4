//! Error types for the annotation engine.
//!
//! Two families of failure exist and they travel differently:
//!
//! - [`Error`] aborts a run. It covers configuration problems detected before
//!   any lane starts, unreadable inputs, stream-consistency violations raised
//!   inside a lane, and lanes that terminate unexpectedly. A run observes at
//!   most one of these, at the position where it was raised.
//! - [`ResolveError`] is local to a single record. It is carried on that
//!   record's handle and reaches the subscriber as a failed
//!   [`Annotated`](crate::Annotated) item while the stream stays healthy.

use std::path::PathBuf;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Fatal errors that abort an annotation run.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The run was configured with values it cannot honour.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// An input file is missing.
    #[error("Input file does not exist: {}", path.display())]
    MissingInput { path: PathBuf },

    /// An input file exists but its name does not carry a recognised
    /// extension.
    #[error("Bad input file name (expected *{expected}): {}", path.display())]
    BadInputName {
        path: PathBuf,
        expected: &'static str,
    },

    /// Reading or decoding an input failed.
    #[error("Input error: {context}")]
    Input { context: String },

    /// A primary record and its secondary record disagree on locus identity.
    #[error("Inconsistent pair at position {position}: {field} differs (primary {primary}, secondary {secondary})")]
    PairMismatch {
        position: u64,
        field: &'static str,
        primary: String,
        secondary: String,
    },

    /// The primary and secondary inputs do not hold the same number of
    /// records.
    #[error("Record count mismatch at position {position}: {side} input exhausted first")]
    CountMismatch { position: u64, side: Side },

    /// A worker thread could not be started.
    #[error("Thread error: {context}")]
    Thread { context: String },

    /// A lane stopped before publishing the handle it was armed with.
    #[error("Lane {lane} terminated before position {position} was published")]
    LaneTerminated { lane: usize, position: u64 },
}

/// Which of the two paired inputs ran out first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Secondary,
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Input {
            context: err.to_string(),
        }
    }
}

/// Failure to annotate one record.
///
/// Cloneable so that a failed record can be fanned out to several
/// subscribers.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// The resolver rejected or failed on the record.
    #[error("Resolver failed: {0}")]
    Resolver(String),

    /// The external predictor failed or returned an unusable payload.
    #[error("Predictor failed: {0}")]
    Predictor(String),

    /// The record needs a predictor payload but no predictor is configured.
    #[error("No predictor configured for {kind} record at {locus}")]
    NoPredictor { kind: &'static str, locus: String },

    /// A payload was attached to a record that already carried one.
    #[error("Payload already attached to record at {locus}")]
    AlreadyAttached { locus: String },
}
