//! Error types for the command-file expansion pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`SyntaxError`] - positional scanner error (RANGE, `${...}` references)
//! - [`LoadError`] - reading and decoding the command file
//! - [`ExpandError`] - lists, loops, wildcards and DEFINE normalization
//! - [`ChartError`] - building charts from the resolved directive stream
//! - [`EngineError`] - top-level orchestration errors
//!
//! Every error maps onto one of the four [`ErrorKind`]s of the command
//! language. Conversion into [`EngineError`] is automatic via `From`, so `?`
//! works across stage boundaries.

use std::path::PathBuf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error kinds
// =============================================================================

/// Category of a command-file error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed RANGE, unterminated reference, malformed ADD/DEFINE/LIST/FOR.
    Syntax,
    /// Unknown list name.
    Name,
    /// Dataset index outside the loaded datasets.
    Range,
    /// File access failure.
    Io,
}

/// What to do when a statement fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first error.
    #[default]
    Abort,
    /// Report the error, drop the statement and continue.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("unknown error policy '{}', expected abort or skip", other)),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => write!(f, "abort"),
            ErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

// =============================================================================
// Scanner Errors
// =============================================================================

/// A syntax error found while scanning a single line.
///
/// `column` is the 1-based character column when the scanner knows it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", .column.map(|c| format!("column {}: ", c)).unwrap_or_default())]
pub struct SyntaxError {
    pub column: Option<usize>,
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            column: None,
            message: message.into(),
        }
    }

    /// Attach a 0-based byte offset within `text`, stored as a 1-based column.
    pub fn at(mut self, text: &str, byte_offset: usize) -> Self {
        let column = text
            .get(..byte_offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(byte_offset);
        self.column = Some(column + 1);
        self
    }
}

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while reading the command file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to open or read the file.
    #[error("cannot read command file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Io
    }
}

// =============================================================================
// Expansion Errors
// =============================================================================

/// Errors raised while expanding lists, loops and wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Malformed statement.
    #[error("line {line}: {source}")]
    Syntax { line: usize, source: SyntaxError },

    /// `LIST ADD` or `FOR ... IN` referencing a list that does not exist.
    #[error("line {line}: list '{name}' not found")]
    UnknownList { line: usize, name: String },
}

impl ExpandError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        ExpandError::Syntax {
            line,
            source: SyntaxError::new(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExpandError::Syntax { .. } => ErrorKind::Syntax,
            ExpandError::UnknownList { .. } => ErrorKind::Name,
        }
    }

    /// Source line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ExpandError::Syntax { line, .. } | ExpandError::UnknownList { line, .. } => *line,
        }
    }
}

// =============================================================================
// Chart Errors
// =============================================================================

/// Errors raised while building charts from the directive stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// `ADD SERIES` before any `ADD CHART`.
    #[error("line {line}: ADD CHART must come before adding a SERIES")]
    NoCurrentChart { line: usize },

    /// Dataset number outside `1..=available`.
    #[error("line {line}: dataset {index} requested but only {available} loaded")]
    DatasetOutOfRange {
        line: usize,
        index: usize,
        available: usize,
    },
}

impl ChartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChartError::NoCurrentChart { .. } => ErrorKind::Syntax,
            ChartError::DatasetOutOfRange { .. } => ErrorKind::Range,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ChartError::NoCurrentChart { line }
            | ChartError::DatasetOutOfRange { line, .. } => *line,
        }
    }
}

// =============================================================================
// Engine Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::pipeline::CommandFile`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Expand(#[from] ExpandError),

    #[error("{0}")]
    Chart(#[from] ChartError),

    /// Serializing the renderer document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Command-language category; serialization failures report as `Io`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Load(e) => e.kind(),
            EngineError::Expand(e) => e.kind(),
            EngineError::Chart(e) => e.kind(),
            EngineError::Json(_) => ErrorKind::Io,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type LoadResult<T> = Result<T, LoadError>;

pub type ExpandResult<T> = Result<T, ExpandError>;

pub type ChartResult<T> = Result<T, ChartError>;

pub type EngineResult<T> = Result<T, EngineError>;
