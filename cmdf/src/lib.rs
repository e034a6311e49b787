//! # cmdf - chart command-file expansion
//!
//! cmdf turns a chart command file (lists, `FOR` loops, dataset wildcards,
//! `DEFINE`d quantities) into a flat stream of resolved directives, a
//! derived-definition table and chart specifications for a renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Command file│────▶│   Parser    │────▶│   Expand    │────▶│   Charts    │
//! │  (any enc.) │     │ ($NUM_CASES)│     │(lists/loops)│     │ + derived   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cmdf::{CommandFile, EngineOptions};
//!
//! let options = EngineOptions { num_datasets: 3, ..Default::default() };
//! let file = CommandFile::from_path("field.cmdf", &options)?;
//! let charts = file.charts("0:3650")?;
//! println!("{} charts, {} derived", charts.charts.len(), file.derived().len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (SourceLine, QualifiedName, ChartSpec)
//! - [`parser`] - Command-file loading with encoding detection
//! - [`expand`] - Lists, loops, wildcards and DEFINE qualification
//! - [`derived`] - Derived-definition table
//! - [`charts`] - Chart and series building
//! - [`pipeline`] - `CommandFile` facade and options
//! - [`logs`] - Broadcast diagnostics

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Expansion
pub mod expand;
pub mod derived;

// Output
pub mod charts;
pub mod pipeline;

// Diagnostics
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ChartError, EngineError, EngineResult, ErrorKind, ErrorPolicy, ExpandError, LoadError,
    SyntaxError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ChartSpec, DerivedDefinition, QualifiedName, SeriesSpec, SourceLine};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    decode_content, detect_encoding, load_bytes, load_command_file, split_lines,
    substitute_variables, LoadedFile, NUM_CASES_PLACEHOLDER,
};

// =============================================================================
// Re-exports - Expansion
// =============================================================================

pub use expand::{Directive, Expander, Expansion, ListRegistry, Statement};
pub use derived::DerivedTable;

// =============================================================================
// Re-exports - Charts & Pipeline
// =============================================================================

pub use charts::{build_charts, ChartBuilder, ChartSet};
pub use pipeline::{CommandFile, EngineOptions, RenderDocument, ENV_NUM_CASES, ENV_ON_ERROR, ENV_XRANGE};
