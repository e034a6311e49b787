//! Macro expansion of the chart command language.
//!
//! Stages, in the order a line passes through them:
//!
//! - [`block`] - groups lines into `LIST` statements, `FOR ... NEXT` blocks and plain lines
//! - [`range`] - `RANGE(a,b)` literals
//! - [`lists`] - the named-list registry
//! - [`wildcard`] - `*` / `?` dataset markers
//! - [`loops`] - loop-variable substitution
//! - [`directive`] - parsing into typed [`Directive`]s
//! - [`qualifier`] - `DEFINE` normalization and reference qualification
//!
//! [`Expander`] runs them all over a file.

pub mod block;
pub mod directive;
pub mod expander;
pub mod lists;
pub mod loops;
pub mod qualifier;
pub mod range;
pub mod reference;
pub mod wildcard;

pub use block::{Block, BlockParser, ForBlock, LoopSource};
pub use directive::{Directive, Statement};
pub use expander::{Expander, Expansion};
pub use lists::{ListCommand, ListOp, ListRegistry};
pub use qualifier::{normalize_define, qualify_references, NO_UNIT};
pub use range::{expand_all_ranges, expand_range_in_place, range_values};
pub use reference::{scan_references, RefForm, Reference};
