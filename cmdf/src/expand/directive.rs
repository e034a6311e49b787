//! Resolved directives: the output of macro expansion.

use std::fmt;

use serde::Serialize;

use crate::error::{ExpandError, ExpandResult};
use crate::models::{QualifiedName, SourceLine};
use crate::parser::tokenizer::{keyword, tokenize, Delimiters};

use super::qualifier::normalize_define;

/// One fully resolved command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Directive {
    /// `DEFINE <dataset>:<name> <unit> = <expr>`
    Define {
        name: QualifiedName,
        unit: String,
        expr: String,
    },
    /// `ADD CHART`
    AddChart,
    /// `ADD SERIES <dataset> <quantity> [axis]`
    #[serde(rename_all = "camelCase")]
    AddSeries {
        /// Dataset number as written (1-based).
        dataset: usize,
        quantity: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        axis: Option<i32>,
    },
    /// Any other keyword, kept verbatim.
    Passthrough { text: String },
}

impl Directive {
    /// Parse one expanded line.
    ///
    /// Lines reaching this point have had loops and wildcards resolved, so
    /// `LIST`, `FOR` and `NEXT` are rejected here.
    pub fn parse(line: &SourceLine) -> ExpandResult<Directive> {
        match keyword(&line.text) {
            Some("DEFINE") => normalize_define(line),
            Some("ADD") => parse_add(line),
            Some(kw @ ("LIST" | "FOR" | "NEXT")) => Err(ExpandError::syntax(
                line.number,
                format!("{} is not allowed inside a FOR block", kw),
            )),
            _ => Ok(Directive::Passthrough {
                text: line.text.trim_start().to_string(),
            }),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Directive::Passthrough { .. })
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Define { name, unit, expr } => write!(f, "DEFINE {} {} = {}", name, unit, expr),
            Directive::AddChart => write!(f, "ADD CHART"),
            Directive::AddSeries {
                dataset,
                quantity,
                axis,
            } => {
                write!(f, "ADD SERIES {} {}", dataset, quantity)?;
                if let Some(axis) = axis {
                    write!(f, " {}", axis)?;
                }
                Ok(())
            }
            Directive::Passthrough { text } => write!(f, "{}", text),
        }
    }
}

fn parse_add(line: &SourceLine) -> ExpandResult<Directive> {
    let tokens = tokenize(&line.text, Delimiters::Whitespace);

    match tokens.get(1).copied() {
        Some("CHART") => Ok(Directive::AddChart),
        Some("SERIES") => {
            if tokens.len() < 4 {
                return Err(ExpandError::syntax(
                    line.number,
                    "expected 'ADD SERIES <dataset> <quantity> [axis]'",
                ));
            }

            let dataset = tokens[2].parse::<usize>().map_err(|_| {
                ExpandError::syntax(
                    line.number,
                    format!("dataset number must be a non-negative integer, found '{}'", tokens[2]),
                )
            })?;

            let axis = match tokens.get(4) {
                Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                    ExpandError::syntax(
                        line.number,
                        format!("axis index must be an integer, found '{}'", raw),
                    )
                })?),
                None => None,
            };

            Ok(Directive::AddSeries {
                dataset,
                quantity: tokens[3].to_string(),
                axis,
            })
        }
        other => Err(ExpandError::syntax(
            line.number,
            format!(
                "ADD must be followed by CHART or SERIES, found '{}'",
                other.unwrap_or("")
            ),
        )),
    }
}

/// A directive together with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub line: usize,
    #[serde(flatten)]
    pub directive: Directive,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.directive.fmt(f)
    }
}
