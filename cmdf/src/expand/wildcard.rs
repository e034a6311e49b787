//! Dataset wildcard expansion for `ADD SERIES *` and `DEFINE *:<name>`.
//!
//! `*` and `?` are interchangeable. Expanded lines use 1-based dataset
//! numbers, one line per loaded dataset, in dataset order.

use crate::error::{ExpandError, ExpandResult};
use crate::models::SourceLine;
use crate::parser::tokenizer::{tokenize, Delimiters};

fn is_wildcard(token: &str) -> bool {
    token == "*" || token == "?"
}

/// Expand a line into one line per dataset, or return it unchanged.
pub fn expand_line(line: &SourceLine, num_datasets: usize) -> ExpandResult<Vec<SourceLine>> {
    let tokens = tokenize(&line.text, Delimiters::Whitespace);

    match tokens.as_slice() {
        ["ADD", "SERIES", marker, rest @ ..] if is_wildcard(marker) => Ok((1..=num_datasets)
            .map(|n| line.with_text(join_line(&["ADD", "SERIES", n.to_string().as_str()], rest)))
            .collect()),

        ["DEFINE", name, rest @ ..] if name.starts_with(['*', '?']) => {
            let suffix = &name[1..];
            if suffix.len() < 2 || !suffix.starts_with(':') {
                return Err(ExpandError::syntax(
                    line.number,
                    format!("wildcard DEFINE name must look like '*:<name>', found '{}'", name),
                ));
            }

            Ok((1..=num_datasets)
                .map(|n| {
                    let qualified = format!("{}{}", n, suffix);
                    line.with_text(join_line(&["DEFINE", qualified.as_str()], rest))
                })
                .collect())
        }

        _ => Ok(vec![line.clone()]),
    }
}

fn join_line(head: &[&str], rest: &[&str]) -> String {
    head.iter().chain(rest.iter()).copied().collect::<Vec<_>>().join(" ")
}
