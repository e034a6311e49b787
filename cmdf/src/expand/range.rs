//! `RANGE(a,b)` literal expansion.
//!
//! Bounds are integers and inclusive. `RANGE(3,1)` is an empty range.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SyntaxError;

const RANGE_OPEN: &str = "RANGE(";

/// Largest number of values one `RANGE(a,b)` may produce.
pub const MAX_RANGE_LEN: i64 = 100_000;

static RANGE_BOUNDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d+)\s*,\s*([+-]?\d+)\s*$").expect("RANGE bounds pattern is valid")
});

/// A located `RANGE(...)` sub-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RangeSpan {
    /// Byte offset of the `R`.
    start: usize,
    /// Byte offset of the closing `)`.
    end: usize,
    values: Vec<String>,
}

fn locate(line: &str) -> Result<Option<RangeSpan>, SyntaxError> {
    let Some(start) = line.find(RANGE_OPEN) else {
        return Ok(None);
    };
    let open = start + RANGE_OPEN.len();

    let end = line[open..]
        .find(')')
        .map(|p| open + p)
        .ok_or_else(|| SyntaxError::new("missing closing ')' in RANGE").at(line, start))?;

    let inner = &line[open..end];
    let caps = RANGE_BOUNDS.captures(inner).ok_or_else(|| {
        SyntaxError::new(format!("RANGE expects two integers 'a,b', found '{}'", inner)).at(line, open)
    })?;

    let bound = |text: &str| {
        text.parse::<i64>()
            .map_err(|_| SyntaxError::new(format!("RANGE bound '{}' is out of range", text)).at(line, open))
    };
    let from = bound(&caps[1])?;
    let to = bound(&caps[2])?;

    let len = i128::from(to) - i128::from(from) + 1;
    if len > i128::from(MAX_RANGE_LEN) {
        return Err(
            SyntaxError::new(format!("RANGE spans more than {} values", MAX_RANGE_LEN)).at(line, start),
        );
    }

    Ok(Some(RangeSpan {
        start,
        end,
        values: (from..=to).map(|n| n.to_string()).collect(),
    }))
}

/// Values of the first `RANGE(...)` on the line, leaving the line untouched.
pub fn range_values(line: &str) -> Result<Vec<String>, SyntaxError> {
    locate(line)?
        .map(|span| span.values)
        .ok_or_else(|| SyntaxError::new("expected a RANGE(a,b) expression"))
}

/// Replace the first `RANGE(...)` with its space-separated values.
///
/// Returns the line unchanged when it holds no `RANGE(`.
pub fn expand_range_in_place(line: &str) -> Result<String, SyntaxError> {
    match locate(line)? {
        Some(span) => Ok(format!(
            "{}{}{}",
            &line[..span.start],
            span.values.join(" "),
            &line[span.end + 1..]
        )),
        None => Ok(line.to_string()),
    }
}

/// Replace every `RANGE(...)` on the line.
pub fn expand_all_ranges(line: &str) -> Result<String, SyntaxError> {
    let mut current = line.to_string();
    while current.contains(RANGE_OPEN) {
        current = expand_range_in_place(&current)?;
    }
    Ok(current)
}
