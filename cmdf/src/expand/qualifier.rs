//! `DEFINE` normalization and dataset qualification of references.
//!
//! A `DEFINE` line leaves this stage in the canonical shape
//! `DEFINE <dataset>:<name> <unit> = <expr>`, with every reference in the
//! expression bound to a dataset.

use crate::error::{ExpandError, ExpandResult, SyntaxError};
use crate::models::{QualifiedName, SourceLine};

use super::directive::Directive;
use super::reference::scan_references;

/// Unit written when a `DEFINE` gives none.
pub const NO_UNIT: &str = "None";

/// Normalize one `DEFINE` line into a [`Directive::Define`].
pub fn normalize_define(line: &SourceLine) -> ExpandResult<Directive> {
    let text = line.text.as_str();
    let syntax = |message: String| ExpandError::syntax(line.number, message);

    let after_keyword = text
        .trim_start()
        .strip_prefix("DEFINE")
        .ok_or_else(|| syntax("expected DEFINE".to_string()))?
        .trim_start();

    let (name, rest) = split_token(after_keyword);
    if name.is_empty() {
        return Err(syntax("DEFINE needs a name".to_string()));
    }
    let name = qualify_name(name).map_err(syntax)?;

    let rest = rest.trim_start();
    let (unit, after_unit) = if rest.starts_with('=') {
        (NO_UNIT, rest)
    } else {
        let (unit, after) = split_token(rest);
        if unit.is_empty() {
            return Err(syntax(format!("DEFINE {} needs '=' and an expression", name)));
        }
        (unit, after.trim_start())
    };

    let expr_start = after_unit
        .strip_prefix('=')
        .ok_or_else(|| syntax(format!("expected '=' after unit '{}'", unit)))?
        .trim_start();
    let expr = expr_start.trim_end();
    if expr.is_empty() {
        return Err(syntax(format!("DEFINE {} has an empty expression", name)));
    }

    let offset = text.len() - expr_start.len();
    let expr = qualify_references(expr, name.dataset).map_err(|mut source| {
        source.column = source.column.map(|c| c + text[..offset].chars().count());
        ExpandError::Syntax {
            line: line.number,
            source,
        }
    })?;

    Ok(Directive::Define {
        name,
        unit: unit.to_string(),
        expr,
    })
}

/// Bind every unqualified reference in `expr` to `dataset`.
///
/// `$NAME` and `${NAME}` become `${<dataset>:NAME}`; references already
/// shaped `N:name` are copied as written.
pub fn qualify_references(expr: &str, dataset: usize) -> Result<String, SyntaxError> {
    let refs = scan_references(expr)?;

    let mut out = String::with_capacity(expr.len() + refs.len() * 4);
    let mut last = 0;
    for r in refs {
        out.push_str(&expr[last..r.start]);
        if QualifiedName::is_qualified(r.body) {
            out.push_str(&expr[r.start..r.end]);
        } else {
            out.push_str(&format!("${{{}:{}}}", dataset, r.body));
        }
        last = r.end;
    }
    out.push_str(&expr[last..]);

    Ok(out)
}

fn qualify_name(name: &str) -> Result<QualifiedName, String> {
    if name.starts_with('$') {
        return Err(format!("unresolved variable '{}' in DEFINE name", name));
    }
    if let Some(qualified) = QualifiedName::parse(name) {
        return Ok(qualified);
    }
    if QualifiedName::is_qualified(name) {
        return Err(format!("dataset number out of range in DEFINE name '{}'", name));
    }
    Ok(QualifiedName::new(0, name))
}

/// Split off the first blank-delimited token.
fn split_token(text: &str) -> (&str, &str) {
    match text.find([' ', '\t']) {
        Some(end) => text.split_at(end),
        None => (text, ""),
    }
}
