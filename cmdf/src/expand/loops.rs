//! `FOR ... NEXT` loop expansion.

use crate::error::ExpandResult;
use crate::models::SourceLine;

use super::block::ForBlock;
use super::wildcard;

/// Replace `${var}` and then `$var` with `value`.
///
/// The braced form goes first so `${X}` never turns into `{value}`.
pub fn substitute(text: &str, var: &str, value: &str) -> String {
    let braced = format!("${{{}}}", var);
    let bare = format!("${}", var);
    text.replace(&braced, value).replace(&bare, value)
}

/// Expand a loop body once per value.
///
/// Each body line gets wildcard expansion first, so a wildcard line inside a
/// loop yields one line per dataset per value. Output order is values
/// outermost, body lines innermost.
pub fn expand_loop(
    block: &ForBlock,
    values: &[String],
    num_datasets: usize,
) -> ExpandResult<Vec<SourceLine>> {
    let mut body = Vec::with_capacity(block.body.len());
    for line in &block.body {
        body.extend(wildcard::expand_line(line, num_datasets)?);
    }

    let mut expanded = Vec::with_capacity(values.len() * body.len());
    for value in values {
        for line in &body {
            let text = substitute(&line.text, &block.var, value);
            expanded.push(line.with_text(text.trim_start()));
        }
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::block::LoopSource;

    fn block(var: &str, body: &[&str]) -> ForBlock {
        ForBlock {
            line: 1,
            var: var.to_string(),
            source: LoopSource::List("L".into()),
            body: body
                .iter()
                .enumerate()
                .map(|(i, text)| SourceLine::new(i + 2, *text))
                .collect(),
        }
    }

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn texts(lines: Vec<SourceLine>) -> Vec<String> {
        lines.into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_substitute_both_forms() {
        assert_eq!(substitute("ADD SERIES ${X} W$X", "X", "2"), "ADD SERIES 2 W2");
        assert_eq!(substitute("${Y} $Z", "X", "2"), "${Y} $Z");
    }

    #[test]
    fn test_values_outer_body_inner() {
        let b = block("X", &["ADD CHART", "ADD SERIES ${X} WOPR"]);
        let out = expand_loop(&b, &values(&["1", "2"]), 3).unwrap();
        assert_eq!(
            texts(out),
            vec!["ADD CHART", "ADD SERIES 1 WOPR", "ADD CHART", "ADD SERIES 2 WOPR"]
        );
    }

    #[test]
    fn test_wildcard_inside_loop_is_cartesian() {
        let b = block("Q", &["ADD SERIES * $Q"]);
        let out = expand_loop(&b, &values(&["FOPT", "FWPT"]), 2).unwrap();
        assert_eq!(
            texts(out),
            vec![
                "ADD SERIES 1 FOPT",
                "ADD SERIES 2 FOPT",
                "ADD SERIES 1 FWPT",
                "ADD SERIES 2 FWPT"
            ]
        );
    }

    #[test]
    fn test_left_trimmed() {
        let b = block("W", &["    ADD SERIES 1 WBHP:$W"]);
        let out = expand_loop(&b, &values(&["P1"]), 1).unwrap();
        assert_eq!(texts(out), vec!["ADD SERIES 1 WBHP:P1"]);
    }

    #[test]
    fn test_empty_list_yields_nothing() {
        let b = block("X", &["ADD CHART"]);
        assert!(expand_loop(&b, &[], 1).unwrap().is_empty());
    }

    #[test]
    fn test_body_line_numbers_kept() {
        let b = block("X", &["ADD CHART", "ADD SERIES $X A"]);
        let out = expand_loop(&b, &values(&["1"]), 1).unwrap();
        assert_eq!(out[0].number, 2);
        assert_eq!(out[1].number, 3);
    }
}
