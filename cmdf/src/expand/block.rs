//! Statement grouping: `LIST` statements, `FOR ... NEXT` blocks and plain lines.
//!
//! [`BlockParser`] walks the loaded lines once and yields one [`Block`] per
//! top-level statement. A malformed statement yields an error but the parser
//! resynchronizes after it, so callers may report and continue.

use crate::error::{ExpandError, ExpandResult};
use crate::models::SourceLine;
use crate::parser::tokenizer::{keyword, tokenize, Delimiters};

use super::lists::{ListCommand, ListOp};
use super::range::{expand_all_ranges, range_values};

/// Where a `FOR` loop takes its values from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopSource {
    /// `RANGE(a,b)` literal, already materialized.
    Range(Vec<String>),
    /// Named list in the registry (`${name}`, `$name` or `name`).
    List(String),
}

/// A `FOR <var> IN <source>` block with its raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForBlock {
    pub line: usize,
    pub var: String,
    pub source: LoopSource,
    pub body: Vec<SourceLine>,
}

/// One top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    List(ListCommand),
    For(ForBlock),
    Line(SourceLine),
}

/// Iterator over the top-level statements of a command file.
pub struct BlockParser<'a> {
    lines: &'a [SourceLine],
    pos: usize,
}

impl<'a> BlockParser<'a> {
    pub fn new(lines: &'a [SourceLine]) -> Self {
        Self { lines, pos: 0 }
    }

    fn parse_for(&mut self, header: &SourceLine) -> ExpandResult<Block> {
        let head = parse_for_header(header);

        let mut body = Vec::new();
        let mut depth = 0usize;
        let mut nested_at = None;

        loop {
            let Some(line) = self.lines.get(self.pos) else {
                return Err(ExpandError::syntax(
                    header.number,
                    "FOR block has no matching NEXT",
                ));
            };
            self.pos += 1;

            match keyword(&line.text) {
                Some("NEXT") if depth == 0 => break,
                Some("NEXT") => depth -= 1,
                Some("FOR") => {
                    depth += 1;
                    nested_at.get_or_insert(line.number);
                }
                _ => {}
            }
            body.push(line.clone());
        }

        if let Some(number) = nested_at {
            return Err(ExpandError::syntax(number, "nested FOR blocks are not supported"));
        }

        let (var, source) = head?;
        Ok(Block::For(ForBlock {
            line: header.number,
            var,
            source,
            body,
        }))
    }
}

impl<'a> Iterator for BlockParser<'a> {
    type Item = ExpandResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;

        let item = match keyword(&line.text) {
            Some("LIST") => parse_list(line).map(Block::List),
            Some("FOR") => self.parse_for(line),
            Some("NEXT") => Err(ExpandError::syntax(line.number, "NEXT without a matching FOR")),
            _ => Ok(Block::Line(line.clone())),
        };

        Some(item)
    }
}

/// Parse `LIST NEW|ADD <name> <tok>...`.
pub fn parse_list(line: &SourceLine) -> ExpandResult<ListCommand> {
    let text = expand_all_ranges(&line.text).map_err(|source| ExpandError::Syntax {
        line: line.number,
        source,
    })?;
    let tokens = tokenize(&text, Delimiters::WhitespaceAndCommas);

    if tokens.len() < 4 {
        return Err(ExpandError::syntax(
            line.number,
            "LIST needs NEW or ADD, a list name and at least one value",
        ));
    }

    let op = match tokens[1] {
        "NEW" => ListOp::New,
        "ADD" => ListOp::Add,
        other => {
            return Err(ExpandError::syntax(
                line.number,
                format!("first argument of LIST must be NEW or ADD, found '{}'", other),
            ))
        }
    };

    Ok(ListCommand {
        line: line.number,
        op,
        name: tokens[2].to_string(),
        tokens: tokens[3..].iter().map(|t| t.to_string()).collect(),
    })
}

/// Parse `FOR <var> IN <source>`.
fn parse_for_header(line: &SourceLine) -> ExpandResult<(String, LoopSource)> {
    let tokens = tokenize(&line.text, Delimiters::WhitespaceAndCommas);

    if tokens.len() < 4 || tokens[2] != "IN" {
        return Err(ExpandError::syntax(
            line.number,
            "expected 'FOR <var> IN <list>'",
        ));
    }
    let var = tokens[1].to_string();

    if tokens[3].starts_with("RANGE(") {
        let values = range_values(&line.text).map_err(|source| ExpandError::Syntax {
            line: line.number,
            source,
        })?;
        return Ok((var, LoopSource::Range(values)));
    }

    if tokens.len() > 4 {
        return Err(ExpandError::syntax(
            line.number,
            "FOR takes a single list reference",
        ));
    }

    Ok((var, LoopSource::List(list_name(tokens[3], line.number)?)))
}

/// Strip the `${...}` or `$` sigil from a list reference.
fn list_name(reference: &str, line: usize) -> ExpandResult<String> {
    let name = if let Some(rest) = reference.strip_prefix("${") {
        rest.strip_suffix('}').ok_or_else(|| {
            ExpandError::syntax(line, format!("unterminated list reference '{}'", reference))
        })?
    } else {
        reference.strip_prefix('$').unwrap_or(reference)
    };

    if name.is_empty() {
        return Err(ExpandError::syntax(line, "empty list reference"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::split_lines;

    fn blocks(source: &str) -> Vec<ExpandResult<Block>> {
        let lines = split_lines(source);
        BlockParser::new(&lines).collect()
    }

    #[test]
    fn test_list_with_range() {
        let line = SourceLine::new(1, "LIST NEW L RANGE(1,3)");
        let cmd = parse_list(&line).unwrap();
        assert_eq!(cmd.op, ListOp::New);
        assert_eq!(cmd.name, "L");
        assert_eq!(cmd.tokens, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_list_with_commas() {
        let cmd = parse_list(&SourceLine::new(1, "LIST ADD WELLS P1,P2, P3")).unwrap();
        assert_eq!(cmd.op, ListOp::Add);
        assert_eq!(cmd.tokens, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_list_errors() {
        let err = parse_list(&SourceLine::new(2, "LIST NEW L")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.line(), 2);

        let err = parse_list(&SourceLine::new(3, "LIST DROP L A")).unwrap_err();
        assert!(err.to_string().contains("NEW or ADD"));

        let err = parse_list(&SourceLine::new(4, "LIST NEW L RANGE(2,5")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_for_block_collects_body() {
        let parsed = blocks("FOR X IN L\nADD SERIES ${X} WOPR\nADD SERIES $X WWPR\nNEXT\nADD CHART");
        assert_eq!(parsed.len(), 2);

        let Ok(Block::For(block)) = &parsed[0] else {
            panic!("expected FOR block, got {:?}", parsed[0]);
        };
        assert_eq!(block.var, "X");
        assert_eq!(block.source, LoopSource::List("L".into()));
        assert_eq!(block.body.len(), 2);
        assert!(matches!(&parsed[1], Ok(Block::Line(l)) if l.text == "ADD CHART"));
    }

    #[test]
    fn test_for_list_reference_forms() {
        for header in ["FOR I IN ${CASES}", "FOR I IN $CASES", "FOR I IN CASES"] {
            let parsed = blocks(&format!("{}\nADD CHART\nNEXT", header));
            let Ok(Block::For(block)) = &parsed[0] else {
                panic!("expected FOR block for {}", header);
            };
            assert_eq!(block.source, LoopSource::List("CASES".into()));
        }
    }

    #[test]
    fn test_for_over_range() {
        let parsed = blocks("FOR I IN RANGE(2,4)\nADD SERIES $I FOPT\nNEXT");
        let Ok(Block::For(block)) = &parsed[0] else {
            panic!("expected FOR block");
        };
        assert_eq!(block.source, LoopSource::Range(vec!["2".into(), "3".into(), "4".into()]));
    }

    #[test]
    fn test_missing_next() {
        let parsed = blocks("FOR X IN L\nADD CHART");
        assert_eq!(parsed.len(), 1);
        let err = parsed[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("no matching NEXT"));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_nested_for_rejected_and_resynchronized() {
        let parsed = blocks(
            "FOR X IN A\nFOR Y IN B\nADD SERIES $X $Y\nNEXT\nNEXT\nADD CHART",
        );
        assert_eq!(parsed.len(), 2);
        let err = parsed[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("nested FOR"));
        assert_eq!(err.line(), 2);
        assert!(matches!(&parsed[1], Ok(Block::Line(l)) if l.text == "ADD CHART"));
    }

    #[test]
    fn test_stray_next() {
        let parsed = blocks("NEXT\nADD CHART");
        assert!(parsed[0].is_err());
        assert!(parsed[1].is_ok());
    }

    #[test]
    fn test_bad_for_header() {
        let parsed = blocks("FOR X OVER L\nADD CHART\nNEXT\nADD CHART");
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_err());

        let parsed = blocks("FOR X IN ${L\nNEXT");
        assert!(parsed[0].as_ref().unwrap_err().to_string().contains("unterminated"));
    }
}
