//! Drives macro expansion over a whole command file.

use crate::error::{ErrorPolicy, ExpandError, ExpandResult};
use crate::logs::{log_error, log_info_indent, log_warning};
use crate::models::SourceLine;

use super::block::{Block, BlockParser, LoopSource};
use super::directive::{Directive, Statement};
use super::lists::ListRegistry;
use super::{loops, wildcard};

/// Result of expanding a command file.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub statements: Vec<Statement>,
    /// Errors dropped under [`ErrorPolicy::Skip`], in file order.
    pub skipped: Vec<ExpandError>,
    pub lists: ListRegistry,
}

/// Expands `LIST`, `FOR` and wildcard lines into resolved statements.
#[derive(Debug, Clone)]
pub struct Expander {
    num_datasets: usize,
    policy: ErrorPolicy,
    registry: ListRegistry,
}

impl Expander {
    pub fn new(num_datasets: usize, policy: ErrorPolicy) -> Self {
        Self {
            num_datasets,
            policy,
            registry: ListRegistry::new(),
        }
    }

    /// Expand `lines` in order.
    ///
    /// Under [`ErrorPolicy::Skip`] a failing statement contributes nothing;
    /// a `FOR` block fails or succeeds as a whole.
    pub fn expand(mut self, lines: &[SourceLine]) -> ExpandResult<Expansion> {
        let mut statements = Vec::new();
        let mut skipped = Vec::new();

        for block in BlockParser::new(lines) {
            match block.and_then(|b| self.expand_block(b)) {
                Ok(mut out) => statements.append(&mut out),
                Err(err) => match self.policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        log_error(format!("skipped: {}", err));
                        skipped.push(err);
                    }
                },
            }
        }

        Ok(Expansion {
            statements,
            skipped,
            lists: self.registry,
        })
    }

    fn expand_block(&mut self, block: Block) -> ExpandResult<Vec<Statement>> {
        match block {
            Block::List(cmd) => {
                self.registry.apply(&cmd)?;
                Ok(Vec::new())
            }
            Block::For(block) => {
                let values = match &block.source {
                    LoopSource::Range(values) => values.clone(),
                    LoopSource::List(name) => self
                        .registry
                        .get(name)
                        .ok_or_else(|| ExpandError::UnknownList {
                            line: block.line,
                            name: name.clone(),
                        })?
                        .to_vec(),
                };
                log_info_indent(
                    format!(
                        "line {}: FOR {} over {} value(s), {} body line(s)",
                        block.line,
                        block.var,
                        values.len(),
                        block.body.len()
                    ),
                    1,
                );
                let lines = loops::expand_loop(&block, &values, self.num_datasets)?;
                parse_all(&lines)
            }
            Block::Line(line) => {
                let lines = wildcard::expand_line(&line, self.num_datasets)?;
                parse_all(&lines)
            }
        }
    }
}

fn parse_all(lines: &[SourceLine]) -> ExpandResult<Vec<Statement>> {
    lines
        .iter()
        .map(|line| {
            let directive = Directive::parse(line)?;
            if directive.is_passthrough() {
                log_warning(format!("line {}: unknown keyword, passed through: {}", line.number, directive));
            }
            Ok(Statement {
                line: line.number,
                directive,
            })
        })
        .collect()
}
