//! Named token lists (`LIST NEW` / `LIST ADD`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ExpandError, ExpandResult};

/// `LIST` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListOp {
    /// Create the list, or clear it if it exists, then append.
    New,
    /// Append to an existing list.
    Add,
}

/// A parsed `LIST` statement; any `RANGE(...)` is already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCommand {
    pub line: usize,
    pub op: ListOp,
    pub name: String,
    pub tokens: Vec<String>,
}

/// Registry of named lists for one command file.
#[derive(Debug, Clone, Default)]
pub struct ListRegistry {
    lists: HashMap<String, Vec<String>>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a `LIST` statement.
    pub fn apply(&mut self, cmd: &ListCommand) -> ExpandResult<()> {
        match cmd.op {
            ListOp::New => {
                let list = self.lists.entry(cmd.name.clone()).or_default();
                list.clear();
                list.extend(cmd.tokens.iter().cloned());
            }
            ListOp::Add => {
                let list = self
                    .lists
                    .get_mut(&cmd.name)
                    .ok_or_else(|| ExpandError::UnknownList {
                        line: cmd.line,
                        name: cmd.name.clone(),
                    })?;
                list.extend(cmd.tokens.iter().cloned());
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.lists.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    /// Registered list names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lists.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
