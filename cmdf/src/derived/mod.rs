//! Derived-definition table.
//!
//! Keeps one entry per qualified name, in last-definition order: redefining
//! a name removes the old entry and appends the new one at the end.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::expand::{Directive, Statement};
use crate::models::{DerivedDefinition, QualifiedName};

/// Ordered table of `DEFINE`d quantities.
#[derive(Debug, Clone, Default)]
pub struct DerivedTable {
    /// Entries in last-definition order
    entries: Vec<DerivedDefinition>,
    /// Qualified name -> position in `entries`
    index: HashMap<QualifiedName, usize>,
}

impl DerivedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from every `DEFINE` in a statement stream.
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut table = Self::new();
        for statement in statements {
            if let Directive::Define { name, unit, expr } = &statement.directive {
                table.insert(DerivedDefinition {
                    name: name.clone(),
                    expression: expr.clone(),
                    unit: unit.clone(),
                });
            }
        }
        table
    }

    /// Add a definition, replacing any earlier one with the same name.
    pub fn insert(&mut self, definition: DerivedDefinition) {
        if let Some(old) = self.index.remove(&definition.name) {
            self.entries.remove(old);
            for pos in self.index.values_mut() {
                if *pos > old {
                    *pos -= 1;
                }
            }
        }

        self.index.insert(definition.name.clone(), self.entries.len());
        self.entries.push(definition);
    }

    pub fn position(&self, name: &QualifiedName) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Position of a `N:name` key, `None` for unknown or malformed keys.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        QualifiedName::parse(key).and_then(|name| self.position(&name))
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&DerivedDefinition> {
        self.position(name).map(|pos| &self.entries[pos])
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedDefinition> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[DerivedDefinition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DerivedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, expression: &str, unit: &str) -> DerivedDefinition {
        DerivedDefinition {
            name: name.parse().unwrap(),
            expression: expression.to_string(),
            unit: unit.to_string(),
        }
    }

    fn names(table: &DerivedTable) -> Vec<String> {
        table.iter().map(|d| d.name.to_string()).collect()
    }

    #[test]
    fn test_insert_in_order() {
        let mut table = DerivedTable::new();
        table.insert(def("1:A", "x", "u"));
        table.insert(def("2:A", "y", "u"));

        assert_eq!(names(&table), vec!["1:A", "2:A"]);
        assert_eq!(table.position_of("2:A"), Some(1));
    }

    #[test]
    fn test_redefinition_moves_to_end() {
        let mut table = DerivedTable::new();
        table.insert(def("1:FOO", "A", "u1"));
        table.insert(def("1:BAR", "C", "u"));
        table.insert(def("0:BAZ", "D", "u"));
        table.insert(def("1:FOO", "B", "u2"));

        assert_eq!(table.len(), 3);
        assert_eq!(names(&table), vec!["1:BAR", "0:BAZ", "1:FOO"]);

        let foo = table.get(&QualifiedName::new(1, "FOO")).unwrap();
        assert_eq!(foo.expression, "B");
        assert_eq!(foo.unit, "u2");

        // Positions of the shifted entries follow the vector.
        for (pos, entry) in table.iter().enumerate() {
            assert_eq!(table.position(&entry.name), Some(pos));
        }
    }

    #[test]
    fn test_lookup_misses() {
        let mut table = DerivedTable::new();
        table.insert(def("1:FOO", "A", "u"));

        assert_eq!(table.position_of("2:FOO"), None);
        assert_eq!(table.position_of("FOO"), None);
        assert!(!table.contains(&QualifiedName::new(0, "FOO")));
    }

    #[test]
    fn test_from_statements_ignores_other_directives() {
        let statements = vec![
            Statement {
                line: 1,
                directive: Directive::Define {
                    name: QualifiedName::new(1, "OIL"),
                    unit: "sm3".into(),
                    expr: "${1:WOPR}".into(),
                },
            },
            Statement {
                line: 2,
                directive: Directive::AddChart,
            },
        ];
        let table = DerivedTable::from_statements(&statements);
        assert_eq!(names(&table), vec!["1:OIL"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut table = DerivedTable::new();
        table.insert(def("1:OIL", "${1:WOPR}", "None"));
        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            serde_json::json!([{"name": "1:OIL", "expression": "${1:WOPR}", "unit": "None"}])
        );
    }
}
