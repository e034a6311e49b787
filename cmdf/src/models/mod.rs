//! Domain models for the command-file pipeline.
//!
//! This module contains the data structures shared by every stage:
//!
//! - [`SourceLine`] - One loaded command line with its file line number
//! - [`QualifiedName`] - `<dataset>:<name>` binding of a quantity to a dataset
//! - [`DerivedDefinition`] - A `DEFINE`d quantity (name, expression, unit)
//! - [`SeriesSpec`] - One plotted series
//! - [`ChartSpec`] - One chart with its series and x-range

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

static QUALIFIED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(.+)$").expect("qualified-name pattern is valid"));

// =============================================================================
// Source Lines
// =============================================================================

/// A non-blank, non-comment line of the command file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// 1-based line number in the command file.
    pub number: usize,
    /// Line text with trailing blanks removed.
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Same line number, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(self.number, text)
    }
}

// =============================================================================
// Qualified Names
// =============================================================================

/// A quantity name bound to a dataset number, written `N:name`.
///
/// `dataset` is the number as written in the command file (1-based for
/// loaded datasets, `0` for definitions not bound to any dataset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub dataset: usize,
    pub name: String,
}

impl QualifiedName {
    pub fn new(dataset: usize, name: impl Into<String>) -> Self {
        Self {
            dataset,
            name: name.into(),
        }
    }

    /// Parse `N:name`, returning `None` for any other shape.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = QUALIFIED_NAME.captures(text)?;
        let dataset = caps[1].parse().ok()?;
        Some(Self::new(dataset, &caps[2]))
    }

    /// Whether `text` already carries a numeric dataset prefix.
    pub fn is_qualified(text: &str) -> bool {
        QUALIFIED_NAME.is_match(text)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dataset, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{}' is not of the form <dataset>:<name>", s))
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Derived Definitions
// =============================================================================

/// A derived quantity defined with `DEFINE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedDefinition {
    pub name: QualifiedName,
    /// Opaque expression text, references already dataset-qualified.
    pub expression: String,
    /// Unit string, `None` (literally) when the command gave no unit.
    pub unit: String,
}

// =============================================================================
// Charts
// =============================================================================

/// One series on a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    /// 0-based index of the loaded dataset.
    pub dataset_index: usize,
    /// Quantity name, as written after the dataset number.
    pub quantity: String,
    /// Axis requested by the command, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<i32>,
    /// Whether the quantity is a `DEFINE`d derived quantity.
    pub is_derived: bool,
}

impl SeriesSpec {
    /// Axis index with `-1` standing for "unspecified".
    pub fn axis_index(&self) -> i32 {
        self.axis.unwrap_or(-1)
    }
}

/// A chart and the series added to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub series: Vec<SeriesSpec>,
    pub x_range: String,
}

impl ChartSpec {
    pub fn new(x_range: impl Into<String>) -> Self {
        Self {
            series: Vec::new(),
            x_range: x_range.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
