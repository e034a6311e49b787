//! High-level API: one command file, loaded and expanded.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdf::{CommandFile, EngineOptions};
//!
//! let options = EngineOptions { num_datasets: 2, ..Default::default() };
//! let file = CommandFile::from_path("field.cmdf", &options)?;
//! for line in file.processed_lines() {
//!     println!("{}", line);
//! }
//! let charts = file.charts("0:3650")?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::charts::{build_charts, ChartSet};
use crate::derived::DerivedTable;
use crate::error::{EngineResult, ErrorPolicy, ExpandError};
use crate::expand::{Expander, ListRegistry, Statement};
use crate::logs::{log_info, log_success, log_warning};
use crate::models::{ChartSpec, SourceLine};
use crate::parser::{load_command_file, split_lines, substitute_variables, LoadedFile};

/// Environment variable holding the dataset count.
pub const ENV_NUM_CASES: &str = "CMDF_NUM_CASES";
/// Environment variable holding the error policy (`abort` or `skip`).
pub const ENV_ON_ERROR: &str = "CMDF_ON_ERROR";
/// Environment variable holding the default chart x-range.
pub const ENV_XRANGE: &str = "CMDF_XRANGE";

/// Options for expanding a command file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Number of loaded datasets
    pub num_datasets: usize,

    /// What to do with a failing statement
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            num_datasets: 1,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl EngineOptions {
    /// Defaults overlaid with `CMDF_NUM_CASES` and `CMDF_ON_ERROR`.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; unparsable values are reported and ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_NUM_CASES) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.num_datasets = n,
                Err(_) => log_warning(format!("ignoring {}='{}': not a dataset count", ENV_NUM_CASES, raw)),
            }
        }
        if let Some(raw) = lookup(ENV_ON_ERROR) {
            match raw.parse::<ErrorPolicy>() {
                Ok(policy) => self.on_error = policy,
                Err(e) => log_warning(format!("ignoring {}: {}", ENV_ON_ERROR, e)),
            }
        }
        self
    }
}

/// Document handed to a chart renderer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderDocument<'a> {
    pub charts: Vec<ChartSpec>,
    pub derived: &'a DerivedTable,
    /// Chart statements dropped under [`ErrorPolicy::Skip`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// A loaded and fully expanded command file.
#[derive(Debug, Clone)]
pub struct CommandFile {
    options: EngineOptions,
    encoding: String,
    lines: Vec<SourceLine>,
    statements: Vec<Statement>,
    lists: ListRegistry,
    derived: DerivedTable,
    skipped: Vec<ExpandError>,
}

impl CommandFile {
    /// Load, substitute and expand the command file at `path`.
    pub fn from_path(path: impl AsRef<Path>, options: &EngineOptions) -> EngineResult<Self> {
        let path = path.as_ref();
        let loaded = load_command_file(path)?;
        log_info(format!(
            "Loaded {} line(s) from {} ({})",
            loaded.lines.len(),
            path.display(),
            loaded.encoding
        ));
        Self::from_loaded(loaded, options)
    }

    /// Expand command-file text held in memory.
    pub fn from_source(source: &str, options: &EngineOptions) -> EngineResult<Self> {
        let loaded = LoadedFile {
            lines: split_lines(source),
            encoding: "utf-8".to_string(),
        };
        Self::from_loaded(loaded, options)
    }

    fn from_loaded(loaded: LoadedFile, options: &EngineOptions) -> EngineResult<Self> {
        let mut lines = loaded.lines;
        substitute_variables(&mut lines, options.num_datasets);

        let expansion = Expander::new(options.num_datasets, options.on_error).expand(&lines)?;
        let derived = DerivedTable::from_statements(&expansion.statements);

        log_info(format!(
            "Expanded to {} statement(s), {} derived definition(s)",
            expansion.statements.len(),
            derived.len()
        ));
        if !expansion.skipped.is_empty() {
            log_warning(format!("{} statement(s) skipped", expansion.skipped.len()));
        }

        Ok(Self {
            options: options.clone(),
            encoding: loaded.encoding,
            lines,
            statements: expansion.statements,
            lists: expansion.lists,
            derived,
            skipped: expansion.skipped,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Encoding the file was decoded from.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Loaded lines after `$NUM_CASES` substitution.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The resolved statements as canonical command lines.
    pub fn processed_lines(&self) -> Vec<String> {
        self.statements.iter().map(|s| s.to_string()).collect()
    }

    pub fn lists(&self) -> &ListRegistry {
        &self.lists
    }

    pub fn derived(&self) -> &DerivedTable {
        &self.derived
    }

    /// Position of `N:name` in the derived table.
    pub fn derived_key_index(&self, key: &str) -> Option<usize> {
        self.derived.position_of(key)
    }

    /// Statements dropped under [`ErrorPolicy::Skip`].
    pub fn skipped(&self) -> &[ExpandError] {
        &self.skipped
    }

    /// Build the charts, all sharing `x_range`.
    pub fn charts(&self, x_range: &str) -> EngineResult<ChartSet> {
        let set = build_charts(
            &self.statements,
            &self.derived,
            self.options.num_datasets,
            x_range,
            self.options.on_error,
        )?;
        log_success(format!(
            "Built {} chart(s) with {} series",
            set.charts.len(),
            set.series_count()
        ));
        if !set.skipped.is_empty() {
            log_warning(format!("{} chart statement(s) skipped", set.skipped.len()));
        }
        Ok(set)
    }

    pub fn render_document(&self, x_range: &str) -> EngineResult<RenderDocument<'_>> {
        let set = self.charts(x_range)?;
        Ok(RenderDocument {
            charts: set.charts,
            derived: &self.derived,
            skipped: set.skipped.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// Pretty-printed JSON of [`Self::render_document`].
    pub fn render_json(&self, x_range: &str) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.render_document(x_range)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn options(n: usize) -> EngineOptions {
        crate::logs::set_echo(false);
        EngineOptions {
            num_datasets: n,
            ..Default::default()
        }
    }

    fn processed(source: &str, n: usize) -> Vec<String> {
        CommandFile::from_source(source, &options(n))
            .unwrap()
            .processed_lines()
    }

    #[test]
    fn test_num_cases_placeholder() {
        let file = CommandFile::from_source(
            "LIST NEW L RANGE(1,$NUM_CASES)\nFOR I IN L\nADD SERIES $I FOPT\nNEXT\n-- $NUM_CASES in a comment",
            &options(3),
        )
        .unwrap();

        assert!(file.lines().iter().all(|l| !l.text.contains("$NUM_CASES")));
        assert_eq!(file.lines()[0].text, "LIST NEW L RANGE(1,3)");
        assert_eq!(file.processed_lines().len(), 3);
    }

    #[test]
    fn test_wildcard_series() {
        assert_eq!(
            processed("ADD CHART\nADD SERIES * Q", 3),
            vec!["ADD CHART", "ADD SERIES 1 Q", "ADD SERIES 2 Q", "ADD SERIES 3 Q"]
        );
    }

    #[test]
    fn test_wildcard_define() {
        assert_eq!(
            processed("DEFINE *:OILRATE sm3/day = $WOPR", 2),
            vec![
                "DEFINE 1:OILRATE sm3/day = ${1:WOPR}",
                "DEFINE 2:OILRATE sm3/day = ${2:WOPR}"
            ]
        );
    }

    #[test]
    fn test_list_driven_loop() {
        assert_eq!(
            processed("LIST NEW L RANGE(1,3)\nFOR X IN L\nADD SERIES ${X} WOPR\nNEXT", 3),
            vec!["ADD SERIES 1 WOPR", "ADD SERIES 2 WOPR", "ADD SERIES 3 WOPR"]
        );
    }

    #[test]
    fn test_redefinition() {
        let file = CommandFile::from_source(
            "DEFINE 1:FOO u1 = A\nDEFINE 1:BAR u = C\nDEFINE 2:FOO u = D\nDEFINE 1:FOO u2 = B",
            &options(2),
        )
        .unwrap();

        let derived = file.derived();
        assert_eq!(derived.len(), 3);
        assert_eq!(file.derived_key_index("1:FOO"), Some(2));
        assert_eq!(file.derived_key_index("1:BAR"), Some(0));
        assert_eq!(file.derived_key_index("3:FOO"), None);

        let foo = &derived.entries()[2];
        assert_eq!(foo.expression, "B");
        assert_eq!(foo.unit, "u2");
    }

    #[test]
    fn test_series_before_chart_is_error() {
        let file = CommandFile::from_source("ADD SERIES 1 FOPR\nADD CHART", &options(1)).unwrap();
        let err = file.charts("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_unterminated_range() {
        let err = CommandFile::from_source("LIST NEW L RANGE(2,5", &options(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let source = "\
LIST NEW WELLS P1 P2
DEFINE *:WCUT = $WWPR / $WLPR
DEFINE TOTAL sm3 = ${1:FOPT} + ${2:FOPT}
ADD CHART
FOR W IN WELLS
ADD SERIES * WOPR:$W 1
NEXT
TITLE Water cut";
        let first = processed(source, 2);
        let second = processed(&first.join("\n"), 2);
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-- rates").unwrap();
        writeln!(file, "ADD CHART").unwrap();
        writeln!(file, "ADD SERIES * FOPR").unwrap();

        let cmd = CommandFile::from_path(file.path(), &options(2)).unwrap();
        assert_eq!(cmd.lines()[0].number, 2);
        assert_eq!(cmd.statements().len(), 3);
        assert_eq!(cmd.encoding(), "utf-8");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandFile::from_path(dir.path().join("missing.cmdf"), &options(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_skip_policy_collects_errors() {
        let opts = EngineOptions {
            num_datasets: 1,
            on_error: ErrorPolicy::Skip,
        };
        crate::logs::set_echo(false);
        let file = CommandFile::from_source("ADD CHART\nFOR X IN NOPE\nADD SERIES 1 $X\nNEXT\nADD SERIES 1 A", &opts)
            .unwrap();

        assert_eq!(file.skipped().len(), 1);
        assert_eq!(file.skipped()[0].kind(), ErrorKind::Name);
        assert_eq!(file.processed_lines(), vec!["ADD CHART", "ADD SERIES 1 A"]);
    }

    #[test]
    fn test_render_document() {
        let file = CommandFile::from_source(
            "DEFINE 1:OIL sm3 = $WOPR\nADD CHART\nADD SERIES 1 OIL\nADD SERIES 1 FOPR 2",
            &options(1),
        )
        .unwrap();
        let doc = serde_json::to_value(file.render_document("0:100").unwrap()).unwrap();

        assert_eq!(
            doc,
            serde_json::json!({
                "charts": [{
                    "series": [
                        {"datasetIndex": 0, "quantity": "OIL", "isDerived": true},
                        {"datasetIndex": 0, "quantity": "FOPR", "axis": 2, "isDerived": false}
                    ],
                    "xRange": "0:100"
                }],
                "derived": [{"name": "1:OIL", "expression": "${1:WOPR}", "unit": "sm3"}]
            })
        );
    }

    #[test]
    fn test_render_document_reports_skipped_series() {
        let opts = EngineOptions {
            num_datasets: 1,
            on_error: ErrorPolicy::Skip,
        };
        crate::logs::set_echo(false);
        let file = CommandFile::from_source("ADD SERIES 1 A\nADD CHART\nADD SERIES 7 B\nADD SERIES 1 C", &opts)
            .unwrap();
        assert!(file.skipped().is_empty());

        let doc = file.render_document("").unwrap();
        assert_eq!(doc.charts.len(), 1);
        assert_eq!(doc.skipped.len(), 2);
        assert!(doc.skipped[0].contains("line 1"));
        assert!(doc.skipped[1].contains("line 3"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["skipped"].as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_options_overlay() {
        crate::logs::set_echo(false);
        let opts = EngineOptions::default().overlay(|key| match key {
            ENV_NUM_CASES => Some("4".into()),
            ENV_ON_ERROR => Some("skip".into()),
            _ => None,
        });
        assert_eq!(opts.num_datasets, 4);
        assert_eq!(opts.on_error, ErrorPolicy::Skip);

        let opts = EngineOptions::default().overlay(|key| match key {
            ENV_NUM_CASES => Some("many".into()),
            _ => None,
        });
        assert_eq!(opts, EngineOptions::default());
    }
}
