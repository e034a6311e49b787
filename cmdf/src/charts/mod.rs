//! Chart building from the resolved statement stream.
//!
//! `ADD CHART` opens a chart; each following `ADD SERIES` adds to it until
//! the next `ADD CHART`. Every chart gets the same externally supplied
//! x-range.

use serde::Serialize;

use crate::derived::DerivedTable;
use crate::error::{ChartError, ChartResult, ErrorPolicy};
use crate::expand::{Directive, Statement};
use crate::logs::log_error;
use crate::models::{ChartSpec, QualifiedName, SeriesSpec};

/// Charts built from one command file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSet {
    pub charts: Vec<ChartSpec>,
    /// Errors dropped under [`ErrorPolicy::Skip`].
    #[serde(skip)]
    pub skipped: Vec<ChartError>,
}

impl ChartSet {
    pub fn series_count(&self) -> usize {
        self.charts.iter().map(|c| c.series.len()).sum()
    }
}

/// Sequential chart builder with a current-chart cursor.
pub struct ChartBuilder<'a> {
    derived: &'a DerivedTable,
    num_datasets: usize,
    x_range: String,
    charts: Vec<ChartSpec>,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(derived: &'a DerivedTable, num_datasets: usize, x_range: impl Into<String>) -> Self {
        Self {
            derived,
            num_datasets,
            x_range: x_range.into(),
            charts: Vec::new(),
        }
    }

    /// Apply one statement. Anything but `ADD` is ignored.
    pub fn apply(&mut self, statement: &Statement) -> ChartResult<()> {
        match &statement.directive {
            Directive::AddChart => {
                self.charts.push(ChartSpec::new(self.x_range.clone()));
                Ok(())
            }
            Directive::AddSeries {
                dataset,
                quantity,
                axis,
            } => self.add_series(statement.line, *dataset, quantity, *axis),
            Directive::Define { .. } | Directive::Passthrough { .. } => Ok(()),
        }
    }

    fn add_series(
        &mut self,
        line: usize,
        dataset: usize,
        quantity: &str,
        axis: Option<i32>,
    ) -> ChartResult<()> {
        let is_derived = self.derived.contains(&QualifiedName::new(dataset, quantity));
        let num_datasets = self.num_datasets;
        let chart = self
            .charts
            .last_mut()
            .ok_or(ChartError::NoCurrentChart { line })?;

        if dataset == 0 || dataset > num_datasets {
            return Err(ChartError::DatasetOutOfRange {
                line,
                index: dataset,
                available: num_datasets,
            });
        }

        chart.series.push(SeriesSpec {
            dataset_index: dataset - 1,
            quantity: quantity.to_string(),
            axis,
            is_derived,
        });
        Ok(())
    }

    pub fn finish(self) -> Vec<ChartSpec> {
        self.charts
    }
}

/// Build every chart described by `statements`.
pub fn build_charts(
    statements: &[Statement],
    derived: &DerivedTable,
    num_datasets: usize,
    x_range: &str,
    policy: ErrorPolicy,
) -> ChartResult<ChartSet> {
    let mut builder = ChartBuilder::new(derived, num_datasets, x_range);
    let mut skipped = Vec::new();

    for statement in statements {
        if let Err(err) = builder.apply(statement) {
            match policy {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Skip => {
                    log_error(format!("skipped: {}", err));
                    skipped.push(err);
                }
            }
        }
    }

    Ok(ChartSet {
        charts: builder.finish(),
        skipped,
    })
}
