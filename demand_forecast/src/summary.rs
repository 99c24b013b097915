//! Quick descriptive statistics for an uploaded dataset

use crate::data::DemandDataset;
use crate::schema::Column;
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::fmt;

/// Statistics of the present values in one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: Column,
    /// Present values
    pub count: usize,
    /// Missing values
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation, needs two values
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Shape, date range and per-column statistics of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub duplicate_dates: bool,
    pub columns: Vec<ColumnStats>,
}

impl ColumnStats {
    fn of(dataset: &DemandDataset, column: Column) -> Self {
        let present: Vec<f64> = dataset
            .column_values(column)
            .into_iter()
            .flatten()
            .collect();
        let count = present.len();

        Self {
            column,
            count,
            missing: dataset.len() - count,
            mean: (count > 0).then(|| present.iter().mean()),
            std_dev: (count > 1).then(|| present.iter().std_dev()),
            min: (count > 0).then(|| Statistics::min(present.iter())),
            max: (count > 0).then(|| Statistics::max(present.iter())),
        }
    }
}

impl DatasetSummary {
    /// Summarise every schema column of `dataset`
    pub fn of(dataset: &DemandDataset) -> Self {
        let range = dataset.date_range();
        Self {
            rows: dataset.len(),
            first_date: range.map(|(first, _)| first),
            last_date: range.map(|(_, last)| last),
            duplicate_dates: dataset.has_duplicate_dates(),
            columns: Column::ALL
                .iter()
                .map(|c| ColumnStats::of(dataset, *c))
                .collect(),
        }
    }

    /// Total missing values across all columns
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Summary:")?;
        writeln!(f, "  Rows:    {}", self.rows)?;
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            writeln!(f, "  Dates:   {} to {}", first, last)?;
        }
        if self.duplicate_dates {
            writeln!(f, "  Some dates repeat and will be aggregated before forecasting")?;
        }
        writeln!(
            f,
            "  {:<24} {:>6} {:>8} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Missing", "Mean", "Std", "Min", "Max"
        )?;
        for stats in &self.columns {
            writeln!(
                f,
                "  {:<24} {:>6} {:>8} {:>12} {:>12} {:>12} {:>12}",
                stats.column.name(),
                stats.count,
                stats.missing,
                cell(stats.mean),
                cell(stats.std_dev),
                cell(stats.min),
                cell(stats.max)
            )?;
        }
        Ok(())
    }
}
