//! Demand dataset handling: ingestion, duplicate aggregation and gap filling

use crate::error::{ForecastError, Result};
use crate::schema::{Aggregation, Column, TargetColumn, DATE_COLUMN};
use calamine::{open_workbook, Reader as _, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a calendar date from the formats spreadsheets commonly export
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// `Some(value)` for number or blank cells, `None` for anything else
fn numeric_cell(cell: Option<&calamine::Data>) -> Option<Option<f64>> {
    match cell {
        None | Some(calamine::Data::Empty) => Some(None),
        Some(calamine::Data::Float(v)) => Some(Some(*v)),
        Some(calamine::Data::Int(v)) => Some(Some(*v as f64)),
        Some(_) => None,
    }
}

/// Cell text, with Excel dates rendered as `%Y-%m-%d`
fn text_cell(cell: Option<&calamine::Data>) -> Option<String> {
    match cell? {
        calamine::Data::Empty => None,
        calamine::Data::String(s) | calamine::Data::DateTimeIso(s) => Some(s.clone()),
        calamine::Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string()),
        other => Some(other.to_string()),
    }
}

/// One row of a demand dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    values: [Option<f64>; 9],
}

impl DemandRecord {
    /// Create a record with every value missing
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: [None; 9],
        }
    }

    /// Builder-style setter
    pub fn with(mut self, column: Column, value: f64) -> Self {
        self.values[column.index()] = Some(value);
        self
    }

    /// Value of `column`, if present
    pub fn get(&self, column: Column) -> Option<f64> {
        self.values[column.index()]
    }

    /// Overwrite the value of `column`
    pub fn set(&mut self, column: Column, value: Option<f64>) {
        self.values[column.index()] = value;
    }
}

/// In-memory demand dataset validated against the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemandDataset {
    records: Vec<DemandRecord>,
}

/// Data loader for demand datasets
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a demand dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<DemandDataset> {
        let path = path.as_ref();
        info!("Loading demand data from {}", path.display());
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Load a demand dataset from the first sheet of an Excel workbook.
    ///
    /// The sheet is converted to a `DataFrame` and validated exactly like a
    /// CSV upload.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<DemandDataset> {
        let path = path.as_ref();
        info!("Loading demand data from {}", path.display());
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let sheet = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ForecastError::InputShape("Workbook has no sheets".to_string()))??;

        let df = Self::sheet_frame(&sheet)?;
        Self::from_dataframe(&df)
    }

    /// Load a `.xlsx`/`.xlsm` workbook or, for any other extension, a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DemandDataset> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Self::from_xlsx(path),
            _ => Self::from_csv(path),
        }
    }

    /// The first row names the columns. A column whose cells are all numbers
    /// or blanks becomes `Float64`, any other column `Utf8`.
    fn sheet_frame(sheet: &calamine::Range<calamine::Data>) -> Result<DataFrame> {
        let mut rows = sheet.rows();
        let header = rows
            .next()
            .ok_or_else(|| ForecastError::InputShape("Sheet is empty".to_string()))?;
        let body: Vec<&[calamine::Data]> = rows.collect();

        let columns: Vec<Series> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| !matches!(name, calamine::Data::Empty))
            .map(|(i, name)| {
                let name = name.to_string();
                let cells: Vec<Option<&calamine::Data>> = body.iter().map(|row| row.get(i)).collect();
                let numeric: Option<Vec<Option<f64>>> =
                    cells.iter().map(|cell| numeric_cell(*cell)).collect();
                match numeric {
                    Some(values) if !values.is_empty() => Series::new(&name, values),
                    _ => {
                        let values: Vec<Option<String>> =
                            cells.iter().map(|cell| text_cell(*cell)).collect();
                        Series::new(&name, values)
                    }
                }
            })
            .collect();

        debug!("Read {} columns and {} rows from the sheet", columns.len(), body.len());
        Ok(DataFrame::new(columns)?)
    }

    /// Validate an existing DataFrame and convert it into a dataset
    pub fn from_dataframe(df: &DataFrame) -> Result<DemandDataset> {
        Self::check_schema(df)?;

        let dates = Self::date_column(df)?;
        let mut records: Vec<DemandRecord> = dates.into_iter().map(DemandRecord::new).collect();

        for column in Column::ALL {
            let values = Self::numeric_column(df, column)?;
            for (record, value) in records.iter_mut().zip(values) {
                record.set(column, value);
            }
        }

        debug!("Ingested {} rows", records.len());
        Ok(DemandDataset::new(records))
    }

    /// Reject frames that lack the date column or any numeric column
    fn check_schema(df: &DataFrame) -> Result<()> {
        let present = df.get_column_names();
        let missing: Vec<&str> = std::iter::once(DATE_COLUMN)
            .chain(Column::ALL.iter().map(|c| c.name()))
            .filter(|name| !present.contains(name))
            .collect();

        if !missing.is_empty() {
            return Err(ForecastError::InputShape(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let extra = present.len() - (Column::ALL.len() + 1);
        if extra > 0 {
            debug!("Ignoring {} columns outside the schema", extra);
        }
        Ok(())
    }

    fn date_column(df: &DataFrame) -> Result<Vec<NaiveDate>> {
        let series = df.column(DATE_COLUMN)?;
        match series.dtype() {
            DataType::Utf8 => series
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, raw)| {
                    raw.and_then(parse_date).ok_or_else(|| {
                        ForecastError::InputShape(format!(
                            "Row {}: cannot parse date {:?}",
                            row + 1,
                            raw.unwrap_or("")
                        ))
                    })
                })
                .collect(),
            DataType::Date | DataType::Datetime(_, _) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                    .ok_or_else(|| ForecastError::InputShape("Invalid epoch".to_string()))?;
                let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, day)| {
                        day.and_then(|d| epoch.checked_add_signed(Duration::days(d as i64)))
                            .ok_or_else(|| {
                                ForecastError::InputShape(format!("Row {}: missing date", row + 1))
                            })
                    })
                    .collect()
            }
            other => Err(ForecastError::InputShape(format!(
                "Date column has unsupported type {}",
                other
            ))),
        }
    }

    fn numeric_column(df: &DataFrame, column: Column) -> Result<Vec<Option<f64>>> {
        let series = df.column(column.name())?;
        let values = series.cast(&DataType::Float64).map_err(|e| {
            ForecastError::InputShape(format!("Column '{}' is not numeric: {}", column, e))
        })?;
        let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
        Ok(values)
    }
}

impl DemandDataset {
    /// Create a dataset from records in any order
    pub fn new(records: Vec<DemandRecord>) -> Self {
        Self { records }
    }

    /// Records in their current order
    pub fn records(&self) -> &[DemandRecord] {
        &self.records
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest dates
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// All values of a column, missing entries included
    pub fn column_values(&self, column: Column) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.get(column)).collect()
    }

    /// Whether any date occurs more than once
    pub fn has_duplicate_dates(&self) -> bool {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.windows(2).any(|w| w[0] == w[1])
    }

    /// Collapse rows sharing a date into one, sorted by date.
    ///
    /// Volume columns are summed and rate columns averaged over the values
    /// present. A combined value is missing only when every contributing
    /// value is missing, volume columns included: such a date is not read
    /// as zero sales, so a missing target then fails in
    /// [`DemandDataset::daily_series`] unless [`DemandDataset::fill_missing`]
    /// runs first. Spreadsheet group-sums report `0.0` for the same group.
    pub fn aggregate_duplicates(&self) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<&DemandRecord>> = BTreeMap::new();
        for record in &self.records {
            by_date.entry(record.date).or_default().push(record);
        }

        let duplicates = self.records.len() - by_date.len();
        if duplicates > 0 {
            warn!(
                "Aggregating {} duplicate rows across {} dates",
                duplicates,
                by_date.len()
            );
        }

        let records = by_date
            .into_iter()
            .map(|(date, group)| {
                let mut combined = DemandRecord::new(date);
                for column in Column::ALL {
                    let present: Vec<f64> = group.iter().filter_map(|r| r.get(column)).collect();
                    if present.is_empty() {
                        continue;
                    }
                    let value = match column.aggregation() {
                        Aggregation::Sum => present.iter().sum(),
                        Aggregation::Mean => present.iter().sum::<f64>() / present.len() as f64,
                    };
                    combined.set(column, Some(value));
                }
                combined
            })
            .collect();

        Self { records }
    }

    /// Insert a row for every missing calendar day, copying the previous
    /// day's values forward. Expects one row per date.
    pub fn fill_daily_gaps(&self) -> Self {
        let mut sorted = self.records.clone();
        sorted.sort_by_key(|r| r.date);

        let mut records: Vec<DemandRecord> = Vec::with_capacity(sorted.len());
        let mut filled = 0usize;
        for record in sorted {
            if let Some(previous) = records.last().cloned() {
                let mut day = previous.date + Duration::days(1);
                while day < record.date {
                    let mut padded = previous.clone();
                    padded.date = day;
                    records.push(padded);
                    filled += 1;
                    day += Duration::days(1);
                }
            }
            records.push(record);
        }

        if filled > 0 {
            warn!("Filled {} missing days by carrying values forward", filled);
        }
        Self { records }
    }

    /// Replace missing values with the mean of their column
    pub fn fill_missing(&self) -> Self {
        let mut records = self.records.clone();
        for column in Column::ALL {
            let present: Vec<f64> = records.iter().filter_map(|r| r.get(column)).collect();
            let gaps = records.len() - present.len();
            if gaps == 0 || present.is_empty() {
                continue;
            }
            let mean = present.iter().mean();
            debug!("Filling {} missing {} values with {:.4}", gaps, column, mean);
            for record in records.iter_mut().filter(|r| r.get(column).is_none()) {
                record.set(column, Some(mean));
            }
        }
        Self { records }
    }

    /// Keep rows whose date lies in the inclusive range
    pub fn filter_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ForecastError::Validation(format!(
                    "Start date {} is after end date {}",
                    s, e
                )));
            }
        }

        let records = self
            .records
            .iter()
            .filter(|r| start.map_or(true, |s| r.date >= s) && end.map_or(true, |e| r.date <= e))
            .cloned()
            .collect();
        Ok(Self { records })
    }

    /// Build the contiguous daily series for a target column.
    ///
    /// Duplicate dates are aggregated, rows sorted and missing days padded
    /// before the target values are extracted.
    pub fn daily_series(&self, target: TargetColumn) -> Result<DailySeries> {
        if self.is_empty() {
            return Err(ForecastError::InputShape("Dataset has no rows".to_string()));
        }

        let prepared = self.aggregate_duplicates().fill_daily_gaps();
        let column = target.column();
        let values = prepared
            .records
            .iter()
            .map(|r| {
                r.get(column).ok_or_else(|| {
                    ForecastError::InputShape(format!("Missing {} value on {}", column, r.date))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let start = prepared.records[0].date;
        info!(
            "Prepared {} daily observations of {} starting {}",
            values.len(),
            target,
            start
        );
        Ok(DailySeries::new(target, start, values))
    }
}

/// Contiguous daily series of one target column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    target: TargetColumn,
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a daily series whose first value falls on `start`
    pub fn new(target: TargetColumn, start: NaiveDate, values: Vec<f64>) -> Self {
        Self {
            target,
            start,
            values,
        }
    }

    /// Column the series was extracted from
    pub fn target(&self) -> TargetColumn {
        self.target
    }

    /// Date of the first value
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Date of the last value
    pub fn end(&self) -> Option<NaiveDate> {
        self.date_at(self.values.len().checked_sub(1)?)
    }

    /// Date of the value at `index`
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.start.checked_add_signed(Duration::days(index as i64))
    }

    /// Series values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dates aligned with the values
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.values.len()).filter_map(|i| self.date_at(i)).collect()
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split into `[0, index)` and `[index, len)`
    pub fn split_at(&self, index: usize) -> (DailySeries, DailySeries) {
        let index = index.min(self.values.len());
        let (head, tail) = self.values.split_at(index);
        let tail_start = self.date_at(index).unwrap_or(self.start);
        (
            DailySeries::new(self.target, self.start, head.to_vec()),
            DailySeries::new(self.target, tail_start, tail.to_vec()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(day(5)));
        assert_eq!(parse_date("2024/03/05"), Some(day(5)));
        assert_eq!(parse_date("05-03-2024"), Some(day(5)));
        assert_eq!(parse_date("03/05/2024"), Some(day(5)));
        assert_eq!(parse_date(" 2024-03-05 13:45:00 "), Some(day(5)));
        assert_eq!(parse_date("2024-03-05T00:00:00.000"), Some(day(5)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_fill_daily_gaps_pads_forward() {
        let dataset = DemandDataset::new(vec![
            DemandRecord::new(day(4)).with(Column::SalesVolume, 9.0),
            DemandRecord::new(day(1)).with(Column::SalesVolume, 5.0),
        ]);

        let filled = dataset.fill_daily_gaps();
        let sales: Vec<Option<f64>> = filled.column_values(Column::SalesVolume);
        assert_eq!(filled.len(), 4);
        assert_eq!(sales, vec![Some(5.0), Some(5.0), Some(5.0), Some(9.0)]);
        assert_eq!(filled.records()[2].date, day(3));
    }

    #[test]
    fn test_filter_dates_inclusive() {
        let dataset = DemandDataset::new((1..=5).map(|d| DemandRecord::new(day(d))).collect());
        let filtered = dataset.filter_dates(Some(day(2)), Some(day(4))).unwrap();
        assert_eq!(filtered.len(), 3);

        let open_ended = dataset.filter_dates(Some(day(4)), None).unwrap();
        assert_eq!(open_ended.len(), 2);

        assert!(dataset.filter_dates(Some(day(4)), Some(day(2))).is_err());
    }

    #[test]
    fn test_series_split_dates() {
        let series = DailySeries::new(TargetColumn::SalesVolume, day(1), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let (train, test) = series.split_at(4);
        assert_eq!(train.len(), 4);
        assert_eq!(test.values(), &[5.0]);
        assert_eq!(test.start(), day(5));
        assert_eq!(train.end(), Some(day(4)));
    }
}
