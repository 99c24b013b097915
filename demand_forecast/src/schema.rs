//! Dataset schema: the known columns and how duplicates combine
//!
//! Column selection by user-chosen strings is validated here, once, so that
//! nothing downstream works with free-form column names.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the date column every dataset must carry
pub const DATE_COLUMN: &str = "Date";

/// How values sharing a date are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Volumes add up
    Sum,
    /// Rates and levels average out
    Mean,
}

/// Numeric columns of a demand dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    SalesVolume,
    DemandVolume,
    RemainingVolume,
    ProductionVolume,
    Temperature,
    Humidity,
    ConsumerPriceIndex,
    EconomicIndicator,
    DisposableIncomeLevel,
}

impl Column {
    /// Every numeric column, in dataset order
    pub const ALL: [Column; 9] = [
        Column::SalesVolume,
        Column::DemandVolume,
        Column::RemainingVolume,
        Column::ProductionVolume,
        Column::Temperature,
        Column::Humidity,
        Column::ConsumerPriceIndex,
        Column::EconomicIndicator,
        Column::DisposableIncomeLevel,
    ];

    /// Header used for the column in uploaded spreadsheets
    pub fn name(&self) -> &'static str {
        match self {
            Column::SalesVolume => "Sales Volume",
            Column::DemandVolume => "Demand Volume",
            Column::RemainingVolume => "Remaining Volume",
            Column::ProductionVolume => "Production Volume",
            Column::Temperature => "Temperature",
            Column::Humidity => "Humidity",
            Column::ConsumerPriceIndex => "Consumer Price Index",
            Column::EconomicIndicator => "Economic Indicator",
            Column::DisposableIncomeLevel => "Disposable Income Level",
        }
    }

    /// Rule applied when several rows share a date
    pub fn aggregation(&self) -> Aggregation {
        match self {
            Column::SalesVolume
            | Column::DemandVolume
            | Column::RemainingVolume
            | Column::ProductionVolume => Aggregation::Sum,
            _ => Aggregation::Mean,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase and drop separators so "Sales Volume", "sales_volume" and
/// "sales-volume" all compare equal
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Column {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        let alias = match wanted.as_str() {
            "sales" => Some(Column::SalesVolume),
            "demand" => Some(Column::DemandVolume),
            "cpi" => Some(Column::ConsumerPriceIndex),
            _ => None,
        };
        alias
            .or_else(|| {
                Column::ALL
                    .iter()
                    .copied()
                    .find(|c| normalize(c.name()) == wanted)
            })
            .ok_or_else(|| ForecastError::Validation(format!("Unknown column: {}", s)))
    }
}

/// Column a forecast can be produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetColumn {
    SalesVolume,
    DemandVolume,
}

impl TargetColumn {
    /// Underlying dataset column
    pub fn column(&self) -> Column {
        match self {
            TargetColumn::SalesVolume => Column::SalesVolume,
            TargetColumn::DemandVolume => Column::DemandVolume,
        }
    }
}

impl fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().name())
    }
}

impl FromStr for TargetColumn {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<Column>()? {
            Column::SalesVolume => Ok(TargetColumn::SalesVolume),
            Column::DemandVolume => Ok(TargetColumn::DemandVolume),
            other => Err(ForecastError::Validation(format!(
                "{} cannot be forecast; choose Sales Volume or Demand Volume",
                other
            ))),
        }
    }
}
