//! Relationships between dataset columns for trend exploration

use crate::data::DemandDataset;
use crate::error::{ForecastError, Result};
use crate::schema::Column;
use statrs::statistics::Statistics;

/// `(x, y)` value pairs from rows where both columns are present
pub fn column_pairs(dataset: &DemandDataset, x: Column, y: Column) -> Vec<(f64, f64)> {
    dataset
        .records()
        .iter()
        .filter_map(|r| Some((r.get(x)?, r.get(y)?)))
        .collect()
}

/// Pearson correlation between two columns over rows where both are present
pub fn correlation(dataset: &DemandDataset, x: Column, y: Column) -> Result<f64> {
    let pairs = column_pairs(dataset, x, y);
    if pairs.len() < 2 {
        return Err(ForecastError::Validation(format!(
            "Correlation of {} and {} needs at least 2 complete rows, got {}",
            x,
            y,
            pairs.len()
        )));
    }

    let xs: Vec<f64> = pairs.iter().map(|(a, _)| *a).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, b)| *b).collect();
    let sx = xs.iter().std_dev();
    let sy = ys.iter().std_dev();
    if sx == 0.0 || sy == 0.0 {
        return Err(ForecastError::Validation(format!(
            "Correlation of {} and {} is undefined for a constant column",
            x, y
        )));
    }

    let covariance = xs.iter().covariance(ys.iter());
    Ok((covariance / (sx * sy)).clamp(-1.0, 1.0))
}
