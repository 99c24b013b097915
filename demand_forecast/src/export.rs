//! Export of forecast runs as CSV or JSON

use crate::error::Result;
use crate::session::ForecastRun;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ForecastRow {
    date: NaiveDate,
    baseline: f64,
    adjusted: f64,
}

/// Write `date,baseline,adjusted` rows for every forecast day
pub fn write_forecast_csv<W: Write>(run: &ForecastRun, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for ((date, baseline), adjusted) in run
        .forecast_dates
        .iter()
        .zip(&run.baseline)
        .zip(&run.adjusted.values)
    {
        csv_writer.serialize(ForecastRow {
            date: *date,
            baseline: *baseline,
            adjusted: *adjusted,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON of the whole run
pub fn forecast_json(run: &ForecastRun) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}
