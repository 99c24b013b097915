use chrono::{Duration, NaiveDate};
use demand_forecast::adjustment::{ExternalFactors, PromotionType};
use demand_forecast::export::{forecast_json, write_forecast_csv};
use demand_forecast::summary::DatasetSummary;
use demand_forecast::trend::correlation;
use demand_forecast::{
    Column, DataLoader, ForecastConfig, ForecastEngine, ForecastError, ForecastRequest,
    ForecastSession, TargetColumn,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;

const WEEKLY: [f64; 7] = [-8.0, -3.0, 0.0, 2.0, 5.0, 12.0, 9.0];

// Helper function to create a synthetic demand dataset
fn create_sample_data(days: usize) -> NamedTempFile {
    let mut rng = StdRng::seed_from_u64(2024);
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut file = NamedTempFile::new().unwrap();

    writeln!(
        file,
        "Date,Sales Volume,Demand Volume,Remaining Volume,Production Volume,Temperature,\
Humidity,Consumer Price Index,Economic Indicator,Disposable Income Level"
    )
    .unwrap();
    for t in 0..days {
        let date = start + Duration::days(t as i64);
        let temperature = 15.0 + 10.0 * (t as f64 / 58.0).sin() + rng.gen_range(-1.0..1.0);
        let sales = 150.0 + 0.3 * t as f64 + WEEKLY[t % 7] + 2.0 * temperature
            + rng.gen_range(-3.0..3.0);
        let demand = sales + 10.0 + rng.gen_range(0.0..5.0);
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            date,
            sales,
            demand,
            demand - sales,
            demand + 5.0,
            temperature,
            rng.gen_range(40.0..80.0),
            100.0 + 0.01 * t as f64,
            rng.gen_range(0.9..1.1),
            3000.0 + rng.gen_range(-50.0..50.0)
        )
        .unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load data
    let data_file = create_sample_data(150);
    let dataset = DataLoader::from_csv(data_file.path()).unwrap();
    assert_eq!(dataset.len(), 150);

    // 2. Forecast with external factors
    let mut session = ForecastSession::default();
    session.load_dataset(dataset);
    let factors = ExternalFactors {
        holidays: 2,
        concerts: 1,
        promotion: PromotionType::Discount,
        discount_percent: 10,
    };
    let run = session
        .run_forecast(ForecastRequest::new(TargetColumn::SalesVolume, 30).with_factors(factors))
        .unwrap()
        .clone();

    assert_eq!(run.baseline.len(), 30);
    assert_eq!(run.adjusted.values.len(), 30);
    assert_eq!(run.held_out.len(), 30);
    assert_eq!(run.model, "SARIMA(1,1,1)(1,1,1)[7]");

    // Forecast starts the day after the 120-day training segment
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Duration::days(120);
    assert_eq!(run.forecast_dates[0], first_day);
    assert_eq!(run.forecast_dates[0], run.held_out.start());

    // 3. Adjustment is a uniform 10.5% uplift
    for (baseline, adjusted) in run.baseline.iter().zip(&run.adjusted.values) {
        approx::assert_relative_eq!(*adjusted, baseline * 1.105, epsilon = 1e-9);
    }
    assert_eq!(run.adjusted.breakdown.len(), 3);

    // 4. Evaluate against the held-out data
    let metrics = session.evaluate().unwrap();
    assert_eq!(metrics.compared, 30);
    assert!(metrics.mse >= 0.0);
    assert!(metrics.mae >= 0.0);
    approx::assert_relative_eq!(metrics.rmse, metrics.mse.sqrt());

    // 5. Export
    let mut buffer = Vec::new();
    write_forecast_csv(&run, &mut buffer).unwrap();
    let csv_text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = csv_text.lines().collect();
    assert_eq!(lines[0], "date,baseline,adjusted");
    assert_eq!(lines.len(), 31);
    assert!(lines[1].starts_with(&first_day.to_string()));

    let json = forecast_json(&run).unwrap();
    assert!(json.contains("\"breakdown\""));
}

#[test]
fn test_horizon_longer_than_held_out() {
    let data_file = create_sample_data(70);
    let mut session = ForecastSession::default();
    session.load_dataset(DataLoader::from_csv(data_file.path()).unwrap());

    let run = session
        .run_forecast(ForecastRequest::new(TargetColumn::DemandVolume, 365))
        .unwrap();
    assert_eq!(run.baseline.len(), 365);
    assert_eq!(run.baseline, run.adjusted.values);

    let metrics = session.evaluate().unwrap();
    assert_eq!(metrics.compared, 14);
}

#[test]
fn test_session_requires_dataset() {
    let mut session = ForecastSession::default();
    let result = session.run_forecast(ForecastRequest::new(TargetColumn::SalesVolume, 7));
    assert!(matches!(result, Err(ForecastError::Validation(_))));
    assert!(session.evaluate().is_err());
}

#[test]
fn test_failed_run_keeps_previous() {
    let data_file = create_sample_data(60);
    let mut session = ForecastSession::default();
    session.load_dataset(DataLoader::from_csv(data_file.path()).unwrap());
    session
        .run_forecast(ForecastRequest::new(TargetColumn::SalesVolume, 7))
        .unwrap();

    let result = session.run_forecast(ForecastRequest::new(TargetColumn::SalesVolume, 400));
    assert!(matches!(result, Err(ForecastError::Validation(_))));
    assert_eq!(session.last_run().map(|r| r.baseline.len()), Some(7));

    // A new dataset discards the previous run
    session.load_dataset(DataLoader::from_csv(data_file.path()).unwrap());
    assert!(session.last_run().is_none());
}

#[test]
fn test_short_history_rejected() {
    let data_file = create_sample_data(20);
    let mut session = ForecastSession::default();
    session.load_dataset(DataLoader::from_csv(data_file.path()).unwrap());

    // 80% of 20 days leaves 16 training points
    let result = session.run_forecast(ForecastRequest::new(TargetColumn::SalesVolume, 7));
    match result {
        Err(ForecastError::InsufficientData { needed, got }) => {
            assert_eq!(needed, 20);
            assert_eq!(got, 16);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_engine_with_custom_config() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(config_file, r#"{{"train_ratio": 0.75, "max_horizon": 60}}"#).unwrap();
    let config = ForecastConfig::from_json_file(config_file.path()).unwrap();
    let engine = ForecastEngine::new(config).unwrap();

    let data_file = create_sample_data(100);
    let dataset = DataLoader::from_csv(data_file.path()).unwrap();
    let series = dataset.daily_series(TargetColumn::SalesVolume).unwrap();

    let baseline = engine.forecast(&series, 60).unwrap();
    assert_eq!(baseline.train.len(), 75);
    assert_eq!(baseline.held_out.len(), 25);
    assert!(matches!(
        engine.forecast(&series, 61),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_trend_exploration() {
    let data_file = create_sample_data(120);
    let dataset = DataLoader::from_csv(data_file.path()).unwrap();

    let summary = DatasetSummary::of(&dataset);
    assert_eq!(summary.rows, 120);
    assert_eq!(summary.total_missing(), 0);
    assert!(!summary.duplicate_dates);

    // Sales are driven by temperature in the synthetic data
    let r = correlation(&dataset, Column::SalesVolume, Column::Temperature).unwrap();
    assert!(r > 0.3);
    assert!(r <= 1.0);

    let window = dataset
        .filter_dates(
            NaiveDate::from_ymd_opt(2023, 2, 1),
            NaiveDate::from_ymd_opt(2023, 2, 28),
        )
        .unwrap();
    assert_eq!(window.len(), 28);
}
