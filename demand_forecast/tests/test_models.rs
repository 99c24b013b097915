use demand_forecast::error::ForecastError;
use demand_forecast::models::sarima::{Order, Sarima, SeasonalOrder};
use demand_forecast::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use forecast_math::{MathError, NelderMeadConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

const WEEKLY: [f64; 7] = [0.0, 4.0, 6.0, 3.0, -2.0, -5.0, -6.0];

/// Trend plus weekly pattern plus seeded noise
fn weekly_demand(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|t| 200.0 + 0.5 * t as f64 + WEEKLY[t % 7] + rng.gen_range(-2.0..2.0))
        .collect()
}

#[rstest]
#[case(1)]
#[case(30)]
#[case(365)]
fn test_forecast_length_matches_horizon(#[case] horizon: usize) {
    let trained = Sarima::weekly().train(&weekly_demand(112, 7)).unwrap();

    let forecast = trained.forecast(horizon).unwrap();

    assert_eq!(forecast.horizons(), horizon);
    assert_eq!(forecast.values().len(), horizon);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_forecast_follows_trend() {
    let data = weekly_demand(140, 11);
    let trained = Sarima::weekly().train(&data).unwrap();

    let forecast = trained.forecast(14).unwrap();
    let last_week: f64 = data[data.len() - 7..].iter().sum::<f64>() / 7.0;
    let second_week: f64 = forecast.values()[7..].iter().sum::<f64>() / 7.0;

    // Level keeps rising at roughly half a unit per day
    assert!(second_week > last_week);
    assert!(second_week < last_week + 30.0);
}

#[test]
fn test_zero_horizon_rejected() {
    let trained = Sarima::weekly().train(&weekly_demand(60, 3)).unwrap();
    assert!(matches!(trained.forecast(0), Err(ForecastError::Validation(_))));
}

#[rstest]
#[case(vec![5.0; 10])]
#[case(vec![])]
#[case(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0])]
fn test_short_series_rejected(#[case] data: Vec<f64>) {
    match Sarima::weekly().train(&data) {
        Err(ForecastError::InsufficientData { needed, got }) => {
            assert_eq!(needed, 20);
            assert_eq!(got, data.len());
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_constant_series_rejected() {
    let result = Sarima::weekly().train(&[42.0; 40]);
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));
}

#[test]
fn test_non_finite_observation_rejected() {
    let mut data = weekly_demand(40, 5);
    data[17] = f64::NAN;
    assert!(matches!(
        Sarima::weekly().train(&data),
        Err(ForecastError::ModelFit(_))
    ));
}

#[test]
fn test_custom_order() {
    let model = Sarima::new(Order::new(1, 1, 0), SeasonalOrder::new(0, 0, 0, 0)).unwrap();
    assert_eq!(model.min_observations(), 3);

    let trained = model.train(&weekly_demand(50, 9)).unwrap();
    assert_eq!(trained.forecast(5).unwrap().values().len(), 5);
    assert_eq!(trained.fitted_values().len(), 49);
    assert!(trained.coefficients().ma.is_empty());
}

#[test]
fn test_forecast_result_validation() {
    assert!(ForecastResult::new(vec![1.0, 2.0], 2).is_ok());
    assert!(matches!(
        ForecastResult::new(vec![1.0], 2),
        Err(ForecastError::Validation(_))
    ));
    assert!(matches!(
        ForecastResult::new(vec![1.0, f64::INFINITY], 2),
        Err(ForecastError::ModelFit(_))
    ));

    let json = ForecastResult::new(vec![1.5], 1).unwrap().to_json().unwrap();
    assert!(json.contains("1.5"));
}

#[test]
fn test_optimizer_settings_checked_during_fit() {
    let optimizer = NelderMeadConfig {
        tolerance: 0.0,
        ..Default::default()
    };
    let model = Sarima::weekly().with_optimizer(optimizer);

    match model.train(&weekly_demand(60, 13)) {
        Err(ForecastError::Math(MathError::InvalidInput(message))) => {
            assert!(message.contains("tolerance"));
        }
        other => panic!("Expected Math error, got {:?}", other),
    }
}
