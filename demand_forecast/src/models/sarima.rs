//! Seasonal ARIMA model estimated by conditional sum of squares
//!
//! The model is `φ(B) Φ(B^s) (1-B)^d (1-B^s)^D y_t = θ(B) Θ(B^s) e_t`
//! without a constant term. Coefficients are found with a bounded
//! Nelder-Mead search over the standardised differenced series.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use forecast_math::{
    difference, differencing_polynomial, nelder_mead, seasonal_difference, LagPolynomial,
    NelderMeadConfig,
};
use log::debug;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

const COEFFICIENT_BOUND: f64 = 0.99;
const INITIAL_COEFFICIENT: f64 = 0.1;

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving average order
    pub q: usize,
}

impl Order {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Seasonal order (P, D, Q, s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order
    pub p: usize,
    /// Seasonal differencing order
    pub d: usize,
    /// Seasonal moving average order
    pub q: usize,
    /// Season length in observations
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    fn is_active(&self) -> bool {
        self.p + self.d + self.q > 0
    }
}

impl Default for SeasonalOrder {
    fn default() -> Self {
        Self::new(1, 1, 1, 7)
    }
}

/// Estimated coefficients of a seasonal ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarimaCoefficients {
    /// Non-seasonal AR coefficients
    pub ar: Vec<f64>,
    /// Seasonal AR coefficients
    pub seasonal_ar: Vec<f64>,
    /// Non-seasonal MA coefficients
    pub ma: Vec<f64>,
    /// Seasonal MA coefficients
    pub seasonal_ma: Vec<f64>,
}

/// Seasonal ARIMA model specification
#[derive(Debug, Clone)]
pub struct Sarima {
    name: String,
    order: Order,
    seasonal: SeasonalOrder,
    optimizer: NelderMeadConfig,
}

impl Sarima {
    /// Create a new seasonal ARIMA model
    pub fn new(order: Order, seasonal: SeasonalOrder) -> Result<Self> {
        if seasonal.is_active() && seasonal.period < 2 {
            return Err(ForecastError::Validation(format!(
                "Seasonal period must be at least 2, got {}",
                seasonal.period
            )));
        }

        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                order.p, order.d, order.q, seasonal.p, seasonal.d, seasonal.q, seasonal.period
            ),
            order,
            seasonal,
            optimizer: NelderMeadConfig::default(),
        })
    }

    /// SARIMA(1,1,1)(1,1,1)[7], the weekly demand model
    pub fn weekly() -> Self {
        Self {
            name: "SARIMA(1,1,1)(1,1,1)[7]".to_string(),
            order: Order::default(),
            seasonal: SeasonalOrder::default(),
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Replace the optimizer settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Non-seasonal order
    pub fn order(&self) -> Order {
        self.order
    }

    /// Seasonal order
    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal
    }

    fn period(&self) -> usize {
        if self.seasonal.is_active() {
            self.seasonal.period
        } else {
            0
        }
    }

    /// Fewest observations accepted by `train`
    pub fn min_observations(&self) -> usize {
        let s = self.period();
        let order_sum = self.order.p
            + self.order.d
            + self.order.q
            + self.seasonal.p
            + self.seasonal.d
            + self.seasonal.q;
        let differenced = self.order.d + self.seasonal.d * s;
        let ar_lags = self.order.p + self.seasonal.p * s;
        (2 * s + order_sum).max(differenced + ar_lags + 1)
    }

    fn n_params(&self) -> usize {
        self.order.p + self.seasonal.p + self.order.q + self.seasonal.q
    }

    fn unpack(&self, params: &[f64]) -> SarimaCoefficients {
        let (p, sp, q) = (self.order.p, self.seasonal.p, self.order.q);
        SarimaCoefficients {
            ar: params[..p].to_vec(),
            seasonal_ar: params[p..p + sp].to_vec(),
            ma: params[p + sp..p + sp + q].to_vec(),
            seasonal_ma: params[p + sp + q..].to_vec(),
        }
    }
}

impl Default for Sarima {
    fn default() -> Self {
        Self::weekly()
    }
}

/// Full AR and MA lag polynomials for a coefficient set
fn polynomials(coefficients: &SarimaCoefficients, period: usize) -> (LagPolynomial, LagPolynomial) {
    let ar = LagPolynomial::ar(&coefficients.ar)
        .multiply(&LagPolynomial::seasonal_ar(&coefficients.seasonal_ar, period));
    let ma = LagPolynomial::ma(&coefficients.ma)
        .multiply(&LagPolynomial::seasonal_ma(&coefficients.seasonal_ma, period));
    (ar, ma)
}

/// One-step prediction of `w[t]` from its past and past shocks
fn predict_step(w: &[f64], shocks: &[f64], t: usize, ar: &LagPolynomial, ma: &LagPolynomial) -> f64 {
    let mut prediction = 0.0;
    for lag in 1..=ar.degree().min(t) {
        prediction -= ar.coefficient(lag) * w[t - lag];
    }
    for lag in 1..=ma.degree().min(t) {
        prediction += ma.coefficient(lag) * shocks[t - lag];
    }
    prediction
}

/// Residuals conditional on zero pre-sample shocks. Entries before the AR
/// degree are left at zero.
fn conditional_residuals(w: &[f64], ar: &LagPolynomial, ma: &LagPolynomial) -> Vec<f64> {
    let mut shocks = vec![0.0; w.len()];
    for t in ar.degree()..w.len() {
        shocks[t] = w[t] - predict_step(w, &shocks, t, ar, ma);
    }
    shocks
}

fn sum_of_squares(shocks: &[f64], start: usize) -> f64 {
    shocks.iter().skip(start).map(|e| e * e).sum()
}

impl ForecastModel for Sarima {
    type Trained = TrainedSarima;

    fn train(&self, data: &[f64]) -> Result<TrainedSarima> {
        let needed = self.min_observations();
        if data.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: data.len(),
            });
        }

        if let Some(position) = data.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Observation {} is not a finite number",
                position + 1
            )));
        }

        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        if max - min <= 1e-12 * max.abs().max(1.0) {
            return Err(ForecastError::ModelFit(format!(
                "Series is constant at {}; {} cannot be identified",
                min, self.name
            )));
        }

        let period = self.period();
        let w = seasonal_difference(&difference(data, self.order.d), self.seasonal.d, period);
        let scale = w.iter().std_dev();

        let zeros = || self.unpack(&vec![0.0; self.n_params()]);
        let (coefficients, iterations, drift) = if !(scale.is_finite() && scale > 1e-12) {
            // Differencing left a constant: the series is an exact polynomial
            // trend plus seasonal pattern. The constant is carried forward.
            let drift = w.iter().mean();
            debug!(
                "{}: differenced series is constant at {}, skipping estimation",
                self.name, drift
            );
            (zeros(), 0, drift)
        } else if self.n_params() == 0 {
            (zeros(), 0, 0.0)
        } else {
            let z: Vec<f64> = w.iter().map(|v| v / scale).collect();
            let start = self.order.p + self.seasonal.p * period;
            let bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); self.n_params()];
            let initial = vec![INITIAL_COEFFICIENT; self.n_params()];

            let result = nelder_mead(
                |params| {
                    let (ar, ma) = polynomials(&self.unpack(params), period);
                    sum_of_squares(&conditional_residuals(&z, &ar, &ma), start)
                },
                &initial,
                Some(bounds.as_slice()),
                &self.optimizer,
            )?;

            if !result.optimal_value.is_finite() {
                return Err(ForecastError::ModelFit(format!(
                    "{} objective is not finite",
                    self.name
                )));
            }
            if !result.converged {
                return Err(ForecastError::ModelFit(format!(
                    "{} did not converge after {} iterations",
                    self.name, result.iterations
                )));
            }
            (self.unpack(&result.optimal_point), result.iterations, 0.0)
        };

        let (ar, ma) = polynomials(&coefficients, period);
        let centred: Vec<f64> = w.iter().map(|v| v - drift).collect();
        let residuals = conditional_residuals(&centred, &ar, &ma);
        let start = ar.degree();
        let effective = w.len().saturating_sub(start).max(1);
        let residual_variance = sum_of_squares(&residuals, start) / effective as f64;

        debug!(
            "{} fitted on {} observations in {} iterations: {:?}, sigma2 = {:.4}",
            self.name,
            data.len(),
            iterations,
            coefficients,
            residual_variance
        );

        Ok(TrainedSarima {
            name: self.name.clone(),
            order: self.order,
            seasonal: self.seasonal,
            period,
            coefficients,
            history: data.to_vec(),
            differenced: centred,
            drift,
            residuals,
            residual_variance,
            iterations,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Seasonal ARIMA model fitted to a training series
#[derive(Debug, Clone)]
pub struct TrainedSarima {
    name: String,
    order: Order,
    seasonal: SeasonalOrder,
    period: usize,
    coefficients: SarimaCoefficients,
    history: Vec<f64>,
    /// Differenced training series with `drift` removed
    differenced: Vec<f64>,
    drift: f64,
    residuals: Vec<f64>,
    residual_variance: f64,
    iterations: usize,
}

impl TrainedSarima {
    /// Estimated coefficients
    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    /// Mean squared conditional residual on the differenced scale
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Optimizer iterations used during estimation
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Constant differenced value carried into the forecast, zero unless
    /// the differenced training series had no variation
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Number of training observations
    pub fn n_observations(&self) -> usize {
        self.history.len()
    }
}

impl TrainedForecastModel for TrainedSarima {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        if horizons == 0 {
            return Err(ForecastError::Validation(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        let (ar, ma) = polynomials(&self.coefficients, self.period);
        let observed = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        w.reserve(horizons);
        shocks.reserve(horizons);
        for t in observed..observed + horizons {
            let prediction = predict_step(&w, &shocks, t, &ar, &ma);
            w.push(prediction);
            shocks.push(0.0);
        }

        // Undo differencing: y_t = w_t - Σ_{k≥1} c_k y_{t-k}
        let integrator = differencing_polynomial(self.order.d, self.seasonal.d, self.period);
        let mut levels = self.history.clone();
        levels.reserve(horizons);
        for step in 0..horizons {
            let t = levels.len();
            let mut level = w[observed + step] + self.drift;
            for lag in 1..=integrator.degree() {
                level -= integrator.coefficient(lag) * levels[t - lag];
            }
            levels.push(level);
        }

        ForecastResult::new(levels.split_off(self.history.len()), horizons)
    }

    fn fitted_values(&self) -> Vec<f64> {
        let offset = self.history.len() - self.differenced.len();
        self.history[offset..]
            .iter()
            .zip(&self.residuals)
            .map(|(y, e)| y - e)
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn weekly_pattern(n: usize) -> Vec<f64> {
        let profile = [10.0, 12.0, 15.0, 14.0, 18.0, 25.0, 22.0];
        (0..n)
            .map(|i| 100.0 + 0.5 * i as f64 + profile[i % 7] + ((i * 37) % 11) as f64 * 0.3)
            .collect()
    }

    #[test]
    fn test_min_observations() {
        assert_eq!(Sarima::weekly().min_observations(), 20);

        let plain = Sarima::new(Order::new(1, 1, 1), SeasonalOrder::new(0, 0, 0, 0)).unwrap();
        assert_eq!(plain.min_observations(), 3);
    }

    #[test]
    fn test_invalid_period() {
        assert!(Sarima::new(Order::default(), SeasonalOrder::new(1, 1, 1, 1)).is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(Sarima::weekly().name(), "SARIMA(1,1,1)(1,1,1)[7]");
        let custom = Sarima::new(Order::new(2, 1, 0), SeasonalOrder::new(0, 1, 1, 12)).unwrap();
        assert_eq!(custom.name(), "SARIMA(2,1,0)(0,1,1)[12]");
    }

    #[test]
    fn test_coefficients_within_bounds() {
        let trained = Sarima::weekly().train(&weekly_pattern(120)).unwrap();
        let c = trained.coefficients();
        for value in c.ar.iter().chain(&c.seasonal_ar).chain(&c.ma).chain(&c.seasonal_ma) {
            assert!(value.abs() <= COEFFICIENT_BOUND);
        }
        assert_eq!(trained.n_observations(), 120);
        assert!(trained.residual_variance() >= 0.0);
    }

    #[test]
    fn test_exact_pattern_extrapolates() {
        // Trend plus weekly profile with no noise differences to zero
        let profile = [1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0];
        let data: Vec<f64> = (0..42).map(|i| 2.0 * i as f64 + profile[i % 7]).collect();
        let trained = Sarima::weekly().train(&data).unwrap();
        assert_eq!(trained.iterations(), 0);

        let forecast = trained.forecast(10).unwrap();
        for (step, value) in forecast.values().iter().enumerate() {
            let i = 42 + step;
            assert_abs_diff_eq!(*value, 2.0 * i as f64 + profile[i % 7], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_quadratic_trend_keeps_drift() {
        // (1-B)(1-B^7) maps t² to the constant 14
        let profile = [1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0];
        let level = |i: usize| (i * i) as f64 + profile[i % 7];
        let data: Vec<f64> = (0..35).map(level).collect();

        let trained = Sarima::weekly().train(&data).unwrap();
        assert_eq!(trained.iterations(), 0);
        assert_abs_diff_eq!(trained.drift(), 14.0, epsilon = 1e-9);
        assert_abs_diff_eq!(trained.residual_variance(), 0.0, epsilon = 1e-12);

        let forecast = trained.forecast(14).unwrap();
        for (step, value) in forecast.values().iter().enumerate() {
            assert_abs_diff_eq!(*value, level(35 + step), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_model_without_coefficients() {
        let model = Sarima::new(Order::new(0, 1, 0), SeasonalOrder::new(0, 0, 0, 0)).unwrap();
        let data: Vec<f64> = (0..30).map(|i| 50.0 + ((i * 7) % 5) as f64).collect();

        let trained = model.train(&data).unwrap();
        assert_eq!(trained.iterations(), 0);
        assert_eq!(trained.drift(), 0.0);

        // Random walk forecast repeats the last observation
        let forecast = trained.forecast(3).unwrap();
        assert_eq!(forecast.values(), &[data[29]; 3]);
    }

    #[test]
    fn test_fitted_values_alignment() {
        let data = weekly_pattern(60);
        let trained = Sarima::weekly().train(&data).unwrap();
        let fitted = trained.fitted_values();
        assert_eq!(fitted.len(), 60 - 8);
        // Before the AR degree the residual is zero, so the fit equals the data
        assert_abs_diff_eq!(fitted[0], data[8]);
    }
}
