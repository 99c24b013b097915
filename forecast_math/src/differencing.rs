//! Differencing operators for integrated time series models
//!
//! Contains:
//! - Ordinary differencing `(1 - B)^d`
//! - Seasonal differencing `(1 - B^s)^D`
//! - The expanded differencing polynomial used to integrate forecasts

use crate::polynomial::LagPolynomial;

/// Apply first differencing `d` times.
///
/// Each pass shortens the series by one observation. A series that runs out
/// of observations collapses to an empty vector.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply lag-`period` differencing `d` times.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Expand `(1 - B)^d (1 - B^period)^seasonal_d` into a lag polynomial.
///
/// With the returned coefficients `c`, the level series satisfies
/// `w_t = Σ c_k y_{t-k}`, so `y_t = w_t - Σ_{k≥1} c_k y_{t-k}`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> LagPolynomial {
    let first = LagPolynomial::from_coefficients(vec![1.0, -1.0]);
    let mut result = LagPolynomial::identity();
    for _ in 0..d {
        result = result.multiply(&first);
    }

    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        let seasonal = LagPolynomial::from_coefficients(seasonal);
        for _ in 0..seasonal_d {
            result = result.multiply(&seasonal);
        }
    }

    result
}
