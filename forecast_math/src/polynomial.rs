//! Lag polynomials for ARMA-type recursions

use serde::{Deserialize, Serialize};

/// Polynomial in the backshift operator `B`, stored densely by lag.
///
/// Coefficient 0 is always 1 for the polynomials built here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagPolynomial {
    coefficients: Vec<f64>,
}

impl LagPolynomial {
    /// The constant polynomial `1`
    pub fn identity() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// Create a polynomial from raw coefficients indexed by lag
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        if coefficients.is_empty() {
            return Self::identity();
        }
        Self { coefficients }
    }

    /// Autoregressive polynomial `1 - φ_1 B - ... - φ_p B^p`
    pub fn ar(coefficients: &[f64]) -> Self {
        Self::seasonal_ar(coefficients, 1)
    }

    /// Moving average polynomial `1 + θ_1 B + ... + θ_q B^q`
    pub fn ma(coefficients: &[f64]) -> Self {
        Self::seasonal_ma(coefficients, 1)
    }

    /// Seasonal autoregressive polynomial `1 - Φ_1 B^s - ... - Φ_P B^{Ps}`
    pub fn seasonal_ar(coefficients: &[f64], period: usize) -> Self {
        Self::spread(coefficients, period, -1.0)
    }

    /// Seasonal moving average polynomial `1 + Θ_1 B^s + ... + Θ_Q B^{Qs}`
    pub fn seasonal_ma(coefficients: &[f64], period: usize) -> Self {
        Self::spread(coefficients, period, 1.0)
    }

    fn spread(coefficients: &[f64], period: usize, sign: f64) -> Self {
        if coefficients.is_empty() || period == 0 {
            return Self::identity();
        }

        let mut dense = vec![0.0; coefficients.len() * period + 1];
        dense[0] = 1.0;
        for (i, c) in coefficients.iter().enumerate() {
            dense[(i + 1) * period] = sign * c;
        }
        Self { coefficients: dense }
    }

    /// Product of two lag polynomials
    pub fn multiply(&self, other: &Self) -> Self {
        let mut product = vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
            }
        }
        Self {
            coefficients: product,
        }
    }

    /// Highest lag carried by the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients indexed by lag
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient at `lag`, zero beyond the degree
    pub fn coefficient(&self, lag: usize) -> f64 {
        self.coefficients.get(lag).copied().unwrap_or(0.0)
    }
}

impl Default for LagPolynomial {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ar_and_ma_signs() {
        let ar = LagPolynomial::ar(&[0.5]);
        assert_eq!(ar.coefficients(), &[1.0, -0.5]);

        let ma = LagPolynomial::ma(&[0.3, 0.2]);
        assert_eq!(ma.coefficients(), &[1.0, 0.3, 0.2]);
    }

    #[test]
    fn test_seasonal_spread() {
        let sar = LagPolynomial::seasonal_ar(&[0.4], 7);
        assert_eq!(sar.degree(), 7);
        assert_abs_diff_eq!(sar.coefficient(7), -0.4);
        assert_abs_diff_eq!(sar.coefficient(3), 0.0);
        assert_abs_diff_eq!(sar.coefficient(20), 0.0);
    }

    #[test]
    fn test_multiplicative_expansion() {
        // (1 - 0.5B)(1 - 0.4B^7) = 1 - 0.5B - 0.4B^7 + 0.2B^8
        let product = LagPolynomial::ar(&[0.5]).multiply(&LagPolynomial::seasonal_ar(&[0.4], 7));
        assert_eq!(product.degree(), 8);
        assert_abs_diff_eq!(product.coefficient(0), 1.0);
        assert_abs_diff_eq!(product.coefficient(1), -0.5);
        assert_abs_diff_eq!(product.coefficient(7), -0.4);
        assert_abs_diff_eq!(product.coefficient(8), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_coefficients_are_identity() {
        assert_eq!(LagPolynomial::ar(&[]), LagPolynomial::identity());
        assert_eq!(LagPolynomial::from_coefficients(vec![]), LagPolynomial::identity());
    }
}
