//! Derivative-free minimisation for coefficient estimation
//!
//! Contains a bounded Nelder-Mead simplex search. Bounds are enforced by
//! clamping every trial vertex into its box.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Settings for the Nelder-Mead search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations before giving up
    pub max_iter: usize,
    /// Convergence tolerance on objective spread and simplex diameter
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Step used to build the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a Nelder-Mead search
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub optimal_point: Vec<f64>,
    /// Objective value at the best point
    pub optimal_value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether a convergence criterion was met before `max_iter`
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// `bounds` holds one `(min, max)` pair per dimension.
///
/// # Errors
///
/// Returns [`MathError::InsufficientData`] for an empty starting point and
/// [`MathError::InvalidInput`] when the bounds do not match the starting
/// point, a bound is inverted or the settings cannot terminate.
///
/// # Example
///
/// ```
/// use forecast_math::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 0.5).powi(2) + (x[1] + 0.25).powi(2),
///     &[0.0, 0.0],
///     Some(&[(-1.0, 1.0), (-1.0, 1.0)][..]),
///     &NelderMeadConfig::default(),
/// )
/// .unwrap();
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 0.5).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::InsufficientData(
            "Nelder-Mead needs at least one parameter".to_string(),
        ));
    }
    check_inputs(initial, bounds, config)?;

    // NaN objective values sort last so they are replaced first
    let evaluate = |point: &[f64]| {
        let value = objective(point);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let start = clamp(initial, bounds);
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let step = if vertex[i].abs() > 1e-10 {
            config.initial_step * vertex[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        // Step the other way if the bound swallowed the move
        if let Some(b) = bounds {
            if i < b.len() && vertex[i] > b[i].1 {
                vertex[i] = start[i] - step;
            }
        }
        simplex.push(clamp(&vertex, bounds));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| evaluate(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        if spread.is_finite() && spread <= config.tolerance * (1.0 + values[best].abs()) {
            converged = true;
            break;
        }

        let centroid = centroid(&simplex, worst);
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if diameter < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(&along(&centroid, &simplex[worst], -config.alpha), bounds);
        let reflected_value = evaluate(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(&along(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = evaluate(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let (contracted, threshold) = if reflected_value < values[worst] {
            (along(&centroid, &reflected, config.rho), reflected_value)
        } else {
            (along(&centroid, &simplex[worst], config.rho), values[worst])
        };
        let contracted = clamp(&contracted, bounds);
        let contracted_value = evaluate(&contracted);
        if contracted_value < threshold {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            let shrunk = along(&anchor, &simplex[i], config.sigma);
            simplex[i] = clamp(&shrunk, bounds);
            values[i] = evaluate(&simplex[i]);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Ok(NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    })
}

fn check_inputs(
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> Result<()> {
    if let Some(i) = initial.iter().position(|x| !x.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Starting point has a non-finite value in dimension {}",
            i
        )));
    }

    if let Some(b) = bounds {
        if b.len() != initial.len() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} bounds, got {}",
                initial.len(),
                b.len()
            )));
        }
        if let Some(i) = b.iter().position(|(lo, hi)| lo.is_nan() || hi.is_nan() || lo > hi) {
            return Err(MathError::InvalidInput(format!(
                "Bound {} is empty: {:?}",
                i, b[i]
            )));
        }
    }

    if config.max_iter == 0 || !(config.tolerance > 0.0) {
        return Err(MathError::InvalidInput(
            "Nelder-Mead needs a positive iteration limit and tolerance".to_string(),
        ));
    }
    Ok(())
}

/// Centroid of every vertex except `exclude`
fn centroid(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let dims = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut center = vec![0.0; dims];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == exclude {
            continue;
        }
        for (c, v) in center.iter_mut().zip(vertex) {
            *c += v;
        }
    }
    center.iter_mut().for_each(|c| *c /= count);
    center
}

/// Point `origin + factor * (target - origin)`
fn along(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}

fn clamp(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .zip(b)
            .map(|(&x, &(lo, hi))| x.clamp(lo, hi))
            .collect(),
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounds_are_respected() {
        // Unconstrained minimum lies outside the box
        let bounds = [(-0.99, 0.99)];
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[0.1],
            Some(bounds.as_slice()),
            &NelderMeadConfig::default(),
        )
        .unwrap();

        assert!(result.optimal_point[0] <= 0.99);
        assert_abs_diff_eq!(result.optimal_point[0], 0.99, epsilon = 1e-6);
    }

    #[test]
    fn test_rosenbrock() {
        let config = NelderMeadConfig {
            max_iter: 5000,
            tolerance: 1e-12,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.0, 1.0],
            None,
            &config,
        )
        .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_empty_start() {
        let result = nelder_mead(|_| 0.0, &[], None, &NelderMeadConfig::default());
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }

    #[test]
    fn test_bounds_must_match_dimensions() {
        let bounds = [(-1.0, 1.0)];
        let result = nelder_mead(
            |x| x[0].powi(2) + x[1].powi(2),
            &[0.5, 0.5],
            Some(bounds.as_slice()),
            &NelderMeadConfig::default(),
        );
        assert!(matches!(result, Err(MathError::InvalidInput(_))));

        let inverted = [(1.0, -1.0)];
        let result = nelder_mead(
            |x| x[0].powi(2),
            &[0.0],
            Some(inverted.as_slice()),
            &NelderMeadConfig::default(),
        );
        assert!(matches!(result, Err(MathError::InvalidInput(_))));
    }

    #[test]
    fn test_unusable_settings() {
        let config = NelderMeadConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        let result = nelder_mead(|x| x[0].powi(2), &[1.0], None, &config);
        assert!(matches!(result, Err(MathError::InvalidInput(_))));

        let result = nelder_mead(|x| x[0].powi(2), &[f64::NAN], None, &NelderMeadConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_iteration_cap() {
        let config = NelderMeadConfig {
            max_iter: 3,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (x[0] - 10.0).powi(2) + (x[1] + 10.0).powi(2),
            &[0.0, 0.0],
            None,
            &config,
        )
        .unwrap();
        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }
}
