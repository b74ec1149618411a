//! Derivative-free minimisation
//!
//! A plain Nelder-Mead simplex search. Objective values that come back NaN are
//! treated as +infinity so a bad region of parameter space is simply avoided.

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations
    pub max_iter: usize,
    /// Convergence threshold on the spread of vertex coordinates
    pub x_tolerance: f64,
    /// Convergence threshold on the spread of objective values
    pub f_tolerance: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            x_tolerance: 1e-6,
            f_tolerance: 1e-9,
        }
    }
}

/// Outcome of a minimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    /// Best point found
    pub optimal_point: Vec<f64>,
    /// Objective value at the best point
    pub optimal_value: f64,
    /// Iterations used
    pub iterations: usize,
    /// Whether both tolerances were met before `max_iter`
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `objective` starting from `start`
///
/// `steps` gives the initial simplex edge length per dimension; when `None` every
/// dimension uses 0.1.
pub fn nelder_mead<F>(
    objective: F,
    start: &[f64],
    steps: Option<&[f64]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let n = start.len();
    if n == 0 {
        let value = eval(start);
        return NelderMeadResult {
            optimal_point: Vec::new(),
            optimal_value: value,
            iterations: 0,
            converged: value.is_finite(),
        };
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.to_vec(), eval(start)));
    for i in 0..n {
        let mut vertex = start.to_vec();
        vertex[i] += steps.and_then(|s| s.get(i).copied()).unwrap_or(0.1);
        let value = eval(vertex.as_slice());
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        if has_converged(&simplex, &config) {
            converged = true;
            break;
        }
        iterations += 1;

        // Centroid of every vertex except the worst
        let mut centroid = vec![0.0; n];
        for (vertex, _) in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let worst = simplex[n].clone();
        let best_value = simplex[0].1;
        let second_worst_value = simplex[n - 1].1;

        let reflected = along(&centroid, &worst.0, -REFLECTION);
        let reflected_value = eval(reflected.as_slice());

        if reflected_value < best_value {
            let expanded = along(&centroid, &reflected, EXPANSION);
            let expanded_value = eval(expanded.as_slice());
            simplex[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst_value {
            simplex[n] = (reflected, reflected_value);
            continue;
        }

        let (contracted, contracted_value, accept) = if reflected_value < worst.1 {
            let outside = along(&centroid, &reflected, CONTRACTION);
            let value = eval(outside.as_slice());
            (outside, value, value <= reflected_value)
        } else {
            let inside = along(&centroid, &worst.0, CONTRACTION);
            let value = eval(inside.as_slice());
            (inside, value, value < worst.1)
        };

        if accept {
            simplex[n] = (contracted, contracted_value);
            continue;
        }

        let best = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            for (x, b) in vertex.iter_mut().zip(&best) {
                *x = b + SHRINK * (*x - b);
            }
            *value = eval(vertex.as_slice());
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    if !converged {
        converged = has_converged(&simplex, &config);
    }
    let (optimal_point, optimal_value) = simplex.swap_remove(0);

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged: converged && optimal_value.is_finite(),
    }
}

/// `origin + factor * (target - origin)`
fn along(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}

fn has_converged(sorted: &[(Vec<f64>, f64)], config: &NelderMeadConfig) -> bool {
    let (best, best_value) = &sorted[0];
    sorted[1..].iter().all(|(vertex, value)| {
        let f_close = (value - best_value).abs() <= config.f_tolerance
            || (value.is_infinite() && best_value.is_infinite());
        let x_close = vertex
            .iter()
            .zip(best)
            .all(|(x, b)| (x - b).abs() <= config.x_tolerance);
        f_close && x_close
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_bowl() {
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2) + 2.0,
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimal_point[1], -1.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimal_value, 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_rosenbrock() {
        let config = NelderMeadConfig {
            max_iter: 5000,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            Some(&[0.5, 0.5][..]),
            config,
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_iteration_budget_reports_no_convergence() {
        let config = NelderMeadConfig {
            max_iter: 3,
            ..Default::default()
        };
        let result = nelder_mead(|x| (x[0] - 50.0).powi(2), &[0.0], None, config);
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_zero_dimensional_problem() {
        let result = nelder_mead(|_| 4.0, &[], None, NelderMeadConfig::default());
        assert!(result.converged);
        assert_eq!(result.optimal_value, 4.0);
        assert!(result.optimal_point.is_empty());
    }

    #[test]
    fn test_nan_objective_is_avoided() {
        let result = nelder_mead(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 1.0).powi(2) },
            &[0.5],
            None,
            NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-4);
    }
}
