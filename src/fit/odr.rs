//! Orthogonal (total least squares) polynomial refinement.
//!
//! We minimize the summed squared perpendicular distance
//!
//! ```text
//! S(a) = Σ d_i(a)^2,   d_i = signed distance from (x_i, y_i) to y = P_a(x)
//! ```
//!
//! with Levenberg–Marquardt. At the perpendicular foot `t*` the distance
//! responds to the coefficient of `t^k` as
//!
//! ```text
//! ∂d_i/∂a_k = -t*^k / sqrt(1 + P'(t*)^2)
//! ```
//!
//! so the Jacobian comes for free with the foot search. Each damped step
//! `[J; sqrt(λ) D] δ = [-d; 0]` goes through the SVD least-squares solver.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{OdrOptions, PolynomialModel};
use crate::math::{polyder, polyval, solve_least_squares};
use crate::models::closest_foot;

/// Largest damping before a step search gives up.
const MAX_DAMPING: f64 = 1e16;

/// Outcome of one orthogonal solve.
#[derive(Debug, Clone)]
pub struct OdrSolution {
    /// Coefficients, highest degree first.
    pub coeffs: Vec<f64>,
    /// Summed squared distance of the kept points.
    pub cost: f64,
    pub iterations: usize,
}

/// Refine `initial` (highest degree first) to minimize the orthogonal
/// distance of the kept points.
///
/// The returned coefficients never have a higher cost than `initial`.
pub fn solve_orthogonal(x: &[f64], y: &[f64], keep: &[bool], initial: &[f64], options: &OdrOptions) -> OdrSolution {
    let rows: Vec<usize> = (0..x.len())
        .filter(|&i| keep[i] && x[i].is_finite() && y[i].is_finite())
        .collect();
    let mut coeffs = initial.to_vec();

    let Some((mut residuals, mut jacobian)) = linearize(x, y, &rows, &coeffs) else {
        return OdrSolution {
            coeffs,
            cost: f64::NAN,
            iterations: 0,
        };
    };
    let mut cost = residuals.norm_squared();
    let mut damping = options.initial_damping;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        // Marquardt scaling: damp each coefficient by its own curvature.
        let scale: Vec<f64> = (0..jacobian.ncols())
            .map(|c| {
                let norm = jacobian.column(c).norm();
                if norm > 0.0 { norm } else { 1.0 }
            })
            .collect();

        let mut accepted = false;
        let mut step_small = false;
        while damping < MAX_DAMPING {
            let Some(step) = damped_step(&jacobian, &residuals, &scale, damping) else {
                damping *= 10.0;
                continue;
            };
            let trial = apply_step(&coeffs, &step);
            let Some((trial_residuals, trial_jacobian)) = linearize(x, y, &rows, &trial) else {
                damping *= 10.0;
                continue;
            };
            let trial_cost = trial_residuals.norm_squared();
            if trial_cost <= cost {
                let coeff_norm = coeffs.iter().map(|c| c * c).sum::<f64>().sqrt();
                step_small = step.norm() <= options.step_tolerance * (coeff_norm + options.step_tolerance);
                let relative_gain = if cost > 0.0 { (cost - trial_cost) / cost } else { 0.0 };

                coeffs = trial;
                residuals = trial_residuals;
                jacobian = trial_jacobian;
                cost = trial_cost;
                damping = (damping / 10.0).max(1e-12);
                accepted = true;

                if relative_gain <= options.cost_tolerance {
                    step_small = true;
                }
                break;
            }
            damping *= 10.0;
        }

        if !accepted || step_small || cost == 0.0 {
            break;
        }
    }

    log::debug!("orthogonal refinement: cost={cost:e} after {iterations} iterations, damping={damping:e}");
    OdrSolution {
        coeffs,
        cost,
        iterations,
    }
}

/// Refit `model` on the kept points. Convenience wrapper over
/// [`solve_orthogonal`].
pub fn refine_model(
    x: &[f64],
    y: &[f64],
    keep: &[bool],
    model: &PolynomialModel,
    options: &OdrOptions,
) -> PolynomialModel {
    let solution = solve_orthogonal(x, y, keep, model.coeffs(), options);
    PolynomialModel::new(solution.coeffs).unwrap_or_else(|_| model.clone())
}

/// Signed distances and Jacobian rows for the given points.
///
/// Jacobian columns follow the coefficient order (highest degree first).
fn linearize(x: &[f64], y: &[f64], rows: &[usize], coeffs: &[f64]) -> Option<(DVector<f64>, DMatrix<f64>)> {
    if rows.is_empty() || coeffs.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let model = PolynomialModel::new(coeffs.to_vec()).ok()?;
    let derivative = polyder(coeffs);
    let ncols = coeffs.len();

    let evaluated: Vec<Option<(f64, Vec<f64>)>> = rows
        .par_iter()
        .map(|&i| {
            let foot = closest_foot(&model, &derivative, x[i], y[i])?;
            let slope = polyval(&derivative, foot.t);
            let norm = (1.0 + slope * slope).sqrt();
            let mut row = vec![0.0; ncols];
            let mut power = 1.0;
            for c in (0..ncols).rev() {
                row[c] = -power / norm;
                power *= foot.t;
            }
            Some((foot.distance, row))
        })
        .collect();

    let mut residuals = DVector::<f64>::zeros(rows.len());
    let mut jacobian = DMatrix::<f64>::zeros(rows.len(), ncols);
    for (r, entry) in evaluated.into_iter().enumerate() {
        let (distance, row) = entry?;
        residuals[r] = distance;
        for (c, v) in row.into_iter().enumerate() {
            jacobian[(r, c)] = v;
        }
    }
    if residuals.iter().any(|v| !v.is_finite()) || jacobian.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some((residuals, jacobian))
}

fn damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    scale: &[f64],
    damping: f64,
) -> Option<DVector<f64>> {
    let (m, n) = jacobian.shape();
    let mut augmented = DMatrix::<f64>::zeros(m + n, n);
    augmented.view_mut((0, 0), (m, n)).copy_from(jacobian);
    let root = damping.sqrt();
    for (c, s) in scale.iter().enumerate() {
        augmented[(m + c, c)] = root * s;
    }
    let mut rhs = DVector::<f64>::zeros(m + n);
    rhs.rows_mut(0, m).copy_from(&residuals.map(|v| -v));
    solve_least_squares(&augmented, &rhs)
}

fn apply_step(coeffs: &[f64], step: &DVector<f64>) -> Vec<f64> {
    coeffs.iter().zip(step.iter()).map(|(c, d)| c + d).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_a_fixed_point() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let sol = solve_orthogonal(&x, &y, &[true; 4], &[2.0, 1.0], &OdrOptions::default());
        assert!((sol.coeffs[0] - 2.0).abs() < 1e-9);
        assert!((sol.coeffs[1] - 1.0).abs() < 1e-9);
        assert!(sol.cost < 1e-18);
    }

    #[test]
    fn orthogonal_line_differs_from_ols_on_symmetric_scatter() {
        // Symmetric under x <-> y, so the major axis is y = x while OLS
        // gives slope Sxy / Sxx = 4.5 / 5.5.
        let x = [0.0, 1.0, 2.0, 3.0, 1.0, 2.0];
        let y = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0];
        let sol = solve_orthogonal(&x, &y, &[true; 6], &[0.5, 0.5], &OdrOptions::default());
        assert!((sol.coeffs[0] - 1.0).abs() < 1e-6, "{:?}", sol.coeffs);
        assert!(sol.coeffs[1].abs() < 1e-6, "{:?}", sol.coeffs);
    }

    #[test]
    fn refines_parabola_from_rough_guess() {
        let x: Vec<f64> = (0..40).map(|i| -1.0 + i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v * v - 0.2 * v + 0.1).collect();
        let keep = vec![true; x.len()];
        let sol = solve_orthogonal(&x, &y, &keep, &[0.3, 0.0, 0.0], &OdrOptions::default());
        assert!((sol.coeffs[0] - 0.5).abs() < 1e-6, "{:?}", sol.coeffs);
        assert!((sol.coeffs[1] + 0.2).abs() < 1e-6);
        assert!((sol.coeffs[2] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn nothing_kept_returns_initial() {
        let sol = solve_orthogonal(&[1.0], &[1.0], &[false], &[1.0, 0.0], &OdrOptions::default());
        assert_eq!(sol.coeffs, vec![1.0, 0.0]);
        assert!(sol.cost.is_nan());
    }
}
