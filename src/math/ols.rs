//! Least squares solvers.
//!
//! Two kinds of problem go through here:
//!
//! ```text
//! minimize Σ (y_i - P(x_i))^2              (polynomial OLS, `polyfit`)
//! minimize |J δ + r|^2 + λ |D δ|^2         (damped Gauss-Newton steps)
//! ```
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when
//!   the design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Polynomial design columns are scaled to unit norm before solving, the
//!   same conditioning trick `numpy.polyfit` uses. Color-color loci rarely need
//!   more than a cubic, but `x^3` and `1` still differ by orders of magnitude.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least-squares polynomial fit over the entries where `keep` is true.
///
/// Coefficients are returned highest degree first. Returns `None` when no
/// entry is kept or the solve fails.
pub fn polyfit(x: &[f64], y: &[f64], keep: &[bool], degree: usize) -> Option<Vec<f64>> {
    let rows: Vec<usize> = (0..x.len()).filter(|&i| keep[i]).collect();
    if rows.is_empty() {
        return None;
    }

    let cols = degree + 1;
    let mut design = DMatrix::<f64>::zeros(rows.len(), cols);
    let mut rhs = DVector::<f64>::zeros(rows.len());

    for (r, &i) in rows.iter().enumerate() {
        // Highest power in column 0 so the solution comes out highest first.
        let mut power = 1.0;
        for c in (0..cols).rev() {
            design[(r, c)] = power;
            power *= x[i];
        }
        rhs[r] = y[i];
    }

    let mut scale = vec![1.0; cols];
    for (c, s) in scale.iter_mut().enumerate() {
        let norm = design.column(c).norm();
        if norm > 0.0 && norm.is_finite() {
            *s = norm;
            design.column_mut(c).unscale_mut(norm);
        }
    }

    let beta = solve_least_squares(&design, &rhs)?;
    Some(beta.iter().zip(scale.iter()).map(|(b, s)| b / s).collect())
}
