//! Stellar-locus fitting.
//!
//! `fit_stellar_locus` runs the full pipeline for one color-color locus:
//! - initial fit: iterated OLS with region and residual clipping
//!   (or a steep seed line for near-vertical loci)
//! - orthogonal refinement of that guess on the OLS keep set
//! - `iterations - 1` further clip-and-refit rounds on the vertical residual
//!   `y - P(x)` of the refined model, inside the relaxed region
//!
//! Fitting is deterministic: the same inputs give the same model and mask.

pub mod locus;
pub mod odr;
pub mod region;

pub use locus::*;
pub use odr::*;

use crate::domain::{FitRegion, LocusFit, LocusFitOptions, PolynomialModel};
use crate::error::DiagError;

/// Fit a polynomial locus `y = P(x)` through the point cloud `(x, y)`.
pub fn fit_stellar_locus(x: &[f64], y: &[f64], options: &LocusFitOptions) -> Result<LocusFit, DiagError> {
    let initial = fit_ols_locus(x, y, options)?;

    let mut keep = initial.keep.clone();
    let mut coeffs = solve_orthogonal(x, y, &keep, initial.model.coeffs(), &options.odr).coeffs;

    let relaxed = options.region.clone().unwrap_or_default().relaxed();
    for round in 0..options.iterations.saturating_sub(1) {
        let model = PolynomialModel::new(coeffs.clone())?;
        keep = clip_round(x, y, &model, &keep, options.rejection, &relaxed);

        let num_kept = count(&keep);
        log::debug!("orthogonal round {}: kept {num_kept}", round + 1);
        if num_kept < options.degree {
            return Err(insufficient(num_kept, options.degree));
        }
        coeffs = solve_orthogonal(x, y, &keep, &coeffs, &options.odr).coeffs;
    }

    let model = PolynomialModel::new(coeffs)?;
    log::info!("Locus fit (degree {}): {:?}, {} points kept", options.degree, model.coeffs(), count(&keep));
    Ok(LocusFit { model, keep, initial })
}

/// Keep mask for the next orthogonal round: the residual clip of `model`
/// over every point, restricted to `region`.
fn clip_round(
    x: &[f64],
    y: &[f64],
    model: &PolynomialModel,
    keep: &[bool],
    rejection: f64,
    region: &FitRegion,
) -> Vec<bool> {
    let residuals: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - model.eval(xi);
            if r.is_finite() { r } else { f64::NAN }
        })
        .collect();
    let mut next = clip_by_residual(&residuals, keep, rejection, clip_floor(y, keep));
    restrict_to(&mut next, x, y, region);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocusStrategy;
    use crate::error::ErrorKind;

    #[test]
    fn line_with_outlier_matches_ols_result() {
        let mut x: Vec<f64> = (0..10).map(f64::from).collect();
        let mut y = x.clone();
        x.push(5.0);
        y.push(100.0);

        let fit = fit_stellar_locus(&x, &y, &LocusFitOptions::default()).unwrap();
        let (intercept, slope) = fit.model.as_line().unwrap();
        assert!((slope - 1.0).abs() < 1e-6);
        assert!(intercept.abs() < 1e-6);
        assert_eq!(fit.num_kept(), 10);
        assert!(!fit.keep[10]);
    }

    #[test]
    fn fit_is_deterministic() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin() + i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 0.8 * v + 0.05 * ((i * 7 % 11) as f64 - 5.0)).collect();
        let a = fit_stellar_locus(&x, &y, &LocusFitOptions::default()).unwrap();
        let b = fit_stellar_locus(&x, &y, &LocusFitOptions::default()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.keep, b.keep);
    }

    #[test]
    fn near_vertical_recovers_steep_line() {
        // x = 1 + (y - 2) / 50 with a small perpendicular jitter.
        let y: Vec<f64> = (0..60).map(|i| i as f64 * 0.1).collect();
        let x: Vec<f64> = y
            .iter()
            .enumerate()
            .map(|(i, v)| 1.0 + (v - 2.0) / 50.0 + 0.002 * ((i * 5 % 7) as f64 - 3.0))
            .collect();
        let options = LocusFitOptions {
            strategy: LocusStrategy::near_vertical_from_x_range(0.9, 1.2),
            ..LocusFitOptions::default()
        };
        let fit = fit_stellar_locus(&x, &y, &options).unwrap();
        let (_, slope) = fit.model.as_line().unwrap();
        assert!(slope > 30.0, "slope = {slope}");
        assert_eq!(fit.initial.iterations_run, 0);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let err = fit_stellar_locus(&[f64::NAN], &[1.0], &LocusFitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn rounds_clip_on_vertical_residual() {
        // y = x^2 with a small vertical jitter, plus one point on the steep
        // branch that sits 0.1 above the curve (about 0.016 away orthogonally).
        let mut x: Vec<f64> = (0..11).map(|i| i as f64 * 0.05).collect();
        let mut y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| v * v + 0.005 * ((i * 7 % 5) as f64 - 2.0))
            .collect();
        x.push(3.0);
        y.push(9.1);

        let model = PolynomialModel::new(vec![1.0, 0.0, 0.0]).unwrap();
        let keep = clip_round(&x, &y, &model, &[true; 12], 3.0, &FitRegion::default());
        assert!(keep[..11].iter().all(|&k| k));
        assert!(!keep[11]);
    }

    #[test]
    fn round_mask_respects_region() {
        let x = [0.1, 0.2, 0.3, f64::NAN];
        let y = [0.1, 0.2, 0.3, 0.4];
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let region = FitRegion {
            x_range: Some((0.0, 0.25)),
            ..FitRegion::default()
        };
        let keep = clip_round(&x, &y, &model, &[true; 4], 3.0, &region);
        assert_eq!(keep, vec![true, true, false, false]);
    }
}
