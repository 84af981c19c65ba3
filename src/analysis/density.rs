//! Highest-density point of a 2-D point cloud.
//!
//! Density is a Gaussian KDE evaluated at the data points themselves, with
//! Scott's bandwidth (`n^(-1/6)` in 2-D) scaling the full sample covariance.

use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;

/// The kept point with the highest KDE density.
///
/// Returns `None` with no kept finite points or a singular covariance.
pub fn highest_density_point(x: &[f64], y: &[f64], keep: &[bool]) -> Option<(f64, f64)> {
    let points: Vec<Vector2<f64>> = x
        .iter()
        .zip(y.iter())
        .zip(keep.iter())
        .filter(|((xi, yi), k)| **k && xi.is_finite() && yi.is_finite())
        .map(|((xi, yi), _)| Vector2::new(*xi, *yi))
        .collect();

    match points.len() {
        0 => return None,
        1 => return Some((points[0].x, points[0].y)),
        _ => {}
    }

    let density = kde_at_points(&points)?;
    let (best, _) = density
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let p = points[best];
    log::info!("Highest density point x, y: {:.2} {:.2}", p.x, p.y);
    Some((p.x, p.y))
}

/// Unnormalized KDE density at every input point.
fn kde_at_points(points: &[Vector2<f64>]) -> Option<Vec<f64>> {
    let n = points.len() as f64;
    let mean = points.iter().fold(Vector2::zeros(), |acc, p| acc + p) / n;
    let covariance = points
        .iter()
        .map(|p| {
            let d = p - mean;
            d * d.transpose()
        })
        .fold(Matrix2::zeros(), |acc, m| acc + m)
        / (n - 1.0);

    let factor = n.powf(-1.0 / 6.0);
    let kernel = covariance * (factor * factor);
    let Some(inverse) = kernel.try_inverse() else {
        log::warn!("KDE covariance is singular; no highest-density point");
        return None;
    };
    if !inverse.iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(
        points
            .par_iter()
            .map(|p| {
                points
                    .iter()
                    .map(|q| {
                        let d = p - q;
                        (-0.5 * (d.transpose() * inverse * d)[(0, 0)]).exp()
                    })
                    .sum::<f64>()
            })
            .collect(),
    )
}
