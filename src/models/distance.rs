//! Signed nearest distance from points to a polynomial curve.
//!
//! For `y = P(x)` the closest curve point `(t, P(t))` to `(x, y)` satisfies
//!
//! ```text
//! (t - x) + (P(t) - y) P'(t) = 0
//! ```
//!
//! which is a polynomial of degree `2d - 1` in `t`. Every real root is a
//! candidate foot; the one with the smallest squared distance wins. The sign
//! is positive above the curve (`y >= P(x)`) and negative below.

use rayon::prelude::*;

use crate::domain::{DistanceBounds, PolynomialModel};
use crate::math::{polyadd, polyder, polymul, polyval, real_roots};

/// Foot of the perpendicular from `(x, y)` to the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFoot {
    /// x-coordinate of the closest curve point.
    pub t: f64,
    /// Signed distance to it.
    pub distance: f64,
}

/// Closest point on `model` to `(x, y)`, or `None` for non-finite input.
///
/// `derivative` must be `polyder(model.coeffs())`; callers evaluating many
/// points compute it once.
pub fn closest_foot(model: &PolynomialModel, derivative: &[f64], x: f64, y: f64) -> Option<CurveFoot> {
    if !(x.is_finite() && y.is_finite()) {
        return None;
    }
    let coeffs = model.coeffs();

    // (P(t) - y) * P'(t) + (t - x)
    let shifted = polyadd(coeffs, &[-y]);
    let stationary = polyadd(&polymul(&shifted, derivative), &[1.0, -x]);

    let sq_dist = |t: f64| {
        let dy = polyval(coeffs, t) - y;
        (t - x) * (t - x) + dy * dy
    };

    let mut best: Option<(f64, f64)> = None;
    for t in real_roots(&stationary) {
        let d2 = sq_dist(t);
        if best.is_none_or(|(_, b)| d2 < b) {
            best = Some((t, d2));
        }
    }
    // A constant model has the vertical foot directly below/above the point.
    let (t, d2) = best.unwrap_or((x, sq_dist(x)));

    let sign = if y >= polyval(coeffs, x) { 1.0 } else { -1.0 };
    Some(CurveFoot {
        t,
        distance: sign * d2.sqrt(),
    })
}

/// Signed distance from each `(x[i], y[i])` to `model`.
///
/// Entries with non-finite coordinates or outside `bounds` are NaN; the output
/// always has the input length.
pub fn evaluate_curve_distance(x: &[f64], y: &[f64], model: &PolynomialModel, bounds: &DistanceBounds) -> Vec<f64> {
    let derivative = polyder(model.coeffs());
    x.par_iter()
        .zip(y.par_iter())
        .map(|(&xi, &yi)| {
            if !within_bounds(bounds, xi, yi) {
                return f64::NAN;
            }
            closest_foot(model, &derivative, xi, yi).map_or(f64::NAN, |foot| foot.distance)
        })
        .collect()
}

fn within_bounds(bounds: &DistanceBounds, x: f64, y: f64) -> bool {
    if bounds.x_min.is_some_and(|min| x < min) || bounds.x_max.is_some_and(|max| x > max) {
        return false;
    }
    if bounds.upper_line.is_some_and(|line| y > line.y_at(x)) {
        return false;
    }
    if bounds.lower_line.is_some_and(|line| y < line.y_at(x)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitLine;

    #[test]
    fn distance_to_line_y_equals_x() {
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let d = evaluate_curve_distance(&[0.0, 1.0, 2.0], &[1.0, 0.0, 2.0], &model, &DistanceBounds::default());
        let r = 1.0 / 2.0_f64.sqrt();
        assert!((d[0] - r).abs() < 1e-12);
        assert!((d[1] + r).abs() < 1e-12);
        assert!(d[2].abs() < 1e-12);
    }

    #[test]
    fn distance_to_parabola_vertex() {
        // Point straight above the vertex of y = x^2 at height 0.25:
        // the closest point is the vertex itself (curvature radius 0.5).
        let model = PolynomialModel::new(vec![1.0, 0.0, 0.0]).unwrap();
        let d = evaluate_curve_distance(&[0.0], &[0.25], &model, &DistanceBounds::default());
        assert!((d[0] - 0.25).abs() < 1e-9);

        // Above the focus the closest points move off-axis: y0 = 1 gives t^2 = 0.5.
        let d = evaluate_curve_distance(&[0.0], &[1.0], &model, &DistanceBounds::default());
        assert!((d[0] - 0.75_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn constant_model_uses_vertical_offset() {
        let model = PolynomialModel::new(vec![2.0]).unwrap();
        let d = evaluate_curve_distance(&[5.0, -1.0], &[3.5, 1.0], &model, &DistanceBounds::default());
        assert!((d[0] - 1.5).abs() < 1e-12);
        assert!((d[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_bounds_and_non_finite_are_nan() {
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let bounds = DistanceBounds {
            x_min: Some(0.0),
            x_max: Some(10.0),
            upper_line: Some(FitLine::new(5.0, 0.0)),
            lower_line: None,
        };
        let x = [-1.0, 1.0, 2.0, f64::NAN, 3.0];
        let y = [-1.0, 1.0, 6.0, 0.0, 3.5];
        let d = evaluate_curve_distance(&x, &y, &model, &bounds);
        assert_eq!(d.len(), 5);
        assert!(d[0].is_nan());
        assert!(d[1].abs() < 1e-12);
        assert!(d[2].is_nan());
        assert!(d[3].is_nan());
        assert!((d[4] - 0.5 / 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
