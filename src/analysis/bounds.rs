//! Bounding-line consistency.
//!
//! The upper and lower fit lines are meant to cut across the locus roughly at
//! right angles. For each configured line we find where the fitted polynomial
//! crosses it, build the line through that point perpendicular to the fit,
//! and warn when the configured line is more than 5% off in slope or
//! intercept.

use crate::domain::{FitLine, FitRegion, PolynomialModel};
use crate::math::{polyadd, real_roots};

/// Allowed relative difference (percent) before a line is reported.
pub const LINE_MISMATCH_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSide {
    Upper,
    Lower,
}

impl LineSide {
    pub fn name(self) -> &'static str {
        match self {
            LineSide::Upper => "Upper",
            LineSide::Lower => "Lower",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineCheck {
    pub side: LineSide,
    pub configured: FitLine,
    /// x where the suggestion was computed.
    pub crossing_x: f64,
    /// False when the line never meets the fit inside the x range and the
    /// range end was used instead.
    pub crossed: bool,
    /// Line through the crossing point perpendicular to the fit.
    pub suggested: FitLine,
    pub mismatch: bool,
}

/// Check both bounding lines of `region` against `model` over `x_range`.
///
/// Lines whose local fit slope is zero (a vertical perpendicular) are skipped.
pub fn check_bounding_lines(model: &PolynomialModel, region: &FitRegion, x_range: (f64, f64)) -> Vec<LineCheck> {
    let (x_min, x_max) = region.x_range.unwrap_or(x_range);
    let mut checks = Vec::new();

    for (side, line) in [(LineSide::Upper, region.upper_line), (LineSide::Lower, region.lower_line)] {
        let Some(line) = line else {
            continue;
        };

        let crossing = first_crossing(model, &line, x_min, x_max);
        let crossed = crossing.is_some();
        let crossing_x = crossing.unwrap_or(match side {
            LineSide::Upper => x_max,
            LineSide::Lower => x_min,
        });
        if !crossed {
            log::warn!(
                "{} branch of the lines for object selection does not cross the current polynomial fit; \
                 using x = {crossing_x} to compute the local slope",
                side.name()
            );
        }

        let local_slope = model.derivative().eval(crossing_x);
        if local_slope == 0.0 || !local_slope.is_finite() {
            log::warn!("{} line check skipped: fit is flat at x = {crossing_x}", side.name());
            continue;
        }
        let slope = -1.0 / local_slope;
        let suggested = FitLine::new(model.eval(crossing_x) - slope * crossing_x, slope);

        let mismatch = percent_diff(line.intercept, suggested.intercept) > LINE_MISMATCH_PERCENT
            || percent_diff(line.slope, suggested.slope) > LINE_MISMATCH_PERCENT;
        if mismatch {
            log::warn!(
                "{} branch of the lines for object selection does not match the local slope of the current \
                 polynomial fit. Consider replacing [{:.3}, {:.3}] with [{:.3}, {:.3}] (line crosses fit at x = {:.2})",
                side.name(),
                line.intercept,
                line.slope,
                suggested.intercept,
                suggested.slope,
                crossing_x
            );
        }

        checks.push(LineCheck {
            side,
            configured: line,
            crossing_x,
            crossed,
            suggested,
            mismatch,
        });
    }

    checks
}

/// Smallest x in `(x_min, x_max)` where `model` meets `line`.
fn first_crossing(model: &PolynomialModel, line: &FitLine, x_min: f64, x_max: f64) -> Option<f64> {
    let difference = polyadd(model.coeffs(), &[-line.slope, -line.intercept]);
    real_roots(&difference)
        .into_iter()
        .find(|&r| r > x_min && r < x_max)
}

/// Symmetric percent difference `200 |a - b| / |a + b|`.
fn percent_diff(a: f64, b: f64) -> f64 {
    let diff = (200.0 * (a - b) / (a + b)).abs();
    if diff.is_nan() { 0.0 } else { diff }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_lines_pass() {
        // Fit y = x; perpendicular lines through (1, 1) and (0.2, 0.2).
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let region = FitRegion {
            x_range: Some((0.0, 2.0)),
            upper_line: Some(FitLine::new(2.0, -1.0)),
            lower_line: Some(FitLine::new(0.4, -1.0)),
            ..FitRegion::default()
        };
        let checks = check_bounding_lines(&model, &region, (0.0, 2.0));
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.crossed && !c.mismatch));
        assert!((checks[0].crossing_x - 1.0).abs() < 1e-12);
        assert!((checks[1].crossing_x - 0.2).abs() < 1e-12);
    }

    #[test]
    fn skewed_line_is_flagged_with_suggestion() {
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let region = FitRegion {
            upper_line: Some(FitLine::new(3.0, -2.0)),
            ..FitRegion::default()
        };
        let checks = check_bounding_lines(&model, &region, (0.0, 2.0));
        assert_eq!(checks.len(), 1);
        let check = &checks[0];
        assert!(check.crossed && check.mismatch);
        assert!((check.crossing_x - 1.0).abs() < 1e-12);
        assert!((check.suggested.slope + 1.0).abs() < 1e-12);
        assert!((check.suggested.intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_crossing_falls_back_to_range_end() {
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let region = FitRegion {
            lower_line: Some(FitLine::new(10.0, -1.0)),
            ..FitRegion::default()
        };
        let checks = check_bounding_lines(&model, &region, (0.0, 2.0));
        assert!(!checks[0].crossed);
        assert_eq!(checks[0].crossing_x, 0.0);
    }
}
