//! Iterated OLS polynomial fit with region and residual clipping.
//!
//! Each iteration:
//! 1. restrict the kept points to the active region
//! 2. fit `y ~ P(x)` over the kept points
//! 3. compute residuals `r = y - P(x)` for every point
//! 4. rebuild the kept set as the points with
//!    `|r - median(r)| <= rejection * 0.74 * IQR(r)`, quartiles taken over the
//!    previous kept set
//!
//! After the first iteration the region ranges are relaxed by 7% of their
//! span, so points just outside the configured ranges can rejoin the fit.
//! Residuals are centred on their median: the first fit may be pulled by gross
//! outliers, and a uniform offset of the inliers must not clip all of them.

use crate::domain::{FitRegion, LocusFitOptions, LocusStrategy, OlsLocusFit, PolynomialModel};
use crate::error::{DiagError, ErrorKind};
use crate::math::{IQR_TO_SIGMA, polyfit, polyval, quartiles};

/// Relative floor on the clip threshold, scaled by the largest kept `|y|`.
const CLIP_FLOOR: f64 = 1e-8;

impl LocusStrategy {
    /// Conventional steep seed for loci that run close to vertical:
    /// slope 10 through the point one third of the way along the x fit range.
    pub fn near_vertical_from_x_range(x_min: f64, x_max: f64) -> LocusStrategy {
        let slope = 10.0;
        LocusStrategy::NearVertical {
            slope,
            intercept: -slope * (x_min + (x_max - x_min) / 3.0),
        }
    }
}

/// Initial locus fit: iterated OLS, or the seeded line for `NearVertical`.
pub fn fit_ols_locus(x: &[f64], y: &[f64], options: &LocusFitOptions) -> Result<OlsLocusFit, DiagError> {
    check_inputs(x, y, options)?;
    let region = options.region.clone().unwrap_or_default();

    let mut keep = initial_keep(x, y, &region);
    let initial_count = count(&keep);
    if initial_count == 0 {
        return Err(insufficient(0, options.degree));
    }

    if let LocusStrategy::NearVertical { slope, intercept } = options.strategy {
        let mut coeffs = vec![0.0; options.degree + 1];
        let n = coeffs.len();
        coeffs[n - 1] = intercept;
        if n >= 2 {
            coeffs[n - 2] = slope;
        }
        log::debug!("near-vertical locus seed: slope={slope}, intercept={intercept}");
        return Ok(OlsLocusFit {
            model: PolynomialModel::new(coeffs)?,
            keep,
            iterations_run: 0,
        });
    }

    let mut active = region;
    for iteration in 0..options.iterations {
        restrict_to(&mut keep, x, y, &active);
        let coeffs = fit_kept(x, y, &keep, options.degree)?;
        let residuals: Vec<f64> = x.iter().zip(y.iter()).map(|(&xi, &yi)| yi - polyval(&coeffs, xi)).collect();
        keep = clip_by_residual(&residuals, &keep, options.rejection, clip_floor(y, &keep));
        if iteration == 0 {
            active = active.relaxed();
        }
        log::debug!("OLS locus iteration {}: clip kept {} of {initial_count}", iteration + 1, count(&keep));
    }
    log::info!("Number of iterations in polynomial fit: {}", options.iterations);

    restrict_to(&mut keep, x, y, &active);
    let num_kept = count(&keep);
    if num_kept < options.degree {
        return Err(insufficient(num_kept, options.degree));
    }
    let coeffs = fit_kept(x, y, &keep, options.degree)?;

    Ok(OlsLocusFit {
        model: PolynomialModel::new(coeffs)?,
        keep,
        iterations_run: options.iterations,
    })
}

/// Points to keep after clipping `residuals` about their median over `keep`.
///
/// Median and quartiles come from the kept entries only; the threshold is
/// `rejection * 0.74 * IQR`, never below `floor`. Every entry, kept or not, is
/// judged against it, so the result is a fresh mask. Non-finite residuals are
/// never kept.
pub fn clip_by_residual(residuals: &[f64], keep: &[bool], rejection: f64, floor: f64) -> Vec<bool> {
    let kept = residuals.iter().zip(keep.iter()).filter(|(_, k)| **k).map(|(r, _)| *r);
    let Some((q1, median, q3)) = quartiles(kept) else {
        return vec![false; residuals.len()];
    };
    let threshold = (rejection * IQR_TO_SIGMA * (q3 - q1)).max(floor);
    residuals.iter().map(|&r| r.is_finite() && (r - median).abs() <= threshold).collect()
}

/// `1e-8 * max(1, max |y|)` over the kept points.
pub fn clip_floor(y: &[f64], keep: &[bool]) -> f64 {
    let max_abs = y
        .iter()
        .zip(keep.iter())
        .filter(|(v, k)| **k && v.is_finite())
        .fold(1.0_f64, |m, (v, _)| m.max(v.abs()));
    CLIP_FLOOR * max_abs
}

pub(crate) fn check_inputs(x: &[f64], y: &[f64], options: &LocusFitOptions) -> Result<(), DiagError> {
    if x.len() != y.len() {
        return Err(DiagError::new(
            ErrorKind::InvalidInput,
            format!("Locus coordinates differ in length: x={}, y={}", x.len(), y.len()),
        ));
    }
    if !(options.rejection.is_finite() && options.rejection > 0.0) {
        return Err(DiagError::new(
            ErrorKind::InvalidInput,
            format!("Rejection factor must be positive, got {}.", options.rejection),
        ));
    }
    if let LocusStrategy::NearVertical { slope, intercept } = options.strategy {
        if !(slope.is_finite() && intercept.is_finite()) {
            return Err(DiagError::new(ErrorKind::InvalidInput, "Near-vertical seed must be finite."));
        }
    }
    if let Some(region) = &options.region {
        region.validate()?;
    }
    Ok(())
}

pub(crate) fn initial_keep(x: &[f64], y: &[f64], region: &FitRegion) -> Vec<bool> {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| xi.is_finite() && yi.is_finite() && region.contains(xi, yi))
        .collect()
}

/// `keep &= finite(x, y) && region.contains(x, y)`.
pub(crate) fn restrict_to(keep: &mut [bool], x: &[f64], y: &[f64], region: &FitRegion) {
    for (i, k) in keep.iter_mut().enumerate() {
        *k = *k && x[i].is_finite() && y[i].is_finite() && region.contains(x[i], y[i]);
    }
}

pub(crate) fn count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&k| k).count()
}

pub(crate) fn insufficient(num_kept: usize, degree: usize) -> DiagError {
    DiagError::new(
        ErrorKind::InsufficientData,
        format!("Not enough good data points ({num_kept}) for polynomial fit of order {degree}"),
    )
}

fn fit_kept(x: &[f64], y: &[f64], keep: &[bool], degree: usize) -> Result<Vec<f64>, DiagError> {
    polyfit(x, y, keep, degree).ok_or_else(|| insufficient(count(keep), degree))
}
