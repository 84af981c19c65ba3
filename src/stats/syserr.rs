//! Additive systematic-error solver.
//!
//! Finds `s >= 0` such that the clipped stdev of `value / sqrt(error^2 + s^2)`
//! is one: the error floor that would make the quoted errors describe the
//! observed scatter.

use crate::domain::ScalarSample;
use crate::math::{bisect, median};
use crate::stats::robust::compute_robust_statistics;

/// Default tolerance on `stdev - 1`.
pub const SYS_ERR_TOLERANCE: f64 = 1e-3;

const MAX_BRACKET_STEPS: usize = 128;
const MAX_BISECT_STEPS: usize = 200;

/// Solve for the additive systematic error of `sample`.
///
/// Returns 0 when the quoted errors already explain the scatter, and NaN
/// (with a warning) when the sample has no errors or the solve fails.
pub fn solve_systematic_error(
    sample: &ScalarSample,
    clip_factor: f64,
    forced_mean: Option<f64>,
    tolerance: f64,
) -> f64 {
    let Some(errors) = sample.errors() else {
        log::warn!("sysErr calculation skipped: sample has no errors");
        return f64::NAN;
    };

    let objective = |sys_err2: f64| -> f64 {
        let normalized: Vec<f64> = sample
            .values()
            .iter()
            .zip(errors.iter())
            .map(|(v, e)| v / (e * e + sys_err2).sqrt())
            .collect();
        let Ok(scaled) = sample.with_values(normalized) else {
            return f64::NAN;
        };
        compute_robust_statistics(&scaled, clip_factor, forced_mean).stdev - 1.0
    };

    let f0 = objective(0.0);
    if !f0.is_finite() {
        // Zero errors make every normalized value infinite at s^2 = 0.
        let zero_errors = (0..sample.len())
            .filter(|&i| sample.is_selected(i))
            .all(|i| errors[i] == 0.0);
        if zero_errors {
            log::debug!("sysErr: errors are all zero, treating the scatter as explained");
            return 0.0;
        }
        log::warn!("sysErr calculation failed: objective is not finite at s^2=0");
        return f64::NAN;
    }
    if f0 <= tolerance {
        log::debug!("sysErr: errors explain the scatter (stdev - 1 = {f0})");
        return 0.0;
    }

    let typical = median(
        (0..sample.len())
            .filter(|&i| sample.is_selected(i))
            .map(|i| errors[i] * errors[i]),
    )
    .unwrap_or(0.0);
    let mut hi = typical.max(1e-12);
    let mut bracketed = false;
    for _ in 0..MAX_BRACKET_STEPS {
        if objective(hi) < 0.0 {
            bracketed = true;
            break;
        }
        hi *= 4.0;
    }
    if !bracketed {
        log::warn!("sysErr calculation failed: no bracket found up to s^2={hi:e}");
        return f64::NAN;
    }

    match bisect(objective, 0.0, hi, tolerance, MAX_BISECT_STEPS) {
        Some(sys_err2) => {
            log::debug!("sysErr: s^2={sys_err2:e} in bracket [0, {hi:e}]");
            sys_err2.max(0.0).sqrt()
        }
        None => {
            log::warn!("sysErr calculation failed: bisection did not converge");
            f64::NAN
        }
    }
}
