//! Root finding.
//!
//! - `bisect`: bracketed 1-D root of an arbitrary function, used by the
//!   systematic-error solver.
//! - `real_roots`: all real roots of a dense polynomial, used by the curve
//!   distance evaluator.
//!
//! `real_roots` isolates roots recursively: between two consecutive real roots
//! of `p'` the polynomial is monotone, so each such interval (plus the two
//! outer intervals bounded by the Cauchy root bound) holds at most one root and
//! can be bisected safely. Degrees stay small here (`2d - 1` for a degree-`d`
//! locus), so the recursion is shallow.

use super::poly::{polyder, polyval, trim_leading_zeros};

/// Upper bound on bisection steps. Enough to shrink any `f64` bracket to a
/// single ulp.
const MAX_BISECT_STEPS: usize = 2_100;

/// Find `x` in `[lo, hi]` with `|f(x)| <= tolerance` by bisection.
///
/// `f(lo)` and `f(hi)` must have opposite signs. Infinite values count with
/// their sign, NaN aborts. Returns `None` when there is no sign change, the
/// iteration budget runs out, or the bracket collapses without meeting the
/// tolerance.
pub fn bisect<F>(mut f: F, mut lo: f64, mut hi: f64, tolerance: f64, max_iterations: usize) -> Option<f64>
where
    F: FnMut(f64) -> f64,
{
    let f_lo_start = f(lo);
    if f_lo_start.abs() <= tolerance {
        return Some(lo);
    }
    let f_hi = f(hi);
    if f_hi.abs() <= tolerance {
        return Some(hi);
    }
    if f_lo_start.is_nan() || f_hi.is_nan() || (f_lo_start > 0.0) == (f_hi > 0.0) {
        return None;
    }

    let lo_positive = f_lo_start > 0.0;
    for _ in 0..max_iterations {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            return None;
        }
        let f_mid = f(mid);
        if f_mid.is_nan() {
            return None;
        }
        if f_mid.abs() <= tolerance {
            return Some(mid);
        }
        if (f_mid > 0.0) == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    None
}

/// All real roots of `coeffs` (highest degree first), ascending.
///
/// Repeated roots are reported once. The zero polynomial and non-zero
/// constants have no roots.
pub fn real_roots(coeffs: &[f64]) -> Vec<f64> {
    let p = trim_leading_zeros(coeffs);
    if p.iter().any(|c| !c.is_finite()) {
        return Vec::new();
    }

    match p.len() {
        0 | 1 => Vec::new(),
        2 => vec![-p[1] / p[0]],
        3 => quadratic_roots(p[0], p[1], p[2]),
        _ => isolate_roots(p),
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // Avoid cancellation: q = -(b + sign(b) sqrt(disc)) / 2.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let (r1, r2) = if q == 0.0 {
        // b == 0 and c == 0 is handled by disc == 0; here b == 0, c != 0.
        let r = (-c / a).sqrt();
        (-r, r)
    } else {
        (q / a, c / q)
    };
    let mut roots = vec![r1, r2];
    roots.sort_by(f64::total_cmp);
    roots
}

fn isolate_roots(p: &[f64]) -> Vec<f64> {
    let bound = cauchy_bound(p);
    let critical = real_roots(&polyder(p));

    let mut knots = Vec::with_capacity(critical.len() + 2);
    knots.push(-bound);
    knots.extend(critical.iter().copied().filter(|c| c.abs() < bound));
    knots.push(bound);

    let scale = p.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    let touch_tol = 1e-12 * scale;

    let mut roots = Vec::new();
    for w in knots.windows(2) {
        let (a, b) = (w[0], w[1]);
        let fa = polyval(p, a);
        let fb = polyval(p, b);

        if fa == 0.0 {
            push_unique(&mut roots, a);
        }
        if fa != 0.0 && fb != 0.0 && (fa > 0.0) != (fb > 0.0) {
            push_unique(&mut roots, bisect_to_ulp(p, a, b, fa));
        }
    }
    // Even-multiplicity roots sit on a critical point without a sign change.
    for &c in &critical {
        if polyval(p, c).abs() <= touch_tol {
            push_unique(&mut roots, c);
        }
    }
    if let Some(&last) = knots.last() {
        if polyval(p, last) == 0.0 {
            push_unique(&mut roots, last);
        }
    }

    roots.sort_by(f64::total_cmp);
    roots
}

/// Every real root lies in `[-B, B]` with `B = 1 + max |a_i / a_n|`.
fn cauchy_bound(p: &[f64]) -> f64 {
    let lead = p[0].abs();
    1.0 + p[1..].iter().fold(0.0_f64, |m, c| m.max(c.abs() / lead))
}

fn bisect_to_ulp(p: &[f64], mut lo: f64, mut hi: f64, f_lo: f64) -> f64 {
    let lo_positive = f_lo > 0.0;
    for _ in 0..MAX_BISECT_STEPS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let f_mid = polyval(p, mid);
        if f_mid == 0.0 {
            return mid;
        }
        if (f_mid > 0.0) == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

fn push_unique(roots: &mut Vec<f64>, r: f64) {
    let tol = 1e-12 * (1.0 + r.abs());
    if !roots.iter().any(|&x| (x - r).abs() <= tol) {
        roots.push(r);
    }
}
