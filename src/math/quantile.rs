//! Percentiles with linear interpolation between order statistics
//! (the `numpy.percentile` default).

/// IQR → Gaussian sigma conversion used by every clipping rule in the crate.
///
/// For a normal distribution `IQR ≈ 1.349σ`, so `σ ≈ 0.74 · IQR`.
pub const IQR_TO_SIGMA: f64 = 0.74;

/// Percentile `p` (0–100) of an ascending-sorted slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// `(Q1, median, Q3)` of the finite entries of `values`.
///
/// Returns `None` when there are no finite entries.
pub fn quartiles(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64, f64)> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some((
        percentile_sorted(&sorted, 25.0),
        percentile_sorted(&sorted, 50.0),
        percentile_sorted(&sorted, 75.0),
    ))
}

/// Median of the finite entries, or `None` if there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    quartiles(values).map(|(_, m, _)| m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_numpy_linear_interpolation() {
        // np.percentile([1, 2, 3, 4], [25, 50, 75]) == [1.75, 2.5, 3.25]
        let (q1, m, q3) = quartiles([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((q1 - 1.75).abs() < 1e-12);
        assert!((m - 2.5).abs() < 1e-12);
        assert!((q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn skips_non_finite_entries() {
        let (q1, m, q3) = quartiles([f64::NAN, 5.0, f64::INFINITY]).unwrap();
        assert_eq!((q1, m, q3), (5.0, 5.0, 5.0));
        assert!(median([f64::NAN]).is_none());
    }
}
