//! Clipped location/scale statistics.
//!
//! The spread estimate is `0.74 * IQR`, which equals sigma for Gaussian data
//! and is insensitive to the tails. Entries further than `k * spread` from the
//! median are dropped before the mean and RMS are computed.

use crate::domain::{ClippedStatistics, ScalarSample};
use crate::math::{IQR_TO_SIGMA, quartiles};

/// Clipped statistics of the selected, finite entries of `sample`.
///
/// When `forced_mean` is given it replaces the reported mean, and `stdev` is
/// the RMS about it. Never fails: an empty selection gives the NaN result.
pub fn compute_robust_statistics(
    sample: &ScalarSample,
    clip_factor: f64,
    forced_mean: Option<f64>,
) -> ClippedStatistics {
    let n = sample.len();
    let values = sample.values();
    let selected: Vec<bool> = (0..n).map(|i| sample.is_selected(i)).collect();
    let total = selected.iter().filter(|&&s| s).count();

    let Some((q1, median, q3)) = quartiles(
        values
            .iter()
            .zip(selected.iter())
            .filter(|(_, s)| **s)
            .map(|(v, _)| *v),
    ) else {
        return ClippedStatistics::empty(n, forced_mean);
    };

    let clip_threshold = (clip_factor * IQR_TO_SIGMA * (q3 - q1)).max(0.0);
    let mut used: Vec<bool> = values
        .iter()
        .zip(selected.iter())
        .map(|(&v, &s)| s && (v - median).abs() <= clip_threshold)
        .collect();
    let mut num_used = used.iter().filter(|&&u| u).count();

    if num_used == 0 {
        // Zero clip with the median falling between two distinct values.
        log::debug!("clip removed every entry (clip={clip_threshold}); using the full selection");
        used = selected;
        num_used = total;
    }

    let actual_mean = mean_of(values, &used, num_used);
    let mean = forced_mean.unwrap_or(actual_mean);
    let variance = values
        .iter()
        .zip(used.iter())
        .filter(|(_, u)| **u)
        .map(|(v, _)| (v - mean) * (v - mean))
        .sum::<f64>()
        / num_used as f64;

    ClippedStatistics {
        total,
        num_used,
        mean,
        median,
        stdev: variance.sqrt(),
        clip_threshold,
        forced_mean,
        sys_err: None,
        used,
    }
}

fn mean_of(values: &[f64], used: &[bool], count: usize) -> f64 {
    let sum: f64 = values
        .iter()
        .zip(used.iter())
        .filter(|(_, u)| **u)
        .map(|(v, _)| *v)
        .sum();
    sum / count as f64
}
