//! End-to-end analyses.
//!
//! - `label_statistics`: clipped statistics (and systematic error) of one
//!   quantity for each source label
//! - `analyze_locus`: fit one color-color locus and derive everything the
//!   reports need from it
//! - `color_color_distance`: distance of catalog objects to a fitted locus

use std::collections::BTreeMap;

use crate::analysis::bounds::{LineCheck, check_bounding_lines};
use crate::analysis::density::highest_density_point;
use crate::analysis::principal::{PrincipalColors, principal_colors_from_line, project_onto_line};
use crate::data::catalog::{ColumnSource, flag_union};
use crate::domain::{
    AnalysisConfig, ClippedStatistics, DistanceBounds, LocusConfig, LocusFit, PolynomialModel, ScalarSample,
    SourceLabel,
};
use crate::error::{DiagError, ErrorKind};
use crate::fit::fit_stellar_locus;
use crate::models::evaluate_curve_distance;
use crate::stats::{compute_robust_statistics, solve_systematic_error};

/// Sample of `values` with flagged objects deselected.
///
/// `magnitude_column` supplies the magnitudes for the brightness cut.
pub fn build_sample<S: ColumnSource + ?Sized>(
    source: &S,
    values: Vec<f64>,
    magnitude_column: &str,
    errors: Option<Vec<f64>>,
    flags: &[String],
) -> Result<ScalarSample, DiagError> {
    let magnitudes = source.require_column(magnitude_column)?.to_vec();
    let selection = flag_union(source, flags).into_iter().map(|bad| !bad).collect();
    ScalarSample::new(values, magnitudes, errors, selection)
}

/// Statistics of `sample` for each label in `label_set`.
///
/// Values (and errors) are scaled by `config.unit_scale()` and restricted to
/// objects brighter than `config.mag_threshold`. `forced_mean` is in the
/// scaled units. Labels with no objects are left out.
pub fn label_statistics(
    sample: &ScalarSample,
    labels: &[SourceLabel],
    label_set: &[SourceLabel],
    config: &AnalysisConfig,
    forced_mean: Option<f64>,
) -> Result<BTreeMap<SourceLabel, ClippedStatistics>, DiagError> {
    if labels.len() != sample.len() {
        return Err(DiagError::new(
            ErrorKind::InvalidInput,
            format!("Got {} labels for {} objects.", labels.len(), sample.len()),
        ));
    }
    let scaled = sample
        .scaled(config.unit_scale())
        .with_magnitude_threshold(config.mag_threshold);

    let mut out = BTreeMap::new();
    for &label in label_set {
        let mask: Vec<bool> = labels.iter().map(|&l| l == label || label == SourceLabel::All).collect();
        if !mask.iter().any(|&m| m) {
            log::debug!("no objects labelled '{}'", label.display_name());
            continue;
        }
        let subset = scaled.restricted(&mask);
        let mut stats = compute_robust_statistics(&subset, config.clip, forced_mean);
        if subset.errors().is_some() {
            stats.sys_err = Some(solve_systematic_error(
                &subset,
                config.clip,
                forced_mean,
                config.sys_err_tolerance,
            ));
        }
        if stats.is_degenerate() {
            log::warn!("{}: no usable data", label.display_name());
        }
        log::info!("{}: {stats}", label.display_name());
        out.insert(label, stats);
    }

    if out.is_empty() {
        log::warn!("stats: no usable data for any label");
    }
    Ok(out)
}

/// Spread of the points about a fitted locus.
#[derive(Debug, Clone)]
pub struct LocusQuality {
    /// Signed distances of the kept points, times the unit scale.
    pub distances: Vec<f64>,
    pub stats: ClippedStatistics,
    /// RMS of the distances that survive the clip.
    pub rms: f64,
}

/// Distance statistics of the kept points about `model`.
pub fn locus_quality(
    x: &[f64],
    y: &[f64],
    model: &PolynomialModel,
    keep: &[bool],
    unit_scale: f64,
    rejection: f64,
) -> LocusQuality {
    let distances: Vec<f64> = evaluate_curve_distance(x, y, model, &DistanceBounds::default())
        .into_iter()
        .zip(keep.iter())
        .filter(|(_, k)| **k)
        .map(|(d, _)| d * unit_scale)
        .collect();

    let stats = compute_robust_statistics(&ScalarSample::from_values(distances.clone()), rejection, None);
    let rms = if stats.num_used > 0 {
        let sum_sq: f64 = distances
            .iter()
            .zip(stats.used.iter())
            .filter(|(_, u)| **u)
            .map(|(d, _)| d * d)
            .sum();
        (sum_sq / stats.num_used as f64).sqrt()
    } else {
        f64::NAN
    };

    LocusQuality { distances, stats, rms }
}

/// Everything derived from one locus fit.
#[derive(Debug, Clone)]
pub struct LocusAnalysis {
    pub fit: LocusFit,
    /// Densest point of the initial keep set.
    pub high_density: Option<(f64, f64)>,
    /// Principal colors, for linear fits with a density point.
    pub principal: Option<PrincipalColors>,
    pub line_checks: Vec<LineCheck>,
    pub quality: LocusQuality,
}

/// Fit the locus through `(x, y)` and derive density, principal colors,
/// bounding-line checks and quality.
pub fn analyze_locus(x: &[f64], y: &[f64], config: &LocusConfig) -> Result<LocusAnalysis, DiagError> {
    let fit = fit_stellar_locus(x, y, &config.fit_options())?;

    let high_density = highest_density_point(x, y, &fit.initial.keep);
    let principal = match (fit.model.as_line(), high_density) {
        (Some((intercept, slope)), Some((hx, hy))) => {
            let origin = project_onto_line(slope, intercept, hx, hy);
            log::info!("P1/P2 origin x, y: {:.2} {:.2}", origin.0, origin.1);
            Some(principal_colors_from_line(slope, intercept, origin))
        }
        _ => None,
    };

    let line_checks = match finite_range(x) {
        Some(range) => check_bounding_lines(&fit.model, &config.region, range),
        None => Vec::new(),
    };

    let quality = locus_quality(x, y, &fit.model, &fit.keep, config.unit_scale, config.quality_rejection);
    log::info!(
        "Locus quality: {} (rms={:.4})",
        quality.stats,
        quality.rms
    );

    Ok(LocusAnalysis {
        fit,
        high_density,
        principal,
        line_checks,
        quality,
    })
}

/// Signed distance of each object to `model` on the plane
/// `x = b1 - b2`, `y = b2 - b3`, times `unit_scale`.
pub fn color_color_distance<S: ColumnSource + ?Sized>(
    source: &S,
    bands: [&str; 3],
    model: &PolynomialModel,
    bounds: &DistanceBounds,
    unit_scale: f64,
) -> Result<Vec<f64>, DiagError> {
    let b1 = source.require_column(bands[0])?;
    let b2 = source.require_column(bands[1])?;
    let b3 = source.require_column(bands[2])?;
    let x: Vec<f64> = b1.iter().zip(b2).map(|(a, b)| a - b).collect();
    let y: Vec<f64> = b2.iter().zip(b3).map(|(a, b)| a - b).collect();
    Ok(evaluate_curve_distance(&x, &y, model, bounds)
        .into_iter()
        .map(|d| d * unit_scale)
        .collect())
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::Catalog;
    use crate::data::sample::{LocusSampleConfig, generate_locus_sample};
    use crate::domain::{FitLine, FitRegion};

    #[test]
    fn statistics_per_label_with_threshold() {
        let values = vec![0.001, 0.002, 0.003, 0.5, 0.010, 0.020];
        let mags = vec![18.0, 19.0, 20.0, 22.0, 18.0, 18.5];
        let sample = ScalarSample::new(values, mags, None, vec![true; 6]).unwrap();
        let labels = vec![
            SourceLabel::Star,
            SourceLabel::Star,
            SourceLabel::Star,
            SourceLabel::Star,
            SourceLabel::Galaxy,
            SourceLabel::Galaxy,
        ];
        let stats = label_statistics(
            &sample,
            &labels,
            &[SourceLabel::Star, SourceLabel::Galaxy, SourceLabel::Maybe],
            &AnalysisConfig::default(),
            None,
        )
        .unwrap();

        assert_eq!(stats.len(), 2);
        let star = &stats[&SourceLabel::Star];
        assert_eq!(star.total, 3);
        assert!((star.mean - 2.0).abs() < 1e-9);
        assert!(star.sys_err.is_none());
        assert!((stats[&SourceLabel::Galaxy].mean - 15.0).abs() < 1e-9);
    }

    #[test]
    fn all_label_covers_everything() {
        let sample = ScalarSample::new(vec![1.0, 2.0], vec![18.0, 18.0], Some(vec![0.5, 0.5]), vec![true; 2]).unwrap();
        let config = AnalysisConfig {
            to_milli: false,
            ..AnalysisConfig::default()
        };
        let stats = label_statistics(&sample, &[SourceLabel::Star, SourceLabel::Galaxy], &[SourceLabel::All], &config, None)
            .unwrap();
        assert_eq!(stats[&SourceLabel::All].total, 2);
        assert!(stats[&SourceLabel::All].sys_err.is_some());
    }

    #[test]
    fn flagged_objects_are_deselected() {
        let cat = Catalog::new(3)
            .with_column("mag", vec![18.0, 18.0, 18.0])
            .unwrap()
            .with_flag("bad", vec![false, true, false])
            .unwrap();
        let sample = build_sample(&cat, vec![1.0, 2.0, 3.0], "mag", None, &["bad".to_string()]).unwrap();
        assert_eq!(sample.selection(), &[true, false, true]);
    }

    #[test]
    fn analyze_linear_locus() {
        let sample = generate_locus_sample(&LocusSampleConfig {
            count: 800,
            coeffs: vec![0.5, 0.1],
            scatter: 0.01,
            outlier_fraction: 0.05,
            seed: 3,
            ..LocusSampleConfig::default()
        })
        .unwrap();
        let config = LocusConfig {
            region: FitRegion {
                x_range: Some((0.3, 1.1)),
                upper_line: Some(FitLine::new(0.55 + 2.0 * 0.9, -2.0)),
                lower_line: Some(FitLine::new(0.35 + 2.0 * 0.5, -2.0)),
                ..FitRegion::default()
            },
            ..LocusConfig::default()
        };
        let analysis = analyze_locus(&sample.x, &sample.y, &config).unwrap();

        let (intercept, slope) = analysis.fit.model.as_line().unwrap();
        assert!((slope - 0.5).abs() < 0.02, "slope = {slope}");
        assert!((intercept - 0.1).abs() < 0.02, "intercept = {intercept}");

        // Quality in mmag: close to the 10 mmag scatter.
        assert!((analysis.quality.rms - 10.0).abs() < 2.0, "rms = {}", analysis.quality.rms);

        let principal = analysis.principal.unwrap();
        let (ox, oy) = principal.origin;
        assert!((oy - (slope * ox + intercept)).abs() < 1e-9);

        assert_eq!(analysis.line_checks.len(), 2);
        assert!(analysis.line_checks.iter().all(|c| c.crossed));
    }

    #[test]
    fn distances_from_band_catalog() {
        let model = PolynomialModel::line(0.0, 1.0).unwrap();
        let cat = Catalog::new(2)
            .with_column("g", vec![19.0, 18.0])
            .unwrap()
            .with_column("r", vec![18.0, 18.0])
            .unwrap()
            .with_column("i", vec![17.0, 18.5])
            .unwrap();
        let d = color_color_distance(&cat, ["g", "r", "i"], &model, &DistanceBounds::default(), 1000.0).unwrap();
        assert!(d[0].abs() < 1e-9);
        assert!((d[1] + 500.0 / 2.0_f64.sqrt()).abs() < 1e-6);
        assert!(color_color_distance(&cat, ["g", "r", "z"], &model, &DistanceBounds::default(), 1.0).is_err());
    }
}
