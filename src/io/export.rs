//! Export locus fit summaries to JSON.
//!
//! The summary is the portable record of one fitted locus:
//! - model coefficients (ODR and initial OLS), highest degree first
//! - point counts and distance-quality statistics
//! - density point and principal colors, when available
//! - a sampled curve grid for quick plotting
//!
//! Statistics may be NaN, which serde_json writes as `null`, so the file is
//! meant for downstream tools rather than for reading back.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::analysis::{LocusAnalysis, PrincipalColors};
use crate::domain::{ClippedStatistics, PolynomialModel};
use crate::error::{DiagError, ErrorKind};

/// Points in the sampled curve grid.
pub const GRID_POINTS: usize = 101;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySummary {
    pub stats: ClippedStatistics,
    pub rms: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocusSummary {
    pub tool: String,
    pub name: String,
    pub model: PolynomialModel,
    pub initial_model: PolynomialModel,
    pub num_points: usize,
    pub num_initial: usize,
    pub num_kept: usize,
    pub quality: QualitySummary,
    pub high_density: Option<(f64, f64)>,
    pub principal: Option<PrincipalSummary>,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalSummary {
    pub p2: [f64; 4],
    pub p1: [f64; 4],
    pub origin: (f64, f64),
}

impl From<&PrincipalColors> for PrincipalSummary {
    fn from(p: &PrincipalColors) -> Self {
        Self {
            p2: p.p2,
            p1: p.p1,
            origin: p.origin,
        }
    }
}

/// Collect the summary of one analysed locus.
///
/// The grid spans the x range of the kept points.
pub fn build_locus_summary(name: &str, x: &[f64], analysis: &LocusAnalysis) -> LocusSummary {
    let fit = &analysis.fit;
    let (x_min, x_max) = kept_range(x, &fit.keep);

    LocusSummary {
        tool: env!("CARGO_PKG_NAME").to_string(),
        name: name.to_string(),
        model: fit.model.clone(),
        initial_model: fit.initial.model.clone(),
        num_points: fit.keep.len(),
        num_initial: fit.initial.keep.iter().filter(|&&k| k).count(),
        num_kept: fit.num_kept(),
        quality: QualitySummary {
            stats: analysis.quality.stats.clone(),
            rms: analysis.quality.rms,
        },
        high_density: analysis.high_density,
        principal: analysis.principal.as_ref().map(PrincipalSummary::from),
        grid: build_grid(&fit.model, x_min, x_max, GRID_POINTS),
    }
}

/// Write a locus summary JSON file.
pub fn write_locus_summary(path: &Path, name: &str, x: &[f64], analysis: &LocusAnalysis) -> Result<(), DiagError> {
    let file = File::create(path).map_err(|e| {
        DiagError::new(ErrorKind::Io, format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;

    let summary = build_locus_summary(name, x, analysis);
    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| DiagError::new(ErrorKind::Io, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

fn kept_range(x: &[f64], keep: &[bool]) -> (f64, f64) {
    x.iter()
        .zip(keep.iter())
        .filter(|(v, k)| **k && v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (&v, _)| (lo.min(v), hi.max(v)))
}

fn build_grid(model: &PolynomialModel, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        xs.push(x);
        ys.push(model.eval(x));
    }

    CurveGrid { x: xs, y: ys }
}
