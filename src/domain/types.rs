//! Shared domain types.
//!
//! These types are intentionally plain data: the numeric code lives in
//! `stats`, `fit` and `models`, and the types are serializable so that
//! configuration and results can be written to JSON by `io`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::transform::ColorTransform;
use crate::error::{DiagError, ErrorKind};

/// Default clip factor (in robust sigma) for quantity statistics.
pub const DEFAULT_CLIP_FACTOR: f64 = 4.0;
/// Default rejection factor (in robust sigma) for locus fitting.
pub const DEFAULT_REJECTION: f64 = 3.0;
/// Default number of clip-and-refit iterations for locus fitting.
pub const DEFAULT_ITERATIONS: usize = 3;
/// Fractional widening of fit ranges applied after the first iteration.
pub const REGION_PAD_FRACTION: f64 = 0.07;

/// Parallel per-object arrays feeding the statistics code.
///
/// `values` may contain NaN for missing measurements. Those entries are never
/// used, whatever the selection mask says.
#[derive(Debug, Clone)]
pub struct ScalarSample {
    values: Vec<f64>,
    magnitudes: Vec<f64>,
    errors: Option<Vec<f64>>,
    selection: Vec<bool>,
}

impl ScalarSample {
    pub fn new(
        values: Vec<f64>,
        magnitudes: Vec<f64>,
        errors: Option<Vec<f64>>,
        selection: Vec<bool>,
    ) -> Result<Self, DiagError> {
        let n = values.len();
        let errors_ok = errors.as_ref().is_none_or(|e| e.len() == n);
        if magnitudes.len() != n || selection.len() != n || !errors_ok {
            return Err(DiagError::new(
                ErrorKind::InvalidInput,
                format!(
                    "Sample arrays differ in length: values={n}, magnitudes={}, errors={}, selection={}",
                    magnitudes.len(),
                    errors.as_ref().map_or("-".to_string(), |e| e.len().to_string()),
                    selection.len()
                ),
            ));
        }
        Ok(Self {
            values,
            magnitudes,
            errors,
            selection,
        })
    }

    /// Sample with every entry selected and no magnitudes of interest.
    pub fn from_values(values: Vec<f64>) -> Self {
        let n = values.len();
        Self {
            values,
            magnitudes: vec![f64::NAN; n],
            errors: None,
            selection: vec![true; n],
        }
    }

    /// Narrow the selection to objects brighter than `threshold`
    /// (`magnitude < threshold`).
    pub fn with_magnitude_threshold(mut self, threshold: f64) -> Self {
        for (sel, &mag) in self.selection.iter_mut().zip(self.magnitudes.iter()) {
            *sel = *sel && mag < threshold;
        }
        self
    }

    /// Replace the per-object values, keeping magnitudes, errors and selection.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, DiagError> {
        Self::new(
            values,
            self.magnitudes.clone(),
            self.errors.clone(),
            self.selection.clone(),
        )
    }

    /// Values and errors multiplied by `factor` (e.g. 1000 for milli-units).
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self.values.iter().map(|v| v * factor).collect(),
            magnitudes: self.magnitudes.clone(),
            errors: self.errors.as_ref().map(|e| e.iter().map(|v| v * factor).collect()),
            selection: self.selection.clone(),
        }
    }

    /// Same arrays with the selection narrowed to `mask`.
    pub fn restricted(&self, mask: &[bool]) -> Self {
        let mut out = self.clone();
        for (sel, &m) in out.selection.iter_mut().zip(mask) {
            *sel = *sel && m;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn errors(&self) -> Option<&[f64]> {
        self.errors.as_deref()
    }

    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    /// Effective selection: the mask and a finite value.
    pub fn is_selected(&self, i: usize) -> bool {
        self.selection[i] && self.values[i].is_finite()
    }
}

/// Result of clipped location/scale statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippedStatistics {
    /// Number of selected entries with a finite value.
    pub total: usize,
    /// Number of entries surviving the clip.
    pub num_used: usize,
    /// Mean of the used entries, or the forced mean when one was supplied.
    pub mean: f64,
    pub median: f64,
    /// RMS deviation of the used entries about `mean`.
    pub stdev: f64,
    /// Absolute deviation from the median beyond which entries are clipped.
    pub clip_threshold: f64,
    pub forced_mean: Option<f64>,
    pub sys_err: Option<f64>,
    /// Per-entry flag: selected and within the clip.
    #[serde(skip)]
    pub used: Vec<bool>,
}

impl ClippedStatistics {
    /// Result for a sample with no usable entries.
    pub fn empty(len: usize, forced_mean: Option<f64>) -> Self {
        Self {
            total: 0,
            num_used: 0,
            mean: f64::NAN,
            median: f64::NAN,
            stdev: f64::NAN,
            clip_threshold: f64::NAN,
            forced_mean,
            sys_err: None,
            used: vec![false; len],
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.total == 0
    }
}

/// A polynomial `y = P(x)` with coefficients stored highest degree first.
///
/// Evaluation helpers live in `models::polynomial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    pub(crate) coeffs: Vec<f64>,
}

/// Straight line `y = intercept + slope * x` bounding a fit region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitLine {
    pub intercept: f64,
    pub slope: f64,
}

impl FitLine {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    pub fn y_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Restricts which points take part in a locus fit.
///
/// Membership is strict on every bound: `xmin < x < xmax`, `ymin < y < ymax`,
/// `y < upper(x)` and `y > lower(x)`. Logic lives in `fit::region`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitRegion {
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub upper_line: Option<FitLine>,
    pub lower_line: Option<FitLine>,
}

/// How the first polynomial guess is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LocusStrategy {
    /// Iterated OLS of `y` on `x`, then orthogonal refinement.
    #[default]
    Standard,
    /// Skip OLS (unstable at infinite slope) and seed the orthogonal
    /// refinement with a steep line.
    NearVertical { slope: f64, intercept: f64 },
}

/// Levenberg–Marquardt controls for the orthogonal refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OdrOptions {
    pub max_iterations: usize,
    /// Stop when the relative change of the summed squared distance drops below this.
    pub cost_tolerance: f64,
    /// Stop when the relative coefficient step drops below this.
    pub step_tolerance: f64,
    pub initial_damping: f64,
}

impl Default for OdrOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            cost_tolerance: 1e-12,
            step_tolerance: 1e-10,
            initial_damping: 1e-3,
        }
    }
}

/// Inputs of `fit_stellar_locus` beyond the coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusFitOptions {
    pub degree: usize,
    pub region: Option<FitRegion>,
    pub rejection: f64,
    pub iterations: usize,
    pub strategy: LocusStrategy,
    pub odr: OdrOptions,
}

impl Default for LocusFitOptions {
    fn default() -> Self {
        Self {
            degree: 1,
            region: None,
            rejection: DEFAULT_REJECTION,
            iterations: DEFAULT_ITERATIONS,
            strategy: LocusStrategy::Standard,
            odr: OdrOptions::default(),
        }
    }
}

/// Output of the OLS stage.
#[derive(Debug, Clone)]
pub struct OlsLocusFit {
    pub model: PolynomialModel,
    pub keep: Vec<bool>,
    /// Clip iterations actually run (0 for the near-vertical strategy).
    pub iterations_run: usize,
}

/// Output of `fit_stellar_locus`.
#[derive(Debug, Clone)]
pub struct LocusFit {
    /// The orthogonal-regression model: "the fit".
    pub model: PolynomialModel,
    /// Points used in the final orthogonal round.
    pub keep: Vec<bool>,
    /// The OLS (or seeded) model the refinement started from.
    pub initial: OlsLocusFit,
}

impl LocusFit {
    pub fn num_kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }
}

/// Optional limits outside of which curve distances are reported as NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistanceBounds {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub upper_line: Option<FitLine>,
    pub lower_line: Option<FitLine>,
}

/// Per-object class used to split statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceLabel {
    All,
    Star,
    Galaxy,
    Maybe,
    NotStar,
}

impl SourceLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            SourceLabel::All => "all",
            SourceLabel::Star => "star",
            SourceLabel::Galaxy => "galaxy",
            SourceLabel::Maybe => "maybe",
            SourceLabel::NotStar => "notStar",
        }
    }
}

/// Options for per-quantity statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Clip factor (robust sigma) for `compute_robust_statistics`.
    pub clip: f64,
    /// Only objects brighter than this take part in statistics.
    pub mag_threshold: f64,
    /// Flag columns marking objects to ignore.
    pub flags: Vec<String>,
    /// Report statistics in milli-units (mmag, mas).
    pub to_milli: bool,
    /// Tolerance on `stdev - 1` for the systematic-error solve.
    pub sys_err_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clip: DEFAULT_CLIP_FACTOR,
            mag_threshold: 21.0,
            flags: vec![
                "base_SdssCentroid_flag".to_string(),
                "base_PixelFlags_flag_saturatedCenter".to_string(),
                "base_PixelFlags_flag_interpolatedCenter".to_string(),
                "base_PsfFlux_flag".to_string(),
            ],
            to_milli: true,
            sys_err_tolerance: 1e-3,
        }
    }
}

/// Everything needed to fit and assess one color-color locus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocusConfig {
    pub degree: usize,
    pub iterations: usize,
    pub rejection: f64,
    pub region: FitRegion,
    pub strategy: LocusStrategy,
    pub odr: OdrOptions,
    /// Multiplier applied to distances before statistics (1000 → mmag).
    pub unit_scale: f64,
    /// Clip factor for the distance-quality statistics.
    pub quality_rejection: f64,
}

impl Default for LocusConfig {
    fn default() -> Self {
        Self {
            degree: 1,
            iterations: DEFAULT_ITERATIONS,
            rejection: DEFAULT_REJECTION,
            region: FitRegion::default(),
            strategy: LocusStrategy::Standard,
            odr: OdrOptions::default(),
            unit_scale: 1000.0,
            quality_rejection: DEFAULT_REJECTION,
        }
    }
}

impl AnalysisConfig {
    /// Factor applied to quantities before statistics.
    pub fn unit_scale(&self) -> f64 {
        if self.to_milli { 1000.0 } else { 1.0 }
    }
}

impl LocusConfig {
    pub fn fit_options(&self) -> LocusFitOptions {
        LocusFitOptions {
            degree: self.degree,
            region: Some(self.region.clone()),
            rejection: self.rejection,
            iterations: self.iterations,
            strategy: self.strategy,
            odr: self.odr,
        }
    }
}

/// Top-level configuration of a diagnostics run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticsConfig {
    pub analysis: AnalysisConfig,
    /// Color transforms keyed by name (e.g. `wPerp`, `wPara`).
    pub transforms: BTreeMap<String, ColorTransform>,
    /// Locus fits keyed by name (e.g. `wFit`).
    pub loci: BTreeMap<String, LocusConfig>,
}
