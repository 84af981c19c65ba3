//! Color transforms: linear combinations of per-band magnitudes.
//!
//! A transform defines
//!
//! ```text
//! color = constant + Σ coeff_b * mag_b
//! ```
//!
//! plus optional metadata used by the principal-color analysis: a reference
//! origin on the color-color plane, limits on other colors that make this one
//! meaningful, and a pair of parallel bounding lines roughly perpendicular to
//! the locus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::catalog::ColumnSource;
use crate::domain::FitLine;
use crate::error::{DiagError, ErrorKind};

/// Two parallel lines `y = intercept + slope * x` bounding the fit range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpLines {
    pub slope: f64,
    pub upper_intercept: f64,
    pub lower_intercept: f64,
}

impl PerpLines {
    pub fn upper(&self) -> FitLine {
        FitLine::new(self.upper_intercept, self.slope)
    }

    pub fn lower(&self) -> FitLine {
        FitLine::new(self.lower_intercept, self.slope)
    }

    /// Strictly between the two lines.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        y > self.lower().y_at(x) && y < self.upper().y_at(x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorTransform {
    pub description: String,
    pub sub_description: String,
    pub plot: bool,
    /// `(band, coefficient)` in a fixed order; the order matters for the
    /// principal-color coefficient vectors.
    pub coeffs: Vec<(String, f64)>,
    pub constant: Option<f64>,
    /// Origin of the P1/P2 axes on the color-color plane.
    pub origin: Option<(f64, f64)>,
    pub require_greater: BTreeMap<String, f64>,
    pub require_less: BTreeMap<String, f64>,
    pub perp_lines: Option<PerpLines>,
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self {
            description: String::new(),
            sub_description: String::new(),
            plot: true,
            coeffs: Vec::new(),
            constant: None,
            origin: None,
            require_greater: BTreeMap::new(),
            require_less: BTreeMap::new(),
            perp_lines: None,
        }
    }
}

impl ColorTransform {
    pub fn new(description: &str, sub_description: &str, plot: bool, coeffs: &[(&str, f64)]) -> Self {
        Self {
            description: description.to_string(),
            sub_description: sub_description.to_string(),
            plot,
            coeffs: coeffs.iter().map(|(b, c)| (b.to_string(), *c)).collect(),
            ..Self::default()
        }
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.origin = Some((x0, y0));
        self
    }

    pub fn with_limits(mut self, greater: &[(&str, f64)], less: &[(&str, f64)]) -> Self {
        self.require_greater = greater.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self.require_less = less.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self
    }

    pub fn with_perp_lines(mut self, slope: f64, upper_intercept: f64, lower_intercept: f64) -> Self {
        self.perp_lines = Some(PerpLines {
            slope,
            upper_intercept,
            lower_intercept,
        });
        self
    }

    pub fn full_description(&self) -> String {
        format!("{}{}", self.description, self.sub_description)
    }

    pub fn bands(&self) -> impl Iterator<Item = &str> {
        self.coeffs.iter().map(|(b, _)| b.as_str())
    }

    pub fn coefficient(&self, band: &str) -> Option<f64> {
        self.coeffs.iter().find(|(b, _)| b == band).map(|(_, c)| *c)
    }

    /// Band coefficients in order, followed by the constant (0 when absent).
    pub fn coefficient_vector(&self) -> Vec<f64> {
        let mut out: Vec<f64> = self.coeffs.iter().map(|(_, c)| *c).collect();
        out.push(self.constant.unwrap_or(0.0));
        out
    }

    /// The color of every object, or `None` when a band column is missing.
    ///
    /// Band names are magnitude column names in `source`.
    pub fn apply<S: ColumnSource + ?Sized>(&self, source: &S) -> Option<Vec<f64>> {
        let mut value = vec![self.constant.unwrap_or(0.0); source.len()];
        for (band, coeff) in &self.coeffs {
            let mags = source.column(band)?;
            for (v, m) in value.iter_mut().zip(mags) {
                *v += coeff * m;
            }
        }
        Some(value)
    }
}

/// Apply every transform whose bands are all present. Others are skipped.
pub fn transform_catalog<S: ColumnSource + ?Sized>(
    source: &S,
    transforms: &BTreeMap<String, ColorTransform>,
) -> BTreeMap<String, Vec<f64>> {
    let mut out = BTreeMap::new();
    for (name, transform) in transforms {
        match transform.apply(source) {
            Some(values) => {
                out.insert(name.clone(), values);
            }
            None => log::debug!("skipping transform '{name}': missing band column"),
        }
    }
    out
}

/// `values * unit_scale` where `(x_color, y_color)` lies strictly between the
/// bounding lines, NaN elsewhere.
pub fn color_value_in_fit_range(
    values: &[f64],
    x_color: &[f64],
    y_color: &[f64],
    lines: &PerpLines,
    unit_scale: f64,
) -> Vec<f64> {
    values
        .iter()
        .zip(x_color.iter().zip(y_color.iter()))
        .map(|(&v, (&x, &y))| if lines.contains(x, y) { v * unit_scale } else { f64::NAN })
        .collect()
}

/// `colors[column] * unit_scale` where every other color named in the
/// transform's limits lies strictly inside them, NaN elsewhere.
pub fn color_value_in_perp_range(
    colors: &BTreeMap<String, Vec<f64>>,
    column: &str,
    transform: &ColorTransform,
    unit_scale: f64,
) -> Result<Vec<f64>, DiagError> {
    let lookup = |name: &str| {
        colors
            .get(name)
            .ok_or_else(|| DiagError::new(ErrorKind::InvalidInput, format!("Missing color '{name}'.")))
    };
    let values = lookup(column)?;
    let mut good = vec![true; values.len()];
    for (name, &limit) in &transform.require_greater {
        for (g, &c) in good.iter_mut().zip(lookup(name)?) {
            *g = *g && c > limit;
        }
    }
    for (name, &limit) in &transform.require_less {
        for (g, &c) in good.iter_mut().zip(lookup(name)?) {
            *g = *g && c < limit;
        }
    }
    Ok(values
        .iter()
        .zip(good)
        .map(|(&v, g)| if g { v * unit_scale } else { f64::NAN })
        .collect())
}

fn insert(map: &mut BTreeMap<String, ColorTransform>, name: &str, transform: ColorTransform) {
    map.insert(name.to_string(), transform);
}

/// Ivezic et al. principal colors for SDSS filters.
pub fn ivezic_transforms_sdss() -> BTreeMap<String, ColorTransform> {
    let mut map = BTreeMap::new();
    insert(
        &mut map,
        "wPerp",
        ColorTransform::new(
            "Ivezic w perpendicular",
            " (griBlue)",
            true,
            &[("SDSS-G", -0.227), ("SDSS-R", 0.792), ("SDSS-I", -0.567)],
        )
        .with_constant(0.050)
        .with_origin(0.4250, 0.0818)
        .with_limits(&[("wPara", -0.2)], &[("wPara", 0.6)]),
    );
    insert(
        &mut map,
        "xPerp",
        ColorTransform::new("Ivezic x perpendicular", " (griRed)", true, &[("SDSS-G", 0.707), ("SDSS-R", -0.707)])
            .with_constant(-0.988)
            .with_limits(&[("xPara", 0.8)], &[("xPara", 1.6)]),
    );
    insert(
        &mut map,
        "yPerp",
        ColorTransform::new(
            "Ivezic y perpendicular",
            " (rizRed)",
            true,
            &[("SDSS-R", -0.270), ("SDSS-I", 0.800), ("SDSS-Z", -0.534)],
        )
        .with_constant(0.054)
        .with_origin(0.5763, 0.1900)
        .with_limits(&[("yPara", 0.1)], &[("yPara", 1.2)]),
    );
    insert(
        &mut map,
        "wPara",
        ColorTransform::new(
            "Ivezic w parallel",
            " (griBlue)",
            false,
            &[("SDSS-G", 0.928), ("SDSS-R", -0.556), ("SDSS-I", -0.372)],
        )
        .with_constant(-0.425),
    );
    insert(
        &mut map,
        "xPara",
        ColorTransform::new("Ivezic x parallel", " (griRed)", false, &[("SDSS-R", 1.0), ("SDSS-I", -1.0)]),
    );
    insert(
        &mut map,
        "yPara",
        ColorTransform::new(
            "Ivezic y parallel",
            " (rizRed)",
            false,
            &[("SDSS-R", 0.895), ("SDSS-I", -0.448), ("SDSS-Z", -0.447)],
        )
        .with_constant(-0.600),
    );
    map
}

/// Ivezic et al. principal colors recalibrated for HSC filters, with the
/// straight-line locus fits they were derived from.
pub fn ivezic_transforms_hsc() -> BTreeMap<String, ColorTransform> {
    let mut map = BTreeMap::new();
    insert(
        &mut map,
        "wPerp",
        ColorTransform::new(
            "Ivezic w perpendicular",
            " (griBlue)",
            true,
            &[("HSC-G", -0.272), ("HSC-R", 0.803), ("HSC-I", -0.531)],
        )
        .with_constant(0.036)
        .with_origin(0.4481, 0.1546)
        .with_limits(&[("wPara", -0.2)], &[("wPara", 0.6)])
        .with_perp_lines(-1.0 / 0.51, 2.40, 0.68),
    );
    insert(
        &mut map,
        "xPerp",
        ColorTransform::new(
            "Ivezic x perpendicular",
            " (griRed)",
            true,
            &[("HSC-G", 0.678), ("HSC-R", -0.733), ("HSC-I", 0.055)],
        )
        .with_constant(-0.792)
        .with_origin(1.2654, 1.3675)
        .with_limits(&[("xPara", 0.8)], &[("xPara", 1.6)])
        .with_perp_lines(-1.0 / 11.4, 1.73, 0.87),
    );
    insert(
        &mut map,
        "yPerp",
        ColorTransform::new(
            "Ivezic y perpendicular",
            " (rizRed)",
            true,
            &[("HSC-R", -0.227), ("HSC-I", 0.793), ("HSC-Z", -0.566)],
        )
        .with_constant(-0.012)
        .with_origin(1.2219, 0.5183)
        .with_limits(&[("yPara", 0.1)], &[("yPara", 1.2)])
        .with_perp_lines(-1.0 / 0.40, 5.5, 2.7),
    );
    insert(
        &mut map,
        "wPara",
        ColorTransform::new(
            "Ivezic w parallel",
            " (griBlue)",
            false,
            &[("HSC-G", 0.89), ("HSC-R", -0.43), ("HSC-I", -0.46)],
        )
        .with_constant(-0.52),
    );
    insert(
        &mut map,
        "xPara",
        ColorTransform::new(
            "Ivezic x parallel",
            " (griRed)",
            false,
            &[("HSC-G", 0.0), ("HSC-R", 1.0), ("HSC-I", -1.0)],
        )
        .with_constant(0.0),
    );
    insert(
        &mut map,
        "yPara",
        ColorTransform::new(
            "Ivezic y parallel",
            " (rizRed)",
            false,
            &[("HSC-R", 0.928), ("HSC-I", -0.555), ("HSC-Z", -0.373)],
        )
        .with_constant(-1.400),
    );
    insert(
        &mut map,
        "wFit",
        ColorTransform::new("Straight line fit for wPerp range", " (griBlue)", false, &[("HSC-G", 0.51), ("HSC-R", -0.51)])
            .with_constant(-0.07),
    );
    insert(
        &mut map,
        "xFit",
        ColorTransform::new("Straight line fit for xperp range", " (griRed)", false, &[("HSC-G", 11.4), ("HSC-R", -11.4)])
            .with_constant(-13.3),
    );
    insert(
        &mut map,
        "yFit",
        ColorTransform::new("Straight line fit for yPerp range", " (rizRed)", false, &[("HSC-R", 0.40), ("HSC-I", -0.40)])
            .with_constant(0.02),
    );
    map
}

/// Single-band "colors": the magnitudes themselves.
pub fn straight_transforms() -> BTreeMap<String, ColorTransform> {
    let mut map = BTreeMap::new();
    for (name, band) in [
        ("g", "HSC-G"),
        ("r", "HSC-R"),
        ("i", "HSC-I"),
        ("z", "HSC-Z"),
        ("y", "HSC-Y"),
        ("n921", "NB0921"),
    ] {
        insert(&mut map, name, ColorTransform::new(band, "", true, &[(band, 1.0)]));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::Catalog;

    fn gri_catalog() -> Catalog {
        Catalog::new(2)
            .with_column("SDSS-G", vec![20.0, 18.0])
            .unwrap()
            .with_column("SDSS-R", vec![19.5, 17.0])
            .unwrap()
            .with_column("SDSS-I", vec![19.2, 16.5])
            .unwrap()
    }

    #[test]
    fn applies_coefficients_and_constant() {
        let transforms = ivezic_transforms_sdss();
        let w_perp = &transforms["wPerp"];
        let values = w_perp.apply(&gri_catalog()).unwrap();
        let expected = 0.050 - 0.227 * 20.0 + 0.792 * 19.5 - 0.567 * 19.2;
        assert!((values[0] - expected).abs() < 1e-12);
        assert_eq!(w_perp.coefficient_vector(), vec![-0.227, 0.792, -0.567, 0.050]);
        assert_eq!(w_perp.full_description(), "Ivezic w perpendicular (griBlue)");
    }

    #[test]
    fn transforms_with_missing_bands_are_skipped() {
        let colors = transform_catalog(&gri_catalog(), &ivezic_transforms_sdss());
        assert!(colors.contains_key("wPerp"));
        assert!(colors.contains_key("xPara"));
        assert!(!colors.contains_key("yPerp"));
        assert!(!colors.contains_key("yPara"));
    }

    #[test]
    fn fit_range_keeps_points_between_lines() {
        let lines = PerpLines {
            slope: -1.0,
            upper_intercept: 2.0,
            lower_intercept: 1.0,
        };
        let out = color_value_in_fit_range(&[0.1, 0.2, 0.3], &[0.5, 0.5, 0.5], &[0.8, 0.4, 1.6], &lines, 1000.0);
        assert!((out[0] - 100.0).abs() < 1e-9);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
    }

    #[test]
    fn perp_range_applies_other_color_limits() {
        let transform = ColorTransform::new("t", "", true, &[]).with_limits(&[("wPara", -0.2)], &[("wPara", 0.6)]);
        let colors = BTreeMap::from([
            ("wPerp".to_string(), vec![0.01, 0.02, 0.03]),
            ("wPara".to_string(), vec![0.0, 0.7, -0.3]),
        ]);
        let out = color_value_in_perp_range(&colors, "wPerp", &transform, 1000.0).unwrap();
        assert!((out[0] - 10.0).abs() < 1e-9);
        assert!(out[1].is_nan() && out[2].is_nan());

        let missing = ColorTransform::new("t", "", true, &[]).with_limits(&[("xPara", 0.0)], &[]);
        assert!(color_value_in_perp_range(&colors, "wPerp", &missing, 1.0).is_err());
    }

    #[test]
    fn straight_transforms_are_single_band() {
        let straight = straight_transforms();
        assert_eq!(straight.len(), 6);
        assert_eq!(straight["n921"].coefficient("NB0921"), Some(1.0));
    }
}
