//! Principal colors from a straight-line locus.
//!
//! On the color-color plane `x = b1 - b2`, `y = b2 - b3`, a linear locus
//! `y = m x + b` with origin `(x0, y0)` on it defines two colors:
//!
//! ```text
//! P2 = (y - m x - b) / sqrt(1 + m^2)                 (perpendicular)
//! P1 = ((x - x0) + m (y - y0)) / sqrt(1 + m^2)       (parallel)
//! ```
//!
//! Written in band magnitudes, each is a coefficient vector
//! `[c_b1, c_b2, c_b3, constant]`, the same layout as
//! `ColorTransform::coefficient_vector`.

use std::collections::BTreeMap;

use crate::data::catalog::ColumnSource;
use crate::data::transform::ColorTransform;
use crate::error::{DiagError, ErrorKind};

/// Wired origins must satisfy the intersection of the P1 and P2 zero lines to
/// this tolerance.
pub const ORIGIN_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalColors {
    /// Perpendicular color, `[b1, b2, b3, constant]`.
    pub p2: [f64; 4],
    /// Parallel color, `[b1, b2, b3, constant]`.
    pub p1: [f64; 4],
    pub origin: (f64, f64),
}

/// Zero lines of P1 and P2 on the color-color plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalLines {
    pub slope_p1: f64,
    pub intercept_p1: f64,
    pub slope_p2: f64,
    pub intercept_p2: f64,
}

/// Closest point on `y = slope x + intercept` to `(x, y)`.
pub fn project_onto_line(slope: f64, intercept: f64, x: f64, y: f64) -> (f64, f64) {
    let denom = slope * slope + 1.0;
    let x0 = (x + slope * (y - intercept)) / denom;
    let y0 = (slope * (x + slope * y) + intercept) / denom;
    (x0, y0)
}

/// P2/P1 coefficients for the line `y = slope x + intercept` with P1 = 0 at
/// `origin`.
pub fn principal_colors_from_line(slope: f64, intercept: f64, origin: (f64, f64)) -> PrincipalColors {
    let norm = (1.0 + slope * slope).sqrt();
    let (x0, y0) = origin;
    let p2 = [-slope, 1.0 + slope, -1.0, -intercept].map(|c| c / norm);
    let p1 = [1.0, slope - 1.0, -slope, -(x0 + slope * y0)].map(|c| c / norm);
    PrincipalColors { p2, p1, origin }
}

/// Zero lines of a perpendicular (`p2`) and parallel (`p1`) color.
///
/// A color `c1 b1 + c2 b2 + c3 b3 + c` with `c1 + c2 + c3 = 0` equals
/// `c1 x + (c1 + c2) y + c`, so its zero line is `y = -c1/(c1+c2) x - c/(c1+c2)`.
/// Coefficient slices are `[b1, b2, b3, constant]`; a two-band color may omit
/// the third band. Returns `None` when a line is vertical.
pub fn lines_from_principal_coeffs(p2: &[f64], p1: &[f64]) -> Option<PrincipalLines> {
    let zero_line = |coeffs: &[f64]| -> Option<(f64, f64)> {
        let (bands, constant) = coeffs.split_at(coeffs.len().checked_sub(1)?);
        let alpha = *bands.first()?;
        let beta = alpha + bands.get(1).copied().unwrap_or(0.0);
        let constant = constant[0];
        if beta == 0.0 {
            return None;
        }
        Some((-alpha / beta, -constant / beta))
    };
    let (slope_p2, intercept_p2) = zero_line(p2)?;
    let (slope_p1, intercept_p1) = zero_line(p1)?;
    Some(PrincipalLines {
        slope_p1,
        intercept_p1,
        slope_p2,
        intercept_p2,
    })
}

impl PrincipalLines {
    /// Vertical mismatch of the two lines at `x`; zero where they cross.
    pub fn mismatch_at(&self, x: f64) -> f64 {
        (self.slope_p1 - self.slope_p2) * x + (self.intercept_p1 - self.intercept_p2)
    }
}

/// Name of the parallel partner of a perpendicular color (`wPerp` → `wPara`).
pub fn parallel_name(perp: &str) -> Option<String> {
    perp.chars().next().map(|c| format!("{c}Para"))
}

/// Check that the wired origin of `perp` lies on the crossing of the zero
/// lines of it and its parallel partner.
pub fn validate_wired_origin(transforms: &BTreeMap<String, ColorTransform>, perp: &str) -> Result<(), DiagError> {
    let invalid = |message: String| DiagError::new(ErrorKind::InvalidInput, message);
    let transform = transforms
        .get(perp)
        .ok_or_else(|| invalid(format!("Unknown color transform '{perp}'.")))?;
    let Some((x0, _)) = transform.origin else {
        return Ok(());
    };
    let para_name = parallel_name(perp).ok_or_else(|| invalid("Empty transform name.".to_string()))?;
    let para = transforms
        .get(&para_name)
        .ok_or_else(|| invalid(format!("Transform '{perp}' has an origin but no '{para_name}' partner.")))?;

    let lines = lines_from_principal_coeffs(&transform.coefficient_vector(), &para.coefficient_vector())
        .ok_or_else(|| invalid(format!("Principal-color lines for '{perp}' are vertical.")))?;
    let mismatch = lines.mismatch_at(x0);
    if !(mismatch.abs() <= ORIGIN_TOLERANCE) {
        return Err(invalid(format!(
            "Wired origin for {perp} does not lie on line associated with wired PCA coefficients \
             (mismatch {mismatch:.2e}). Check that the wired values are correct."
        )));
    }
    Ok(())
}

/// Validate every plotted transform with a wired origin.
pub fn validate_wired_origins(transforms: &BTreeMap<String, ColorTransform>) -> Result<(), DiagError> {
    for (name, transform) in transforms {
        if transform.plot && transform.origin.is_some() {
            validate_wired_origin(transforms, name)?;
        }
    }
    Ok(())
}

/// Per-object value of a principal color from band magnitudes, times
/// `unit_scale`.
pub fn principal_color_values<S: ColumnSource + ?Sized>(
    source: &S,
    bands: [&str; 3],
    coeffs: &[f64; 4],
    unit_scale: f64,
) -> Result<Vec<f64>, DiagError> {
    let mut values = vec![coeffs[3]; source.len()];
    for (band, &c) in bands.iter().zip(coeffs.iter()) {
        for (v, m) in values.iter_mut().zip(source.require_column(band)?) {
            *v += c * m;
        }
    }
    Ok(values.into_iter().map(|v| v * unit_scale).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::Catalog;
    use crate::data::transform::ivezic_transforms_sdss;

    fn eval(coeffs: &[f64; 4], b1: f64, b2: f64, b3: f64) -> f64 {
        coeffs[0] * b1 + coeffs[1] * b2 + coeffs[2] * b3 + coeffs[3]
    }

    /// Bands reproducing the colors `(x, y)` with `b3 = 17`.
    fn bands_for(x: f64, y: f64) -> (f64, f64, f64) {
        let b3 = 17.0;
        let b2 = b3 + y;
        (b2 + x, b2, b3)
    }

    #[test]
    fn p2_vanishes_on_line_and_p1_at_origin() {
        let (m, b) = (0.4, 0.1);
        let origin = project_onto_line(m, b, 0.8, 0.9);
        assert!((origin.1 - (m * origin.0 + b)).abs() < 1e-12);

        let pc = principal_colors_from_line(m, b, origin);
        for x in [0.0, 0.5, 1.3] {
            let (b1, b2, b3) = bands_for(x, m * x + b);
            assert!(eval(&pc.p2, b1, b2, b3).abs() < 1e-12);
        }
        let (b1, b2, b3) = bands_for(origin.0, origin.1);
        assert!(eval(&pc.p1, b1, b2, b3).abs() < 1e-12);

        // Unit offset perpendicular to the line gives P2 = 1.
        let norm = (1.0 + m * m).sqrt();
        let (b1, b2, b3) = bands_for(origin.0 - m / norm, origin.1 + 1.0 / norm);
        assert!((eval(&pc.p2, b1, b2, b3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_lines_cross_at_origin() {
        let pc = principal_colors_from_line(0.4, 0.1, (0.5, 0.3));
        let lines = lines_from_principal_coeffs(&pc.p2, &pc.p1).unwrap();
        assert!((lines.slope_p2 - 0.4).abs() < 1e-12);
        assert!((lines.intercept_p2 - 0.1).abs() < 1e-12);
        assert!(lines.mismatch_at(0.5).abs() < 1e-12);
    }

    #[test]
    fn sdss_w_origin_is_consistent() {
        let mut transforms = ivezic_transforms_sdss();
        assert!(validate_wired_origin(&transforms, "wPerp").is_ok());

        if let Some(w) = transforms.get_mut("wPerp") {
            w.origin = Some((0.5, 0.0818));
        }
        let err = validate_wired_origin(&transforms, "wPerp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn transform_without_origin_is_not_checked() {
        assert!(validate_wired_origin(&ivezic_transforms_sdss(), "xPerp").is_ok());
        assert!(validate_wired_origin(&ivezic_transforms_sdss(), "nope").is_err());
    }

    #[test]
    fn principal_values_from_catalog() {
        let pc = principal_colors_from_line(0.0, 0.2, (0.0, 0.2));
        let (b1, b2, b3) = bands_for(0.3, 0.5);
        let cat = Catalog::new(1)
            .with_column("g", vec![b1])
            .unwrap()
            .with_column("r", vec![b2])
            .unwrap()
            .with_column("i", vec![b3])
            .unwrap();
        let p2 = principal_color_values(&cat, ["g", "r", "i"], &pc.p2, 1000.0).unwrap();
        assert!((p2[0] - 300.0).abs() < 1e-9);
    }
}
