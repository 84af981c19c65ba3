//! Fit-region membership.
//!
//! A region is the intersection of up to four constraints, all strict:
//! an x-range, a y-range, "below the upper line" and "above the lower line".

use crate::domain::{FitLine, FitRegion, REGION_PAD_FRACTION};
use crate::error::{DiagError, ErrorKind};

impl FitRegion {
    pub fn validate(&self) -> Result<(), DiagError> {
        for (name, range) in [("x", self.x_range), ("y", self.y_range)] {
            if let Some((min, max)) = range {
                if !(min.is_finite() && max.is_finite()) {
                    return Err(DiagError::new(
                        ErrorKind::InvalidRegion,
                        format!("Fit {name}-range must be finite, got ({min}, {max})."),
                    ));
                }
                if min >= max {
                    return Err(DiagError::new(
                        ErrorKind::InvalidRegion,
                        format!("Fit {name}-range must have min < max, got ({min}, {max})."),
                    ));
                }
            }
        }
        for (name, line) in [("upper", self.upper_line), ("lower", self.lower_line)] {
            if let Some(FitLine { intercept, slope }) = line {
                if !(intercept.is_finite() && slope.is_finite()) {
                    return Err(DiagError::new(
                        ErrorKind::InvalidRegion,
                        format!("Fit {name} line must be finite, got intercept={intercept}, slope={slope}."),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        if let Some((min, max)) = self.x_range {
            if !(x > min && x < max) {
                return false;
            }
        }
        if let Some((min, max)) = self.y_range {
            if !(y > min && y < max) {
                return false;
            }
        }
        if let Some(line) = self.upper_line {
            if !(y < line.y_at(x)) {
                return false;
            }
        }
        if let Some(line) = self.lower_line {
            if !(y > line.y_at(x)) {
                return false;
            }
        }
        true
    }

    /// Membership of every point.
    pub fn mask(&self, x: &[f64], y: &[f64]) -> Vec<bool> {
        x.iter().zip(y.iter()).map(|(&xi, &yi)| self.contains(xi, yi)).collect()
    }

    /// Ranges widened by `fraction` of their span on each side. Lines are kept.
    pub fn padded(&self, fraction: f64) -> FitRegion {
        let pad = |range: Option<(f64, f64)>| {
            range.map(|(min, max)| {
                let span = max - min;
                (min - fraction * span, max + fraction * span)
            })
        };
        FitRegion {
            x_range: pad(self.x_range),
            y_range: pad(self.y_range),
            upper_line: self.upper_line,
            lower_line: self.lower_line,
        }
    }

    /// The relaxed region used after the first clip iteration.
    pub fn relaxed(&self) -> FitRegion {
        self.padded(REGION_PAD_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_region() -> FitRegion {
        FitRegion {
            x_range: Some((0.0, 1.0)),
            y_range: Some((0.0, 2.0)),
            upper_line: Some(FitLine::new(1.5, 0.0)),
            lower_line: None,
        }
    }

    #[test]
    fn membership_is_strict() {
        let region = box_region();
        assert!(region.contains(0.5, 1.0));
        assert!(!region.contains(0.0, 1.0));
        assert!(!region.contains(0.5, 1.5));
        assert!(!region.contains(0.5, 1.75));
        assert!(!region.contains(f64::NAN, 1.0));
        assert!(FitRegion::default().contains(1e9, -1e9));
    }

    #[test]
    fn relaxed_region_grows_ranges_only() {
        let relaxed = box_region().relaxed();
        let (xmin, xmax) = relaxed.x_range.unwrap();
        assert!((xmin + 0.07).abs() < 1e-12 && (xmax - 1.07).abs() < 1e-12);
        let (ymin, ymax) = relaxed.y_range.unwrap();
        assert!((ymin + 0.14).abs() < 1e-12 && (ymax - 2.14).abs() < 1e-12);
        assert_eq!(relaxed.upper_line, box_region().upper_line);
    }

    #[test]
    fn validation_rejects_malformed_regions() {
        assert!(box_region().validate().is_ok());

        let inverted = FitRegion {
            x_range: Some((1.0, 1.0)),
            ..FitRegion::default()
        };
        assert_eq!(inverted.validate().unwrap_err().kind(), ErrorKind::InvalidRegion);

        let infinite = FitRegion {
            y_range: Some((0.0, f64::INFINITY)),
            ..FitRegion::default()
        };
        assert!(infinite.validate().is_err());

        let bad_line = FitRegion {
            lower_line: Some(FitLine::new(f64::NAN, 1.0)),
            ..FitRegion::default()
        };
        assert!(bad_line.validate().is_err());
    }
}
