//! Polynomial locus model `y = P(x)`.

use crate::domain::PolynomialModel;
use crate::error::{DiagError, ErrorKind};
use crate::math::{polyder, polyval};

impl PolynomialModel {
    /// Build a model from coefficients ordered highest degree first.
    pub fn new(coeffs: Vec<f64>) -> Result<Self, DiagError> {
        if coeffs.is_empty() {
            return Err(DiagError::new(ErrorKind::InvalidInput, "Polynomial needs at least one coefficient."));
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(DiagError::new(
                ErrorKind::InvalidInput,
                format!("Polynomial coefficients must be finite: {coeffs:?}"),
            ));
        }
        Ok(Self { coeffs })
    }

    /// Straight line `y = intercept + slope * x`.
    pub fn line(intercept: f64, slope: f64) -> Result<Self, DiagError> {
        Self::new(vec![slope, intercept])
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Coefficients, highest degree first.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Coefficients, lowest degree first (`[a0, a1, ...]`).
    pub fn reversed(&self) -> Vec<f64> {
        self.coeffs.iter().rev().copied().collect()
    }

    pub fn eval(&self, x: f64) -> f64 {
        polyval(&self.coeffs, x)
    }

    pub fn derivative(&self) -> PolynomialModel {
        PolynomialModel {
            coeffs: polyder(&self.coeffs),
        }
    }

    /// `(intercept, slope)` for a degree-1 model.
    pub fn as_line(&self) -> Option<(f64, f64)> {
        match self.coeffs.as_slice() {
            [slope, intercept] => Some((*intercept, *slope)),
            _ => None,
        }
    }
}
