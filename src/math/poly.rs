//! Dense polynomial helpers.
//!
//! Coefficients are stored highest degree first (`[a_n, ..., a_1, a_0]`), which
//! is the ordering used for every fitted model in this crate.

/// Evaluate a polynomial at `x` with Horner's scheme.
///
/// An empty coefficient slice is the zero polynomial.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// First derivative. The derivative of a constant is `[0.0]`.
pub fn polyder(coeffs: &[f64]) -> Vec<f64> {
    let n = coeffs.len();
    if n <= 1 {
        return vec![0.0];
    }
    coeffs[..n - 1]
        .iter()
        .enumerate()
        .map(|(i, &c)| c * (n - 1 - i) as f64)
        .collect()
}

/// Sum of two polynomials, aligned on the constant term.
pub fn polyadd(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let mut out = vec![0.0; n];
    for (i, &c) in a.iter().enumerate() {
        out[n - a.len() + i] += c;
    }
    for (i, &c) in b.iter().enumerate() {
        out[n - b.len() + i] += c;
    }
    out
}

/// Product of two polynomials.
pub fn polymul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ca) in a.iter().enumerate() {
        for (j, &cb) in b.iter().enumerate() {
            out[i + j] += ca * cb;
        }
    }
    out
}

/// Drop leading coefficients that are exactly zero (keeps at least one term).
pub fn trim_leading_zeros(coeffs: &[f64]) -> &[f64] {
    let first = coeffs.iter().position(|&c| c != 0.0).unwrap_or(coeffs.len().saturating_sub(1));
    &coeffs[first..]
}
