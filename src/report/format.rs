//! Text formatting of fits, principal colors and per-label statistics.

use std::collections::BTreeMap;

use crate::analysis::{LocusAnalysis, PrincipalColors};
use crate::domain::{ClippedStatistics, PolynomialModel, SourceLabel};

/// `name = a0 + a1x + a2x^2 ...` with `precision` decimals.
pub fn format_polynomial(name: &str, model: &PolynomialModel, precision: usize) -> String {
    let low_first = model.reversed();
    let mut out = format!("{name} = {:.precision$}", low_first[0]);
    for (power, &c) in low_first.iter().enumerate().skip(1) {
        let sign = if c < 0.0 { '-' } else { '+' };
        let exponent = if power > 1 { format!("^{power}") } else { String::new() };
        out.push_str(&format!(" {sign} {:.precision$}x{exponent}", c.abs()));
    }
    out
}

/// `name = c1 b1 + c2 b2 + c3 b3 + constant` with three decimals.
///
/// `coeffs` has one entry per band followed by the constant.
pub fn format_principal_color(name: &str, coeffs: &[f64], bands: &[&str]) -> String {
    let mut out = format!("{name} =");
    for (i, (&c, band)) in coeffs.iter().zip(bands.iter()).enumerate() {
        out.push_str(&signed_term(c, band, i == 0));
    }
    if let Some(&constant) = coeffs.get(bands.len()) {
        out.push_str(&signed_term(constant, "", bands.is_empty()));
    }
    out
}

fn signed_term(c: f64, band: &str, first: bool) -> String {
    match (first, c < 0.0) {
        (true, true) => format!(" -{:.3}{band}", c.abs()),
        (true, false) => format!(" {:.3}{band}", c),
        (false, true) => format!(" - {:.3}{band}", c.abs()),
        (false, false) => format!(" + {:.3}{band}", c),
    }
}

/// One line per label: `label: Stats(...)`.
pub fn format_label_statistics(description: &str, stats: &BTreeMap<SourceLabel, ClippedStatistics>) -> String {
    let mut out = format!("{description}:\n");
    for (label, s) in stats {
        out.push_str(&format!("  {:<8} {s}\n", label.display_name()));
    }
    out
}

/// Multi-line summary of a locus analysis.
///
/// `bands` names the three bands of the color-color plane, used for the
/// principal-color equations.
pub fn format_locus_summary(name: &str, analysis: &LocusAnalysis, bands: [&str; 3]) -> String {
    let fit = &analysis.fit;
    let mut out = String::new();

    out.push_str(&format!("=== Locus fit: {name} ===\n"));
    out.push_str(&format!(
        "Points: used={} (initial {}) of {}\n",
        fit.num_kept(),
        fit.initial.keep.iter().filter(|&&k| k).count(),
        fit.keep.len()
    ));
    out.push_str(&format!("{}\n", format_polynomial("y_odr", &fit.model, 4)));
    out.push_str(&format!("{}\n", format_polynomial("y_init", &fit.initial.model, 4)));

    if let Some((x, y)) = analysis.high_density {
        out.push_str(&format!("Highest density point: ({x:.3}, {y:.3})\n"));
    }
    if let Some(principal) = &analysis.principal {
        out.push_str(&format_principal_colors(name, principal, bands));
    }

    out.push_str(&format!("Quality: {} rms={:.4}\n", analysis.quality.stats, analysis.quality.rms));

    for check in &analysis.line_checks {
        let status = if check.mismatch { "MISMATCH" } else { "ok" };
        out.push_str(&format!(
            "{} line [{:.3}, {:.3}] at x={:.3}: {status} (suggested [{:.3}, {:.3}])\n",
            check.side.name(),
            check.configured.intercept,
            check.configured.slope,
            check.crossing_x,
            check.suggested.intercept,
            check.suggested.slope
        ));
    }

    out
}

fn format_principal_colors(name: &str, principal: &PrincipalColors, bands: [&str; 3]) -> String {
    let prefix = name.chars().next().map(String::from).unwrap_or_default();
    let (x0, y0) = principal.origin;
    format!(
        "P1/P2 origin: ({x0:.3}, {y0:.3})\n{}\n{}\n",
        format_principal_color(&format!("{prefix}Perp_fit"), &principal.p2, &bands),
        format_principal_color(&format!("{prefix}Para_fit"), &principal.p1, &bands),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_equation() {
        let model = PolynomialModel::new(vec![-0.25, 1.5, 0.1]).unwrap();
        assert_eq!(format_polynomial("y", &model, 2), "y = 0.10 + 1.50x - 0.25x^2");
    }

    #[test]
    fn principal_color_equation() {
        let text = format_principal_color("wPerp", &[-0.227, 0.792, -0.567, 0.050], &["g", "r", "i"]);
        assert_eq!(text, "wPerp = -0.227g + 0.792r - 0.567i + 0.050");
    }

    #[test]
    fn label_table_lists_each_label() {
        use crate::domain::ScalarSample;
        use crate::stats::compute_robust_statistics;

        let stats = BTreeMap::from([(
            SourceLabel::Star,
            compute_robust_statistics(&ScalarSample::from_values(vec![1.0]), 4.0, None),
        )]);
        let text = format_label_statistics("psfMag", &stats);
        assert!(text.starts_with("psfMag:\n  star"));
    }

    #[test]
    fn locus_summary_lists_fit_and_principal_colors() {
        use crate::analysis::analyze_locus;
        use crate::data::{LocusSampleConfig, generate_locus_sample};
        use crate::domain::LocusConfig;

        let sample = generate_locus_sample(&LocusSampleConfig::default()).unwrap();
        let analysis = analyze_locus(&sample.x, &sample.y, &LocusConfig::default()).unwrap();
        let text = format_locus_summary("wFit", &analysis, ["g", "r", "i"]);

        assert!(text.starts_with("=== Locus fit: wFit ===\n"));
        assert!(text.contains("y_odr = "));
        assert!(text.contains("wPerp_fit = "));
        assert!(text.contains("wPara_fit = "));
        assert!(text.contains("Quality: Stats(mean="));
    }
}
