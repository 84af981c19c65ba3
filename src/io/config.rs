//! Read/write diagnostics configuration JSON.
//!
//! The schema is `domain::DiagnosticsConfig`. Every field has a default, so a
//! config file only needs to name what it changes.

use std::fs::File;
use std::path::Path;

use crate::analysis::validate_wired_origins;
use crate::domain::{DiagnosticsConfig, LocusConfig};
use crate::error::{DiagError, ErrorKind};

impl DiagnosticsConfig {
    /// Check the analysis settings, every locus and the wired principal-color
    /// origins.
    pub fn validate(&self) -> Result<(), DiagError> {
        let analysis = &self.analysis;
        if !(analysis.clip.is_finite() && analysis.clip >= 0.0) {
            return Err(invalid(format!("clip must be finite and >= 0, got {}", analysis.clip)));
        }
        if !(analysis.sys_err_tolerance.is_finite() && analysis.sys_err_tolerance > 0.0) {
            return Err(invalid(format!(
                "sysErrTolerance must be finite and > 0, got {}",
                analysis.sys_err_tolerance
            )));
        }

        for (name, locus) in &self.loci {
            validate_locus(locus).map_err(|e| DiagError::new(e.kind(), format!("locus '{name}': {}", e.message())))?;
        }

        validate_wired_origins(&self.transforms)
    }
}

fn validate_locus(locus: &LocusConfig) -> Result<(), DiagError> {
    if locus.degree < 1 {
        return Err(invalid("degree must be >= 1"));
    }
    if locus.iterations < 1 {
        return Err(invalid("iterations must be >= 1"));
    }
    if !(locus.rejection.is_finite() && locus.rejection > 0.0) {
        return Err(invalid(format!("rejection must be finite and > 0, got {}", locus.rejection)));
    }
    if !(locus.unit_scale.is_finite() && locus.unit_scale > 0.0) {
        return Err(invalid(format!("unitScale must be finite and > 0, got {}", locus.unit_scale)));
    }
    locus.region.validate()
}

fn invalid(message: impl Into<String>) -> DiagError {
    DiagError::new(ErrorKind::InvalidInput, message)
}

/// Write a configuration JSON file.
pub fn write_config(path: &Path, config: &DiagnosticsConfig) -> Result<(), DiagError> {
    let file = File::create(path)
        .map_err(|e| DiagError::new(ErrorKind::Io, format!("Failed to create config JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, config)
        .map_err(|e| DiagError::new(ErrorKind::Io, format!("Failed to write config JSON: {e}")))?;
    Ok(())
}

/// Read and validate a configuration JSON file.
pub fn read_config(path: &Path) -> Result<DiagnosticsConfig, DiagError> {
    let file = File::open(path)
        .map_err(|e| DiagError::new(ErrorKind::Io, format!("Failed to open config JSON '{}': {e}", path.display())))?;
    let config: DiagnosticsConfig = serde_json::from_reader(file)
        .map_err(|e| DiagError::new(ErrorKind::Io, format!("Invalid config JSON: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitLine, FitRegion};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("locus-diag-{}-{name}.json", std::process::id()))
    }

    fn w_fit() -> LocusConfig {
        LocusConfig {
            region: FitRegion {
                x_range: Some((0.28, 1.0)),
                y_range: Some((0.02, 0.48)),
                upper_line: Some(FitLine::new(0.52, -1.0)),
                lower_line: Some(FitLine::new(0.20, -1.0)),
            },
            ..LocusConfig::default()
        }
    }

    #[test]
    fn config_round_trips_through_file() {
        let mut config = DiagnosticsConfig::default();
        config.loci.insert("wFit".to_string(), w_fit());
        config.analysis.mag_threshold = 22.5;

        let path = temp_path("round-trip");
        write_config(&path, &config).unwrap();
        let back = read_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: DiagnosticsConfig = serde_json::from_str(r#"{"analysis": {"clip": 3.0}}"#).unwrap();
        assert_eq!(config.analysis.clip, 3.0);
        assert_eq!(config.analysis.mag_threshold, 21.0);
        assert!(config.loci.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_region_is_rejected() {
        let mut locus = w_fit();
        locus.region.x_range = Some((1.0, 0.5));
        let mut config = DiagnosticsConfig::default();
        config.loci.insert("wFit".to_string(), locus);

        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRegion);
        assert!(err.message().starts_with("locus 'wFit'"));
    }

    #[test]
    fn zero_degree_is_rejected() {
        let mut config = DiagnosticsConfig::default();
        config.loci.insert("xFit".to_string(), LocusConfig { degree: 0, ..w_fit() });
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config(&temp_path("does-not-exist")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
