//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - input samples (`ScalarSample`) and their summary (`ClippedStatistics`)
//! - fitted models and fit inputs/outputs (`PolynomialModel`, `FitRegion`,
//!   `LocusFitOptions`, `LocusFit`)
//! - configuration structs (`AnalysisConfig`, `LocusConfig`, `DiagnosticsConfig`)

pub mod types;

pub use types::*;
