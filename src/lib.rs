//! `locus-diag` library crate.
//!
//! Photometric catalog diagnostics:
//!
//! - robust (IQR-clipped) statistics and the systematic-error solve (`stats`)
//! - stellar-locus fitting on color-color planes, OLS then orthogonal (`fit`)
//! - signed distances to a fitted curve (`models`)
//! - principal colors, density and bounding-line checks (`analysis`)
//!
//! Everything is a synchronous pure function over in-memory columns; the only
//! file I/O is the JSON layer in `io`. Logging goes through the `log` facade
//! and no logger is installed here.

pub mod analysis;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod stats;
