//! Input/output helpers.
//!
//! - diagnostics configuration read/write + validation (`config`)
//! - locus fit summary exports (JSON) (`export`)

pub mod config;
pub mod export;

pub use config::*;
pub use export::*;
